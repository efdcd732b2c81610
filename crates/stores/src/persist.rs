//! The durable key-value persistence surface.
//!
//! Each store owns one named [`Slot`] holding its entire collection as a
//! single JSON blob (an array of entity records). The surface is
//! deliberately narrow - read a blob, write a blob - so the stores can sit
//! on top of anything origin-scoped and durable.
//!
//! # Failure contract
//!
//! - Read failures and unparsable blobs are absorbed: the store falls back
//!   to its seed collection and immediately persists it.
//! - Write failures are logged and otherwise ignored: the in-memory
//!   collection runs ahead of the persisted state until the next
//!   successful write. Callers are never told apart success from failure.
//!
//! There is no schema version field; a blob that no longer parses is
//! seed-replaced on the next load.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{error, warn};

use crate::feed::ChangeFeed;
use crate::sync::lock;

/// Named persistence slots, one per store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    /// Product catalog collection.
    Products,
    /// Cart line collection.
    Cart,
    /// Order log.
    Orders,
    /// Registered-user records.
    RegisteredUsers,
}

impl Slot {
    /// The slot's stable key on the persistence surface.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Products => "products",
            Self::Cart => "cart",
            Self::Orders => "orders",
            Self::RegisteredUsers => "registered-users",
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors surfaced by [`StorageBackend`] implementations.
///
/// Stores absorb these at the boundary; they only reach callers through
/// backend construction ([`FileBackend::open`]).
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The backend could not be initialized.
    #[error("failed to initialize storage: {0}")]
    Init(String),
    /// Reading or writing a slot failed.
    #[error("IO error: {0}")]
    Io(String),
}

/// A durable key-value surface holding one serialized blob per slot.
///
/// Implementations must be usable from multiple stores at once; all
/// methods take `&self`.
pub trait StorageBackend: Send + Sync {
    /// Read the blob stored in `slot`, or `None` if the slot is absent.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Io`] if the slot exists but cannot be read.
    fn read(&self, slot: Slot) -> Result<Option<String>, StorageError>;

    /// Replace the blob stored in `slot`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Io`] if the write fails (e.g. quota or
    /// filesystem errors). Stores log and continue on this error.
    fn write(&self, slot: Slot, blob: &str) -> Result<(), StorageError>;
}

/// In-memory backend for tests and throwaway contexts.
///
/// Shared between store instances via `Arc` to simulate two execution
/// contexts over one origin.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    slots: Mutex<HashMap<Slot, String>>,
}

impl MemoryBackend {
    /// Create an empty backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageBackend for MemoryBackend {
    fn read(&self, slot: Slot) -> Result<Option<String>, StorageError> {
        Ok(lock(&self.slots).get(&slot).cloned())
    }

    fn write(&self, slot: Slot, blob: &str) -> Result<(), StorageError> {
        lock(&self.slots).insert(slot, blob.to_owned());
        Ok(())
    }
}

/// File-per-slot backend: `<dir>/<slot>.json`.
///
/// The durable analogue of the browser's origin-scoped local storage; all
/// execution contexts pointing at the same directory share the same slots.
#[derive(Debug, Clone)]
pub struct FileBackend {
    dir: PathBuf,
}

impl FileBackend {
    /// Open a backend rooted at `dir`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Init`] if the directory cannot be created.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, StorageError> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir)
            .map_err(|e| StorageError::Init(format!("{}: {e}", dir.display())))?;
        Ok(Self { dir })
    }

    fn slot_path(&self, slot: Slot) -> PathBuf {
        self.dir.join(format!("{slot}.json"))
    }
}

impl StorageBackend for FileBackend {
    fn read(&self, slot: Slot) -> Result<Option<String>, StorageError> {
        match std::fs::read_to_string(self.slot_path(slot)) {
            Ok(blob) => Ok(Some(blob)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::Io(e.to_string())),
        }
    }

    fn write(&self, slot: Slot, blob: &str) -> Result<(), StorageError> {
        std::fs::write(self.slot_path(slot), blob).map_err(|e| StorageError::Io(e.to_string()))
    }
}

/// Load a collection from `slot`, falling back to `seed` when the slot is
/// absent, unreadable, or unparsable. The fallback is persisted
/// immediately so the next context sees it.
///
/// Returns the collection together with the blob that represents it (used
/// as the store's last-seen value for change detection).
pub(crate) fn load_or_seed<T>(
    backend: &dyn StorageBackend,
    slot: Slot,
    seed: impl FnOnce() -> Vec<T>,
) -> (Vec<T>, Option<String>)
where
    T: Serialize + DeserializeOwned,
{
    match backend.read(slot) {
        Ok(Some(blob)) => match serde_json::from_str::<Vec<T>>(&blob) {
            Ok(items) => (items, Some(blob)),
            Err(e) => {
                error!(slot = %slot, error = %e, "Unparsable blob, replacing with seed data");
                seed_and_persist(backend, slot, seed())
            }
        },
        Ok(None) => seed_and_persist(backend, slot, seed()),
        Err(e) => {
            warn!(slot = %slot, error = %e, "Failed to read slot, falling back to seed data");
            seed_and_persist(backend, slot, seed())
        }
    }
}

fn seed_and_persist<T: Serialize>(
    backend: &dyn StorageBackend,
    slot: Slot,
    items: Vec<T>,
) -> (Vec<T>, Option<String>) {
    let blob = write_through(backend, None, slot, &items);
    (items, blob)
}

/// Serialize `items`, write the blob to `slot`, and publish the change on
/// the feed when the write succeeded.
///
/// Returns the serialized blob (whether or not the write stuck); the
/// in-memory collection is the source of truth between writes.
pub(crate) fn write_through<T: Serialize>(
    backend: &dyn StorageBackend,
    feed: Option<&ChangeFeed>,
    slot: Slot,
    items: &[T],
) -> Option<String> {
    let blob = match serde_json::to_string(items) {
        Ok(blob) => blob,
        Err(e) => {
            error!(slot = %slot, error = %e, "Failed to serialize collection");
            return None;
        }
    };

    match backend.write(slot, &blob) {
        Ok(()) => {
            if let Some(feed) = feed {
                feed.publish(slot, blob.clone());
            }
        }
        Err(e) => {
            error!(slot = %slot, error = %e, "Failed to persist collection, memory is ahead of storage");
        }
    }

    Some(blob)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_keys_are_stable() {
        assert_eq!(Slot::Products.as_str(), "products");
        assert_eq!(Slot::Cart.as_str(), "cart");
        assert_eq!(Slot::Orders.as_str(), "orders");
        assert_eq!(Slot::RegisteredUsers.as_str(), "registered-users");
    }

    #[test]
    fn test_memory_backend_round_trip() {
        let backend = MemoryBackend::new();
        assert!(backend.read(Slot::Cart).unwrap().is_none());

        backend.write(Slot::Cart, "[]").unwrap();
        assert_eq!(backend.read(Slot::Cart).unwrap().as_deref(), Some("[]"));

        backend.write(Slot::Cart, "[1]").unwrap();
        assert_eq!(backend.read(Slot::Cart).unwrap().as_deref(), Some("[1]"));
    }

    #[test]
    fn test_file_backend_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FileBackend::open(dir.path()).unwrap();

        assert!(backend.read(Slot::Products).unwrap().is_none());
        backend.write(Slot::Products, "[{\"id\":\"1\"}]").unwrap();
        assert_eq!(
            backend.read(Slot::Products).unwrap().as_deref(),
            Some("[{\"id\":\"1\"}]")
        );
        assert!(dir.path().join("products.json").exists());
    }

    #[test]
    fn test_load_or_seed_absent_slot_persists_seed() {
        let backend = MemoryBackend::new();
        let (items, blob) = load_or_seed(&backend, Slot::Products, || vec![1u32, 2, 3]);

        assert_eq!(items, vec![1, 2, 3]);
        assert_eq!(blob.as_deref(), Some("[1,2,3]"));
        // The fallback was written through immediately.
        assert_eq!(
            backend.read(Slot::Products).unwrap().as_deref(),
            Some("[1,2,3]")
        );
    }

    #[test]
    fn test_load_or_seed_unparsable_blob_is_replaced() {
        let backend = MemoryBackend::new();
        backend.write(Slot::Products, "{not json").unwrap();

        let (items, _) = load_or_seed(&backend, Slot::Products, || vec![7u32]);
        assert_eq!(items, vec![7]);
        assert_eq!(
            backend.read(Slot::Products).unwrap().as_deref(),
            Some("[7]")
        );
    }

    #[test]
    fn test_load_or_seed_prefers_stored_blob() {
        let backend = MemoryBackend::new();
        backend.write(Slot::Products, "[9]").unwrap();

        let (items, blob) = load_or_seed(&backend, Slot::Products, || vec![1u32]);
        assert_eq!(items, vec![9]);
        assert_eq!(blob.as_deref(), Some("[9]"));
    }
}
