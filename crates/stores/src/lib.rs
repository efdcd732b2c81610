//! Shopstate Stores - the reactive, persisted state layer.
//!
//! Four stores share one shape: an in-memory entity collection, a
//! subscriber list, and a named slot on a durable key-value surface.
//! Every mutation validates its input, updates the collection, writes the
//! full collection back to the slot, and then notifies subscribers
//! synchronously - write-then-notify, no batching.
//!
//! - [`ProductCatalogStore`] - product CRUD plus filtered views
//! - [`CartStore`] - per-session lines with stock-bounded quantities
//! - [`OrderStore`] - append-mostly order log with derived statistics
//! - [`UserDirectory`] - registered users and credential validation
//!
//! Stores are explicitly constructed with a [`StorageBackend`] (and an
//! optional [`ChangeFeed`]) and injected into consumers; there is no
//! global instance. Tests construct isolated stores over a
//! [`MemoryBackend`].
//!
//! # Consistency model
//!
//! All operations are synchronous and run to completion; within one
//! execution context, subscriber notifications are strictly ordered by
//! subscription order and issued after the persisted write attempt.
//! Across contexts the shared slot is last-writer-wins: propagation is
//! best-effort via the change feed ([`ChangeFeed`]) or polling
//! (`reload_if_changed`), with no locking and no merge.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod directory;
pub mod feed;
pub mod orders;
pub mod persist;
pub mod seed;
pub mod subscription;

mod collection;
mod sync;

pub use cart::{CartLine, CartOutcome, CartStore};
pub use catalog::{NewProduct, Product, ProductCatalogStore, ProductPatch};
pub use directory::{NewUser, UserDirectory, UserRecord};
pub use feed::{ChangeFeed, ChangeListener, ChangeNotice};
pub use orders::{NewOrder, Order, OrderLine, OrderStats, OrderStore, ShippingAddress};
pub use persist::{FileBackend, MemoryBackend, Slot, StorageBackend, StorageError};
pub use subscription::Subscription;
