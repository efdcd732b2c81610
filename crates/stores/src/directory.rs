//! User directory.
//!
//! Owns the registered-user records: case-insensitive email lookup,
//! registration, credential validation, and recency queries. Email
//! uniqueness is the caller's job - check [`UserDirectory::by_email`]
//! before [`UserDirectory::create`].
//!
//! Passwords are stored and compared in plaintext. That is the source
//! system's demo-grade behavior, preserved as specified; the hashing
//! boundary lives outside this layer.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use shopstate_core::{Email, UserId, UserRole};

use crate::collection::Collection;
use crate::feed::ChangeFeed;
use crate::persist::{Slot, StorageBackend};
use crate::seed;
use crate::subscription::Subscription;

/// A registered user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub id: UserId,
    /// Case-insensitive unique key (uniqueness enforced by callers).
    pub email: Email,
    pub name: String,
    pub role: UserRole,
    /// Plaintext, per the source system.
    pub password: String,
    pub created_at: DateTime<Utc>,
}

/// Input for [`UserDirectory::create`]: a user before the directory
/// assigns its id and timestamp.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: Email,
    pub name: String,
    pub role: UserRole,
    pub password: String,
}

/// The user directory (slot `registered-users`).
pub struct UserDirectory {
    inner: Collection<UserRecord>,
}

impl UserDirectory {
    /// Open the directory over `backend`, seeding the demo admin and
    /// customer accounts when the slot is absent or unparsable.
    #[must_use]
    pub fn open(backend: Arc<dyn StorageBackend>, feed: Option<ChangeFeed>) -> Self {
        Self {
            inner: Collection::open(backend, feed, Slot::RegisteredUsers, || {
                seed::users(Utc::now())
            }),
        }
    }

    /// All registered users, in registration order.
    #[must_use]
    pub fn all(&self) -> Vec<UserRecord> {
        self.inner.snapshot()
    }

    /// First user whose email matches `email`, ignoring case.
    #[must_use]
    pub fn by_email(&self, email: &str) -> Option<UserRecord> {
        self.inner
            .read(|users| users.iter().find(|u| u.email.matches(email)).cloned())
    }

    /// Register a user: assigns a random id and the creation timestamp,
    /// and returns the stored record. Does not check email uniqueness.
    pub fn create(&self, user: NewUser) -> UserRecord {
        self.inner.mutate(|users| {
            let created = UserRecord {
                id: UserId::new(Uuid::new_v4().to_string()),
                email: user.email,
                name: user.name,
                role: user.role,
                password: user.password,
                created_at: Utc::now(),
            };
            users.push(created.clone());
            created
        })
    }

    /// Look up by email and compare the stored password. Returns the
    /// full record on a match, `None` on unknown email or wrong password.
    #[must_use]
    pub fn validate_credentials(&self, email: &str, password: &str) -> Option<UserRecord> {
        self.by_email(email).filter(|user| user.password == password)
    }

    /// Number of registered users.
    #[must_use]
    pub fn count(&self) -> usize {
        self.inner.read(|users| users.len())
    }

    /// The `limit` most recently registered users, newest first.
    #[must_use]
    pub fn recent(&self, limit: usize) -> Vec<UserRecord> {
        let mut users = self.inner.snapshot();
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        users.truncate(limit);
        users
    }

    /// Register a listener; fires synchronously after every mutation's
    /// persisted write, with a snapshot of the records.
    pub fn subscribe(
        &self,
        listener: impl Fn(&[UserRecord]) + Send + Sync + 'static,
    ) -> Subscription {
        self.inner.subscribe(listener)
    }

    /// Re-read the slot after another context changed it.
    pub fn reload(&self) {
        self.inner.reload();
    }

    /// Poll the slot; reload and notify only on a changed blob.
    pub fn reload_if_changed(&self) -> bool {
        self.inner.reload_if_changed()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::persist::MemoryBackend;

    fn open_directory() -> UserDirectory {
        UserDirectory::open(Arc::new(MemoryBackend::new()), None)
    }

    fn new_user(email: &str) -> NewUser {
        NewUser {
            email: Email::parse(email).unwrap(),
            name: "New User".to_owned(),
            role: UserRole::Customer,
            password: "hunter2".to_owned(),
        }
    }

    #[test]
    fn test_opens_with_demo_accounts() {
        let directory = open_directory();
        assert_eq!(directory.count(), 2);
        assert!(directory.by_email("admin@example.com").is_some());
        assert!(directory.by_email("customer@example.com").is_some());
    }

    #[test]
    fn test_by_email_ignores_case() {
        let directory = open_directory();
        let user = directory.by_email("ADMIN@Example.COM").unwrap();
        assert_eq!(user.role, UserRole::Admin);
    }

    #[test]
    fn test_create_assigns_unique_ids() {
        let directory = open_directory();
        let first = directory.create(new_user("a@example.com"));
        let second = directory.create(new_user("b@example.com"));

        assert_ne!(first.id, second.id);
        assert_eq!(directory.count(), 4);
    }

    #[test]
    fn test_create_does_not_enforce_uniqueness() {
        // Uniqueness is the caller's pre-check; the directory will
        // happily store a duplicate, and lookups return the first match.
        let directory = open_directory();
        let duplicate = directory.create(new_user("admin@example.com"));

        let found = directory.by_email("admin@example.com").unwrap();
        assert_ne!(found.id, duplicate.id);
        assert_eq!(found.role, UserRole::Admin);
    }

    #[test]
    fn test_validate_credentials() {
        let directory = open_directory();

        let user = directory
            .validate_credentials("customer@example.com", "password")
            .unwrap();
        assert_eq!(user.name, "Customer User");

        assert!(
            directory
                .validate_credentials("customer@example.com", "wrong")
                .is_none()
        );
        assert!(
            directory
                .validate_credentials("ghost@example.com", "password")
                .is_none()
        );
    }

    #[test]
    fn test_validate_credentials_is_case_insensitive_on_email_only() {
        let directory = open_directory();
        assert!(
            directory
                .validate_credentials("CUSTOMER@example.com", "password")
                .is_some()
        );
        assert!(
            directory
                .validate_credentials("customer@example.com", "PASSWORD")
                .is_none()
        );
    }

    #[test]
    fn test_recent_sorts_newest_first_and_truncates() {
        let directory = open_directory();
        let newest = directory.create(new_user("new@example.com"));

        let recent = directory.recent(2);
        assert_eq!(recent.len(), 2);
        assert_eq!(recent.first().unwrap().id, newest.id);

        assert_eq!(directory.recent(10).len(), 3);
    }

    #[test]
    fn test_round_trip_into_fresh_instance() {
        let backend = Arc::new(MemoryBackend::new());
        let directory =
            UserDirectory::open(Arc::clone(&backend) as Arc<dyn StorageBackend>, None);
        directory.create(new_user("extra@example.com"));

        let reopened =
            UserDirectory::open(Arc::clone(&backend) as Arc<dyn StorageBackend>, None);
        assert_eq!(reopened.all(), directory.all());
    }
}
