//! Integration tests for Shopstate.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p shopstate-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `checkout_flow` - Catalog, cart, and order stores composed the way
//!   the storefront composes them
//! - `cross_context` - Two store sets over one backend: change feed,
//!   polling, last-writer-wins
//! - `persistence` - File-backend round trips and fallback behavior

use std::sync::Arc;

use shopstate_stores::{
    CartStore, ChangeFeed, OrderStore, ProductCatalogStore, StorageBackend, UserDirectory,
};

/// One execution context's full set of stores over a shared backend.
///
/// Mirrors how an application wires the layer: one backend, one optional
/// feed, four independently constructed stores.
pub struct StoreSet {
    pub catalog: ProductCatalogStore,
    pub cart: CartStore,
    pub orders: OrderStore,
    pub users: UserDirectory,
}

impl StoreSet {
    /// Open all four stores over `backend`, publishing to `feed` if given.
    #[must_use]
    pub fn open(backend: &Arc<dyn StorageBackend>, feed: Option<&ChangeFeed>) -> Self {
        Self {
            catalog: ProductCatalogStore::open(Arc::clone(backend), feed.cloned()),
            cart: CartStore::open(Arc::clone(backend), feed.cloned()),
            orders: OrderStore::open(Arc::clone(backend), feed.cloned()),
            users: UserDirectory::open(Arc::clone(backend), feed.cloned()),
        }
    }
}
