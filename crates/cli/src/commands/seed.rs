//! Seed and reset the persisted slots.

use std::sync::Arc;

use tracing::info;

use shopstate_stores::{
    CartStore, FileBackend, OrderStore, ProductCatalogStore, StorageBackend, UserDirectory,
};

use crate::config::CliConfig;

/// Seed every absent slot with demo data.
///
/// Opening a store seeds its slot when the slot is absent or unparsable;
/// slots that already hold data are left untouched.
///
/// # Errors
///
/// Returns an error if the data directory cannot be created.
pub fn run(config: &CliConfig) -> Result<(), Box<dyn std::error::Error>> {
    let backend: Arc<dyn StorageBackend> = Arc::new(FileBackend::open(&config.data_dir)?);

    let catalog = ProductCatalogStore::open(Arc::clone(&backend), None);
    let cart = CartStore::open(Arc::clone(&backend), None);
    let orders = OrderStore::open(Arc::clone(&backend), None);
    let users = UserDirectory::open(Arc::clone(&backend), None);

    info!(
        dir = %config.data_dir.display(),
        products = catalog.list().len(),
        cart_lines = cart.lines().len(),
        orders = orders.all().len(),
        users = users.count(),
        "Slots seeded"
    );
    Ok(())
}

/// Reset the product catalog to seed data (operator cache refresh).
///
/// # Errors
///
/// Returns an error if the data directory cannot be created.
pub fn reset(config: &CliConfig) -> Result<(), Box<dyn std::error::Error>> {
    let backend: Arc<dyn StorageBackend> = Arc::new(FileBackend::open(&config.data_dir)?);

    let catalog = ProductCatalogStore::open(backend, None);
    catalog.reset_to_defaults();

    info!(products = catalog.list().len(), "Catalog reset to defaults");
    Ok(())
}
