//! Inspect the persisted collections.

#![allow(clippy::print_stdout)] // stdout is these commands' output

use std::sync::Arc;

use shopstate_stores::{
    CartStore, FileBackend, OrderStore, ProductCatalogStore, StorageBackend, UserDirectory,
};

use crate::Collection;
use crate::config::CliConfig;

/// Print order statistics and the registered-user count.
///
/// # Errors
///
/// Returns an error if the data directory cannot be created or the
/// output cannot be serialized.
pub fn stats(config: &CliConfig) -> Result<(), Box<dyn std::error::Error>> {
    let backend: Arc<dyn StorageBackend> = Arc::new(FileBackend::open(&config.data_dir)?);

    let orders = OrderStore::open(Arc::clone(&backend), None);
    let users = UserDirectory::open(backend, None);

    let stats = orders.stats();
    println!("{}", serde_json::to_string_pretty(&stats)?);
    println!("registered users: {}", users.count());
    Ok(())
}

/// Dump one collection as pretty JSON.
///
/// # Errors
///
/// Returns an error if the data directory cannot be created or the
/// collection cannot be serialized.
pub fn list(config: &CliConfig, collection: Collection) -> Result<(), Box<dyn std::error::Error>> {
    let backend: Arc<dyn StorageBackend> = Arc::new(FileBackend::open(&config.data_dir)?);

    let json = match collection {
        Collection::Products => {
            serde_json::to_string_pretty(&ProductCatalogStore::open(backend, None).list())?
        }
        Collection::Cart => serde_json::to_string_pretty(&CartStore::open(backend, None).lines())?,
        Collection::Orders => serde_json::to_string_pretty(&OrderStore::open(backend, None).all())?,
        Collection::Users => {
            serde_json::to_string_pretty(&UserDirectory::open(backend, None).all())?
        }
    };
    println!("{json}");
    Ok(())
}
