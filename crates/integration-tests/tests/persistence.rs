//! File-backend behavior: seeding, round trips, and fallback.

use std::sync::Arc;

use rust_decimal::Decimal;

use shopstate_core::{OrderStatus, ProductId};
use shopstate_integration_tests::StoreSet;
use shopstate_stores::{FileBackend, NewOrder, Slot, StorageBackend};

fn open_file_backend(dir: &std::path::Path) -> Arc<dyn StorageBackend> {
    Arc::new(FileBackend::open(dir).expect("temp dir is writable"))
}

#[test]
fn test_open_seeds_slot_files() {
    let dir = tempfile::tempdir().expect("temp dir");
    let backend = open_file_backend(dir.path());
    let _ctx = StoreSet::open(&backend, None);

    for slot in ["products", "cart", "orders", "registered-users"] {
        assert!(
            dir.path().join(format!("{slot}.json")).exists(),
            "missing {slot}.json"
        );
    }
}

#[test]
fn test_every_collection_round_trips_through_files() {
    let dir = tempfile::tempdir().expect("temp dir");
    let backend = open_file_backend(dir.path());

    let ctx = StoreSet::open(&backend, None);
    let headphones = ctx.catalog.get(&ProductId::new("1")).expect("seeded");
    ctx.cart.add_item(&headphones);
    ctx.orders.create(NewOrder {
        user_id: "2".into(),
        user_email: "customer@example.com".to_owned(),
        user_name: "Customer User".to_owned(),
        lines: Vec::new(),
        total: Decimal::new(999, 2),
        status: OrderStatus::Pending,
        shipping_address: None,
        payment_session_id: None,
    });
    ctx.catalog.set_stock(&headphones.id, 44);

    // A fresh context over the same directory reproduces every
    // collection by value.
    let reopened = StoreSet::open(&backend, None);
    assert_eq!(reopened.catalog.list(), ctx.catalog.list());
    assert_eq!(reopened.cart.lines(), ctx.cart.lines());
    assert_eq!(reopened.orders.all(), ctx.orders.all());
    assert_eq!(reopened.users.all(), ctx.users.all());
}

#[test]
fn test_corrupted_slot_is_seed_replaced_on_open() {
    let dir = tempfile::tempdir().expect("temp dir");
    let backend = open_file_backend(dir.path());

    {
        let ctx = StoreSet::open(&backend, None);
        ctx.catalog.set_stock(&ProductId::new("1"), 7);
    }

    // Someone corrupts the products file between sessions.
    std::fs::write(dir.path().join("products.json"), "{definitely not json")
        .expect("temp dir is writable");

    // The next open falls back to the seed catalog and writes it back.
    let ctx = StoreSet::open(&backend, None);
    assert_eq!(ctx.catalog.list().len(), 6);
    assert_eq!(
        ctx.catalog.get(&ProductId::new("1")).expect("seeded").stock,
        45
    );

    let blob = backend
        .read(Slot::Products)
        .expect("readable")
        .expect("rewritten");
    assert!(blob.starts_with('['));
}

#[test]
fn test_notification_follows_the_file_write() {
    let dir = tempfile::tempdir().expect("temp dir");
    let backend = open_file_backend(dir.path());
    let ctx = StoreSet::open(&backend, None);

    // The listener inspects the file the moment it fires; the mutation
    // must already be durable by then.
    let products_file = dir.path().join("products.json");
    let observed = Arc::new(std::sync::Mutex::new(String::new()));
    let seen = Arc::clone(&observed);
    let _sub = ctx.catalog.subscribe(move |_| {
        *seen.lock().expect("not poisoned") =
            std::fs::read_to_string(&products_file).expect("file exists");
    });

    ctx.catalog.set_stock(&ProductId::new("1"), 11);

    let blob = observed.lock().expect("not poisoned").clone();
    assert!(blob.contains("\"stock\":11"));
}

#[test]
fn test_reset_to_defaults_round_trips_idempotently() {
    let dir = tempfile::tempdir().expect("temp dir");
    let backend = open_file_backend(dir.path());
    let ctx = StoreSet::open(&backend, None);

    ctx.catalog.delete(&ProductId::new("1"));
    ctx.catalog.reset_to_defaults();
    let once = ctx.catalog.list();
    ctx.catalog.reset_to_defaults();
    let twice = ctx.catalog.list();
    assert_eq!(once, twice);

    let reopened = StoreSet::open(&backend, None);
    assert_eq!(reopened.catalog.list(), twice);
}
