//! End-to-end storefront flows composed from the individual stores.
//!
//! The stores never call each other; all composition happens here, the
//! way consuming application code joins them.

use std::sync::Arc;

use rust_decimal::Decimal;

use shopstate_core::{Email, OrderStatus, ProductId, UserRole};
use shopstate_integration_tests::StoreSet;
use shopstate_stores::{
    CartOutcome, MemoryBackend, NewOrder, NewUser, OrderLine, StorageBackend,
};

fn open_context() -> StoreSet {
    let backend: Arc<dyn StorageBackend> = Arc::new(MemoryBackend::new());
    StoreSet::open(&backend, None)
}

// =============================================================================
// Customer Checkout
// =============================================================================

#[test]
fn test_full_checkout_flow() {
    let ctx = open_context();

    // Sign in with the seeded demo account.
    let customer = ctx
        .users
        .validate_credentials("customer@example.com", "password")
        .expect("demo credentials are valid");

    // Browse: the out-of-stock cable is not on offer.
    let storefront = ctx.catalog.active_products();
    assert!(storefront.iter().all(|p| p.id.as_str() != "4"));

    // Add two units of the headphones and one speaker.
    let headphones = ctx.catalog.get(&ProductId::new("1")).expect("seeded");
    let speaker = ctx.catalog.get(&ProductId::new("5")).expect("seeded");
    assert_eq!(ctx.cart.add_item(&headphones), CartOutcome::Applied);
    assert_eq!(ctx.cart.add_item(&headphones), CartOutcome::Applied);
    assert_eq!(ctx.cart.add_item(&speaker), CartOutcome::Applied);
    assert_eq!(ctx.cart.item_count(), 3);

    // 2 x 99.99 + 79.99
    let total = ctx.cart.total();
    assert_eq!(total, Decimal::new(27997, 2));

    // Place the order from the cart lines, then empty the cart.
    let lines: Vec<OrderLine> = ctx
        .cart
        .lines()
        .into_iter()
        .map(|line| OrderLine {
            id: line.id,
            name: line.name,
            price: line.price,
            quantity: line.quantity,
            image: line.image,
        })
        .collect();
    let order = ctx.orders.create(NewOrder {
        user_id: customer.id.clone(),
        user_email: customer.email.to_string(),
        user_name: customer.name.clone(),
        lines,
        total,
        status: OrderStatus::Pending,
        shipping_address: None,
        payment_session_id: Some("cs_test_123".to_owned()),
    });
    ctx.cart.clear();

    assert_eq!(order.total, total);
    assert_eq!(order.created_at, order.updated_at);
    assert!(ctx.cart.lines().is_empty());

    // The order shows up first in the customer's history.
    let history = ctx.orders.by_user(&customer.id);
    assert_eq!(history.first().expect("order placed").id, order.id);

    // Fulfilment: ship with tracking, then deliver.
    assert!(
        ctx.orders
            .update_status(&order.id, OrderStatus::Shipped, Some("TRK-42"))
    );
    assert!(ctx.orders.update_status(&order.id, OrderStatus::Delivered, None));

    let delivered = ctx.orders.by_id(&order.id).expect("order exists");
    assert_eq!(delivered.status, OrderStatus::Delivered);
    assert_eq!(delivered.tracking_number.as_deref(), Some("TRK-42"));
    assert!(delivered.updated_at > delivered.created_at);
}

#[test]
fn test_cart_bound_follows_snapshot_not_live_catalog() {
    let ctx = open_context();
    let speaker = ctx.catalog.get(&ProductId::new("5")).expect("seeded");

    ctx.cart.add_item(&speaker);

    // The admin sells the speaker out; the cart line keeps its add-time
    // bound and does not re-validate.
    ctx.catalog.set_stock(&speaker.id, 0);
    assert_eq!(
        ctx.cart.set_quantity(&speaker.id, speaker.stock),
        CartOutcome::Applied
    );

    // But the bound itself still binds.
    assert_eq!(
        ctx.cart.set_quantity(&speaker.id, speaker.stock + 1),
        CartOutcome::RejectedOverBound
    );
}

#[test]
fn test_deleting_product_keeps_history_intact() {
    let ctx = open_context();
    let case = ctx.catalog.get(&ProductId::new("2")).expect("seeded");

    ctx.cart.add_item(&case);
    assert!(ctx.catalog.delete(&case.id));

    // No cascade: the cart line and the seeded order lines for the same
    // product survive the catalog delete.
    assert_eq!(ctx.cart.lines().len(), 1);
    let seeded_order_lines = ctx.orders.lines(&"ORD-002".into());
    assert_eq!(seeded_order_lines.first().expect("seeded").id, case.id);
}

// =============================================================================
// Admin Dashboard
// =============================================================================

#[test]
fn test_registration_then_admin_recency_views() {
    let ctx = open_context();

    // Uniqueness is the caller's responsibility: pre-check, then create.
    assert!(ctx.users.by_email("fresh@example.com").is_none());
    let fresh = ctx.users.create(NewUser {
        email: Email::parse("fresh@example.com").expect("valid"),
        name: "Fresh User".to_owned(),
        role: UserRole::Customer,
        password: "secret".to_owned(),
    });

    assert_eq!(ctx.users.count(), 3);
    let recent = ctx.users.recent(1);
    assert_eq!(recent.first().expect("one user").id, fresh.id);
}

#[test]
fn test_dashboard_stats_after_cancellation() {
    let ctx = open_context();

    let order = ctx.orders.create(NewOrder {
        user_id: "2".into(),
        user_email: "customer@example.com".to_owned(),
        user_name: "Customer User".to_owned(),
        lines: Vec::new(),
        total: Decimal::new(5000, 2),
        status: OrderStatus::Pending,
        shipping_address: None,
        payment_session_id: None,
    });

    let before = ctx.orders.stats();
    ctx.orders
        .update_status(&order.id, OrderStatus::Cancelled, None);
    let after = ctx.orders.stats();

    assert_eq!(after.total, before.total);
    assert_eq!(after.cancelled, before.cancelled + 1);
    assert_eq!(
        after.total_revenue,
        before.total_revenue - Decimal::new(5000, 2)
    );
}
