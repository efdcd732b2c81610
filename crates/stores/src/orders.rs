//! Order store.
//!
//! Owns the append-mostly order log. Orders are created from
//! caller-assembled data (the store never recomputes totals), viewed
//! most-recent-first, advanced through statuses without transition
//! validation, and summarized into per-status counts plus revenue.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use shopstate_core::{OrderId, OrderStatus, ProductId, UserId};

use crate::collection::Collection;
use crate::feed::ChangeFeed;
use crate::persist::{Slot, StorageBackend};
use crate::seed;
use crate::subscription::Subscription;

/// One line of an order: a product snapshot frozen at checkout.
///
/// Lines are immutable after creation so the order stays historically
/// accurate even when the catalog changes or the product is deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub id: ProductId,
    pub name: String,
    pub price: Decimal,
    pub quantity: u32,
    pub image: String,
}

/// Best-effort shipping address attached at checkout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    pub name: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub country: String,
}

/// A placed order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub user_email: String,
    pub user_name: String,
    #[serde(rename = "items")]
    pub lines: Vec<OrderLine>,
    /// Caller-computed; the store stores it as-is.
    pub total: Decimal,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipping_address: Option<ShippingAddress>,
    /// Session id handed back by the external payment processor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_session_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tracking_number: Option<String>,
}

/// Input for [`OrderStore::create`]: an order before the store assigns
/// its id and timestamps.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub user_id: UserId,
    pub user_email: String,
    pub user_name: String,
    pub lines: Vec<OrderLine>,
    pub total: Decimal,
    pub status: OrderStatus,
    pub shipping_address: Option<ShippingAddress>,
    pub payment_session_id: Option<String>,
}

/// Aggregate order statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct OrderStats {
    pub total: usize,
    pub pending: usize,
    pub processing: usize,
    pub shipped: usize,
    pub delivered: usize,
    pub cancelled: usize,
    pub refunded: usize,
    /// Sum of totals over all non-cancelled orders. Refunded orders
    /// still count - confirmed as the source system's behavior.
    pub total_revenue: Decimal,
}

/// The order store (slot `orders`).
pub struct OrderStore {
    inner: Collection<Order>,
}

impl OrderStore {
    /// Open the store over `backend`, seeding two demo orders when the
    /// slot is absent or unparsable.
    #[must_use]
    pub fn open(backend: Arc<dyn StorageBackend>, feed: Option<ChangeFeed>) -> Self {
        Self {
            inner: Collection::open(backend, feed, Slot::Orders, || seed::orders(Utc::now())),
        }
    }

    /// Create an order: assigns the id and both timestamps, prepends to
    /// the log (native order is most-recent-first), and returns the
    /// stored record.
    pub fn create(&self, order: NewOrder) -> Order {
        let now = Utc::now();
        self.inner.mutate(|orders| {
            let created = Order {
                id: next_order_id(orders, now),
                user_id: order.user_id,
                user_email: order.user_email,
                user_name: order.user_name,
                lines: order.lines,
                total: order.total,
                status: order.status,
                created_at: now,
                updated_at: now,
                shipping_address: order.shipping_address,
                payment_session_id: order.payment_session_id,
                tracking_number: None,
            };
            orders.insert(0, created.clone());
            created
        })
    }

    /// A user's orders, newest first. Sorted defensively rather than
    /// trusting insertion order.
    #[must_use]
    pub fn by_user(&self, user_id: &UserId) -> Vec<Order> {
        let mut orders = self.inner.read(|orders| {
            orders
                .iter()
                .filter(|o| &o.user_id == user_id)
                .cloned()
                .collect::<Vec<_>>()
        });
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        orders
    }

    /// All orders, newest first.
    #[must_use]
    pub fn all(&self) -> Vec<Order> {
        let mut orders = self.inner.snapshot();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        orders
    }

    /// The newest `limit` orders.
    #[must_use]
    pub fn recent(&self, limit: usize) -> Vec<Order> {
        let mut orders = self.all();
        orders.truncate(limit);
        orders
    }

    /// A single order by id.
    #[must_use]
    pub fn by_id(&self, id: &OrderId) -> Option<Order> {
        self.inner
            .read(|orders| orders.iter().find(|o| &o.id == id).cloned())
    }

    /// The order's lines, or empty when the id is unknown.
    #[must_use]
    pub fn lines(&self, id: &OrderId) -> Vec<OrderLine> {
        self.by_id(id).map(|o| o.lines).unwrap_or_default()
    }

    /// Set an order's status, bumping `updated_at`. No transition
    /// validation: any status may follow any other. A non-empty
    /// `tracking` sets the tracking number; an existing number is never
    /// cleared. Unknown id is a no-op returning `false`.
    pub fn update_status(
        &self,
        id: &OrderId,
        status: OrderStatus,
        tracking: Option<&str>,
    ) -> bool {
        self.inner
            .try_mutate(|orders| {
                let order = orders.iter_mut().find(|o| &o.id == id)?;
                order.status = status;
                order.updated_at = Utc::now();
                if let Some(tracking) = tracking
                    && !tracking.is_empty()
                {
                    order.tracking_number = Some(tracking.to_owned());
                }
                Some(())
            })
            .is_some()
    }

    /// Per-status counts plus total revenue over non-cancelled orders.
    #[must_use]
    pub fn stats(&self) -> OrderStats {
        self.inner.read(|orders| {
            let count_of = |status: OrderStatus| orders.iter().filter(|o| o.status == status).count();
            OrderStats {
                total: orders.len(),
                pending: count_of(OrderStatus::Pending),
                processing: count_of(OrderStatus::Processing),
                shipped: count_of(OrderStatus::Shipped),
                delivered: count_of(OrderStatus::Delivered),
                cancelled: count_of(OrderStatus::Cancelled),
                refunded: count_of(OrderStatus::Refunded),
                total_revenue: orders
                    .iter()
                    .filter(|o| o.status != OrderStatus::Cancelled)
                    .map(|o| o.total)
                    .sum(),
            }
        })
    }

    /// Register a listener; fires synchronously after every mutation's
    /// persisted write, with a snapshot of the log.
    pub fn subscribe(&self, listener: impl Fn(&[Order]) + Send + Sync + 'static) -> Subscription {
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

/// `ORD-` plus the low six digits of unix-millis, bumped past collisions
/// (two orders can land on the same millisecond, and the suffix wraps).
fn next_order_id(existing: &[Order], now: DateTime<Utc>) -> OrderId {
    let mut suffix = now.timestamp_millis().rem_euclid(1_000_000);
    loop {
        let id = format!("ORD-{suffix:06}");
        if !existing.iter().any(|o| o.id.as_str() == id) {
            return OrderId::new(id);
        }
        suffix = (suffix + 1) % 1_000_000;
    }
}
