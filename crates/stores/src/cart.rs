//! Cart store.
//!
//! Owns the per-session cart lines. Each line snapshots the product's
//! price, image, category, and stock at add-time; quantities are bounded
//! by that snapshot and never re-validated against the live catalog.
//!
//! Mutations report a [`CartOutcome`] so callers can tell an applied
//! change from a clamp or a rejection - the source system swallowed
//! these distinctions, which left the UI unable to explain why a
//! quantity refused to move.

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use shopstate_core::ProductId;

use crate::catalog::Product;
use crate::collection::Collection;
use crate::feed::ChangeFeed;
use crate::persist::{Slot, StorageBackend};
use crate::seed::PLACEHOLDER_IMAGE;
use crate::subscription::Subscription;

/// One cart line: a product snapshot plus a quantity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    /// Id of the snapshotted product.
    pub id: ProductId,
    pub name: String,
    pub price: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_price: Option<Decimal>,
    /// Always within `[1, stock]`.
    pub quantity: u32,
    pub image: String,
    pub category: String,
    /// Stock level captured when the line was created; the quantity bound.
    pub stock: u32,
}

/// What a cart mutation actually did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartOutcome {
    /// The mutation was applied as requested.
    Applied,
    /// The line was already at its snapshotted stock bound; the quantity
    /// is unchanged (the no-op was still persisted and notified).
    AtStockBound,
    /// The requested quantity exceeds the snapshotted stock bound; the
    /// prior quantity was retained and nothing was persisted.
    RejectedOverBound,
    /// The line was removed from the cart.
    Removed,
    /// No cart line matches that product id.
    NotFound,
}

/// The cart store (slot `cart`).
///
/// Seed collection is empty: a fresh context starts with an empty cart.
pub struct CartStore {
    inner: Collection<CartLine>,
}

impl CartStore {
    /// Open the store over `backend`.
    #[must_use]
    pub fn open(backend: Arc<dyn StorageBackend>, feed: Option<ChangeFeed>) -> Self {
        Self {
            inner: Collection::open(backend, feed, Slot::Cart, Vec::new),
        }
    }

    /// All cart lines, in add order.
    #[must_use]
    pub fn lines(&self) -> Vec<CartLine> {
        self.inner.snapshot()
    }

    /// Add one unit of `product`.
    ///
    /// An existing line increments by one, clamped at its snapshotted
    /// stock bound; otherwise a new quantity-1 line snapshots the
    /// product as it is now. A product with zero stock is rejected
    /// outright - a line below its own bound could never be valid.
    pub fn add_item(&self, product: &Product) -> CartOutcome {
        self.inner.mutate_with(|lines| {
            if let Some(line) = lines.iter_mut().find(|line| line.id == product.id) {
                if line.quantity < line.stock {
                    line.quantity += 1;
                    (true, CartOutcome::Applied)
                } else {
                    (true, CartOutcome::AtStockBound)
                }
            } else if product.stock == 0 {
                (false, CartOutcome::RejectedOverBound)
            } else {
                lines.push(CartLine {
                    id: product.id.clone(),
                    name: product.name.clone(),
                    price: product.price,
                    original_price: product.original_price,
                    quantity: 1,
                    image: product
                        .image
                        .clone()
                        .unwrap_or_else(|| PLACEHOLDER_IMAGE.to_owned()),
                    category: product.category.clone(),
                    stock: product.stock,
                });
                (true, CartOutcome::Applied)
            }
        })
    }

    /// Remove the line for `id`, if present.
    pub fn remove_item(&self, id: &ProductId) -> CartOutcome {
        self.inner.mutate_with(|lines| {
            let before = lines.len();
            lines.retain(|line| &line.id != id);
            if lines.len() < before {
                (true, CartOutcome::Removed)
            } else {
                (false, CartOutcome::NotFound)
            }
        })
    }

    /// Set the quantity for `id`. Zero removes the line; a value above
    /// the line's snapshotted stock bound is rejected with the prior
    /// quantity retained.
    pub fn set_quantity(&self, id: &ProductId, quantity: u32) -> CartOutcome {
        self.inner.mutate_with(|lines| {
            let Some(position) = lines.iter().position(|line| &line.id == id) else {
                return (false, CartOutcome::NotFound);
            };
            if quantity == 0 {
                lines.remove(position);
                return (true, CartOutcome::Removed);
            }
            match lines.get_mut(position) {
                Some(line) if quantity <= line.stock => {
                    line.quantity = quantity;
                    (true, CartOutcome::Applied)
                }
                _ => (false, CartOutcome::RejectedOverBound),
            }
        })
    }

    /// Empty the cart.
    pub fn clear(&self) {
        self.inner.mutate(|lines| lines.clear());
    }

    /// Sum of `price x quantity` over all lines, recomputed per call.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.inner.read(|lines| {
            lines
                .iter()
                .map(|line| line.price * Decimal::from(line.quantity))
                .sum()
        })
    }

    /// Sum of quantities over all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.inner
            .read(|lines| lines.iter().map(|line| line.quantity).sum())
    }

    /// Register a listener; fires synchronously after every mutation's
    /// persisted write, with a snapshot of the lines.
    pub fn subscribe(&self, listener: impl Fn(&[CartLine]) + Send + Sync + 'static) -> Subscription {
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
