//! Product catalog store.
//!
//! Owns the mutable product collection: CRUD, an operator-triggered reset
//! to seed data, stock updates with status derivation, and the filtered
//! views the storefront renders from (active subset, category, free-text
//! search).

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use shopstate_core::{ProductId, ProductStatus};

use crate::collection::Collection;
use crate::feed::ChangeFeed;
use crate::persist::{Slot, StorageBackend};
use crate::seed::{self, PLACEHOLDER_IMAGE};
use crate::subscription::Subscription;

/// A catalog product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub price: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_price: Option<Decimal>,
    pub category: String,
    pub stock: u32,
    /// Stored, not derived: only [`ProductCatalogStore::set_stock`] forces
    /// it to `OutOfStock`; every other path leaves it caller-controlled.
    pub status: ProductStatus,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviews: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub badge: Option<String>,
}

/// Input for [`ProductCatalogStore::add`]: a product before the store
/// assigns its id and fills presentation defaults.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub price: Decimal,
    pub original_price: Option<Decimal>,
    pub category: String,
    pub stock: u32,
    pub status: ProductStatus,
    pub description: String,
    pub image: Option<String>,
    pub rating: Option<Decimal>,
    pub reviews: Option<u32>,
    pub badge: Option<String>,
}

/// Field-wise merge for [`ProductCatalogStore::update`]: `Some` fields are
/// applied, `None` fields left untouched. Optional product fields
/// (image, badge, ...) can be set but not cleared through a patch.
#[derive(Debug, Clone, Default)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub price: Option<Decimal>,
    pub original_price: Option<Decimal>,
    pub category: Option<String>,
    pub stock: Option<u32>,
    pub status: Option<ProductStatus>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub rating: Option<Decimal>,
    pub reviews: Option<u32>,
    pub badge: Option<String>,
}

impl ProductPatch {
    fn apply(self, product: &mut Product) {
        if let Some(name) = self.name {
            product.name = name;
        }
        if let Some(price) = self.price {
            product.price = price;
        }
        if let Some(original_price) = self.original_price {
            product.original_price = Some(original_price);
        }
        if let Some(category) = self.category {
            product.category = category;
        }
        if let Some(stock) = self.stock {
            product.stock = stock;
        }
        if let Some(status) = self.status {
            product.status = status;
        }
        if let Some(description) = self.description {
            product.description = description;
        }
        if let Some(image) = self.image {
            product.image = Some(image);
        }
        if let Some(rating) = self.rating {
            product.rating = Some(rating);
        }
        if let Some(reviews) = self.reviews {
            product.reviews = Some(reviews);
        }
        if let Some(badge) = self.badge {
            product.badge = Some(badge);
        }
    }
}

/// The product catalog store (slot `products`).
pub struct ProductCatalogStore {
    inner: Collection<Product>,
}

impl ProductCatalogStore {
    /// Open the store over `backend`, seeding the demo catalog when the
    /// slot is absent or unparsable.
    #[must_use]
    pub fn open(backend: Arc<dyn StorageBackend>, feed: Option<ChangeFeed>) -> Self {
        Self {
            inner: Collection::open(backend, feed, Slot::Products, seed::products),
        }
    }

    /// All products, in insertion order.
    #[must_use]
    pub fn list(&self) -> Vec<Product> {
        self.inner.snapshot()
    }

    /// A single product by id.
    #[must_use]
    pub fn get(&self, id: &ProductId) -> Option<Product> {
        self.inner
            .read(|products| products.iter().find(|p| &p.id == id).cloned())
    }

    /// Add a product, assigning a fresh id and defaulting image, rating,
    /// and reviews when absent. Returns the stored record.
    pub fn add(&self, product: NewProduct) -> Product {
        self.inner.mutate(|products| {
            let created = Product {
                id: next_product_id(products),
                name: product.name,
                price: product.price,
                original_price: product.original_price,
                category: product.category,
                stock: product.stock,
                status: product.status,
                description: product.description,
                image: Some(
                    product
                        .image
                        .unwrap_or_else(|| PLACEHOLDER_IMAGE.to_owned()),
                ),
                rating: Some(product.rating.unwrap_or_else(|| Decimal::new(40, 1))),
                reviews: Some(product.reviews.unwrap_or(0)),
                badge: product.badge,
            };
            products.push(created.clone());
            created
        })
    }

    /// Merge `patch` into the product. Unknown id is a no-op returning
    /// `None`; nothing is persisted and no one is notified.
    pub fn update(&self, id: &ProductId, patch: ProductPatch) -> Option<Product> {
        self.inner.try_mutate(|products| {
            let product = products.iter_mut().find(|p| &p.id == id)?;
            patch.apply(product);
            Some(product.clone())
        })
    }

    /// Remove a product. Unknown id is a no-op returning `false`.
    ///
    /// Existing cart lines and historical order lines hold their own
    /// snapshots and are not touched.
    pub fn delete(&self, id: &ProductId) -> bool {
        self.inner
            .try_mutate(|products| {
                let before = products.len();
                products.retain(|p| &p.id != id);
                (products.len() < before).then_some(())
            })
            .is_some()
    }

    /// Replace the whole collection with seed data (operator-triggered
    /// cache refresh). Idempotent.
    pub fn reset_to_defaults(&self) {
        self.inner.mutate(|products| {
            *products = seed::products();
        });
    }

    /// Set a product's stock level, clamped at zero. Drives status to
    /// `OutOfStock` iff the clamped value is zero; a positive value
    /// leaves the stored status untouched. Unknown id returns `None`.
    pub fn set_stock(&self, id: &ProductId, new_stock: i64) -> Option<Product> {
        let clamped = u32::try_from(new_stock.max(0)).unwrap_or(u32::MAX);
        self.inner.try_mutate(|products| {
            let product = products.iter_mut().find(|p| &p.id == id)?;
            product.stock = clamped;
            if clamped == 0 {
                product.status = ProductStatus::OutOfStock;
            }
            Some(product.clone())
        })
    }

    /// Products that are both `Active` and in stock.
    #[must_use]
    pub fn active_products(&self) -> Vec<Product> {
        self.inner.read(|products| {
            products
                .iter()
                .filter(|p| p.status == ProductStatus::Active && p.stock > 0)
                .cloned()
                .collect()
        })
    }

    /// Products in exactly `category`.
    #[must_use]
    pub fn by_category(&self, category: &str) -> Vec<Product> {
        self.inner.read(|products| {
            products
                .iter()
                .filter(|p| p.category == category)
                .cloned()
                .collect()
        })
    }

    /// Case-insensitive substring search across name, description, and
    /// category (OR semantics, unranked).
    #[must_use]
    pub fn search(&self, query: &str) -> Vec<Product> {
        let needle = query.to_lowercase();
        self.inner.read(|products| {
            products
                .iter()
                .filter(|p| {
                    p.name.to_lowercase().contains(&needle)
                        || p.description.to_lowercase().contains(&needle)
                        || p.category.to_lowercase().contains(&needle)
                })
                .cloned()
                .collect()
        })
    }

    /// Register a listener; fires synchronously after every mutation's
    /// persisted write, with a snapshot of the collection.
    pub fn subscribe(&self, listener: impl Fn(&[Product]) + Send + Sync + 'static) -> Subscription {
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

/// Timestamp-derived id, bumped past any collision with an existing
/// product (two adds can land on the same millisecond).
fn next_product_id(existing: &[Product]) -> ProductId {
    let mut candidate = Utc::now().timestamp_millis();
    loop {
        let id = candidate.to_string();
        if !existing.iter().any(|p| p.id.as_str() == id) {
            return ProductId::new(id);
        }
        candidate += 1;
    }
}
