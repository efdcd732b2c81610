//! Fixed seed collections.
//!
//! Every store falls back to these when its persisted slot is absent or
//! unparsable, and persists the fallback immediately. The catalog store
//! also restores them wholesale on `reset_to_defaults`.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;

use shopstate_core::{Email, OrderId, OrderStatus, ProductId, ProductStatus, UserId, UserRole};

use crate::catalog::Product;
use crate::directory::UserRecord;
use crate::orders::{Order, OrderLine};

/// Default image for products added without one, and for cart lines
/// snapshotting such products.
pub(crate) const PLACEHOLDER_IMAGE: &str = "/placeholder.svg?height=200&width=200";

/// The six-product demo catalog.
#[must_use]
pub fn products() -> Vec<Product> {
    vec![
        Product {
            id: ProductId::new("1"),
            name: "Wireless Headphones".to_owned(),
            price: Decimal::new(9999, 2),
            original_price: Some(Decimal::new(12999, 2)),
            category: "Electronics".to_owned(),
            stock: 45,
            status: ProductStatus::Active,
            description: "High-quality wireless headphones with noise cancellation".to_owned(),
            image: Some(
                "https://images.unsplash.com/photo-1505740420928-5e560c06d30e?w=400&h=400&fit=crop&crop=center"
                    .to_owned(),
            ),
            rating: Some(Decimal::new(45, 1)),
            reviews: Some(128),
            badge: Some("Best Seller".to_owned()),
        },
        Product {
            id: ProductId::new("2"),
            name: "Smartphone Case".to_owned(),
            price: Decimal::new(2499, 2),
            original_price: Some(Decimal::new(3499, 2)),
            category: "Accessories".to_owned(),
            stock: 23,
            status: ProductStatus::Active,
            description: "Durable protective case for your smartphone".to_owned(),
            image: Some(
                "https://images.unsplash.com/photo-1601593346740-925612772716?w=400&h=400&fit=crop&crop=center"
                    .to_owned(),
            ),
            rating: Some(Decimal::new(42, 1)),
            reviews: Some(89),
            badge: Some("Sale".to_owned()),
        },
        Product {
            id: ProductId::new("3"),
            name: "Laptop Stand".to_owned(),
            price: Decimal::new(4999, 2),
            original_price: None,
            category: "Office".to_owned(),
            stock: 67,
            status: ProductStatus::Active,
            description: "Ergonomic laptop stand for better posture".to_owned(),
            image: Some(
                "https://images.unsplash.com/photo-1541807084-5c52b6b3adef?w=400&h=400&fit=crop&crop=center"
                    .to_owned(),
            ),
            rating: Some(Decimal::new(47, 1)),
            reviews: Some(156),
            badge: Some("New".to_owned()),
        },
        Product {
            id: ProductId::new("4"),
            name: "USB-C Cable".to_owned(),
            price: Decimal::new(1999, 2),
            original_price: None,
            category: "Electronics".to_owned(),
            stock: 0,
            status: ProductStatus::OutOfStock,
            description: "Fast charging USB-C cable, 6ft length".to_owned(),
            image: Some(
                "https://images.unsplash.com/photo-1544197150-b99a580bb7a8?w=400&h=400&fit=crop&crop=center"
                    .to_owned(),
            ),
            rating: Some(Decimal::new(43, 1)),
            reviews: Some(203),
            badge: None,
        },
        Product {
            id: ProductId::new("5"),
            name: "Bluetooth Speaker".to_owned(),
            price: Decimal::new(7999, 2),
            original_price: Some(Decimal::new(9999, 2)),
            category: "Electronics".to_owned(),
            stock: 12,
            status: ProductStatus::Active,
            description: "Portable Bluetooth speaker with premium sound".to_owned(),
            image: Some(
                "https://images.unsplash.com/photo-1608043152269-423dbba4e7e1?w=400&h=400&fit=crop&crop=center"
                    .to_owned(),
            ),
            rating: Some(Decimal::new(46, 1)),
            reviews: Some(94),
            badge: Some("Sale".to_owned()),
        },
        Product {
            id: ProductId::new("6"),
            name: "Desk Organizer".to_owned(),
            price: Decimal::new(3499, 2),
            original_price: None,
            category: "Office".to_owned(),
            stock: 28,
            status: ProductStatus::Active,
            description: "Bamboo desk organizer with multiple compartments".to_owned(),
            image: Some(
                "https://images.unsplash.com/photo-1558618666-fcd25c85cd64?w=400&h=400&fit=crop&crop=center"
                    .to_owned(),
            ),
            rating: Some(Decimal::new(44, 1)),
            reviews: Some(67),
            badge: None,
        },
    ]
}

/// Two demo orders for the customer demo user, dated relative to `now`.
#[must_use]
pub fn orders(now: DateTime<Utc>) -> Vec<Order> {
    vec![
        Order {
            id: OrderId::new("ORD-001"),
            user_id: UserId::new("2"),
            user_email: "customer@example.com".to_owned(),
            user_name: "Customer User".to_owned(),
            lines: vec![OrderLine {
                id: ProductId::new("1"),
                name: "Wireless Headphones".to_owned(),
                price: Decimal::new(9999, 2),
                quantity: 1,
                image: "/placeholder.svg?height=300&width=300".to_owned(),
            }],
            total: Decimal::new(9999, 2),
            status: OrderStatus::Delivered,
            created_at: now - Duration::days(7),
            updated_at: now - Duration::days(2),
            shipping_address: None,
            payment_session_id: None,
            tracking_number: Some("TRK123456789".to_owned()),
        },
        Order {
            id: OrderId::new("ORD-002"),
            user_id: UserId::new("2"),
            user_email: "customer@example.com".to_owned(),
            user_name: "Customer User".to_owned(),
            lines: vec![OrderLine {
                id: ProductId::new("2"),
                name: "Smartphone Case".to_owned(),
                price: Decimal::new(2499, 2),
                quantity: 2,
                image: "/placeholder.svg?height=300&width=300".to_owned(),
            }],
            total: Decimal::new(4998, 2),
            status: OrderStatus::Processing,
            created_at: now - Duration::days(3),
            updated_at: now - Duration::days(1),
            shipping_address: None,
            payment_session_id: None,
            tracking_number: None,
        },
    ]
}

/// The demo admin and customer accounts.
#[must_use]
pub fn users(now: DateTime<Utc>) -> Vec<UserRecord> {
    vec![
        UserRecord {
            id: UserId::new("1"),
            email: Email::parse("admin@example.com").expect("seed email is valid"),
            name: "Admin User".to_owned(),
            role: UserRole::Admin,
            password: "password".to_owned(),
            created_at: now,
        },
        UserRecord {
            id: UserId::new("2"),
            email: Email::parse("customer@example.com").expect("seed email is valid"),
            name: "Customer User".to_owned(),
            role: UserRole::Customer,
            password: "password".to_owned(),
            created_at: now,
        },
    ]
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_catalog_shape() {
        let catalog = products();
        assert_eq!(catalog.len(), 6);

        // Product "4" ships out of stock; the active-products view must
        // exclude it from day one.
        let cable = catalog.iter().find(|p| p.id.as_str() == "4").unwrap();
        assert_eq!(cable.stock, 0);
        assert_eq!(cable.status, ProductStatus::OutOfStock);
    }

    #[test]
    fn test_seed_orders_are_consistent() {
        let now = Utc::now();
        for order in orders(now) {
            assert!(order.updated_at >= order.created_at);
            assert!(order.created_at < now);
        }
    }

    #[test]
    fn test_seed_users_cover_both_roles() {
        let users = users(Utc::now());
        assert_eq!(users.len(), 2);
        assert!(users.iter().any(|u| u.role == UserRole::Admin));
        assert!(users.iter().any(|u| u.role == UserRole::Customer));
    }
}
