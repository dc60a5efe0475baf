//! # Repositories
//!
//! Read/write access to orders, the services attached to order bases, and the
//! shop's service catalog. `MemoryStore` implements both repository traits and
//! can be seeded from a TOML fixtures file:
//!
//! ```toml
//! [[orders]]
//! id = "O-1"
//! base_id = "B-1"
//! payment_status = "unfinished"
//! price = { amount = 4500, currency = "eur" }
//!
//! [[order_services]]
//! base_id = "B-1"
//! type = "payment"
//! code = "invoice"
//!
//! [[services]]
//! code = "invoice"
//! type = "payment"
//! provider = "prepay"
//! ```

use crate::error::{CheckoutError, CheckoutResult};
use crate::order::{Order, OrderService, ServiceType};
use crate::service::ServiceItem;
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::sync::RwLock;

/// Access to orders and their order-base services
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Fetch an order by ID
    async fn get(&self, order_id: &str) -> CheckoutResult<Order>;

    /// Insert or replace an order
    async fn save(&self, order: &Order) -> CheckoutResult<()>;

    /// Services of the given type attached to an order base, in insertion order
    async fn search_services(
        &self,
        base_id: &str,
        service_type: ServiceType,
    ) -> CheckoutResult<Vec<OrderService>>;
}

/// Access to the configured services
#[async_trait]
pub trait ServiceRepository: Send + Sync {
    /// Services with the given code and type
    async fn search(&self, code: &str, service_type: ServiceType)
        -> CheckoutResult<Vec<ServiceItem>>;
}

/// Seed data for [`MemoryStore`]
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ShopFixtures {
    #[serde(default)]
    pub orders: Vec<Order>,
    #[serde(default)]
    pub order_services: Vec<OrderService>,
    #[serde(default)]
    pub services: Vec<ServiceItem>,
}

impl ShopFixtures {
    pub fn from_toml_str(source: &str) -> CheckoutResult<Self> {
        toml::from_str(source)
            .map_err(|e| CheckoutError::Configuration(format!("Invalid shop fixtures: {}", e)))
    }
}

/// In-memory order and service storage
#[derive(Debug, Default)]
pub struct MemoryStore {
    orders: RwLock<BTreeMap<String, Order>>,
    order_services: RwLock<Vec<OrderService>>,
    services: RwLock<Vec<ServiceItem>>,
}

fn poisoned<T>(_: T) -> CheckoutError {
    CheckoutError::Repository("storage lock poisoned".to_string())
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding the given fixtures
    pub fn from_fixtures(fixtures: ShopFixtures) -> Self {
        Self {
            orders: RwLock::new(
                fixtures
                    .orders
                    .into_iter()
                    .map(|order| (order.id.clone(), order))
                    .collect(),
            ),
            order_services: RwLock::new(fixtures.order_services),
            services: RwLock::new(fixtures.services),
        }
    }

    /// Builder: add an order
    pub fn with_order(self, order: Order) -> Self {
        if let Ok(mut orders) = self.orders.write() {
            orders.insert(order.id.clone(), order);
        }
        self
    }

    /// Builder: attach a service to an order base
    pub fn with_order_service(self, entry: OrderService) -> Self {
        if let Ok(mut entries) = self.order_services.write() {
            entries.push(entry);
        }
        self
    }

    /// Builder: add a service item
    pub fn with_service(self, service: ServiceItem) -> Self {
        if let Ok(mut services) = self.services.write() {
            services.push(service);
        }
        self
    }

    pub fn order_count(&self) -> usize {
        self.orders.read().map(|o| o.len()).unwrap_or(0)
    }
}

#[async_trait]
impl OrderRepository for MemoryStore {
    async fn get(&self, order_id: &str) -> CheckoutResult<Order> {
        let orders = self.orders.read().map_err(poisoned)?;
        orders
            .get(order_id)
            .cloned()
            .ok_or_else(|| CheckoutError::OrderNotFound {
                order_id: order_id.to_string(),
            })
    }

    async fn save(&self, order: &Order) -> CheckoutResult<()> {
        let mut orders = self.orders.write().map_err(poisoned)?;
        orders.insert(order.id.clone(), order.clone());
        Ok(())
    }

    async fn search_services(
        &self,
        base_id: &str,
        service_type: ServiceType,
    ) -> CheckoutResult<Vec<OrderService>> {
        let entries = self.order_services.read().map_err(poisoned)?;
        Ok(entries
            .iter()
            .filter(|e| e.base_id == base_id && e.service_type == service_type)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl ServiceRepository for MemoryStore {
    async fn search(
        &self,
        code: &str,
        service_type: ServiceType,
    ) -> CheckoutResult<Vec<ServiceItem>> {
        let services = self.services.read().map_err(poisoned)?;
        Ok(services
            .iter()
            .filter(|s| s.code == code && s.service_type == service_type)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::{Currency, PaymentStatus, Price};

    const FIXTURES: &str = r#"
        [[orders]]
        id = "O-1"
        base_id = "B-1"
        payment_status = "refused"
        price = { amount = 4500, currency = "eur" }

        [[order_services]]
        base_id = "B-1"
        type = "payment"
        code = "invoice"

        [[order_services]]
        base_id = "B-1"
        type = "delivery"
        code = "dhl"

        [[services]]
        code = "invoice"
        type = "payment"
        provider = "prepay"
    "#;

    #[tokio::test]
    async fn test_fixtures() {
        let store = MemoryStore::from_fixtures(ShopFixtures::from_toml_str(FIXTURES).unwrap());

        let order = store.get("O-1").await.unwrap();
        assert_eq!(order.payment_status, PaymentStatus::Refused);
        assert_eq!(order.price, Price::from_cents(4500, Currency::EUR));

        let payment = store
            .search_services("B-1", ServiceType::Payment)
            .await
            .unwrap();
        assert_eq!(payment.len(), 1);
        assert_eq!(payment[0].code, "invoice");

        let services = store.search("invoice", ServiceType::Payment).await.unwrap();
        assert_eq!(services[0].provider, "prepay");
        assert!(store
            .search("invoice", ServiceType::Delivery)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_missing_order() {
        let store = MemoryStore::new();
        let err = store.get("nope").await.unwrap_err();

        assert!(matches!(err, CheckoutError::OrderNotFound { .. }));
    }

    #[tokio::test]
    async fn test_save_replaces() {
        let order = Order::new("B-2", Price::from_cents(100, Currency::EUR)).with_id("O-2");
        let store = MemoryStore::new().with_order(order.clone());

        let mut updated = order;
        updated.set_payment_status(PaymentStatus::Received);
        store.save(&updated).await.unwrap();

        assert_eq!(
            store.get("O-2").await.unwrap().payment_status,
            PaymentStatus::Received
        );
        assert_eq!(store.order_count(), 1);
    }
}
