//! # checkout-core
//!
//! Core types, traits and controllers for the checkout-flow payment handoff.
//!
//! This crate provides:
//! - `PaymentProvider` trait and `ProviderRegistry` for payment providers
//! - `Order`, `PaymentStatus` and `OrderService` for placed orders
//! - `ServiceController`, `OrderController` and `BasketController`
//! - `ClientConfig` for the hierarchical client configuration
//! - `UrlBuilder` for checkout step URLs
//! - `Session` and `SessionStore` for per-customer state
//! - `CheckoutError` for typed error handling
//!
//! ## Example
//!
//! ```rust,ignore
//! use checkout_core::{ProviderRegistry, PrePayFactory, ServiceItem};
//!
//! let registry = ProviderRegistry::new().with_factory(Arc::new(PrePayFactory));
//! let mut provider = registry.create(&ServiceItem::payment("invoice", "prepay"))?;
//!
//! provider.inject_global_config(callback_urls);
//! if let Some(result) = provider.process(&order, &params).await? {
//!     // Send the customer to result.url()
//! }
//! ```

pub mod config;
pub mod controller;
pub mod error;
pub mod i18n;
pub mod order;
pub mod prepay;
pub mod provider;
pub mod repository;
pub mod service;
pub mod session;
pub mod url;

/// Request and provider parameters, ordered by name
pub type Params = std::collections::BTreeMap<String, String>;

// Re-exports for convenience
pub use config::ClientConfig;
pub use controller::{
    BasketController, LoggingOrderUpdater, OrderController, OrderUpdater, ServiceController,
    SessionBasket,
};
pub use error::{CheckoutError, CheckoutResult, ErrorKind, NON_RECOVERABLE_MESSAGE};
pub use i18n::{Catalog, MessageDomain, Translator};
pub use order::{Currency, DeliveryStatus, Order, OrderService, PaymentStatus, Price, ServiceType};
pub use prepay::{PrePayFactory, PrePayProvider};
pub use provider::{
    BoxedPaymentProvider, HttpMethod, PaymentProvider, PaymentUpdate, ProcessResult,
    ProviderFactory, ProviderRegistry, PushRequest,
};
pub use repository::{MemoryStore, OrderRepository, ServiceRepository, ShopFixtures};
pub use service::ServiceItem;
pub use session::{MemorySessionStore, Session, SessionStore};
pub use url::{RouteUrlBuilder, UrlBuilder, UrlConfig, UrlSettings};
