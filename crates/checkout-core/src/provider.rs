//! # Payment Provider Trait
//!
//! Strategy trait for payment providers and the registry that creates them.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  PaymentProvider (trait)                    │
//! │  ├── inject_global_config()                                 │
//! │  ├── process()                                              │
//! │  ├── update_sync()                                          │
//! │  └── update_push()                                          │
//! └─────────────────────────────────────────────────────────────┘
//!                            ▲
//!               ┌────────────┴────────────┐
//!               │                         │
//!       ┌───────┴───────┐         ┌───────┴───────┐
//!       │ PrePayProvider│         │StripeProvider │
//!       └───────────────┘         └───────────────┘
//! ```
//!
//! Providers are created per request from a [`ServiceItem`] by a
//! [`ProviderFactory`]. The [`ProviderRegistry`] maps provider names to
//! factories and is validated against the configured services at startup.

use crate::error::{CheckoutError, CheckoutResult};
use crate::order::{Order, PaymentStatus, ServiceType};
use crate::service::ServiceItem;
use crate::Params;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// Global config key: URL of the checkout step that started the payment
pub const URL_SELF: &str = "payment.url-self";
/// Global config key: URL of the confirmation page
pub const URL_SUCCESS: &str = "payment.url-success";
/// Global config key: URL for server-to-server payment notifications
pub const URL_UPDATE: &str = "payment.url-update";
/// Global config key: IP address of the customer
pub const CLIENT_IP: &str = "client.ipaddress";

/// HTTP method used to reach the next URL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
        }
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Redirect instructions produced by a provider's `process()`.
///
/// Immutable once built; a result always has a destination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessResult {
    url: String,
    method: HttpMethod,
    values: Params,
    external: bool,
}

impl ProcessResult {
    /// Build a result, rejecting an empty destination URL
    pub fn new(
        url: impl Into<String>,
        method: HttpMethod,
        values: Params,
        external: bool,
    ) -> CheckoutResult<Self> {
        let url = url.into();
        if url.trim().is_empty() {
            return Err(CheckoutError::InvalidProcessResult(
                "missing destination URL".to_string(),
            ));
        }

        Ok(Self {
            url,
            method,
            values,
            external,
        })
    }

    /// Destination URL
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn method(&self) -> HttpMethod {
        self.method
    }

    /// Form fields to send along
    pub fn values(&self) -> &Params {
        &self.values
    }

    /// True if the destination is outside the shop (hosted payment page)
    pub fn is_external(&self) -> bool {
        self.external
    }
}

/// Inbound server-to-server notification from a payment provider
#[derive(Debug, Clone, Default)]
pub struct PushRequest {
    /// Query and form parameters
    pub params: Params,
    /// Request headers, names lowercased
    pub headers: BTreeMap<String, String>,
    /// Raw request body
    pub body: Vec<u8>,
}

impl PushRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }
}

/// Payment status change reported by a provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentUpdate {
    pub order_id: String,
    pub status: PaymentStatus,
}

/// Core trait for payment provider implementations.
#[async_trait]
pub trait PaymentProvider: Send + Sync {
    /// Get the provider name (for logging and routing).
    fn provider_name(&self) -> &'static str;

    /// Receive the callback URLs and the customer's IP address
    /// (keys [`URL_SELF`], [`URL_SUCCESS`], [`URL_UPDATE`], [`CLIENT_IP`]).
    fn inject_global_config(&mut self, config: Params);

    /// Start the payment for an order.
    ///
    /// Returns the redirect instructions, or `None` if the provider has
    /// nothing to hand the customer to.
    async fn process(&self, order: &Order, params: &Params)
        -> CheckoutResult<Option<ProcessResult>>;

    /// Synchronise the order with the provider when the customer returns.
    async fn update_sync(&self, order: Order, _params: &Params) -> CheckoutResult<Order> {
        Ok(order)
    }

    /// Handle a server-to-server notification.
    async fn update_push(&self, _request: &PushRequest) -> CheckoutResult<Option<PaymentUpdate>> {
        Ok(None)
    }
}

/// Type alias for a boxed payment provider (dynamic dispatch)
pub type BoxedPaymentProvider = Box<dyn PaymentProvider>;

/// Creates providers for service items
pub trait ProviderFactory: Send + Sync {
    /// Name service items use to select this factory
    fn name(&self) -> &'static str;

    /// Create a fresh provider configured for the service
    fn create(&self, service: &ServiceItem) -> CheckoutResult<BoxedPaymentProvider>;
}

/// Registry of provider factories keyed by name
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    factories: HashMap<String, Arc<dyn ProviderFactory>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory
    pub fn register(&mut self, factory: Arc<dyn ProviderFactory>) {
        self.factories.insert(factory.name().to_string(), factory);
    }

    /// Register with builder pattern
    pub fn with_factory(mut self, factory: Arc<dyn ProviderFactory>) -> Self {
        self.register(factory);
        self
    }

    /// Check if a provider is registered
    pub fn has_provider(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// List all registered providers
    pub fn providers(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Create the provider for a service item
    pub fn create(&self, service: &ServiceItem) -> CheckoutResult<BoxedPaymentProvider> {
        let factory = self.factories.get(&service.provider).ok_or_else(|| {
            CheckoutError::Configuration(format!(
                "No provider \"{}\" registered for service \"{}\"",
                service.provider, service.code
            ))
        })?;

        factory.create(service)
    }

    /// Check that every payment service names a registered provider
    pub fn validate<'a>(
        &self,
        services: impl IntoIterator<Item = &'a ServiceItem>,
    ) -> CheckoutResult<()> {
        for service in services {
            if service.service_type == ServiceType::Payment && !self.has_provider(&service.provider)
            {
                return Err(CheckoutError::Configuration(format!(
                    "Service \"{}\" uses unknown provider \"{}\" (registered: {:?})",
                    service.code,
                    service.provider,
                    self.providers()
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prepay::PrePayFactory;

    #[test]
    fn test_process_result_requires_url() {
        let err = ProcessResult::new("  ", HttpMethod::Get, Params::new(), false).unwrap_err();
        assert!(matches!(err, CheckoutError::InvalidProcessResult(_)));

        let result =
            ProcessResult::new("https://pay.example/x", HttpMethod::Post, Params::new(), true)
                .unwrap();
        assert_eq!(result.url(), "https://pay.example/x");
        assert_eq!(result.method(), HttpMethod::Post);
        assert!(result.is_external());
    }

    #[test]
    fn test_http_method_serialization() {
        assert_eq!(serde_json::to_string(&HttpMethod::Get).unwrap(), "\"GET\"");
        assert_eq!(HttpMethod::Post.to_string(), "POST");
    }

    #[test]
    fn test_registry_create_and_validate() {
        let registry = ProviderRegistry::new().with_factory(Arc::new(PrePayFactory));

        assert_eq!(registry.providers(), vec!["prepay"]);

        let prepay = ServiceItem::payment("invoice", "prepay");
        let provider = registry.create(&prepay).unwrap();
        assert_eq!(provider.provider_name(), "prepay");

        let unknown = ServiceItem::payment("paypal", "paypal");
        assert!(matches!(
            registry.create(&unknown),
            Err(CheckoutError::Configuration(_))
        ));
        assert!(registry.validate([&prepay]).is_ok());
        assert!(registry.validate([&prepay, &unknown]).is_err());
    }

    #[test]
    fn test_push_request_header_lookup() {
        let mut request = PushRequest::default();
        request
            .headers
            .insert("stripe-signature".into(), "t=1,v1=abc".into());

        assert_eq!(request.header("Stripe-Signature"), Some("t=1,v1=abc"));
    }
}
