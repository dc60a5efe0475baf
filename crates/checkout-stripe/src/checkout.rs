//! # Stripe Checkout Sessions
//!
//! Payment provider backed by the Stripe Checkout Sessions API. The customer is
//! redirected to Stripe's hosted payment page and returns to the confirmation
//! page with the session ID appended.

use crate::config::StripeConfig;
use crate::webhook::{self, map_payment_status, CheckoutSessionData, StripeEvent};
use async_trait::async_trait;
use checkout_core::provider::{CLIENT_IP, URL_SELF, URL_SUCCESS};
use checkout_core::url::append_raw_param;
use checkout_core::{
    BoxedPaymentProvider, CheckoutError, CheckoutResult, HttpMethod, Order, Params,
    PaymentProvider, PaymentUpdate, ProcessResult, ProviderFactory, PushRequest, ServiceItem,
};
use chrono::Utc;
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use tracing::{debug, error, info, instrument, warn};
use url::Url;
use uuid::Uuid;

/// Placeholder Stripe replaces with the session ID in the success URL
const SESSION_ID_PLACEHOLDER: &str = "{CHECKOUT_SESSION_ID}";

/// Stripe Checkout Session provider
pub struct StripeProvider {
    config: StripeConfig,
    client: Client,
    service_code: String,
    global: Params,
}

impl StripeProvider {
    /// Create a provider for one payment service
    pub fn new(config: StripeConfig, client: Client, service_code: impl Into<String>) -> Self {
        Self {
            config,
            client,
            service_code: service_code.into(),
            global: Params::new(),
        }
    }

    fn global_url(&self, key: &str) -> CheckoutResult<&str> {
        self.global
            .get(key)
            .map(String::as_str)
            .ok_or_else(|| CheckoutError::Configuration(format!("{} not injected", key)))
    }

    /// Build form data for the Checkout Session API
    fn session_form(&self, order: &Order) -> CheckoutResult<Vec<(String, String)>> {
        let success = self.global_url(URL_SUCCESS)?;
        let success_url = append_raw_param(success, "session_id", SESSION_ID_PLACEHOLDER);
        let cancel_url = absolute_url(success, self.global_url(URL_SELF)?)?;

        let mut form_params: Vec<(String, String)> = vec![
            ("mode".to_string(), "payment".to_string()),
            ("success_url".to_string(), success_url),
            ("cancel_url".to_string(), cancel_url),
            ("client_reference_id".to_string(), order.id.clone()),
            (
                "line_items[0][price_data][currency]".to_string(),
                order.price.currency.as_str().to_string(),
            ),
            (
                "line_items[0][price_data][unit_amount]".to_string(),
                order.price.amount.to_string(),
            ),
            (
                "line_items[0][price_data][product_data][name]".to_string(),
                format!("Order {}", order.id),
            ),
            ("line_items[0][quantity]".to_string(), "1".to_string()),
            ("metadata[order_id]".to_string(), order.id.clone()),
            ("metadata[service_code]".to_string(), self.service_code.clone()),
        ];

        if let Some(ref email) = order.customer_email {
            form_params.push(("customer_email".to_string(), email.clone()));
        }

        if let Some(ip) = self.global.get(CLIENT_IP) {
            form_params.push(("metadata[client_ip]".to_string(), ip.clone()));
        }

        Ok(form_params)
    }

    /// Send an authenticated request and return the body of a successful response
    async fn send(&self, request: RequestBuilder) -> CheckoutResult<String> {
        let response = request
            .header("Authorization", self.config.auth_header())
            .header("Stripe-Version", &self.config.api_version)
            .send()
            .await
            .map_err(|e| CheckoutError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| CheckoutError::Network(e.to_string()))?;

        if !status.is_success() {
            error!("Stripe API error: status={}, body={}", status, body);

            let message = match serde_json::from_str::<StripeErrorResponse>(&body) {
                Ok(error_response) => error_response.error.message,
                Err(_) => format!("HTTP {}: {}", status, body),
            };

            return Err(CheckoutError::Provider {
                provider: "stripe".to_string(),
                message,
            });
        }

        Ok(body)
    }
}

#[async_trait]
impl PaymentProvider for StripeProvider {
    fn provider_name(&self) -> &'static str {
        "stripe"
    }

    fn inject_global_config(&mut self, config: Params) {
        self.global.extend(config);
    }

    #[instrument(skip(self, order, _params), fields(order_id = %order.id, service = %self.service_code))]
    async fn process(
        &self,
        order: &Order,
        _params: &Params,
    ) -> CheckoutResult<Option<ProcessResult>> {
        if order.price.amount <= 0 {
            return Err(CheckoutError::InvalidRequest(format!(
                "Order {} has no amount to pay",
                order.id
            )));
        }

        let form_params = self.session_form(order)?;
        debug!(
            "Creating Stripe checkout session: amount={}",
            order.price.display()
        );

        let url = format!("{}/v1/checkout/sessions", self.config.api_base_url);
        let body = self
            .send(
                self.client
                    .post(&url)
                    .header("Idempotency-Key", idempotency_key(order))
                    .form(&form_params),
            )
            .await?;

        let session: StripeCheckoutSessionResponse = serde_json::from_str(&body).map_err(|e| {
            CheckoutError::Serialization(format!("Failed to parse Stripe response: {}", e))
        })?;

        info!(
            "Created Stripe checkout session: id={}, url={}",
            session.id, session.url
        );

        ProcessResult::new(session.url, HttpMethod::Get, Params::new(), true).map(Some)
    }

    #[instrument(skip(self, order, params), fields(order_id = %order.id))]
    async fn update_sync(&self, mut order: Order, params: &Params) -> CheckoutResult<Order> {
        let Some(session_id) = params.get("session_id") else {
            debug!("No session_id parameter, order left unchanged");
            return Ok(order);
        };

        if session_id.is_empty()
            || !session_id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            return Err(CheckoutError::InvalidRequest(format!(
                "Invalid Stripe session ID \"{}\"",
                session_id
            )));
        }

        let url = format!(
            "{}/v1/checkout/sessions/{}",
            self.config.api_base_url, session_id
        );
        let body = self.send(self.client.get(&url)).await?;

        let session: CheckoutSessionData = serde_json::from_str(&body).map_err(|e| {
            CheckoutError::Serialization(format!("Failed to parse Stripe session: {}", e))
        })?;

        if session.order_id() != Some(order.id.as_str()) {
            return Err(CheckoutError::Provider {
                provider: "stripe".to_string(),
                message: format!(
                    "Checkout session {} does not belong to order {}",
                    session.id, order.id
                ),
            });
        }

        match map_payment_status(&session.payment_status) {
            Some(status) if status != order.payment_status => {
                info!(
                    "Stripe session {} is {}: {} -> {}",
                    session.id, session.payment_status, order.payment_status, status
                );
                order.set_payment_status(status);
            }
            Some(_) => {}
            None => warn!(
                "Unknown payment status {:?} for Stripe session {}",
                session.payment_status, session.id
            ),
        }

        Ok(order)
    }

    #[instrument(skip(self, request))]
    async fn update_push(&self, request: &PushRequest) -> CheckoutResult<Option<PaymentUpdate>> {
        let signature = request.header("stripe-signature").ok_or_else(|| {
            CheckoutError::WebhookVerificationFailed("Missing Stripe-Signature header".to_string())
        })?;

        webhook::verify_signature(
            &self.config.webhook_secret,
            &request.body,
            signature,
            Utc::now().timestamp(),
        )?;

        let event: StripeEvent = serde_json::from_slice(&request.body).map_err(|e| {
            CheckoutError::Serialization(format!("Failed to parse webhook: {}", e))
        })?;

        debug!("Verified Stripe webhook: type={}", event.event_type);

        webhook::payment_update(&event)
    }
}

/// Resolve a possibly relative URL against the absolute success URL
///
/// Stripe only accepts absolute return URLs.
fn absolute_url(base: &str, target: &str) -> CheckoutResult<String> {
    Url::parse(base)
        .and_then(|base| base.join(target))
        .map(String::from)
        .map_err(|e| CheckoutError::Configuration(format!("Invalid return URL {}: {}", target, e)))
}

/// One key per session creation attempt
fn idempotency_key(order: &Order) -> String {
    format!("{}-{}", order.id, Uuid::new_v4())
}

/// Factory registered under the name "stripe"
#[derive(Clone)]
pub struct StripeFactory {
    client: Client,
}

impl StripeFactory {
    /// Create a factory with a shared HTTP client
    pub fn new() -> CheckoutResult<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| CheckoutError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }
}

impl ProviderFactory for StripeFactory {
    fn name(&self) -> &'static str {
        "stripe"
    }

    fn create(&self, service: &ServiceItem) -> CheckoutResult<BoxedPaymentProvider> {
        let config = StripeConfig::from_service(service)?;
        Ok(Box::new(StripeProvider::new(
            config,
            self.client.clone(),
            service.code.clone(),
        )))
    }
}

// =============================================================================
// Stripe API Types
// =============================================================================

#[derive(Debug, Deserialize)]
struct StripeCheckoutSessionResponse {
    id: String,
    url: String,
}

#[derive(Debug, Deserialize)]
struct StripeErrorResponse {
    error: StripeError,
}

#[derive(Debug, Deserialize)]
struct StripeError {
    message: String,
}
