//! # Stripe Configuration
//!
//! Stripe settings of a payment service. Keys are read from the service item's
//! config and fall back to environment variables, so secrets can stay out of
//! the shop configuration.

use checkout_core::{CheckoutError, CheckoutResult, ServiceItem};
use std::env;

const DEFAULT_API_BASE_URL: &str = "https://api.stripe.com";
const DEFAULT_API_VERSION: &str = "2024-12-18.acacia";

/// Stripe API configuration
#[derive(Debug, Clone)]
pub struct StripeConfig {
    /// Secret API key (sk_test_... or sk_live_...)
    pub secret_key: String,

    /// Webhook signing secret (whsec_...)
    pub webhook_secret: String,

    /// API base URL (for testing/mocking)
    pub api_base_url: String,

    /// API version
    pub api_version: String,
}

impl StripeConfig {
    /// Load configuration for a payment service.
    ///
    /// Service config keys and their environment fallbacks:
    /// - `secret_key` / `STRIPE_SECRET_KEY`
    /// - `webhook_secret` / `STRIPE_WEBHOOK_SECRET`
    /// - `api_base_url` (optional)
    /// - `api_version` (optional)
    pub fn from_service(service: &ServiceItem) -> CheckoutResult<Self> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let secret_key = setting(service, "secret_key", "STRIPE_SECRET_KEY")?;
        let webhook_secret = setting(service, "webhook_secret", "STRIPE_WEBHOOK_SECRET")?;

        if !secret_key.starts_with("sk_test_") && !secret_key.starts_with("sk_live_") {
            return Err(CheckoutError::Configuration(format!(
                "Stripe secret key of service \"{}\" must start with sk_test_ or sk_live_",
                service.code
            )));
        }

        if !webhook_secret.starts_with("whsec_") {
            return Err(CheckoutError::Configuration(format!(
                "Stripe webhook secret of service \"{}\" must start with whsec_",
                service.code
            )));
        }

        Ok(Self {
            secret_key,
            webhook_secret,
            api_base_url: service
                .config_value("api_base_url")
                .unwrap_or(DEFAULT_API_BASE_URL)
                .trim_end_matches('/')
                .to_string(),
            api_version: service
                .config_value("api_version")
                .unwrap_or(DEFAULT_API_VERSION)
                .to_string(),
        })
    }

    /// Create config with explicit values (for testing)
    pub fn new(secret_key: impl Into<String>, webhook_secret: impl Into<String>) -> Self {
        Self {
            secret_key: secret_key.into(),
            webhook_secret: webhook_secret.into(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
        }
    }

    /// Check if using test keys
    pub fn is_test_mode(&self) -> bool {
        self.secret_key.starts_with("sk_test_")
    }

    /// Get authorization header value
    pub fn auth_header(&self) -> String {
        format!("Bearer {}", self.secret_key)
    }

    /// Builder: set custom API base URL (for testing)
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }
}

fn setting(service: &ServiceItem, key: &str, env_var: &str) -> CheckoutResult<String> {
    match service.config_value(key) {
        Some(value) if !value.is_empty() => Ok(value.to_string()),
        _ => env::var(env_var).map_err(|_| {
            CheckoutError::Configuration(format!(
                "Service \"{}\" has no {} and {} is not set",
                service.code, key, env_var
            ))
        }),
    }
}
