//! # checkout-stripe
//!
//! Stripe payment provider for checkout-flow-rs.
//!
//! **StripeProvider** hands the customer over to a hosted Stripe Checkout
//! Session and keeps the order's payment status in sync:
//! - `process` creates the session and redirects to Stripe
//! - `update_sync` reads the session when the customer returns
//! - `update_push` applies signed webhook events
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use checkout_core::ProviderRegistry;
//! use checkout_stripe::StripeFactory;
//!
//! let registry = ProviderRegistry::new().with_factory(Arc::new(StripeFactory::new()?));
//!
//! // Service items select the provider by name:
//! // [[services]]
//! // code = "stripe-card"
//! // type = "payment"
//! // provider = "stripe"
//! // config = { secret_key = "sk_test_...", webhook_secret = "whsec_..." }
//! ```

pub mod checkout;
pub mod config;
pub mod webhook;

// Re-exports
pub use checkout::{StripeFactory, StripeProvider};
pub use config::StripeConfig;
pub use webhook::{
    map_payment_status, payment_update, signature_header, verify_signature,
    CheckoutSessionData, StripeEvent,
};
