//! # Checkout Error Types
//!
//! Typed error handling for the checkout flow.
//! Every fallible operation returns `Result<T, CheckoutError>`.
//!
//! Each variant belongs to exactly one [`ErrorKind`], and the kind alone decides
//! which message catalog translates the error before it is shown to a customer.

use crate::i18n::{MessageDomain, Translator};
use thiserror::Error;

/// Message shown in place of any unclassified failure
pub const NON_RECOVERABLE_MESSAGE: &str = "A non-recoverable error occured";

/// Classification of a [`CheckoutError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// User-facing and recoverable (lost session, bad provider response)
    Client,
    /// Rejected by a frontend controller (basket, order, service)
    Controller,
    /// Persistence or domain-manager failure
    Domain,
    /// Anything else; logged with full detail, never shown verbatim
    Unclassified,
}

impl ErrorKind {
    /// Message catalog used to translate errors of this kind
    pub fn domain(self) -> MessageDomain {
        match self {
            ErrorKind::Client | ErrorKind::Unclassified => MessageDomain::Client,
            ErrorKind::Controller => MessageDomain::ControllerFrontend,
            ErrorKind::Domain => MessageDomain::Mshop,
        }
    }
}

/// Core error type for all checkout operations
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// The session carries no order id (expired or never set)
    #[error("No order ID available")]
    NoOrderId,

    /// No payment service matches the code stored on the order
    #[error("No service for code \"{code}\" found")]
    ServiceNotFound { code: String },

    /// The provider produced no redirect instructions
    #[error("Invalid process response from service provider with code \"{code}\"")]
    InvalidProcessResponse { code: String },

    /// A process result was built without a destination
    #[error("Invalid process result: {0}")]
    InvalidProcessResult(String),

    /// More than one payment service is attached to the order base
    #[error("Multiple payment services found for order base \"{base_id}\"")]
    MultiplePaymentServices { base_id: String },

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// A frontend controller rejected the operation
    #[error("{0}")]
    Controller(String),

    /// Order lookup failed
    #[error("Order item with ID \"{order_id}\" not found")]
    OrderNotFound { order_id: String },

    /// Repository search or save failed
    #[error("Repository error: {0}")]
    Repository(String),

    /// Payment provider API error
    #[error("Provider error [{provider}]: {message}")]
    Provider { provider: String, message: String },

    /// Webhook signature verification failed
    #[error("Webhook verification failed: {0}")]
    WebhookVerificationFailed(String),

    /// Configuration errors (missing keys, unknown client or decorator names)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Network/HTTP error communicating with a provider
    #[error("Network error: {0}")]
    Network(String),

    /// Template lookup or rendering failed
    #[error("Template error: {0}")]
    Template(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Internal error (should not happen)
    #[error("Internal error: {0}")]
    Internal(String),

    /// Any other failure
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CheckoutError {
    /// Returns the classification of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            CheckoutError::NoOrderId
            | CheckoutError::ServiceNotFound { .. }
            | CheckoutError::InvalidProcessResponse { .. }
            | CheckoutError::InvalidProcessResult(_)
            | CheckoutError::MultiplePaymentServices { .. }
            | CheckoutError::InvalidRequest(_) => ErrorKind::Client,
            CheckoutError::Controller(_) => ErrorKind::Controller,
            CheckoutError::OrderNotFound { .. }
            | CheckoutError::Repository(_)
            | CheckoutError::Provider { .. }
            | CheckoutError::WebhookVerificationFailed(_) => ErrorKind::Domain,
            CheckoutError::Configuration(_)
            | CheckoutError::Network(_)
            | CheckoutError::Template(_)
            | CheckoutError::Serialization(_)
            | CheckoutError::Internal(_)
            | CheckoutError::Other(_) => ErrorKind::Unclassified,
        }
    }

    /// Translated message suitable for display to the customer.
    ///
    /// Unclassified errors are replaced by [`NON_RECOVERABLE_MESSAGE`]; their
    /// details stay in the logs.
    pub fn user_message(&self, i18n: &dyn Translator) -> String {
        let kind = self.kind();
        match kind {
            ErrorKind::Unclassified => i18n.dt(kind.domain(), NON_RECOVERABLE_MESSAGE),
            _ => i18n.dt(kind.domain(), &self.to_string()),
        }
    }

    /// Returns true if this error is retryable
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            CheckoutError::Network(_) | CheckoutError::Provider { .. }
        )
    }

    /// Returns the HTTP status code appropriate for this error
    pub fn status_code(&self) -> u16 {
        match self {
            CheckoutError::NoOrderId => 400,
            CheckoutError::ServiceNotFound { .. } => 404,
            CheckoutError::InvalidProcessResponse { .. } => 502,
            CheckoutError::InvalidProcessResult(_) => 502,
            CheckoutError::MultiplePaymentServices { .. } => 409,
            CheckoutError::InvalidRequest(_) => 400,
            CheckoutError::Controller(_) => 422,
            CheckoutError::OrderNotFound { .. } => 404,
            CheckoutError::Repository(_) => 500,
            CheckoutError::Provider { .. } => 502,
            CheckoutError::WebhookVerificationFailed(_) => 401,
            CheckoutError::Configuration(_) => 500,
            CheckoutError::Network(_) => 503,
            CheckoutError::Template(_) => 500,
            CheckoutError::Serialization(_) => 500,
            CheckoutError::Internal(_) => 500,
            CheckoutError::Other(_) => 500,
        }
    }
}

/// Result type alias for checkout operations
pub type CheckoutResult<T> = Result<T, CheckoutError>;
