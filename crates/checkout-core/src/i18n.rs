//! # Message Catalogs
//!
//! Translation of customer-facing messages. Messages are looked up by domain
//! (the catalog) and message id; unknown ids are returned unchanged.

use crate::error::{CheckoutError, CheckoutResult};
use serde::Deserialize;
use std::collections::HashMap;

/// Message catalog domains
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageDomain {
    /// Messages raised by the HTML clients
    Client,
    /// Messages raised by the frontend controllers
    ControllerFrontend,
    /// Messages raised by the domain managers
    Mshop,
}

impl MessageDomain {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageDomain::Client => "client",
            MessageDomain::ControllerFrontend => "controller/frontend",
            MessageDomain::Mshop => "mshop",
        }
    }
}

impl std::fmt::Display for MessageDomain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Translates message ids within a domain
pub trait Translator: Send + Sync {
    /// Translate a single message (the "domain translate" lookup)
    fn dt(&self, domain: MessageDomain, msgid: &str) -> String;
}

/// Translation catalog loaded from TOML.
///
/// ```toml
/// [client]
/// "No order ID available" = "Keine Bestellnummer vorhanden"
///
/// ["controller/frontend"]
/// "Basket is locked" = "Warenkorb ist gesperrt"
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    domains: HashMap<String, HashMap<String, String>>,
}

impl Catalog {
    /// Create an empty catalog (every message passes through untranslated)
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a catalog from TOML source
    pub fn from_toml_str(source: &str) -> CheckoutResult<Self> {
        toml::from_str(source)
            .map_err(|e| CheckoutError::Configuration(format!("Invalid message catalog: {}", e)))
    }

    /// Builder: add a single translation
    pub fn with_message(
        mut self,
        domain: MessageDomain,
        msgid: impl Into<String>,
        translation: impl Into<String>,
    ) -> Self {
        self.domains
            .entry(domain.as_str().to_string())
            .or_default()
            .insert(msgid.into(), translation.into());
        self
    }

    /// Number of translated messages across all domains
    pub fn len(&self) -> usize {
        self.domains.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Translator for Catalog {
    fn dt(&self, domain: MessageDomain, msgid: &str) -> String {
        self.domains
            .get(domain.as_str())
            .and_then(|messages| messages.get(msgid))
            .cloned()
            .unwrap_or_else(|| msgid.to_string())
    }
}
