//! # Service Items
//!
//! Descriptors of the payment and delivery services a shop offers. A service item
//! names the provider implementation that executes it and carries that
//! provider's settings.

use crate::order::ServiceType;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A configured payment or delivery service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceItem {
    /// Unique service identifier
    #[serde(default)]
    pub id: String,

    /// Unique code referenced by order services (e.g., "stripe-card")
    pub code: String,

    /// Payment or delivery
    #[serde(rename = "type")]
    pub service_type: ServiceType,

    /// Name of the provider factory (e.g., "stripe", "prepay")
    pub provider: String,

    /// Display label
    #[serde(default)]
    pub label: String,

    /// Provider settings (API keys, endpoints)
    #[serde(default, skip_serializing)]
    pub config: BTreeMap<String, String>,
}

impl ServiceItem {
    /// Create a payment service item
    pub fn payment(code: impl Into<String>, provider: impl Into<String>) -> Self {
        let code = code.into();
        Self {
            id: code.clone(),
            label: code.clone(),
            code,
            service_type: ServiceType::Payment,
            provider: provider.into(),
            config: BTreeMap::new(),
        }
    }

    /// Builder: add a provider setting
    pub fn with_config(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.insert(key.into(), value.into());
        self
    }

    /// Get a provider setting
    pub fn config_value(&self, key: &str) -> Option<&str> {
        self.config.get(key).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payment_service() {
        let item = ServiceItem::payment("stripe-card", "stripe").with_config("secret_key", "sk_test_1");

        assert_eq!(item.service_type, ServiceType::Payment);
        assert_eq!(item.provider, "stripe");
        assert_eq!(item.config_value("secret_key"), Some("sk_test_1"));
        assert_eq!(item.config_value("missing"), None);
    }

    #[test]
    fn test_config_not_serialized() {
        let item = ServiceItem::payment("stripe-card", "stripe").with_config("secret_key", "sk_test_1");
        let json = serde_json::to_string(&item).unwrap();

        assert!(!json.contains("sk_test_1"));
    }
}
