//! # Client Configuration
//!
//! Hierarchical configuration addressed by `/`-separated paths such as
//! `client/html/checkout/confirm/url/action`. Each path segment selects a nested
//! TOML table, so the key above is written as
//!
//! ```toml
//! [client.html.checkout.confirm.url]
//! action = "confirm"
//! ```

use crate::error::{CheckoutError, CheckoutResult};
use serde::de::DeserializeOwned;
use toml::{Table, Value};

/// Configuration tree for the HTML clients
#[derive(Debug, Clone, Default)]
pub struct ClientConfig {
    root: Table,
}

impl ClientConfig {
    /// Create an empty configuration (all lookups fall back to defaults)
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse configuration from TOML source
    pub fn from_toml_str(source: &str) -> CheckoutResult<Self> {
        let root: Table = toml::from_str(source)
            .map_err(|e| CheckoutError::Configuration(format!("Invalid client config: {}", e)))?;
        Ok(Self { root })
    }

    /// Set a value at the given path, creating intermediate tables
    pub fn set(&mut self, path: &str, value: impl Into<Value>) {
        let mut segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let Some(last) = segments.pop() else {
            return;
        };

        let mut table = &mut self.root;
        for segment in segments {
            let entry = table
                .entry(segment.to_string())
                .or_insert_with(|| Value::Table(Table::new()));
            if !entry.is_table() {
                *entry = Value::Table(Table::new());
            }
            let Value::Table(next) = entry else {
                return;
            };
            table = next;
        }
        table.insert(last.to_string(), value.into());
    }

    /// Builder: set a value
    pub fn with(mut self, path: &str, value: impl Into<Value>) -> Self {
        self.set(path, value);
        self
    }

    /// Raw value at the given path
    pub fn get(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split('/').filter(|s| !s.is_empty());
        let first = segments.next()?;
        let mut value = self.root.get(first)?;
        for segment in segments {
            value = value.as_table()?.get(segment)?;
        }
        Some(value)
    }

    /// String value at the given path
    pub fn get_str(&self, path: &str) -> Option<&str> {
        self.get(path).and_then(Value::as_str)
    }

    /// String value or the given default
    pub fn string_or(&self, path: &str, default: &str) -> String {
        self.get_str(path).unwrap_or(default).to_string()
    }

    /// List of strings at the given path; non-string entries are skipped
    pub fn get_list(&self, path: &str) -> Option<Vec<String>> {
        self.get(path).and_then(Value::as_array).map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(String::from)
                .collect()
        })
    }

    /// List at the given path or the given default
    pub fn list_or(&self, path: &str, default: &[&str]) -> Vec<String> {
        self.get_list(path)
            .unwrap_or_else(|| default.iter().map(|s| s.to_string()).collect())
    }

    /// Deserialize the value at the given path into a typed struct
    pub fn get_as<T: DeserializeOwned>(&self, path: &str) -> CheckoutResult<Option<T>> {
        self.get(path)
            .cloned()
            .map(|value| {
                value.try_into().map_err(|e: toml::de::Error| {
                    CheckoutError::Configuration(format!("Invalid value for {}: {}", path, e))
                })
            })
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
        [client.html.checkout.confirm]
        subparts = ["intro", "order"]
        template-body = "checkout/confirm/body-custom.html"

        [client.html.checkout.confirm.url]
        action = "thanks"
        config = { absoluteUri = false }
    "#;

    #[test]
    fn test_path_lookup() {
        let config = ClientConfig::from_toml_str(SAMPLE).unwrap();

        assert_eq!(
            config.get_str("client/html/checkout/confirm/url/action"),
            Some("thanks")
        );
        assert_eq!(
            config.get_str("client/html/checkout/confirm/template-body"),
            Some("checkout/confirm/body-custom.html")
        );
        assert_eq!(config.get_str("client/html/checkout/update/url/action"), None);
        assert_eq!(
            config.string_or("client/html/checkout/confirm/url/controller", "checkout"),
            "checkout"
        );
    }

    #[test]
    fn test_lists() {
        let config = ClientConfig::from_toml_str(SAMPLE).unwrap();

        assert_eq!(
            config.get_list("client/html/checkout/confirm/subparts"),
            Some(vec!["intro".to_string(), "order".to_string()])
        );
        assert_eq!(
            config.list_or("client/html/checkout/confirm/decorators/global", &["logging"]),
            vec!["logging".to_string()]
        );
    }

    #[test]
    fn test_set_creates_tables() {
        let config = ClientConfig::new()
            .with("client/html/checkout/standard/url/target", "shop")
            .with("client/html/checkout/standard/url/action", "index");

        assert_eq!(
            config.get_str("client/html/checkout/standard/url/target"),
            Some("shop")
        );
        assert_eq!(
            config.get_str("client/html/checkout/standard/url/action"),
            Some("index")
        );
    }

    #[test]
    fn test_invalid_toml() {
        assert!(matches!(
            ClientConfig::from_toml_str("not = [valid"),
            Err(CheckoutError::Configuration(_))
        ));
    }
}
