//! # Client Registry
//!
//! Builds the client trees of the checkout pages from the configuration. Sub-
//! client lists are read from `client/html/<client>/subparts` and every client
//! is wrapped with its configured decorators. Unknown client or decorator names
//! are configuration errors.

use crate::client::{BoxedHtmlClient, HtmlClient, SubClients};
use crate::confirm::{ConfirmClient, ConfirmPartClient, CONFIRM_CLIENT, DEFAULT_SUBPARTS};
use crate::decorator::decorate;
use crate::process::{ProcessClient, PROCESS_CLIENT};
use checkout_core::{CheckoutError, CheckoutResult, ClientConfig};
use tracing::debug;

/// Sub-clients of the process step when none are configured
const PROCESS_SUBPARTS: &[&str] = &[];

/// The page clients
pub struct ClientRegistry {
    process: BoxedHtmlClient,
    confirm: BoxedHtmlClient,
}

impl ClientRegistry {
    /// Build all clients
    pub fn from_config(config: &ClientConfig) -> CheckoutResult<Self> {
        Ok(Self {
            process: build_client(config, PROCESS_CLIENT)?,
            confirm: build_client(config, CONFIRM_CLIENT)?,
        })
    }

    /// Client of the checkout "process" step
    pub fn process(&self) -> &dyn HtmlClient {
        self.process.as_ref()
    }

    /// Client of the confirmation page
    pub fn confirm(&self) -> &dyn HtmlClient {
        self.confirm.as_ref()
    }
}

/// Build the client at `path` with its sub-clients and decorators
pub fn build_client(config: &ClientConfig, path: &str) -> CheckoutResult<BoxedHtmlClient> {
    let client: BoxedHtmlClient = match path {
        PROCESS_CLIENT => Box::new(ProcessClient::new(build_subparts(
            config,
            path,
            PROCESS_SUBPARTS,
        )?)),
        CONFIRM_CLIENT => Box::new(ConfirmClient::new(build_subparts(
            config,
            path,
            DEFAULT_SUBPARTS,
        )?)),
        "checkout/confirm/intro" => Box::new(ConfirmPartClient::intro()),
        "checkout/confirm/order" => Box::new(ConfirmPartClient::order()),
        other => {
            return Err(CheckoutError::Configuration(format!(
                "Unknown HTML client \"{}\"",
                other
            )))
        }
    };

    decorate(config, path, client)
}

fn build_subparts(
    config: &ClientConfig,
    path: &str,
    defaults: &[&str],
) -> CheckoutResult<SubClients> {
    let names = config.list_or(&format!("client/html/{}/subparts", path), defaults);
    debug!("Sub-clients of {}: {:?}", path, names);

    names
        .iter()
        .map(|name| build_client(config, &format!("{}/{}", path, name)))
        .collect::<CheckoutResult<Vec<_>>>()
        .map(SubClients::new)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tree() {
        let registry = ClientRegistry::from_config(&ClientConfig::new()).unwrap();

        assert_eq!(registry.process().name(), "checkout/standard/process");
        assert_eq!(registry.confirm().name(), "checkout/confirm");
    }

    #[test]
    fn test_default_confirm_subparts() {
        let parts = build_subparts(&ClientConfig::new(), CONFIRM_CLIENT, DEFAULT_SUBPARTS).unwrap();
        assert_eq!(
            parts.names(),
            vec!["checkout/confirm/intro", "checkout/confirm/order"]
        );
    }

    #[test]
    fn test_configured_subparts() {
        let config = ClientConfig::from_toml_str(
            r#"
            [client.html.checkout.confirm]
            subparts = ["order"]
            "#,
        )
        .unwrap();

        let parts = build_subparts(&config, CONFIRM_CLIENT, DEFAULT_SUBPARTS).unwrap();
        assert_eq!(parts.names(), vec!["checkout/confirm/order"]);
    }

    #[test]
    fn test_unknown_subpart_fails() {
        let config = ClientConfig::from_toml_str(
            r#"
            [client.html.checkout.standard.process]
            subparts = ["address"]
            "#,
        )
        .unwrap();

        assert!(matches!(
            ClientRegistry::from_config(&config),
            Err(CheckoutError::Configuration(msg)) if msg.contains("checkout/standard/process/address")
        ));
    }

    #[test]
    fn test_decorated_clients_keep_names() {
        let config = ClientConfig::from_toml_str(
            r#"
            [client.html.common.decorators]
            default = ["logging"]
            "#,
        )
        .unwrap();

        let registry = ClientRegistry::from_config(&config).unwrap();
        assert_eq!(registry.confirm().name(), "checkout/confirm");
    }
}
