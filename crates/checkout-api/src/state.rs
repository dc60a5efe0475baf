//! # Application State
//!
//! Shared state for the Axum application.
//! Holds the checkout context, the page clients and the session store.

use checkout_core::{
    Catalog, ClientConfig, MemorySessionStore, MemoryStore, PrePayFactory, ProviderRegistry,
    RouteUrlBuilder, SessionStore, ShopFixtures,
};
use checkout_html::{ClientRegistry, Context};
use checkout_stripe::StripeFactory;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Base URL for generated links and provider callbacks
    pub base_url: String,
    /// Environment (development, staging, production)
    pub environment: String,
    /// Directory searched first for the TOML files
    pub config_dir: Option<PathBuf>,
}

impl AppConfig {
    /// Load from environment variables
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            base_url: std::env::var("BASE_URL")
                .unwrap_or_else(|_| "http://localhost:8080".to_string()),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            config_dir: std::env::var("CHECKOUT_CONFIG_DIR").ok().map(PathBuf::from),
        }
    }

    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid socket address {}:{}: {}", self.host, self.port, e))
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Candidate locations of a config file, most specific first
    fn search_paths(&self, file: &str) -> Vec<PathBuf> {
        self.config_dir
            .iter()
            .map(|dir| dir.join(file))
            .chain(
                ["config", "../config", "../../config"]
                    .into_iter()
                    .map(|dir| PathBuf::from(dir).join(file)),
            )
            .collect()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Services shared by the page clients
    pub ctx: Context,
    /// Client trees of the checkout pages
    pub clients: Arc<ClientRegistry>,
    /// Per-visitor sessions keyed by cookie
    pub sessions: Arc<dyn SessionStore>,
    /// Order and service storage
    pub store: Arc<MemoryStore>,
    /// Application config
    pub config: AppConfig,
}

impl AppState {
    /// Create the state from the environment and the TOML files
    pub fn new() -> anyhow::Result<Self> {
        let config = AppConfig::from_env();

        let client = match read_config(&config, "client.toml")? {
            Some(source) => ClientConfig::from_toml_str(&source)?,
            None => ClientConfig::new(),
        };
        let catalog = match read_config(&config, "i18n.toml")? {
            Some(source) => Catalog::from_toml_str(&source)?,
            None => Catalog::new(),
        };
        let fixtures = match read_config(&config, "shop.toml")? {
            Some(source) => ShopFixtures::from_toml_str(&source)?,
            None => ShopFixtures::default(),
        };

        let providers = ProviderRegistry::new()
            .with_factory(Arc::new(PrePayFactory))
            .with_factory(Arc::new(StripeFactory::new()?));

        Self::from_parts(config, client, catalog, fixtures, providers)
    }

    /// Assemble the state from loaded parts
    pub fn from_parts(
        config: AppConfig,
        client: ClientConfig,
        catalog: Catalog,
        fixtures: ShopFixtures,
        providers: ProviderRegistry,
    ) -> anyhow::Result<Self> {
        providers.validate(&fixtures.services)?;

        info!(
            "Shop data: {} orders, {} services",
            fixtures.orders.len(),
            fixtures.services.len()
        );

        let store = Arc::new(MemoryStore::from_fixtures(fixtures));
        let urls = RouteUrlBuilder::new(&config.base_url)?;
        let clients = ClientRegistry::from_config(&client)?;

        let ctx = Context::new(client, store.clone(), store.clone(), providers, Arc::new(urls))?
            .with_i18n(Arc::new(catalog));

        Ok(Self {
            ctx,
            clients: Arc::new(clients),
            sessions: Arc::new(MemorySessionStore::new()),
            store,
            config,
        })
    }
}

/// Read the first config file found on the search path
fn read_config(config: &AppConfig, file: &str) -> anyhow::Result<Option<String>> {
    for path in config.search_paths(file) {
        if let Ok(content) = std::fs::read_to_string(&path) {
            info!("Loaded {}", path.display());
            return Ok(Some(content));
        }
    }

    warn!("No {} found, using defaults", file);
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> AppConfig {
        AppConfig {
            host: "0.0.0.0".to_string(),
            port: 3000,
            base_url: "http://localhost:3000".to_string(),
            environment: "test".to_string(),
            config_dir: None,
        }
    }

    #[test]
    fn test_socket_addr() {
        let addr = test_config().socket_addr().unwrap();
        assert_eq!(addr.to_string(), "0.0.0.0:3000");
    }

    #[test]
    fn test_invalid_socket_addr() {
        let config = AppConfig {
            host: "not a host".to_string(),
            ..test_config()
        };
        assert!(config.socket_addr().is_err());
    }

    #[test]
    fn test_search_paths() {
        let config = AppConfig {
            config_dir: Some(PathBuf::from("/etc/checkout")),
            ..test_config()
        };

        let paths = config.search_paths("shop.toml");
        assert_eq!(paths[0], PathBuf::from("/etc/checkout/shop.toml"));
        assert_eq!(paths[1], PathBuf::from("config/shop.toml"));
        assert_eq!(paths.len(), 4);
    }

    #[test]
    fn test_unknown_provider_rejected() {
        let fixtures = ShopFixtures::from_toml_str(
            r#"
            [[services]]
            code = "paypal"
            type = "payment"
            provider = "paypal"
            "#,
        )
        .unwrap();

        let result = AppState::from_parts(
            test_config(),
            ClientConfig::new(),
            Catalog::new(),
            fixtures,
            ProviderRegistry::new().with_factory(Arc::new(PrePayFactory)),
        );
        assert!(result.is_err());
    }
}
