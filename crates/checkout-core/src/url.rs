//! # URL Building
//!
//! Builds the URLs of checkout steps from a target/controller/action triple, the
//! request parameters and URL options. Every part can be overridden per step in
//! the client configuration under `<prefix>/target`, `<prefix>/controller`,
//! `<prefix>/action` and `<prefix>/config`.

use crate::config::ClientConfig;
use crate::error::{CheckoutError, CheckoutResult};
use crate::Params;
use serde::{Deserialize, Serialize};
use url::{Position, Url};

/// Default controller of all checkout URLs
pub const DEFAULT_CONTROLLER: &str = "checkout";

/// Prefix of namespaced parameter names
const PARAM_NAMESPACE: &str = "ai";

/// Options applied when generating a URL
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UrlConfig {
    /// Include scheme and host
    #[serde(default)]
    pub absolute_uri: bool,
    /// Prefix parameter names with the framework namespace (`ai[name]`)
    #[serde(default)]
    pub namespace: bool,
}

impl UrlConfig {
    /// Absolute URL without parameter namespace, used for provider callbacks
    pub fn absolute() -> Self {
        Self {
            absolute_uri: true,
            namespace: false,
        }
    }
}

/// Resolved destination of a step URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlSettings {
    /// Page or module that knows the controller (optional path prefix)
    pub target: Option<String>,
    pub controller: String,
    pub action: String,
    pub config: UrlConfig,
}

impl UrlSettings {
    /// Resolve settings below `prefix` (e.g. `client/html/checkout/confirm/url`)
    /// and fall back to the given defaults.
    pub fn resolve(
        config: &ClientConfig,
        prefix: &str,
        default_action: &str,
        default_config: UrlConfig,
    ) -> CheckoutResult<Self> {
        Ok(Self {
            target: config
                .get_str(&format!("{}/target", prefix))
                .filter(|t| !t.is_empty())
                .map(String::from),
            controller: config.string_or(&format!("{}/controller", prefix), DEFAULT_CONTROLLER),
            action: config.string_or(&format!("{}/action", prefix), default_action),
            config: config
                .get_as::<UrlConfig>(&format!("{}/config", prefix))?
                .unwrap_or(default_config),
        })
    }
}

/// Produces URLs for checkout steps
pub trait UrlBuilder: Send + Sync {
    fn build(&self, settings: &UrlSettings, params: &Params) -> CheckoutResult<String>;
}

/// URL builder for `/{target}/{controller}/{action}?{params}` routes
#[derive(Debug, Clone)]
pub struct RouteUrlBuilder {
    base: Url,
}

impl RouteUrlBuilder {
    /// Create a builder for the given base URL (e.g., "https://shop.example")
    pub fn new(base_url: &str) -> CheckoutResult<Self> {
        let base = Url::parse(base_url).map_err(|e| {
            CheckoutError::Configuration(format!("Invalid base URL {}: {}", base_url, e))
        })?;
        if base.cannot_be_a_base() {
            return Err(CheckoutError::Configuration(format!(
                "Base URL {} cannot carry a path",
                base_url
            )));
        }

        Ok(Self { base })
    }
}

impl UrlBuilder for RouteUrlBuilder {
    fn build(&self, settings: &UrlSettings, params: &Params) -> CheckoutResult<String> {
        let mut url = self.base.clone();

        {
            let mut segments = url.path_segments_mut().map_err(|_| {
                CheckoutError::Configuration(format!("Base URL {} cannot carry a path", self.base))
            })?;
            segments.pop_if_empty();
            for segment in settings
                .target
                .as_deref()
                .into_iter()
                .chain([settings.controller.as_str(), settings.action.as_str()])
                .filter(|s| !s.is_empty())
            {
                segments.push(segment);
            }
        }

        if !params.is_empty() {
            let mut query = url.query_pairs_mut();
            for (name, value) in params {
                if settings.config.namespace {
                    query.append_pair(&format!("{}[{}]", PARAM_NAMESPACE, name), value);
                } else {
                    query.append_pair(name, value);
                }
            }
        }

        if settings.config.absolute_uri {
            Ok(url.to_string())
        } else {
            Ok(url[Position::BeforePath..].to_string())
        }
    }
}

/// Parse the query parameters of an absolute or relative URL
pub fn query_params(url: &str) -> CheckoutResult<Params> {
    let parsed = match Url::parse(url) {
        Ok(parsed) => parsed,
        Err(url::ParseError::RelativeUrlWithoutBase) => Url::parse("http://localhost")
            .and_then(|base| base.join(url))
            .map_err(|e| CheckoutError::InvalidRequest(format!("Invalid URL {}: {}", url, e)))?,
        Err(e) => {
            return Err(CheckoutError::InvalidRequest(format!(
                "Invalid URL {}: {}",
                url, e
            )))
        }
    };

    Ok(parsed.query_pairs().into_owned().collect())
}

/// Append a parameter whose value must stay unencoded (provider placeholders)
pub fn append_raw_param(url: &str, name: &str, raw_value: &str) -> String {
    if url.contains('?') {
        format!("{}&{}={}", url, name, raw_value)
    } else {
        format!("{}?{}={}", url, name, raw_value)
    }
}
