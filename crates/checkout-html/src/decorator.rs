//! # Client Decorators
//!
//! Decorators wrap an [`HtmlClient`] and add behaviour around its operations.
//! They are selected by name in the configuration:
//!
//! - `client/html/common/decorators/default`: applied to every client
//! - `client/html/<client>/decorators/excludes`: removed from the default list
//! - `client/html/<client>/decorators/global`: added for this client
//! - `client/html/<client>/decorators/local`: added last, innermost first

use crate::client::{BoxedHtmlClient, HtmlClient};
use crate::context::{Context, RequestScope};
use async_trait::async_trait;
use checkout_core::{CheckoutError, CheckoutResult, ClientConfig};
use std::time::Instant;
use tracing::debug;

/// Names accepted in the decorator lists
pub const DECORATORS: &[&str] = &["logging"];

/// Wrap a client with a decorator by name
pub fn decorate_with(name: &str, client: BoxedHtmlClient) -> CheckoutResult<BoxedHtmlClient> {
    match name {
        "logging" => Ok(Box::new(LoggingDecorator::new(client))),
        other => Err(CheckoutError::Configuration(format!(
            "Unknown decorator \"{}\" for client \"{}\" (available: {:?})",
            other,
            client.name(),
            DECORATORS
        ))),
    }
}

/// Decorator names for the client at `path`, outermost last
pub fn decorator_names(config: &ClientConfig, path: &str) -> Vec<String> {
    let excludes = config.list_or(&format!("client/html/{}/decorators/excludes", path), &[]);

    config
        .list_or("client/html/common/decorators/default", &[])
        .into_iter()
        .filter(|name| !excludes.contains(name))
        .chain(config.list_or(&format!("client/html/{}/decorators/global", path), &[]))
        .chain(config.list_or(&format!("client/html/{}/decorators/local", path), &[]))
        .collect()
}

/// Apply the configured decorators to a client
pub fn decorate(
    config: &ClientConfig,
    path: &str,
    client: BoxedHtmlClient,
) -> CheckoutResult<BoxedHtmlClient> {
    decorator_names(config, path)
        .iter()
        .try_fold(client, |client, name| decorate_with(name, client))
}

/// Logs every call of the wrapped client with its duration
pub struct LoggingDecorator {
    inner: BoxedHtmlClient,
}

impl LoggingDecorator {
    pub fn new(inner: BoxedHtmlClient) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl HtmlClient for LoggingDecorator {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn body(&self, uid: &str, ctx: &Context, scope: &mut RequestScope) -> String {
        let start = Instant::now();
        let html = self.inner.body(uid, ctx, scope).await;
        debug!(
            client = self.name(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            bytes = html.len(),
            "Rendered body"
        );
        html
    }

    async fn header(&self, uid: &str, ctx: &Context, scope: &mut RequestScope) -> Option<String> {
        let start = Instant::now();
        let html = self.inner.header(uid, ctx, scope).await;
        debug!(
            client = self.name(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            empty = html.is_none(),
            "Rendered header"
        );
        html
    }

    async fn process(&self, ctx: &Context, scope: &mut RequestScope) {
        let start = Instant::now();
        self.inner.process(ctx, scope).await;
        debug!(
            client = self.name(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            errors = scope.view.standard.errors.len() + scope.view.confirm.errors.len(),
            "Processed request"
        );
    }
}
