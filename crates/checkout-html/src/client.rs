//! # HTML Client Trait
//!
//! Every page section is an [`HtmlClient`]. Clients form a tree: a parent
//! concatenates the output of its [`SubClients`] into its own template.
//!
//! `body`, `header` and `process` never fail. Errors are translated and
//! recorded in the view, or logged when there is nowhere to show them.

use crate::context::{Context, RequestScope};
use async_trait::async_trait;
use checkout_core::{CheckoutError, ErrorKind};
use tracing::{error, warn};

/// A section of the checkout pages
#[async_trait]
pub trait HtmlClient: Send + Sync {
    /// Configuration path below `client/html` (e.g. "checkout/confirm")
    fn name(&self) -> &str;

    /// HTML for the page body
    async fn body(&self, uid: &str, ctx: &Context, scope: &mut RequestScope) -> String;

    /// HTML for the page head, `None` if the section has nothing to add
    async fn header(&self, uid: &str, ctx: &Context, scope: &mut RequestScope)
        -> Option<String>;

    /// Handle the request's input before anything is rendered
    async fn process(&self, ctx: &Context, scope: &mut RequestScope);
}

/// Type alias for a boxed HTML client (dynamic dispatch)
pub type BoxedHtmlClient = Box<dyn HtmlClient>;

/// Ordered children of a client
#[derive(Default)]
pub struct SubClients {
    clients: Vec<BoxedHtmlClient>,
}

impl SubClients {
    pub fn new(clients: Vec<BoxedHtmlClient>) -> Self {
        Self { clients }
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.clients.iter().map(|c| c.name()).collect()
    }

    /// Concatenated bodies
    pub async fn body(&self, uid: &str, ctx: &Context, scope: &mut RequestScope) -> String {
        let mut html = String::new();
        for client in &self.clients {
            html.push_str(&client.body(uid, ctx, scope).await);
        }
        html
    }

    /// Concatenated headers
    pub async fn header(&self, uid: &str, ctx: &Context, scope: &mut RequestScope) -> String {
        let mut html = String::new();
        for client in &self.clients {
            if let Some(header) = client.header(uid, ctx, scope).await {
                html.push_str(&header);
            }
        }
        html
    }

    /// Run `process` of every child in order
    pub async fn process(&self, ctx: &Context, scope: &mut RequestScope) {
        for client in &self.clients {
            client.process(ctx, scope).await;
        }
    }
}

/// Translate an error into the given error list.
///
/// The catalog follows the error kind. Unclassified errors are logged with all
/// details and shown as the generic non-recoverable message.
pub fn record_error(ctx: &Context, errors: &mut Vec<String>, err: &CheckoutError) {
    match err.kind() {
        ErrorKind::Unclassified => error!("{:?}", err),
        _ => warn!("{}", err),
    }
    errors.push(err.user_message(ctx.i18n.as_ref()));
}
