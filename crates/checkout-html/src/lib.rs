//! # checkout-html
//!
//! HTML clients of the checkout pages.
//!
//! This crate provides:
//! - `ProcessClient` for the "process" step handing the order to its payment provider
//! - `ConfirmClient` for the confirmation page finalising the order
//! - `ClientRegistry` building the client trees from configuration
//! - `LoggingDecorator` and the decorator configuration
//! - `TemplateRenderer` with the embedded MiniJinja templates
//!
//! ## Example
//!
//! ```rust,ignore
//! let registry = ClientRegistry::from_config(&config)?;
//! let mut scope = RequestScope::new(View::new(request), session);
//!
//! let client = registry.process();
//! client.process(&ctx, &mut scope).await;
//! let header = client.header("", &ctx, &mut scope).await;
//! let body = client.body("", &ctx, &mut scope).await;
//! ```

pub mod client;
pub mod confirm;
pub mod context;
pub mod decorator;
pub mod process;
pub mod registry;
pub mod template;
pub mod view;

#[cfg(test)]
mod testing;

// Re-exports for convenience
pub use client::{record_error, BoxedHtmlClient, HtmlClient, SubClients};
pub use confirm::{ConfirmClient, ConfirmPartClient};
pub use context::{Context, RequestScope};
pub use decorator::LoggingDecorator;
pub use process::{ProcessClient, CONFIRM_URL, STANDARD_URL, UPDATE_URL};
pub use registry::{build_client, ClientRegistry};
pub use template::TemplateRenderer;
pub use view::{ConfirmView, Redirect, RequestInfo, StandardView, View};
