//! # checkout-api
//!
//! HTTP layer for checkout-flow-rs.
//!
//! This crate provides:
//! - Axum-based HTTP server
//! - The checkout step and confirmation pages
//! - The payment notification endpoint
//!
//! ## Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | GET | `/health` | Health check |
//! | GET, POST | `/checkout/index?c_step=process` | Hand the order to its payment provider |
//! | GET, POST | `/checkout/confirm` | Confirmation page |
//! | POST | `/checkout/update?code=…` | Payment provider notification |
//! | POST | `/checkout/session/order` | Attach an order to the session (non-production) |

pub mod extract;
pub mod handlers;
pub mod routes;
pub mod state;

pub use routes::create_router;
pub use state::{AppConfig, AppState};
