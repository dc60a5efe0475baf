//! # checkout-flow
//!
//! Checkout process and confirmation pages with payment provider handoff.
//!
//! ## Usage
//!
//! ```bash
//! # Optional: credentials for services without their own keys
//! export STRIPE_SECRET_KEY=sk_test_...
//! export STRIPE_WEBHOOK_SECRET=whsec_...
//!
//! # Run the server (reads config/client.toml, config/i18n.toml, config/shop.toml)
//! checkout-flow
//! ```

use checkout_api::{routes, state::AppState};
use std::net::SocketAddr;
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    print_banner();

    let state = AppState::new()?;

    let addr = state.config.socket_addr()?;
    let is_prod = state.config.is_production();

    info!("Environment: {}", state.config.environment);
    info!("Orders loaded: {}", state.store.order_count());
    info!("Payment providers: {:?}", state.ctx.providers.providers());

    let app = routes::create_router(state);

    info!("Checkout starting on http://{}", addr);

    if !is_prod {
        info!("Process step: GET http://{}/checkout/index?c_step=process", addr);
        info!("Confirmation: GET http://{}/checkout/confirm", addr);
        info!("Notifications: POST http://{}/checkout/update?code=<service>", addr);
        info!("Test session: POST http://{}/checkout/session/order", addr);
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

fn print_banner() {
    println!(
        r#"
  checkout-flow
  ━━━━━━━━━━━━━━━━━━━━━━━
  Process step and confirmation
  Version: {}
"#,
        env!("CARGO_PKG_VERSION")
    );
}
