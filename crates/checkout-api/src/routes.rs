//! # Routes
//!
//! Axum router configuration for the checkout pages.

use crate::handlers;
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Create the main application router
///
/// Routes:
/// - GET|POST /checkout/index - Checkout step page (`c_step=process` hands off to payment)
/// - GET|POST /checkout/confirm - Confirmation page
/// - POST /checkout/update - Payment provider notification (`code` selects the service)
/// - POST /checkout/session/order - Attach an order to the session (non-production)
/// - GET /health - Health check
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let checkout_routes = Router::new()
        .route("/index", get(handlers::index).post(handlers::index))
        .route("/confirm", get(handlers::confirm).post(handlers::confirm))
        .route("/update", post(handlers::update))
        .route("/session/order", post(handlers::session_order));

    Router::new()
        // Health check at root
        .route("/health", get(handlers::health))
        .route("/", get(handlers::health))
        // Checkout pages
        .nest("/checkout", checkout_routes)
        // Middleware, outermost first
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        // State
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::AppConfig;
    use axum::http::{HeaderName, HeaderValue, StatusCode};
    use axum_test::TestServer;
    use checkout_core::{
        Catalog, ClientConfig, MessageDomain, OrderRepository, PaymentStatus, PrePayFactory,
        ProviderRegistry, ShopFixtures,
    };
    use checkout_stripe::{signature_header, StripeFactory};
    use serde_json::{json, Value};
    use std::sync::Arc;

    const WEBHOOK_SECRET: &str = "whsec_test_secret";

    const SHOP: &str = r#"
        [[orders]]
        id = "O-1"
        base_id = "B-1"
        payment_status = "refused"
        price = { amount = 4500, currency = "eur" }

        [[orders]]
        id = "O-2"
        base_id = "B-2"
        payment_status = "authorized"
        price = { amount = 4500, currency = "eur" }

        [[orders]]
        id = "O-3"
        base_id = "B-3"
        price = { amount = 1999, currency = "eur" }

        [[order_services]]
        base_id = "B-1"
        type = "payment"
        code = "invoice"

        [[order_services]]
        base_id = "B-3"
        type = "payment"
        code = "invoice"

        [[services]]
        code = "invoice"
        type = "payment"
        provider = "prepay"

        [[services]]
        code = "stripe-card"
        type = "payment"
        provider = "stripe"
        config = { secret_key = "sk_test_123", webhook_secret = "whsec_test_secret" }
    "#;

    fn config(environment: &str) -> AppConfig {
        AppConfig {
            host: "127.0.0.1".to_string(),
            port: 8080,
            base_url: "https://shop.example".to_string(),
            environment: environment.to_string(),
            config_dir: None,
        }
    }

    fn state(environment: &str) -> AppState {
        let providers = ProviderRegistry::new()
            .with_factory(Arc::new(PrePayFactory))
            .with_factory(Arc::new(StripeFactory::new().unwrap()));
        let catalog = Catalog::new().with_message(
            MessageDomain::Client,
            "No order ID available",
            "Keine Bestellnummer vorhanden",
        );

        AppState::from_parts(
            config(environment),
            ClientConfig::new(),
            catalog,
            ShopFixtures::from_toml_str(SHOP).unwrap(),
            providers,
        )
        .unwrap()
    }

    fn server(state: AppState) -> TestServer {
        let mut server = TestServer::new(create_router(state)).unwrap();
        server.save_cookies();
        server
    }

    async fn attach_order(server: &TestServer, order_id: &str) {
        server
            .post("/checkout/session/order")
            .json(&json!({ "order_id": order_id }))
            .await
            .assert_status_ok();
    }

    #[tokio::test]
    async fn test_health() {
        let server = server(state("test"));

        let response = server.get("/health").await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["status"], "healthy");
    }

    #[tokio::test]
    async fn test_process_without_session_order() {
        let server = server(state("test"));

        let response = server.get("/checkout/index").add_query_param("c_step", "process").await;

        response.assert_status_ok();
        assert!(response.text().contains("Keine Bestellnummer vorhanden"));
    }

    #[tokio::test]
    async fn test_process_hands_off_to_prepay() {
        let server = server(state("test"));
        attach_order(&server, "O-3").await;

        let response = server.get("/checkout/index").add_query_param("c_step", "process").await;

        response.assert_status_ok();
        let html = response.text();
        assert!(html.contains("<form method=\"POST\""));
        assert!(html.contains("orderid=O-3"));
    }

    #[tokio::test]
    async fn test_other_step_renders_nothing() {
        let server = server(state("test"));
        attach_order(&server, "O-3").await;

        let response = server.get("/checkout/index").add_query_param("c_step", "address").await;

        response.assert_status_ok();
        assert!(!response.text().contains("checkout-standard-process"));
    }

    #[tokio::test]
    async fn test_confirm_sets_pending() {
        let state = state("test");
        let store = state.store.clone();
        let server = server(state);
        attach_order(&server, "O-3").await;

        let response = server
            .post("/checkout/confirm")
            .form(&[("code", "invoice"), ("orderid", "O-3")])
            .await;

        response.assert_status_ok();
        assert!(response.text().contains("Thank you for your order"));
        let order = store.get("O-3").await.unwrap();
        assert_eq!(order.payment_status, PaymentStatus::Pending);
    }

    #[tokio::test]
    async fn test_confirm_refused_order() {
        let server = server(state("test"));
        attach_order(&server, "O-1").await;

        let response = server.get("/checkout/confirm").await;

        response.assert_status_ok();
        assert!(response.text().contains("was not completed"));
    }

    #[tokio::test]
    async fn test_update_requires_code() {
        let server = server(state("test"));

        let response = server.post("/checkout/update").await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_update_unknown_service() {
        let server = server(state("test"));

        let response = server
            .post("/checkout/update")
            .add_query_param("code", "paypal")
            .await;

        response.assert_status(StatusCode::NOT_FOUND);
        let body: Value = response.json();
        assert_eq!(body["code"], 404);
    }

    #[tokio::test]
    async fn test_update_rejects_unsigned_webhook() {
        let server = server(state("test"));

        let response = server
            .post("/checkout/update")
            .add_query_param("code", "stripe-card")
            .bytes(r#"{"id":"evt_1"}"#.into())
            .await;

        response.assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_update_applies_signed_webhook() {
        let state = state("test");
        let store = state.store.clone();
        let server = server(state);

        let payload = json!({
            "id": "evt_1",
            "type": "checkout.session.completed",
            "data": { "object": {
                "id": "cs_test_1",
                "payment_status": "paid",
                "client_reference_id": "O-3",
                "metadata": { "order_id": "O-3" }
            }}
        })
        .to_string();
        let signature =
            signature_header(WEBHOOK_SECRET, chrono::Utc::now().timestamp(), payload.as_bytes())
                .unwrap();

        let response = server
            .post("/checkout/update")
            .add_query_param("code", "stripe-card")
            .add_header(
                HeaderName::from_static("stripe-signature"),
                HeaderValue::from_str(&signature).unwrap(),
            )
            .bytes(payload.into())
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["order_id"], "O-3");
        assert_eq!(body["payment_status"], "received");
        assert_eq!(
            store.get("O-3").await.unwrap().payment_status,
            PaymentStatus::Received
        );
    }

    #[tokio::test]
    async fn test_session_route_disabled_in_production() {
        let server = server(state("production"));

        let response = server
            .post("/checkout/session/order")
            .json(&json!({ "order_id": "O-2" }))
            .await;

        response.assert_status(StatusCode::NOT_FOUND);
    }
}
