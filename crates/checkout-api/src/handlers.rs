//! # Request Handlers
//!
//! Axum request handlers for the checkout pages and the payment callback.

use crate::extract::ClientRequest;
use crate::state::AppState;
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    Json,
};
use checkout_core::{CheckoutError, PaymentStatus, Session};
use checkout_html::{HtmlClient, RequestScope, View};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument, warn};

// =============================================================================
// Request/Response Types
// =============================================================================

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, code: u16) -> Self {
        Self {
            error: error.into(),
            code,
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn checkout_error_to_response(err: CheckoutError) -> ApiError {
    let code = err.status_code();
    let mut response = ErrorResponse::new(err.to_string(), code);
    if err.is_retryable() {
        response = response.with_details("retryable");
    }
    (
        StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        Json(response),
    )
}

/// Result of a payment notification
#[derive(Debug, Serialize)]
pub struct UpdateResponse {
    /// Order the notification applied to, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_status: Option<PaymentStatus>,
}

/// Attach an order to the current session
#[derive(Debug, Deserialize)]
pub struct SessionOrderRequest {
    pub order_id: String,
}

// =============================================================================
// Handlers
// =============================================================================

/// Health check endpoint
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "checkout-flow",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Checkout step page
#[instrument(skip(state, request), fields(session = %request.session_id))]
pub async fn index(State(state): State<AppState>, request: ClientRequest) -> Response {
    render_page(&state, state.clients.process(), &request).await
}

/// Confirmation page
#[instrument(skip(state, request), fields(session = %request.session_id))]
pub async fn confirm(State(state): State<AppState>, request: ClientRequest) -> Response {
    render_page(&state, state.clients.confirm(), &request).await
}

/// Payment provider notification
#[instrument(skip(state, request))]
pub async fn update(
    State(state): State<AppState>,
    request: ClientRequest,
) -> Result<Json<UpdateResponse>, ApiError> {
    let code = request.params.get("code").cloned().ok_or_else(|| {
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new("Missing payment service code", 400)),
        )
    })?;

    let order = state
        .ctx
        .service_controller()
        .update_push(&code, &request.push())
        .await
        .map_err(|e| {
            error!("Payment notification for {} failed: {}", code, e);
            checkout_error_to_response(e)
        })?;

    match order {
        Some(order) => {
            info!(
                "Order {} updated by {}: {}",
                order.id, code, order.payment_status
            );
            Ok(Json(UpdateResponse {
                order_id: Some(order.id),
                payment_status: Some(order.payment_status),
            }))
        }
        None => {
            info!("Payment notification for {} ignored", code);
            Ok(Json(UpdateResponse {
                order_id: None,
                payment_status: None,
            }))
        }
    }
}

/// Attach an order id to the session (development helper)
#[instrument(skip(state, request))]
pub async fn session_order(
    State(state): State<AppState>,
    request: ClientRequest,
) -> Result<Response, ApiError> {
    if state.config.is_production() {
        return Err((
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::new("Not found", 404)),
        ));
    }

    let body: SessionOrderRequest = serde_json::from_slice(&request.body).map_err(|e| {
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new(format!("Invalid request: {}", e), 400)),
        )
    })?;

    let mut session = load_session(&state, &request).await;
    session.set_order_id(body.order_id.clone());
    state
        .sessions
        .save(&request.session_id.to_string(), session)
        .await
        .map_err(checkout_error_to_response)?;

    info!("Session {} now holds order {}", request.session_id, body.order_id);

    Ok((
        [(header::SET_COOKIE, request.session_cookie())],
        Json(serde_json::json!({ "order_id": body.order_id })),
    )
        .into_response())
}

// =============================================================================
// Page rendering
// =============================================================================

async fn load_session(state: &AppState, request: &ClientRequest) -> Session {
    if request.new_session {
        return Session::new();
    }

    state
        .sessions
        .load(&request.session_id.to_string())
        .await
        .unwrap_or_else(|e| {
            warn!("Failed to load session {}: {}", request.session_id, e);
            Session::new()
        })
}

/// Run a page client and wrap its output into a document
async fn render_page(state: &AppState, client: &dyn HtmlClient, request: &ClientRequest) -> Response {
    let session = load_session(state, request).await;
    let mut scope = RequestScope::new(View::new(request.info()), session);
    let uid = "";

    client.process(&state.ctx, &mut scope).await;
    let head = client
        .header(uid, &state.ctx, &mut scope)
        .await
        .unwrap_or_default();
    let body = client.body(uid, &state.ctx, &mut scope).await;

    if let Err(e) = state
        .sessions
        .save(&request.session_id.to_string(), scope.session)
        .await
    {
        error!("Failed to save session {}: {}", request.session_id, e);
    }

    let page = format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n{}\n</head>\n<body>\n{}\n</body>\n</html>\n",
        head, body
    );

    (
        [(header::SET_COOKIE, request.session_cookie())],
        Html(page),
    )
        .into_response()
}
