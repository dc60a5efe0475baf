//! # Request Extraction
//!
//! Collects everything the checkout clients read from an HTTP request: query and
//! form parameters, headers, the client address and the session cookie.

use crate::handlers::ErrorResponse;
use axum::{
    body::to_bytes,
    extract::{ConnectInfo, FromRequest, Request},
    http::{header, HeaderMap, StatusCode},
    Json,
};
use checkout_core::{Params, PushRequest};
use checkout_html::RequestInfo;
use std::collections::BTreeMap;
use std::net::SocketAddr;
use uuid::Uuid;

/// Name of the session cookie
pub const SESSION_COOKIE: &str = "checkout_session";

/// Largest accepted request body
const BODY_LIMIT: usize = 1024 * 1024;

/// A checkout request as seen by the page clients
#[derive(Debug, Clone)]
pub struct ClientRequest {
    /// Query parameters, overridden by form fields of the same name
    pub params: Params,
    /// Header values by lowercase name
    pub headers: BTreeMap<String, String>,
    /// Raw request body
    pub body: Vec<u8>,
    /// Address of the customer
    pub client_ip: Option<String>,
    /// Session from the cookie, or a fresh one
    pub session_id: Uuid,
    /// True if the request carried no valid session cookie
    pub new_session: bool,
}

impl ClientRequest {
    /// Request data handed to the view
    pub fn info(&self) -> RequestInfo {
        let info = RequestInfo::new(self.params.clone());
        match &self.client_ip {
            Some(ip) => info.with_client_ip(ip.clone()),
            None => info,
        }
    }

    /// Notification data handed to a payment provider
    pub fn push(&self) -> PushRequest {
        PushRequest {
            params: self.params.clone(),
            headers: self.headers.clone(),
            body: self.body.clone(),
        }
    }

    /// `Set-Cookie` value binding the session to the browser
    pub fn session_cookie(&self) -> String {
        format!(
            "{}={}; Path=/; HttpOnly; SameSite=Lax",
            SESSION_COOKIE, self.session_id
        )
    }
}

impl<S> FromRequest<S> for ClientRequest
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<ErrorResponse>);

    async fn from_request(req: Request, _state: &S) -> Result<Self, Self::Rejection> {
        let (parts, body) = req.into_parts();

        let mut params = parts
            .uri
            .query()
            .map(|query| parse_form(query.as_bytes()))
            .unwrap_or_default();

        let body = to_bytes(body, BODY_LIMIT).await.map_err(|e| {
            (
                StatusCode::PAYLOAD_TOO_LARGE,
                Json(ErrorResponse::new(format!("Failed to read body: {}", e), 413)),
            )
        })?;

        if is_form(&parts.headers) {
            params.extend(parse_form(&body));
        }

        let client_ip = forwarded_for(&parts.headers).or_else(|| {
            parts
                .extensions
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ConnectInfo(addr)| addr.ip().to_string())
        });

        let cookie_session = session_from_cookie(&parts.headers);

        Ok(Self {
            params,
            headers: parts
                .headers
                .iter()
                .filter_map(|(name, value)| {
                    value
                        .to_str()
                        .ok()
                        .map(|v| (name.as_str().to_string(), v.to_string()))
                })
                .collect(),
            body: body.to_vec(),
            client_ip,
            session_id: cookie_session.unwrap_or_else(Uuid::new_v4),
            new_session: cookie_session.is_none(),
        })
    }
}

fn parse_form(input: &[u8]) -> Params {
    url::form_urlencoded::parse(input).into_owned().collect()
}

fn is_form(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("application/x-www-form-urlencoded"))
}

/// First address of `X-Forwarded-For`
fn forwarded_for(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
        .map(String::from)
}

fn session_from_cookie(headers: &HeaderMap) -> Option<Uuid> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .and_then(|(_, value)| Uuid::parse_str(value).ok())
}
