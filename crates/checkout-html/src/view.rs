//! # View
//!
//! Per-request data shared by the HTML clients. Clients read the request
//! parameters from it and write their outputs into the named sections; the whole
//! view is handed to the templates.

use checkout_core::{HttpMethod, Order, Params, ProcessResult};
use serde::Serialize;

/// Data of the incoming request
#[derive(Debug, Clone, Default, Serialize)]
pub struct RequestInfo {
    /// Query and form parameters
    pub params: Params,
    /// IP address of the customer
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_ip: Option<String>,
}

impl RequestInfo {
    pub fn new(params: Params) -> Self {
        Self {
            params,
            client_ip: None,
        }
    }

    /// Builder: set the client IP address
    pub fn with_client_ip(mut self, ip: impl Into<String>) -> Self {
        self.client_ip = Some(ip.into());
        self
    }
}

/// Where the customer goes after the process step
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Redirect {
    pub url: String,
    pub method: HttpMethod,
    /// Form fields sent along (POST) or appended (GET)
    pub params: Params,
    /// Destination is outside the shop
    pub external: bool,
}

impl Redirect {
    /// Plain GET redirect within the shop
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: HttpMethod::Get,
            params: Params::new(),
            external: false,
        }
    }
}

impl From<ProcessResult> for Redirect {
    fn from(result: ProcessResult) -> Self {
        Self {
            url: result.url().to_string(),
            method: result.method(),
            params: result.values().clone(),
            external: result.is_external(),
        }
    }
}

/// Outputs of the checkout step clients
#[derive(Debug, Clone, Default, Serialize)]
pub struct StandardView {
    /// Checkout step being rendered
    pub step_active: Option<String>,
    pub redirect: Option<Redirect>,
    /// URL back to the payment selection step
    pub url_payment: Option<String>,
    pub process_body: String,
    pub process_header: String,
    /// Translated messages for the customer
    pub errors: Vec<String>,
}

/// Outputs of the confirmation clients
#[derive(Debug, Clone, Default, Serialize)]
pub struct ConfirmView {
    pub order: Option<Order>,
    /// Formatted order total
    pub total: Option<String>,
    pub body: String,
    pub header: String,
    pub errors: Vec<String>,
    #[serde(skip)]
    pub(crate) loaded: bool,
}

/// Everything the clients and templates of one request share
#[derive(Debug, Clone, Default, Serialize)]
pub struct View {
    pub request: RequestInfo,
    pub standard: StandardView,
    pub confirm: ConfirmView,
}

impl View {
    /// Create the view for a request; the active step is taken from `c_step`
    pub fn new(request: RequestInfo) -> Self {
        let step_active = request.params.get("c_step").cloned();
        Self {
            request,
            standard: StandardView {
                step_active,
                ..StandardView::default()
            },
            confirm: ConfirmView::default(),
        }
    }

    /// Single request parameter
    pub fn param(&self, name: &str) -> Option<&str> {
        self.request.params.get(name).map(String::as_str)
    }

    /// All request parameters
    pub fn params(&self) -> &Params {
        &self.request.params
    }

    pub fn client_ip(&self) -> Option<&str> {
        self.request.client_ip.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_from_params() {
        let view = View::new(RequestInfo::new(Params::from([(
            "c_step".to_string(),
            "process".to_string(),
        )])));

        assert_eq!(view.standard.step_active.as_deref(), Some("process"));
        assert_eq!(view.param("c_step"), Some("process"));
        assert_eq!(view.param("code"), None);
        assert_eq!(view.client_ip(), None);
    }

    #[test]
    fn test_redirect_from_process_result() {
        let result = ProcessResult::new(
            "https://pay.example/form",
            HttpMethod::Post,
            Params::from([("token".to_string(), "abc".to_string())]),
            true,
        )
        .unwrap();

        let redirect = Redirect::from(result);
        assert_eq!(redirect.method, HttpMethod::Post);
        assert_eq!(redirect.params.get("token").map(String::as_str), Some("abc"));
        assert!(redirect.external);
    }

    #[test]
    fn test_loaded_flag_not_serialized() {
        let json = serde_json::to_value(View::default()).unwrap();

        assert!(json["confirm"].get("loaded").is_none());
        assert!(json["standard"]["errors"].as_array().unwrap().is_empty());
    }
}
