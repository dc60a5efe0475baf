//! # Checkout Process Step
//!
//! Hands the order over to its payment provider. `process` resolves the order's
//! payment service, injects the callback URLs into the provider and stores the
//! provider's redirect instructions in `standard.redirect`. Orders without a
//! payment service go straight to the confirmation page.

use crate::client::{record_error, HtmlClient, SubClients};
use crate::context::{Context, RequestScope};
use crate::view::Redirect;
use async_trait::async_trait;
use checkout_core::provider::{CLIENT_IP, URL_SELF, URL_SUCCESS, URL_UPDATE};
use checkout_core::{CheckoutError, CheckoutResult, Order, Params, ServiceType, UrlConfig};
use tracing::{debug, error, info, instrument};

/// Configuration path of the process client
pub const PROCESS_CLIENT: &str = "checkout/standard/process";

/// URL settings of the checkout step pages
pub const STANDARD_URL: &str = "client/html/checkout/standard/url";
/// URL settings of the confirmation page
pub const CONFIRM_URL: &str = "client/html/checkout/confirm/url";
/// URL settings of the payment notification endpoint
pub const UPDATE_URL: &str = "client/html/checkout/update/url";

const BODY_TEMPLATE_KEY: &str = "client/html/checkout/standard/process/template-body";
const HEADER_TEMPLATE_KEY: &str = "client/html/checkout/standard/process/template-header";
const DEFAULT_BODY_TEMPLATE: &str = "checkout/standard/process-body-standard.html";
const DEFAULT_HEADER_TEMPLATE: &str = "checkout/standard/process-header-standard.html";

fn is_process_step(step: Option<&str>) -> bool {
    matches!(step, Some("order") | Some("process"))
}

/// Client of the checkout "process" step
#[derive(Default)]
pub struct ProcessClient {
    subparts: SubClients,
}

impl ProcessClient {
    pub fn new(subparts: SubClients) -> Self {
        Self { subparts }
    }

    /// Resolve the redirect for the order in the session
    async fn handoff(&self, ctx: &Context, scope: &mut RequestScope) -> CheckoutResult<()> {
        let order_id = scope
            .session
            .order_id()
            .ok_or(CheckoutError::NoOrderId)?
            .to_string();
        let order = ctx.orders.get(&order_id).await?;

        let entries = ctx
            .orders
            .search_services(&order.base_id, ServiceType::Payment)
            .await?;

        let redirect = match entries.as_slice() {
            [] => {
                debug!("Order {} has no payment service", order.id);
                let url = ctx.url(CONFIRM_URL, "confirm", UrlConfig::default(), &Params::new())?;
                Redirect::get(url)
            }
            [entry] => self.provider_redirect(ctx, scope, &order, &entry.code).await?,
            _ => {
                return Err(CheckoutError::MultiplePaymentServices {
                    base_id: order.base_id.clone(),
                })
            }
        };

        scope.view.standard.redirect = Some(redirect);
        Ok(())
    }

    #[instrument(skip(self, ctx, scope, order), fields(order_id = %order.id))]
    async fn provider_redirect(
        &self,
        ctx: &Context,
        scope: &RequestScope,
        order: &Order,
        code: &str,
    ) -> CheckoutResult<Redirect> {
        let (service, mut provider) = ctx.service_controller().provider(code).await?;

        let params = Params::from([
            ("code".to_string(), service.code.clone()),
            ("orderid".to_string(), order.id.clone()),
        ]);
        let mut self_params = params.clone();
        self_params.insert("c_step".to_string(), "process".to_string());

        let mut global = Params::from([
            (
                URL_SELF.to_string(),
                ctx.url(STANDARD_URL, "index", UrlConfig::default(), &self_params)?,
            ),
            (
                URL_SUCCESS.to_string(),
                ctx.url(CONFIRM_URL, "confirm", UrlConfig::absolute(), &params)?,
            ),
            (
                URL_UPDATE.to_string(),
                ctx.url(UPDATE_URL, "update", UrlConfig::absolute(), &params)?,
            ),
        ]);
        if let Some(ip) = scope.view.client_ip() {
            global.insert(CLIENT_IP.to_string(), ip.to_string());
        }
        provider.inject_global_config(global);

        let result = provider
            .process(order, scope.view.params())
            .await?
            .ok_or_else(|| CheckoutError::InvalidProcessResponse {
                code: service.code.clone(),
            })?;

        info!(
            "Payment service {} ({}) redirects to {} via {}",
            service.code,
            provider.provider_name(),
            result.url(),
            result.method()
        );

        Ok(Redirect::from(result))
    }

    /// Link back to the payment step, set once per request
    fn set_view_params(&self, ctx: &Context, scope: &mut RequestScope) -> CheckoutResult<()> {
        if scope.view.standard.url_payment.is_none() {
            let params = Params::from([("c_step".to_string(), "payment".to_string())]);
            let url = ctx.url(STANDARD_URL, "index", UrlConfig::default(), &params)?;
            scope.view.standard.url_payment = Some(url);
        }
        Ok(())
    }
}

#[async_trait]
impl HtmlClient for ProcessClient {
    fn name(&self) -> &str {
        PROCESS_CLIENT
    }

    async fn body(&self, uid: &str, ctx: &Context, scope: &mut RequestScope) -> String {
        if !is_process_step(scope.view.standard.step_active.as_deref()) {
            return String::new();
        }

        if let Err(err) = self.set_view_params(ctx, scope) {
            record_error(ctx, &mut scope.view.standard.errors, &err);
        }

        scope.view.standard.process_body = self.subparts.body(uid, ctx, scope).await;

        let template = ctx.template(BODY_TEMPLATE_KEY, DEFAULT_BODY_TEMPLATE);
        ctx.templates
            .render(&template, &scope.view)
            .unwrap_or_else(|err| {
                error!("{:?}", err);
                String::new()
            })
    }

    async fn header(&self, uid: &str, ctx: &Context, scope: &mut RequestScope) -> Option<String> {
        if !is_process_step(scope.view.standard.step_active.as_deref()) {
            return None;
        }

        let rendered = async {
            self.set_view_params(ctx, scope)?;
            scope.view.standard.process_header = self.subparts.header(uid, ctx, scope).await;

            let template = ctx.template(HEADER_TEMPLATE_KEY, DEFAULT_HEADER_TEMPLATE);
            ctx.templates.render(&template, &scope.view)
        }
        .await;

        rendered.map_err(|err| error!("{:?}", err)).ok()
    }

    async fn process(&self, ctx: &Context, scope: &mut RequestScope) {
        if !is_process_step(scope.view.param("c_step")) || !scope.view.standard.errors.is_empty() {
            return;
        }

        match self.handoff(ctx, scope).await {
            Ok(()) => self.subparts.process(ctx, scope).await,
            Err(err) => record_error(ctx, &mut scope.view.standard.errors, &err),
        }
    }
}
