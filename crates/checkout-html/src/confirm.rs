//! # Checkout Confirmation
//!
//! The page the customer lands on after paying. `process` synchronises the
//! order with the payment provider, runs the order side effects and empties the
//! basket once the payment is no longer refused. The body shows the order with
//! the `intro` and `order` sections.

use crate::client::{record_error, HtmlClient, SubClients};
use crate::context::{Context, RequestScope};
use async_trait::async_trait;
use checkout_core::{CheckoutError, CheckoutResult};
use tracing::{debug, error, info, instrument};

/// Configuration path of the confirmation client
pub const CONFIRM_CLIENT: &str = "checkout/confirm";

/// Sections rendered when `client/html/checkout/confirm/subparts` is not set
pub const DEFAULT_SUBPARTS: &[&str] = &["intro", "order"];

const BODY_TEMPLATE_KEY: &str = "client/html/checkout/confirm/template-body";
const HEADER_TEMPLATE_KEY: &str = "client/html/checkout/confirm/template-header";
const DEFAULT_BODY_TEMPLATE: &str = "checkout/confirm/body-standard.html";
const DEFAULT_HEADER_TEMPLATE: &str = "checkout/confirm/header-standard.html";

/// Client of the confirmation page
#[derive(Default)]
pub struct ConfirmClient {
    subparts: SubClients,
}

impl ConfirmClient {
    pub fn new(subparts: SubClients) -> Self {
        Self { subparts }
    }

    /// Load the order of the session into the view, once per request
    async fn load(&self, ctx: &Context, scope: &mut RequestScope) -> CheckoutResult<()> {
        if scope.view.confirm.loaded {
            return Ok(());
        }

        if let Some(order_id) = scope.session.order_id().map(str::to_string) {
            let order = ctx.order_controller().get(&order_id).await?;
            scope.view.confirm.total = Some(order.price.display());
            scope.view.confirm.order = Some(order);
        }
        scope.view.confirm.loaded = true;
        Ok(())
    }

    #[instrument(skip(self, ctx, scope))]
    async fn finalize(&self, ctx: &Context, scope: &mut RequestScope) -> CheckoutResult<()> {
        let order_id = scope
            .session
            .order_id()
            .ok_or(CheckoutError::NoOrderId)?
            .to_string();

        let order = match scope.view.param("code").map(str::to_string) {
            Some(code) => {
                ctx.service_controller()
                    .update_sync(scope.view.params(), &code, &order_id)
                    .await?
            }
            None => ctx.order_controller().get(&order_id).await?,
        };

        ctx.order_updater.update(&order).await?;

        self.subparts.process(ctx, scope).await;

        if order.payment_status.is_settled() {
            ctx.basket.clear(&mut scope.session).await?;

            let cached = scope.session.basket_cache_keys();
            debug!("Removing {} cached basket entries", cached.len());
            scope.session.remove(cached);

            info!("Order {} confirmed ({})", order.id, order.payment_status);
        } else {
            debug!(
                "Order {} not settled ({}), basket kept",
                order.id, order.payment_status
            );
        }

        Ok(())
    }
}

#[async_trait]
impl HtmlClient for ConfirmClient {
    fn name(&self) -> &str {
        CONFIRM_CLIENT
    }

    async fn body(&self, uid: &str, ctx: &Context, scope: &mut RequestScope) -> String {
        match self.load(ctx, scope).await {
            Ok(()) => scope.view.confirm.body = self.subparts.body(uid, ctx, scope).await,
            Err(err) => record_error(ctx, &mut scope.view.confirm.errors, &err),
        }

        let template = ctx.template(BODY_TEMPLATE_KEY, DEFAULT_BODY_TEMPLATE);
        ctx.templates
            .render(&template, &scope.view)
            .unwrap_or_else(|err| {
                error!("{:?}", err);
                String::new()
            })
    }

    async fn header(&self, uid: &str, ctx: &Context, scope: &mut RequestScope) -> Option<String> {
        let rendered = async {
            self.load(ctx, scope).await?;
            scope.view.confirm.header = self.subparts.header(uid, ctx, scope).await;

            let template = ctx.template(HEADER_TEMPLATE_KEY, DEFAULT_HEADER_TEMPLATE);
            ctx.templates.render(&template, &scope.view)
        }
        .await;

        rendered.map_err(|err| error!("{:?}", err)).ok()
    }

    async fn process(&self, ctx: &Context, scope: &mut RequestScope) {
        if let Err(err) = self.finalize(ctx, scope).await {
            record_error(ctx, &mut scope.view.confirm.errors, &err);
        }
    }
}

/// A section of the confirmation page rendered from a single template
pub struct ConfirmPartClient {
    name: String,
    default_body: &'static str,
}

impl ConfirmPartClient {
    /// Greeting depending on the payment outcome
    pub fn intro() -> Self {
        Self {
            name: format!("{}/intro", CONFIRM_CLIENT),
            default_body: "checkout/confirm/intro-body-standard.html",
        }
    }

    /// Order summary
    pub fn order() -> Self {
        Self {
            name: format!("{}/order", CONFIRM_CLIENT),
            default_body: "checkout/confirm/order-body-standard.html",
        }
    }
}

#[async_trait]
impl HtmlClient for ConfirmPartClient {
    fn name(&self) -> &str {
        &self.name
    }

    async fn body(&self, _uid: &str, ctx: &Context, scope: &mut RequestScope) -> String {
        let template = ctx.template(
            &format!("client/html/{}/template-body", self.name),
            self.default_body,
        );

        match ctx.templates.render(&template, &scope.view) {
            Ok(html) => html,
            Err(err) => {
                record_error(ctx, &mut scope.view.confirm.errors, &err);
                String::new()
            }
        }
    }

    async fn header(&self, _uid: &str, ctx: &Context, scope: &mut RequestScope) -> Option<String> {
        let key = format!("client/html/{}/template-header", self.name);
        let template = ctx.config.get_str(&key)?;

        ctx.templates
            .render(template, &scope.view)
            .map_err(|err| error!("{:?}", err))
            .ok()
    }

    async fn process(&self, _ctx: &Context, _scope: &mut RequestScope) {}
}
