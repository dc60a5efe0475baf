//! # Client Context
//!
//! Shared services handed to every HTML client, and the per-request scope the
//! clients write into.

use crate::template::TemplateRenderer;
use crate::view::View;
use checkout_core::{
    BasketController, Catalog, CheckoutResult, ClientConfig, LoggingOrderUpdater,
    OrderController, OrderRepository, OrderUpdater, Params, ProviderRegistry, ServiceController,
    ServiceRepository, Session, SessionBasket, Translator, UrlBuilder, UrlConfig, UrlSettings,
};
use std::sync::Arc;

/// Immutable services shared by all requests
#[derive(Clone)]
pub struct Context {
    pub config: Arc<ClientConfig>,
    pub i18n: Arc<dyn Translator>,
    pub orders: Arc<dyn OrderRepository>,
    pub services: Arc<dyn ServiceRepository>,
    pub providers: Arc<ProviderRegistry>,
    pub urls: Arc<dyn UrlBuilder>,
    pub templates: Arc<TemplateRenderer>,
    pub basket: Arc<dyn BasketController>,
    pub order_updater: Arc<dyn OrderUpdater>,
}

impl Context {
    /// Create a context with an untranslated catalog, the session basket and
    /// the logging order updater.
    pub fn new(
        config: ClientConfig,
        orders: Arc<dyn OrderRepository>,
        services: Arc<dyn ServiceRepository>,
        providers: ProviderRegistry,
        urls: Arc<dyn UrlBuilder>,
    ) -> CheckoutResult<Self> {
        let templates = TemplateRenderer::from_config(&config)?;

        Ok(Self {
            config: Arc::new(config),
            i18n: Arc::new(Catalog::new()),
            orders,
            services,
            providers: Arc::new(providers),
            urls,
            templates: Arc::new(templates),
            basket: Arc::new(SessionBasket),
            order_updater: Arc::new(LoggingOrderUpdater),
        })
    }

    /// Builder: set the message catalog
    pub fn with_i18n(mut self, i18n: Arc<dyn Translator>) -> Self {
        self.i18n = i18n;
        self
    }

    /// Builder: set the basket controller
    pub fn with_basket(mut self, basket: Arc<dyn BasketController>) -> Self {
        self.basket = basket;
        self
    }

    /// Builder: set the order side-effects hook
    pub fn with_order_updater(mut self, updater: Arc<dyn OrderUpdater>) -> Self {
        self.order_updater = updater;
        self
    }

    /// Builder: set the template renderer
    pub fn with_templates(mut self, templates: TemplateRenderer) -> Self {
        self.templates = Arc::new(templates);
        self
    }

    pub fn order_controller(&self) -> OrderController {
        OrderController::new(self.orders.clone())
    }

    pub fn service_controller(&self) -> ServiceController {
        ServiceController::new(
            self.orders.clone(),
            self.services.clone(),
            self.providers.clone(),
        )
    }

    /// Build the URL configured below `prefix`
    pub fn url(
        &self,
        prefix: &str,
        default_action: &str,
        default_config: UrlConfig,
        params: &Params,
    ) -> CheckoutResult<String> {
        let settings = UrlSettings::resolve(&self.config, prefix, default_action, default_config)?;
        self.urls.build(&settings, params)
    }

    /// Template name configured at `key`, or the default
    pub fn template(&self, key: &str, default: &str) -> String {
        self.config.string_or(key, default)
    }
}

/// State owned by a single request
#[derive(Debug, Clone, Default)]
pub struct RequestScope {
    pub view: View,
    pub session: Session,
}

impl RequestScope {
    pub fn new(view: View, session: Session) -> Self {
        Self { view, session }
    }
}
