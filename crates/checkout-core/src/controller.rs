//! # Frontend Controllers
//!
//! Order, service and basket operations used by the HTML clients.
//! Controllers sit between the clients and the repositories/providers and
//! enforce the rules that do not belong in either.

use crate::error::{CheckoutError, CheckoutResult};
use crate::order::{Order, PaymentStatus, ServiceType};
use crate::provider::{BoxedPaymentProvider, ProviderRegistry, PushRequest};
use crate::repository::{OrderRepository, ServiceRepository};
use crate::service::ServiceItem;
use crate::session::{Session, BASKET_CONTENT};
use crate::Params;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Read access to orders
#[derive(Clone)]
pub struct OrderController {
    orders: Arc<dyn OrderRepository>,
}

impl OrderController {
    pub fn new(orders: Arc<dyn OrderRepository>) -> Self {
        Self { orders }
    }

    /// Fetch an order by ID
    pub async fn get(&self, order_id: &str) -> CheckoutResult<Order> {
        self.orders.get(order_id).await
    }
}

/// Payment service operations
#[derive(Clone)]
pub struct ServiceController {
    orders: Arc<dyn OrderRepository>,
    services: Arc<dyn ServiceRepository>,
    providers: Arc<ProviderRegistry>,
}

impl ServiceController {
    pub fn new(
        orders: Arc<dyn OrderRepository>,
        services: Arc<dyn ServiceRepository>,
        providers: Arc<ProviderRegistry>,
    ) -> Self {
        Self {
            orders,
            services,
            providers,
        }
    }

    /// Find the payment service with the given code
    pub async fn payment_service(&self, code: &str) -> CheckoutResult<ServiceItem> {
        self.services
            .search(code, ServiceType::Payment)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| CheckoutError::ServiceNotFound {
                code: code.to_string(),
            })
    }

    /// Create the provider for the payment service with the given code
    pub async fn provider(&self, code: &str) -> CheckoutResult<(ServiceItem, BoxedPaymentProvider)> {
        let service = self.payment_service(code).await?;
        let provider = self.providers.create(&service)?;
        Ok((service, provider))
    }

    /// Synchronise an order with its provider when the customer returns
    /// from the payment page.
    #[instrument(skip(self, params))]
    pub async fn update_sync(
        &self,
        params: &Params,
        code: &str,
        order_id: &str,
    ) -> CheckoutResult<Order> {
        if let Some(param_id) = params.get("orderid") {
            if param_id != order_id {
                return Err(CheckoutError::Controller(format!(
                    "Order ID \"{}\" does not belong to the current session",
                    param_id
                )));
            }
        }

        let (_, provider) = self.provider(code).await?;
        let order = self.orders.get(order_id).await?;
        let before = order.payment_status;

        let order = provider.update_sync(order, params).await?;
        self.orders.save(&order).await?;

        if order.payment_status != before {
            info!(
                "Payment status of order {} changed: {} -> {}",
                order.id, before, order.payment_status
            );
        }

        Ok(order)
    }

    /// Apply a server-to-server notification from the provider of `code`.
    ///
    /// Returns the updated order, or `None` if the notification carried no
    /// status change.
    #[instrument(skip(self, request))]
    pub async fn update_push(
        &self,
        code: &str,
        request: &PushRequest,
    ) -> CheckoutResult<Option<Order>> {
        let (_, provider) = self.provider(code).await?;

        let Some(update) = provider.update_push(request).await? else {
            return Ok(None);
        };

        let mut order = self.orders.get(&update.order_id).await?;
        if order.payment_status == update.status {
            return Ok(Some(order));
        }
        if is_stale_update(order.payment_status, update.status) {
            warn!(
                "Ignoring late payment notification for order {}: {} -> {}",
                order.id, order.payment_status, update.status
            );
            return Ok(Some(order));
        }

        info!(
            "Payment notification for order {}: {} -> {}",
            order.id, order.payment_status, update.status
        );
        order.set_payment_status(update.status);
        self.orders.save(&order).await?;

        Ok(Some(order))
    }
}

/// Notifications may arrive out of order. Once authorized, an order only moves
/// forward or to refund.
fn is_stale_update(current: PaymentStatus, next: PaymentStatus) -> bool {
    current >= PaymentStatus::Authorized && next < current && next != PaymentStatus::Refund
}

/// Basket operations
#[async_trait]
pub trait BasketController: Send + Sync {
    /// Empty the customer's basket
    async fn clear(&self, session: &mut Session) -> CheckoutResult<()>;
}

/// Basket kept in the session
#[derive(Debug, Clone, Copy, Default)]
pub struct SessionBasket;

#[async_trait]
impl BasketController for SessionBasket {
    async fn clear(&self, session: &mut Session) -> CheckoutResult<()> {
        session.remove([BASKET_CONTENT]);
        Ok(())
    }
}

/// Side effects of a placed order (stock, coupons).
///
/// Called on every visit of the confirmation page, so implementations must be
/// idempotent.
#[async_trait]
pub trait OrderUpdater: Send + Sync {
    async fn update(&self, order: &Order) -> CheckoutResult<()>;
}

/// Order updater that only logs
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingOrderUpdater;

#[async_trait]
impl OrderUpdater for LoggingOrderUpdater {
    async fn update(&self, order: &Order) -> CheckoutResult<()> {
        if order.payment_status.is_settled() {
            info!(
                "Order {} settled ({}), total={}",
                order.id,
                order.payment_status,
                order.price.display()
            );
        } else {
            warn!("Order {} not settled: {}", order.id, order.payment_status);
        }
        Ok(())
    }
}
