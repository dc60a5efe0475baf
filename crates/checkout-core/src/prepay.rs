//! # Prepayment Provider
//!
//! Payment by bank transfer or invoice. No hosted payment page is involved: the
//! customer is sent straight to the confirmation page and the order waits in
//! `Pending` until the money arrives.

use crate::error::{CheckoutError, CheckoutResult};
use crate::order::{Order, PaymentStatus};
use crate::provider::{
    BoxedPaymentProvider, HttpMethod, PaymentProvider, ProcessResult, ProviderFactory, URL_SUCCESS,
};
use crate::service::ServiceItem;
use crate::Params;
use async_trait::async_trait;
use tracing::{debug, instrument};

/// Provider for payments settled outside the shop
#[derive(Debug, Default)]
pub struct PrePayProvider {
    service_code: String,
    global: Params,
}

impl PrePayProvider {
    pub fn new(service: &ServiceItem) -> Self {
        Self {
            service_code: service.code.clone(),
            global: Params::new(),
        }
    }
}

#[async_trait]
impl PaymentProvider for PrePayProvider {
    fn provider_name(&self) -> &'static str {
        "prepay"
    }

    fn inject_global_config(&mut self, config: Params) {
        self.global.extend(config);
    }

    #[instrument(skip(self, order, _params), fields(order_id = %order.id, service = %self.service_code))]
    async fn process(
        &self,
        order: &Order,
        _params: &Params,
    ) -> CheckoutResult<Option<ProcessResult>> {
        let url = self.global.get(URL_SUCCESS).ok_or_else(|| {
            CheckoutError::Configuration(format!("{} not injected", URL_SUCCESS))
        })?;

        debug!("Prepayment needs no redirect, continuing to {}", url);

        ProcessResult::new(url.clone(), HttpMethod::Post, Params::new(), false).map(Some)
    }

    async fn update_sync(&self, mut order: Order, _params: &Params) -> CheckoutResult<Order> {
        if order.payment_status == PaymentStatus::Unfinished {
            order.set_payment_status(PaymentStatus::Pending);
        }
        Ok(order)
    }
}

/// Factory registered under the name "prepay"
#[derive(Debug, Clone, Copy, Default)]
pub struct PrePayFactory;

impl ProviderFactory for PrePayFactory {
    fn name(&self) -> &'static str {
        "prepay"
    }

    fn create(&self, service: &ServiceItem) -> CheckoutResult<BoxedPaymentProvider> {
        Ok(Box::new(PrePayProvider::new(service)))
    }
}
