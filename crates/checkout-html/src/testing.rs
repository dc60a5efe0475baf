//! Test doubles shared by the client tests.

use crate::context::{Context, RequestScope};
use crate::view::{RequestInfo, View};
use async_trait::async_trait;
use checkout_core::{
    BasketController, BoxedPaymentProvider, CheckoutError, CheckoutResult, ClientConfig,
    Currency, MemoryStore, MessageDomain, Order, OrderRepository, OrderService, OrderUpdater,
    Params, PaymentProvider, PaymentStatus, PrePayFactory, Price, ProcessResult, ProviderFactory,
    ProviderRegistry, RouteUrlBuilder, ServiceItem, ServiceRepository, ServiceType, Session,
    SessionBasket, Translator,
};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub fn params(pairs: &[(&str, &str)]) -> Params {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// Request scope with the given parameters and session order
pub fn fixture(pairs: &[(&str, &str)], order_id: Option<&str>) -> RequestScope {
    let mut session = Session::new();
    if let Some(id) = order_id {
        session.set_order_id(id);
    }
    RequestScope::new(View::new(RequestInfo::new(params(pairs))), session)
}

/// Memory store counting every repository call
pub struct CountingStore {
    inner: MemoryStore,
    calls: AtomicUsize,
}

impl CountingStore {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn inner(&self) -> &MemoryStore {
        &self.inner
    }

    fn count(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl OrderRepository for CountingStore {
    async fn get(&self, order_id: &str) -> CheckoutResult<Order> {
        self.count();
        self.inner.get(order_id).await
    }

    async fn save(&self, order: &Order) -> CheckoutResult<()> {
        self.count();
        self.inner.save(order).await
    }

    async fn search_services(
        &self,
        base_id: &str,
        service_type: ServiceType,
    ) -> CheckoutResult<Vec<OrderService>> {
        self.count();
        self.inner.search_services(base_id, service_type).await
    }
}

#[async_trait]
impl ServiceRepository for CountingStore {
    async fn search(
        &self,
        code: &str,
        service_type: ServiceType,
    ) -> CheckoutResult<Vec<ServiceItem>> {
        self.count();
        self.inner.search(code, service_type).await
    }
}

/// Provider that never produces redirect instructions
#[derive(Default)]
pub struct NothingState {
    calls: AtomicUsize,
    injected: Mutex<Params>,
}

impl NothingState {
    pub fn process_calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn injected(&self) -> Params {
        self.injected.lock().map(|p| p.clone()).unwrap_or_default()
    }
}

struct NothingProvider {
    state: Arc<NothingState>,
}

#[async_trait]
impl PaymentProvider for NothingProvider {
    fn provider_name(&self) -> &'static str {
        "nothing"
    }

    fn inject_global_config(&mut self, config: Params) {
        if let Ok(mut injected) = self.state.injected.lock() {
            injected.extend(config);
        }
    }

    async fn process(
        &self,
        _order: &Order,
        _params: &Params,
    ) -> CheckoutResult<Option<ProcessResult>> {
        self.state.calls.fetch_add(1, Ordering::SeqCst);
        Ok(None)
    }
}

struct NothingFactory {
    state: Arc<NothingState>,
}

impl ProviderFactory for NothingFactory {
    fn name(&self) -> &'static str {
        "nothing"
    }

    fn create(&self, _service: &ServiceItem) -> CheckoutResult<BoxedPaymentProvider> {
        Ok(Box::new(NothingProvider {
            state: self.state.clone(),
        }))
    }
}

/// Translator remembering every lookup
#[derive(Default)]
pub struct RecordingTranslator {
    lookups: Mutex<Vec<(MessageDomain, String)>>,
}

impl Translator for RecordingTranslator {
    fn dt(&self, domain: MessageDomain, msgid: &str) -> String {
        if let Ok(mut lookups) = self.lookups.lock() {
            lookups.push((domain, msgid.to_string()));
        }
        msgid.to_string()
    }
}

/// Session basket counting clears
#[derive(Default)]
pub struct CountingBasket {
    clears: AtomicUsize,
}

impl CountingBasket {
    pub fn clears(&self) -> usize {
        self.clears.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BasketController for CountingBasket {
    async fn clear(&self, session: &mut Session) -> CheckoutResult<()> {
        self.clears.fetch_add(1, Ordering::SeqCst);
        SessionBasket.clear(session).await
    }
}

/// Order updater counting calls, optionally failing
#[derive(Default)]
pub struct CountingUpdater {
    updates: AtomicUsize,
    failing: AtomicBool,
}

impl CountingUpdater {
    pub fn updates(&self) -> usize {
        self.updates.load(Ordering::SeqCst)
    }

    pub fn fail(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl OrderUpdater for CountingUpdater {
    async fn update(&self, _order: &Order) -> CheckoutResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(CheckoutError::Internal("stock service unavailable".to_string()));
        }
        self.updates.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// A shop with one order per scenario
pub struct TestShop {
    pub ctx: Context,
    pub store: Arc<CountingStore>,
    pub nothing: Arc<NothingState>,
    pub basket: Arc<CountingBasket>,
    pub updater: Arc<CountingUpdater>,
    pub i18n: Arc<RecordingTranslator>,
}

impl TestShop {
    pub fn new() -> Self {
        let order = |id: &str, base: &str, status: PaymentStatus| {
            Order::new(base, Price::from_cents(4500, Currency::EUR))
                .with_id(id)
                .with_payment_status(status)
        };

        let inner = MemoryStore::new()
            .with_order(order("O-1", "B-1", PaymentStatus::Refused))
            .with_order(order("O-2", "B-2", PaymentStatus::Authorized))
            .with_order(order("O-prepay", "B-prepay", PaymentStatus::Unfinished))
            .with_order(order("O-free", "B-free", PaymentStatus::Unfinished))
            .with_order(order("O-nothing", "B-nothing", PaymentStatus::Unfinished))
            .with_order(order("O-unknown", "B-unknown", PaymentStatus::Unfinished))
            .with_order(order("O-double", "B-double", PaymentStatus::Unfinished))
            .with_order(order("O-orphan", "B-orphan", PaymentStatus::Unfinished))
            .with_order_service(OrderService::payment("B-1", "invoice"))
            .with_order_service(OrderService::payment("B-2", "invoice"))
            .with_order_service(OrderService::payment("B-prepay", "invoice"))
            .with_order_service(OrderService::delivery("B-free", "pickup"))
            .with_order_service(OrderService::payment("B-nothing", "nothing"))
            .with_order_service(OrderService::payment("B-unknown", "paypal"))
            .with_order_service(OrderService::payment("B-double", "invoice"))
            .with_order_service(OrderService::payment("B-double", "nothing"))
            .with_order_service(OrderService::payment("B-orphan", "orphan"))
            .with_service(ServiceItem::payment("invoice", "prepay"))
            .with_service(ServiceItem::payment("nothing", "nothing"))
            .with_service(ServiceItem::payment("orphan", "ghost"));

        let store = Arc::new(CountingStore {
            inner,
            calls: AtomicUsize::new(0),
        });
        let nothing = Arc::new(NothingState::default());
        let basket = Arc::new(CountingBasket::default());
        let updater = Arc::new(CountingUpdater::default());
        let i18n = Arc::new(RecordingTranslator::default());

        let providers = ProviderRegistry::new()
            .with_factory(Arc::new(PrePayFactory))
            .with_factory(Arc::new(NothingFactory {
                state: nothing.clone(),
            }));

        let urls = RouteUrlBuilder::new("https://shop.example").expect("valid base URL");

        let ctx = Context::new(
            ClientConfig::new(),
            store.clone(),
            store.clone(),
            providers,
            Arc::new(urls),
        )
        .expect("context")
        .with_i18n(i18n.clone())
        .with_basket(basket.clone())
        .with_order_updater(updater.clone());

        Self {
            ctx,
            store,
            nothing,
            basket,
            updater,
            i18n,
        }
    }

    /// Catalog lookups made so far
    pub fn translated(&self) -> Vec<(MessageDomain, String)> {
        self.i18n
            .lookups
            .lock()
            .map(|l| l.clone())
            .unwrap_or_default()
    }
}
