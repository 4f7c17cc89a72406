//! In-memory stand-ins for the remote services the engine depends on.
use std::{
    collections::{HashMap, HashSet},
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Mutex,
    },
};

use async_trait::async_trait;

use crate::{
    db_types::{Cents, TransactionStatus},
    traits::{
        AccountDirectory,
        CatalogClient,
        CatalogProduct,
        CheckoutLine,
        OrderStatusUpdater,
        PaymentProvider,
        ProviderProductDetails,
        RemoteCallError,
    },
};

#[derive(Default)]
pub struct InMemoryCatalog {
    products: Mutex<HashMap<String, CatalogProduct>>,
    unavailable: AtomicBool,
}

impl InMemoryCatalog {
    /// Adds or replaces a product. `price` is in cents.
    pub fn add_product(&self, id: &str, name: &str, price: i64) {
        let product = CatalogProduct {
            id: id.to_string(),
            name: name.to_string(),
            description: format!("{name} description"),
            price: Cents::from(price),
            account_id: None,
        };
        self.products.lock().expect("catalog lock poisoned").insert(id.to_string(), product);
    }

    pub fn remove_product(&self, id: &str) {
        self.products.lock().expect("catalog lock poisoned").remove(id);
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }
}

#[async_trait]
impl CatalogClient for InMemoryCatalog {
    async fn fetch_products(&self, product_ids: &[String]) -> Result<Vec<CatalogProduct>, RemoteCallError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(RemoteCallError::Unavailable("catalog is down".into()));
        }
        let products = self.products.lock().expect("catalog lock poisoned");
        Ok(product_ids.iter().filter_map(|id| products.get(id).cloned()).collect())
    }
}

#[derive(Default)]
pub struct StaticAccountDirectory {
    accounts: HashSet<i64>,
}

impl StaticAccountDirectory {
    pub fn with_accounts(ids: &[i64]) -> Self {
        Self { accounts: ids.iter().copied().collect() }
    }
}

#[async_trait]
impl AccountDirectory for StaticAccountDirectory {
    async fn account_exists(&self, account_id: i64) -> Result<bool, RemoteCallError> {
        Ok(self.accounts.contains(&account_id))
    }
}

/// Hands out sequential ids and counts every successful call.
#[derive(Default)]
pub struct FakePaymentProvider {
    next_id: AtomicUsize,
    customers_created: AtomicUsize,
    products_created: AtomicUsize,
    products_updated: AtomicUsize,
    products_archived: AtomicUsize,
    failed_calls: AtomicUsize,
    unavailable: AtomicBool,
}

impl FakePaymentProvider {
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub fn customers_created(&self) -> usize {
        self.customers_created.load(Ordering::SeqCst)
    }

    pub fn products_created(&self) -> usize {
        self.products_created.load(Ordering::SeqCst)
    }

    pub fn products_updated(&self) -> usize {
        self.products_updated.load(Ordering::SeqCst)
    }

    pub fn products_archived(&self) -> usize {
        self.products_archived.load(Ordering::SeqCst)
    }

    pub fn failed_calls(&self) -> usize {
        self.failed_calls.load(Ordering::SeqCst)
    }

    fn check_available(&self) -> Result<(), RemoteCallError> {
        if self.unavailable.load(Ordering::SeqCst) {
            self.failed_calls.fetch_add(1, Ordering::SeqCst);
            return Err(RemoteCallError::Unavailable("payment provider is down".into()));
        }
        Ok(())
    }

    fn new_id(&self, prefix: &str) -> String {
        format!("{prefix}_{}", self.next_id.fetch_add(1, Ordering::SeqCst) + 1)
    }
}

#[async_trait]
impl PaymentProvider for FakePaymentProvider {
    fn currency(&self) -> String {
        "USD".to_string()
    }

    async fn create_product(&self, _product: ProviderProductDetails) -> Result<String, RemoteCallError> {
        self.check_available()?;
        self.products_created.fetch_add(1, Ordering::SeqCst);
        Ok(self.new_id("pdt"))
    }

    async fn update_product(
        &self,
        _provider_product_id: &str,
        _name: Option<String>,
        _price: Option<Cents>,
    ) -> Result<(), RemoteCallError> {
        self.check_available()?;
        self.products_updated.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn archive_product(&self, _provider_product_id: &str) -> Result<(), RemoteCallError> {
        self.check_available()?;
        self.products_archived.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn create_customer(&self, _email: &str, _name: &str) -> Result<String, RemoteCallError> {
        self.check_available()?;
        self.customers_created.fetch_add(1, Ordering::SeqCst);
        Ok(self.new_id("cus"))
    }

    async fn create_checkout_session(
        &self,
        provider_customer_id: &str,
        lines: Vec<CheckoutLine>,
        _return_url: &str,
        order_id: i64,
        user_id: i64,
    ) -> Result<String, RemoteCallError> {
        self.check_available()?;
        if lines.is_empty() {
            return Err(RemoteCallError::InvalidArgument("empty cart".into()));
        }
        Ok(format!("https://checkout.test/{provider_customer_id}?order={order_id}&user={user_id}"))
    }

    async fn create_customer_portal_session(&self, provider_customer_id: &str) -> Result<String, RemoteCallError> {
        self.check_available()?;
        Ok(format!("https://portal.test/{provider_customer_id}"))
    }
}

/// Remembers every status update it is asked to make.
#[derive(Default)]
pub struct RecordingOrderStatusUpdater {
    updates: Mutex<Vec<(i64, TransactionStatus)>>,
    unavailable: AtomicBool,
}

impl RecordingOrderStatusUpdater {
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub fn updates(&self) -> Vec<(i64, TransactionStatus)> {
        self.updates.lock().expect("updates lock poisoned").clone()
    }
}

#[async_trait]
impl OrderStatusUpdater for RecordingOrderStatusUpdater {
    async fn update_order_status(&self, order_id: i64, status: TransactionStatus) -> Result<(), RemoteCallError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(RemoteCallError::Unavailable("order service is down".into()));
        }
        self.updates.lock().expect("updates lock poisoned").push((order_id, status));
        Ok(())
    }
}
