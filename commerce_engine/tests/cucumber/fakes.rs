use std::{
    collections::{HashMap, HashSet},
    sync::{
        atomic::{AtomicUsize, Ordering},
        Mutex,
    },
};

use async_trait::async_trait;
use commerce_engine::{
    db_types::Cents,
    traits::{
        AccountDirectory,
        CatalogClient,
        CatalogProduct,
        CheckoutLine,
        PaymentProvider,
        ProviderProductDetails,
        RemoteCallError,
    },
};

#[derive(Debug, Default)]
pub struct TestCatalog {
    products: Mutex<HashMap<String, CatalogProduct>>,
}

impl TestCatalog {
    pub fn put(&self, id: &str, price: Cents) {
        let product = CatalogProduct {
            id: id.to_string(),
            name: format!("Product {id}"),
            description: String::new(),
            price,
            account_id: None,
        };
        self.products.lock().unwrap().insert(id.to_string(), product);
    }

    pub fn remove(&self, id: &str) {
        self.products.lock().unwrap().remove(id);
    }
}

#[async_trait]
impl CatalogClient for TestCatalog {
    async fn fetch_products(&self, product_ids: &[String]) -> Result<Vec<CatalogProduct>, RemoteCallError> {
        let products = self.products.lock().unwrap();
        Ok(product_ids.iter().filter_map(|id| products.get(id).cloned()).collect())
    }
}

#[derive(Debug, Default)]
pub struct TestAccounts {
    accounts: Mutex<HashSet<i64>>,
}

impl TestAccounts {
    pub fn add(&self, account_id: i64) {
        self.accounts.lock().unwrap().insert(account_id);
    }
}

#[async_trait]
impl AccountDirectory for TestAccounts {
    async fn account_exists(&self, account_id: i64) -> Result<bool, RemoteCallError> {
        Ok(self.accounts.lock().unwrap().contains(&account_id))
    }
}

#[derive(Debug, Default)]
pub struct TestProvider {
    customers: AtomicUsize,
    products: AtomicUsize,
}

impl TestProvider {
    pub fn customers_created(&self) -> usize {
        self.customers.load(Ordering::SeqCst)
    }

    pub fn products_created(&self) -> usize {
        self.products.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PaymentProvider for TestProvider {
    fn currency(&self) -> String {
        "USD".into()
    }

    async fn create_product(&self, _product: ProviderProductDetails) -> Result<String, RemoteCallError> {
        let n = self.products.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(format!("pdt_{n}"))
    }

    async fn update_product(&self, _id: &str, _name: Option<String>, _price: Option<Cents>) -> Result<(), RemoteCallError> {
        Ok(())
    }

    async fn archive_product(&self, _id: &str) -> Result<(), RemoteCallError> {
        Ok(())
    }

    async fn create_customer(&self, _email: &str, _name: &str) -> Result<String, RemoteCallError> {
        let n = self.customers.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(format!("cus_{n}"))
    }

    async fn create_checkout_session(
        &self,
        customer_id: &str,
        _lines: Vec<CheckoutLine>,
        _return_url: &str,
        order_id: i64,
        _user_id: i64,
    ) -> Result<String, RemoteCallError> {
        Ok(format!("https://checkout.test/{customer_id}/{order_id}"))
    }

    async fn create_customer_portal_session(&self, customer_id: &str) -> Result<String, RemoteCallError> {
        Ok(format!("https://portal.test/{customer_id}"))
    }
}
