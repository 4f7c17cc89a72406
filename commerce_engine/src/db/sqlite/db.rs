use std::fmt::Debug;

use log::*;
use sqlx::{migrate, SqlitePool};

use super::{customers, db_url, new_pool, orders, products, transactions, SqliteDatabaseError};
use crate::{
    db::traits::{
        InsertOutcome,
        OrderManagement,
        OrderStoreError,
        PaymentProjection,
        ProjectionError,
        UpsertOutcome,
    },
    db_types::{
        Cents,
        NewOrder,
        NewPaymentCustomer,
        NewPaymentProduct,
        NewTransaction,
        Order,
        OrderWithItems,
        PaymentCustomer,
        PaymentProduct,
        Transaction,
        TransactionStatus,
    },
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SqliteDatabase ({})", self.url)
    }
}

impl SqliteDatabase {
    /// Creates a new database API object using the URL in `SHOP_DATABASE_URL`
    pub async fn new(max_connections: u32) -> Result<Self, SqliteDatabaseError> {
        let url = db_url();
        SqliteDatabase::new_with_url(url.as_str(), max_connections).await
    }

    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, SqliteDatabaseError> {
        let pool = new_pool(url, max_connections).await?;
        Ok(Self { url: url.to_string(), pool })
    }

    pub fn url(&self) -> &str {
        self.url.as_str()
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn run_migrations(&self) -> Result<(), SqliteDatabaseError> {
        migrate!("./src/db/sqlite/migrations").run(&self.pool).await?;
        info!("🗃️ Database migrations complete");
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

impl OrderManagement for SqliteDatabase {
    async fn insert_order(&self, order: NewOrder) -> Result<OrderWithItems, OrderStoreError> {
        let mut tx = self.pool.begin().await.map_err(SqliteDatabaseError::from)?;
        let result = orders::insert_order(order, &mut tx).await?;
        tx.commit().await.map_err(SqliteDatabaseError::from)?;
        Ok(result)
    }

    async fn fetch_order(&self, order_id: i64) -> Result<Option<OrderWithItems>, OrderStoreError> {
        let mut conn = self.pool.acquire().await.map_err(SqliteDatabaseError::from)?;
        let Some(order) = orders::fetch_order_by_id(order_id, &mut conn).await? else {
            return Ok(None);
        };
        let line_items = orders::fetch_line_items(&[order.id], &mut conn).await?;
        Ok(Some(OrderWithItems { order, line_items }))
    }

    async fn fetch_orders_for_account(&self, account_id: i64) -> Result<Vec<OrderWithItems>, OrderStoreError> {
        let mut conn = self.pool.acquire().await.map_err(SqliteDatabaseError::from)?;
        let orders = orders::fetch_orders_for_account(account_id, &mut conn).await?;
        let ids = orders.iter().map(|o| o.id).collect::<Vec<i64>>();
        let items = orders::fetch_line_items(&ids, &mut conn).await?;
        Ok(orders::group_line_items(orders, items))
    }

    async fn update_order_status(&self, order_id: i64, status: TransactionStatus) -> Result<Order, OrderStoreError> {
        let mut conn = self.pool.acquire().await.map_err(SqliteDatabaseError::from)?;
        let order = orders::update_payment_status(order_id, status, &mut conn).await?;
        Ok(order)
    }
}

impl PaymentProjection for SqliteDatabase {
    async fn fetch_customer(&self, user_id: i64) -> Result<Option<PaymentCustomer>, ProjectionError> {
        let mut conn = self.pool.acquire().await.map_err(SqliteDatabaseError::from)?;
        Ok(customers::fetch_customer_by_user_id(user_id, &mut conn).await?)
    }

    async fn insert_customer(&self, customer: NewPaymentCustomer) -> Result<InsertOutcome, ProjectionError> {
        let mut conn = self.pool.acquire().await.map_err(SqliteDatabaseError::from)?;
        Ok(customers::insert_customer(customer, &mut conn).await?)
    }

    async fn fetch_product(&self, product_id: &str) -> Result<Option<PaymentProduct>, ProjectionError> {
        let mut conn = self.pool.acquire().await.map_err(SqliteDatabaseError::from)?;
        Ok(products::fetch_product(product_id, &mut conn).await?)
    }

    async fn fetch_products(&self, product_ids: &[String]) -> Result<Vec<PaymentProduct>, ProjectionError> {
        let mut conn = self.pool.acquire().await.map_err(SqliteDatabaseError::from)?;
        Ok(products::fetch_products(product_ids, &mut conn).await?)
    }

    async fn insert_product(&self, product: NewPaymentProduct) -> Result<InsertOutcome, ProjectionError> {
        let mut conn = self.pool.acquire().await.map_err(SqliteDatabaseError::from)?;
        Ok(products::insert_product(product, &mut conn).await?)
    }

    async fn update_product_details(
        &self,
        product_id: &str,
        name: &str,
        price: Cents,
    ) -> Result<Option<PaymentProduct>, ProjectionError> {
        let mut conn = self.pool.acquire().await.map_err(SqliteDatabaseError::from)?;
        Ok(products::update_details(product_id, name, price, &mut conn).await?)
    }

    async fn delete_product(&self, product_id: &str) -> Result<bool, ProjectionError> {
        let mut conn = self.pool.acquire().await.map_err(SqliteDatabaseError::from)?;
        Ok(products::delete_product(product_id, &mut conn).await?)
    }

    async fn upsert_transaction(
        &self,
        transaction: NewTransaction,
    ) -> Result<(Transaction, UpsertOutcome), ProjectionError> {
        let mut tx = self.pool.begin().await.map_err(SqliteDatabaseError::from)?;
        let existing = transactions::fetch_transaction(&transaction.provider_payment_id, &mut tx).await?;
        let stored = transactions::upsert_transaction(transaction, &mut tx).await?;
        tx.commit().await.map_err(SqliteDatabaseError::from)?;
        let outcome = if existing.is_some() { UpsertOutcome::Updated } else { UpsertOutcome::Inserted };
        Ok((stored, outcome))
    }

    async fn fetch_transaction(&self, provider_payment_id: &str) -> Result<Option<Transaction>, ProjectionError> {
        let mut conn = self.pool.acquire().await.map_err(SqliteDatabaseError::from)?;
        Ok(transactions::fetch_transaction(provider_payment_id, &mut conn).await?)
    }

    async fn fetch_transactions_for_order(&self, order_id: i64) -> Result<Vec<Transaction>, ProjectionError> {
        let mut conn = self.pool.acquire().await.map_err(SqliteDatabaseError::from)?;
        Ok(transactions::fetch_transactions_for_order(order_id, &mut conn).await?)
    }
}
