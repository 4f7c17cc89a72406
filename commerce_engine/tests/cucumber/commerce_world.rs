use std::{fmt::Debug, sync::Arc};

use commerce_engine::{
    db_types::OrderWithItems,
    events::{ChannelBroker, EventProducers},
    OrderFlowApi,
    OrderFlowError,
    PaymentApi,
    SqliteDatabase,
};
use cucumber::World;
use log::*;

use super::fakes::{TestAccounts, TestCatalog, TestProvider};

#[derive(Default, Debug, World)]
pub struct CommerceWorld {
    pub system: Option<CommerceSystem>,
    pub last_order: Option<Result<OrderWithItems, OrderFlowError>>,
}

pub struct CommerceSystem {
    pub orders: OrderFlowApi<SqliteDatabase>,
    pub payments: PaymentApi<SqliteDatabase>,
    pub catalog: Arc<TestCatalog>,
    pub accounts: Arc<TestAccounts>,
    pub provider: Arc<TestProvider>,
    pub broker: ChannelBroker,
}

impl Debug for CommerceSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CommerceSystem")
    }
}

impl CommerceWorld {
    pub fn system(&self) -> &CommerceSystem {
        self.system.as_ref().expect("System not initialised. Did you forget 'Given a fresh install'?")
    }

    pub fn last_order(&self) -> &OrderWithItems {
        match &self.last_order {
            Some(Ok(order)) => order,
            other => panic!("No order was placed: {other:?}"),
        }
    }
}

impl CommerceSystem {
    pub async fn new() -> Self {
        let db = SqliteDatabase::new_with_url("sqlite::memory:", 1).await.expect("Error creating database");
        db.run_migrations().await.expect("Error running migrations");
        debug!("🚀️ Created in-memory database");
        let catalog = Arc::new(TestCatalog::default());
        let accounts = Arc::new(TestAccounts::default());
        let provider = Arc::new(TestProvider::default());
        let orders = OrderFlowApi::new(db.clone(), catalog.clone(), accounts.clone(), EventProducers::default());
        let payments = PaymentApi::new(db, provider.clone());
        Self { orders, payments, catalog, accounts, provider, broker: ChannelBroker::new() }
    }
}
