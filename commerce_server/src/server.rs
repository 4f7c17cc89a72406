use std::{sync::Arc, time::Duration};

use actix_web::{dev::Server, http::KeepAlive, middleware::Logger, web, App, HttpServer};
use commerce_engine::{
    events::{
        interaction_events_hook,
        ChannelBroker,
        EventHandlers,
        EventHooks,
        EventProducers,
        EventPublisher,
        MessageBroker,
    },
    traits::{AccountDirectory, CatalogClient, OrderStatusUpdater, PaymentProvider},
    OrderFlowApi,
    PaymentApi,
    SqliteDatabase,
};
use log::*;
use payment_provider::ProviderApi;

use crate::{
    catalog_worker::start_catalog_worker,
    config::{BrokerConfig, OrderServiceConfig, PaymentServiceConfig},
    errors::ServerError,
    integrations::provider::HostedPaymentProvider,
    remote::{HttpAccountDirectory, HttpCatalogClient, HttpOrderStatusClient},
    routes::{
        health,
        CheckoutRoute,
        CustomerPortalRoute,
        OrderByIdRoute,
        OrdersForAccountRoute,
        PlaceOrderRoute,
        UpdateOrderStatusRoute,
    },
    webhook::{PaymentWebhookRoute, WebhookContext},
};

const MAX_DB_CONNECTIONS: u32 = 25;

pub fn connect_broker(config: &BrokerConfig) -> Result<Arc<dyn MessageBroker>, ServerError> {
    match config {
        BrokerConfig::Channel => {
            error!(
                "📬️ Using the in-process channel broker. Events published here never leave this process, and no \
                 other service can publish to it. Set SHOP_BROKER=kafka outside of local development."
            );
            Ok(Arc::new(ChannelBroker::new()))
        },
        #[cfg(feature = "kafka")]
        BrokerConfig::Kafka { bootstrap_servers, group_id } => {
            use commerce_engine::events::{KafkaBroker, KafkaConfig};
            let broker = KafkaBroker::new(KafkaConfig::new(bootstrap_servers, group_id))
                .map_err(|e| ServerError::InitializeError(e.to_string()))?;
            Ok(Arc::new(broker))
        },
        #[cfg(not(feature = "kafka"))]
        BrokerConfig::Kafka { .. } => Err(ServerError::ConfigurationError(
            "SHOP_BROKER is 'kafka', but this build does not include Kafka support. Rebuild with the 'kafka' feature."
                .into(),
        )),
    }
}

async fn open_database(url: &str) -> Result<SqliteDatabase, ServerError> {
    let db = SqliteDatabase::new_with_url(url, MAX_DB_CONNECTIONS)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    db.run_migrations().await.map_err(|e| ServerError::InitializeError(e.to_string()))?;
    Ok(db)
}

//-------------------------------------------------  Order service  ----------------------------------------------------
pub async fn run_order_server(config: OrderServiceConfig) -> Result<(), ServerError> {
    let db = open_database(&config.database_url).await?;
    let broker = connect_broker(&config.broker)?;
    let catalog = Arc::new(HttpCatalogClient::new(&config.catalog_url, config.remote_timeout)?);
    let accounts = Arc::new(HttpAccountDirectory::new(&config.account_url, config.remote_timeout)?);

    let mut hooks = EventHooks::default();
    hooks.on_order_placed =
        Some(interaction_events_hook(EventPublisher::new(broker), config.interaction_events_topic.clone()));
    let handlers = EventHandlers::new(config.event_buffer_size, hooks);
    let producers = handlers.producers();
    handlers.start_handlers();

    info!("🚀️ Order service listening on {}:{}", config.host, config.port);
    let srv = create_order_server_instance(&config, db.clone(), catalog, accounts, producers)?;
    let result = srv.await.map_err(|e| ServerError::Unspecified(e.to_string()));
    db.close().await;
    result
}

pub fn create_order_server_instance(
    config: &OrderServiceConfig,
    db: SqliteDatabase,
    catalog: Arc<dyn CatalogClient>,
    accounts: Arc<dyn AccountDirectory>,
    producers: EventProducers,
) -> Result<Server, ServerError> {
    let srv = HttpServer::new(move || {
        let orders_api = OrderFlowApi::new(db.clone(), catalog.clone(), accounts.clone(), producers.clone());
        App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("commerce::access_log"))
            .app_data(web::Data::new(orders_api))
            .service(health)
            .service(PlaceOrderRoute::<SqliteDatabase>::new())
            .service(OrdersForAccountRoute::<SqliteDatabase>::new())
            .service(UpdateOrderStatusRoute::<SqliteDatabase>::new())
            .service(OrderByIdRoute::<SqliteDatabase>::new())
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((config.host.as_str(), config.port))?
    .run();
    Ok(srv)
}

//-------------------------------------------------  Payment service  --------------------------------------------------
pub async fn run_payment_server(config: PaymentServiceConfig) -> Result<(), ServerError> {
    config.validate()?;
    let db = open_database(&config.database_url).await?;
    let broker = connect_broker(&config.broker)?;
    let provider_api =
        ProviderApi::new(config.provider.clone()).map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let provider: Arc<dyn PaymentProvider> = Arc::new(HostedPaymentProvider::new(provider_api));
    let order_status: Arc<dyn OrderStatusUpdater> =
        Arc::new(HttpOrderStatusClient::new(&config.order_service_url, config.remote_timeout)?);
    let api = PaymentApi::new(db.clone(), provider);

    let worker = start_catalog_worker(api.clone(), broker, &config.product_events_topic);
    let context = WebhookContext::new(config.provider.webhook_secret.clone(), order_status, config.remote_timeout);
    info!("🚀️ Payment service listening on {}:{}", config.host, config.port);
    let result = match create_payment_server_instance(&config, api, context) {
        Ok(srv) => srv.await.map_err(|e| ServerError::Unspecified(e.to_string())),
        Err(e) => Err(e),
    };
    worker.stop().await;
    db.close().await;
    result
}

pub fn create_payment_server_instance(
    config: &PaymentServiceConfig,
    api: PaymentApi<SqliteDatabase>,
    context: WebhookContext,
) -> Result<Server, ServerError> {
    let srv = HttpServer::new(move || {
        App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("commerce::access_log"))
            .app_data(web::Data::new(api.clone()))
            .app_data(web::Data::new(context.clone()))
            .service(health)
            .service(CheckoutRoute::<SqliteDatabase>::new())
            .service(CustomerPortalRoute::<SqliteDatabase>::new())
            .service(PaymentWebhookRoute::<SqliteDatabase>::new())
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((config.host.as_str(), config.port))?
    .run();
    Ok(srv)
}
