use std::{env, str::FromStr, time::Duration};

use log::*;
use payment_provider::ProviderConfig;

use crate::errors::ServerError;

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_ORDER_SERVICE_PORT: u16 = 8360;
const DEFAULT_PAYMENT_SERVICE_PORT: u16 = 8361;
const DEFAULT_REMOTE_TIMEOUT_MS: u64 = 10_000;
const DEFAULT_EVENT_BUFFER_SIZE: usize = 25;
const DEFAULT_CATALOG_URL: &str = "http://127.0.0.1:8370";
const DEFAULT_ACCOUNT_URL: &str = "http://127.0.0.1:8371";
const DEFAULT_ORDER_SERVICE_URL: &str = "http://127.0.0.1:8360";
const DEFAULT_INTERACTION_EVENTS_TOPIC: &str = "interaction_events";
const DEFAULT_PRODUCT_EVENTS_TOPIC: &str = "product_events";
const DEFAULT_KAFKA_BOOTSTRAP_SERVERS: &str = "127.0.0.1:9092";

//-------------------------------------------------  BrokerConfig  -----------------------------------------------------
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum BrokerConfig {
    /// In-process broker. Messages never leave the process; useful for development and tests.
    #[default]
    Channel,
    Kafka { bootstrap_servers: String, group_id: String },
}

impl BrokerConfig {
    pub fn is_in_process(&self) -> bool {
        matches!(self, Self::Channel)
    }

    pub fn from_env_or_default(default_group_id: &str) -> Self {
        match env::var("SHOP_BROKER").map(|s| s.trim().to_lowercase()) {
            Ok(s) if s == "kafka" => {
                let bootstrap_servers = env_or_default("SHOP_KAFKA_BOOTSTRAP_SERVERS", DEFAULT_KAFKA_BOOTSTRAP_SERVERS);
                let group_id = env_or_default("SHOP_KAFKA_GROUP_ID", default_group_id);
                Self::Kafka { bootstrap_servers, group_id }
            },
            Ok(s) if s == "channel" => Self::Channel,
            Ok(s) => {
                warn!("🪛️ '{s}' is not a valid value for SHOP_BROKER. Expected 'channel' or 'kafka'. Using 'channel'.");
                Self::Channel
            },
            Err(_) => {
                info!("🪛️ SHOP_BROKER is not set. Using the in-process channel broker.");
                Self::Channel
            },
        }
    }
}

//-------------------------------------------------  OrderServiceConfig  -----------------------------------------------
#[derive(Clone, Debug)]
pub struct OrderServiceConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    /// Base URL of the catalog service's price lookup API
    pub catalog_url: String,
    /// Base URL of the account service
    pub account_url: String,
    /// Deadline for every call to the catalog and account services
    pub remote_timeout: Duration,
    /// Capacity of the order-placed hook channel. Events beyond this are dropped (and logged).
    pub event_buffer_size: usize,
    pub interaction_events_topic: String,
    pub broker: BrokerConfig,
}

impl Default for OrderServiceConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_ORDER_SERVICE_PORT,
            database_url: String::default(),
            catalog_url: DEFAULT_CATALOG_URL.to_string(),
            account_url: DEFAULT_ACCOUNT_URL.to_string(),
            remote_timeout: Duration::from_millis(DEFAULT_REMOTE_TIMEOUT_MS),
            event_buffer_size: DEFAULT_EVENT_BUFFER_SIZE,
            interaction_events_topic: DEFAULT_INTERACTION_EVENTS_TOPIC.to_string(),
            broker: BrokerConfig::Channel,
        }
    }
}

impl OrderServiceConfig {
    pub fn from_env_or_default() -> Self {
        let host = env_or_default("SHOP_HOST", DEFAULT_HOST);
        let port = parse_env("SHOP_PORT", DEFAULT_ORDER_SERVICE_PORT);
        let database_url = database_url_from_env();
        let catalog_url = env_or_default("SHOP_CATALOG_URL", DEFAULT_CATALOG_URL);
        let account_url = env_or_default("SHOP_ACCOUNT_URL", DEFAULT_ACCOUNT_URL);
        let remote_timeout = Duration::from_millis(parse_env("SHOP_REMOTE_TIMEOUT_MS", DEFAULT_REMOTE_TIMEOUT_MS));
        let event_buffer_size = parse_env("SHOP_EVENT_BUFFER_SIZE", DEFAULT_EVENT_BUFFER_SIZE);
        let interaction_events_topic = env_or_default("SHOP_INTERACTION_EVENTS_TOPIC", DEFAULT_INTERACTION_EVENTS_TOPIC);
        let broker = BrokerConfig::from_env_or_default("order_service");
        Self {
            host,
            port,
            database_url,
            catalog_url,
            account_url,
            remote_timeout,
            event_buffer_size,
            interaction_events_topic,
            broker,
        }
    }
}

//-------------------------------------------------  PaymentServiceConfig  ---------------------------------------------
#[derive(Clone, Debug)]
pub struct PaymentServiceConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    /// Base URL of the order service, which receives payment outcomes
    pub order_service_url: String,
    pub remote_timeout: Duration,
    pub product_events_topic: String,
    pub broker: BrokerConfig,
    pub provider: ProviderConfig,
}

impl Default for PaymentServiceConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PAYMENT_SERVICE_PORT,
            database_url: String::default(),
            order_service_url: DEFAULT_ORDER_SERVICE_URL.to_string(),
            remote_timeout: Duration::from_millis(DEFAULT_REMOTE_TIMEOUT_MS),
            product_events_topic: DEFAULT_PRODUCT_EVENTS_TOPIC.to_string(),
            broker: BrokerConfig::Channel,
            provider: ProviderConfig::default(),
        }
    }
}

impl PaymentServiceConfig {
    pub fn from_env_or_default() -> Self {
        let host = env_or_default("SHOP_HOST", DEFAULT_HOST);
        let port = parse_env("SHOP_PORT", DEFAULT_PAYMENT_SERVICE_PORT);
        let database_url = database_url_from_env();
        let order_service_url = env_or_default("SHOP_ORDER_SERVICE_URL", DEFAULT_ORDER_SERVICE_URL);
        let remote_timeout = Duration::from_millis(parse_env("SHOP_REMOTE_TIMEOUT_MS", DEFAULT_REMOTE_TIMEOUT_MS));
        let product_events_topic = env_or_default("SHOP_PRODUCT_EVENTS_TOPIC", DEFAULT_PRODUCT_EVENTS_TOPIC);
        let broker = BrokerConfig::from_env_or_default("payment_service");
        let provider = ProviderConfig::new_from_env_or_default();
        Self { host, port, database_url, order_service_url, remote_timeout, product_events_topic, broker, provider }
    }

    /// Fails if the configuration cannot possibly work, rather than letting every request fail later.
    ///
    /// Catalog changes can only reach the payment service through a shared broker, so the in-process broker is only
    /// accepted against the provider's test environment.
    pub fn validate(&self) -> Result<(), ServerError> {
        if self.provider.api_key.reveal().is_empty() {
            return Err(ServerError::ConfigurationError("SHOP_PROVIDER_API_KEY must be set".into()));
        }
        if self.broker.is_in_process() && !self.provider.test_mode {
            return Err(ServerError::ConfigurationError(
                "The live payment provider needs a shared broker to receive catalog changes. Set SHOP_BROKER=kafka, \
                 or SHOP_PROVIDER_TEST_MODE=true for a local setup."
                    .into(),
            ));
        }
        Ok(())
    }
}

fn database_url_from_env() -> String {
    env::var("SHOP_DATABASE_URL").ok().unwrap_or_else(|| {
        let url = commerce_engine::db_url();
        warn!("🪛️ SHOP_DATABASE_URL is not set. Using {url}");
        url
    })
}

fn env_or_default(name: &str, default: &str) -> String {
    env::var(name).ok().filter(|s| !s.trim().is_empty()).unwrap_or_else(|| {
        debug!("🪛️ {name} is not set. Using the default, {default}");
        default.to_string()
    })
}

fn parse_env<T>(name: &str, default: T) -> T
where
    T: FromStr + std::fmt::Display + Copy,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(s) => s.trim().parse::<T>().unwrap_or_else(|e| {
            error!("🪛️ {s} is not a valid value for {name}. {e} Using the default, {default}, instead.");
            default
        }),
        Err(_) => default,
    }
}
