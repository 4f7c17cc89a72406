use commerce_common::{parse_boolean_flag, Secret, DEFAULT_CURRENCY_CODE};
use log::*;

pub const LIVE_API_URL: &str = "https://live.dodopayments.com";
pub const TEST_API_URL: &str = "https://test.dodopayments.com";
const DEFAULT_TAX_CATEGORY: &str = "digital_products";

#[derive(Debug, Clone, Default)]
pub struct ProviderConfig {
    pub api_url: String,
    pub api_key: Secret<String>,
    /// Shared secret used to sign webhook bodies.
    pub webhook_secret: Secret<String>,
    pub test_mode: bool,
    pub currency: String,
    pub tax_category: String,
}

impl ProviderConfig {
    pub fn new(api_url: &str, api_key: &str, webhook_secret: &str) -> Self {
        Self {
            api_url: api_url.to_string(),
            api_key: Secret::new(api_key.to_string()),
            webhook_secret: Secret::new(webhook_secret.to_string()),
            test_mode: false,
            currency: DEFAULT_CURRENCY_CODE.to_string(),
            tax_category: DEFAULT_TAX_CATEGORY.to_string(),
        }
    }

    pub fn new_from_env_or_default() -> Self {
        let test_mode = parse_boolean_flag(std::env::var("SHOP_PROVIDER_TEST_MODE").ok(), false);
        let api_url = std::env::var("SHOP_PROVIDER_API_URL").unwrap_or_else(|_| {
            let url = if test_mode { TEST_API_URL } else { LIVE_API_URL };
            info!("🪛️ SHOP_PROVIDER_API_URL not set, using {url} (test mode: {test_mode})");
            url.to_string()
        });
        let api_key = Secret::new(std::env::var("SHOP_PROVIDER_API_KEY").unwrap_or_else(|_| {
            warn!("🪛️ SHOP_PROVIDER_API_KEY not set, using (probably useless) default");
            String::default()
        }));
        let webhook_secret = Secret::new(std::env::var("SHOP_PROVIDER_WEBHOOK_SECRET").unwrap_or_else(|_| {
            warn!(
                "🪛️ SHOP_PROVIDER_WEBHOOK_SECRET not set. Every incoming payment webhook will fail signature checks."
            );
            String::default()
        }));
        let currency = std::env::var("SHOP_PROVIDER_CURRENCY").unwrap_or_else(|_| DEFAULT_CURRENCY_CODE.to_string());
        Self { api_url, api_key, webhook_secret, test_mode, currency, tax_category: DEFAULT_TAX_CATEGORY.to_string() }
    }
}
