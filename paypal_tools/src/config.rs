use hosting_common::{helpers::trim_base_url, Secret, DEFAULT_CURRENCY_CODE};
use log::*;

use crate::PaypalApiError;

pub const PAYPAL_SANDBOX_URL: &str = "https://api-m.sandbox.paypal.com";
pub const PAYPAL_LIVE_URL: &str = "https://api-m.paypal.com";

#[derive(Debug, Clone, Default)]
pub struct PaypalConfig {
    /// The REST API base URL, e.g. [`PAYPAL_SANDBOX_URL`]
    pub api_url: String,
    pub client_id: Secret<String>,
    pub client_secret: Secret<String>,
    /// ISO-4217 currency for all orders created by this client
    pub currency: String,
    /// Shown to the buyer on the PayPal approval page
    pub brand_name: Option<String>,
}

impl PaypalConfig {
    /// Loads the PayPal configuration from the environment.
    ///
    /// The client id and secret are required. Everything else falls back to a logged default.
    pub fn new_from_env() -> Result<Self, PaypalApiError> {
        let client_id = std::env::var("HOSTING_PAYPAL_CLIENT_ID")
            .map_err(|_| PaypalApiError::Initialization("HOSTING_PAYPAL_CLIENT_ID is not set".into()))?;
        let client_secret = std::env::var("HOSTING_PAYPAL_CLIENT_SECRET")
            .map_err(|_| PaypalApiError::Initialization("HOSTING_PAYPAL_CLIENT_SECRET is not set".into()))?;
        let live = std::env::var("HOSTING_PAYPAL_MODE").map(|s| s.eq_ignore_ascii_case("live")).unwrap_or(false);
        let api_url = std::env::var("HOSTING_PAYPAL_API_URL").map(|s| trim_base_url(&s)).unwrap_or_else(|_| {
            let url = if live { PAYPAL_LIVE_URL } else { PAYPAL_SANDBOX_URL };
            info!("💳️ HOSTING_PAYPAL_API_URL is not set. Using {url}");
            url.to_string()
        });
        let currency = std::env::var("HOSTING_PAYPAL_CURRENCY").unwrap_or_else(|_| {
            info!("💳️ HOSTING_PAYPAL_CURRENCY is not set. Using {DEFAULT_CURRENCY_CODE}");
            DEFAULT_CURRENCY_CODE.to_string()
        });
        let brand_name = std::env::var("HOSTING_PAYPAL_BRAND_NAME").ok();
        let config = Self {
            api_url,
            client_id: Secret::new(client_id),
            client_secret: Secret::new(client_secret),
            currency: currency.to_uppercase(),
            brand_name,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), PaypalApiError> {
        if self.client_id.is_empty() || self.client_secret.is_empty() {
            return Err(PaypalApiError::Initialization("PayPal client credentials are empty".into()));
        }
        if self.api_url.is_empty() {
            return Err(PaypalApiError::Initialization("PayPal API URL is empty".into()));
        }
        Ok(())
    }
}
