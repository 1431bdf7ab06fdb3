use std::env;

use hosting_common::{
    helpers::{parse_boolean_flag, trim_base_url},
    Secret,
};
use log::*;
use panel_tools::PanelConfig;
use paypal_tools::PaypalConfig;
use provisioning_engine::order_objects::CheckoutSettings;

use crate::errors::ServerError;

const DEFAULT_HOSTING_HOST: &str = "127.0.0.1";
const DEFAULT_HOSTING_PORT: u16 = 8360;
const DEFAULT_DATABASE_URL: &str = "sqlite://data/hosting_store.db";
const DEFAULT_SITE_URL: &str = "http://localhost:3000";

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    /// The storefront's base URL. PayPal sends buyers back to `{site_url}/checkout/success` or
    /// `{site_url}/checkout/cancel`.
    pub site_url: String,
    /// Apply pending database migrations at start-up.
    pub run_migrations: bool,
    pub auth: AuthConfig,
    pub paypal: PaypalConfig,
    pub panel: PanelConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOSTING_HOST.to_string(),
            port: DEFAULT_HOSTING_PORT,
            database_url: DEFAULT_DATABASE_URL.to_string(),
            site_url: DEFAULT_SITE_URL.to_string(),
            run_migrations: true,
            auth: AuthConfig::default(),
            paypal: PaypalConfig::default(),
            panel: PanelConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    /// Reads the non-secret settings, falling back to (logged) defaults. The credential sections are left empty.
    pub fn from_env_or_default() -> Self {
        let host = env::var("HOSTING_HOST").ok().unwrap_or_else(|| DEFAULT_HOSTING_HOST.into());
        let port = env::var("HOSTING_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!(
                        "🪛️ {s} is not a valid port for HOSTING_PORT. {e} Using the default, {DEFAULT_HOSTING_PORT}, \
                         instead."
                    );
                    DEFAULT_HOSTING_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_HOSTING_PORT);
        let database_url = env::var("HOSTING_DATABASE_URL").ok().unwrap_or_else(|| {
            warn!("🪛️ HOSTING_DATABASE_URL is not set. Using {DEFAULT_DATABASE_URL}");
            DEFAULT_DATABASE_URL.to_string()
        });
        let site_url = env::var("HOSTING_SITE_URL").map(|s| trim_base_url(&s)).unwrap_or_else(|_| {
            warn!("🪛️ HOSTING_SITE_URL is not set. Buyers will be returned to {DEFAULT_SITE_URL}");
            DEFAULT_SITE_URL.to_string()
        });
        let run_migrations = parse_boolean_flag(env::var("HOSTING_RUN_MIGRATIONS").ok(), true);
        Self { host, port, database_url, site_url, run_migrations, ..Default::default() }
    }

    /// Reads the full configuration. Every credential is required, and a missing one is a start-up error.
    pub fn try_from_env() -> Result<Self, ServerError> {
        let mut config = Self::from_env_or_default();
        config.auth = AuthConfig::try_from_env()?;
        config.paypal = PaypalConfig::new_from_env().map_err(|e| ServerError::ConfigurationError(e.to_string()))?;
        config.panel = PanelConfig::new_from_env().map_err(|e| ServerError::ConfigurationError(e.to_string()))?;
        Ok(config)
    }

    pub fn checkout_settings(&self) -> CheckoutSettings {
        let currency = if self.paypal.currency.is_empty() {
            CheckoutSettings::default().currency
        } else {
            self.paypal.currency.clone()
        };
        CheckoutSettings {
            currency,
            return_url: format!("{}/checkout/success", self.site_url),
            cancel_url: format!("{}/checkout/cancel", self.site_url),
        }
    }
}

//-------------------------------------------------  AuthConfig  -------------------------------------------------------
#[derive(Clone, Debug, Default)]
pub struct AuthConfig {
    /// The HMAC secret shared with the identity provider that issues customer access tokens.
    pub jwt_secret: Secret<String>,
}

impl AuthConfig {
    pub fn new(secret: &str) -> Self {
        Self { jwt_secret: Secret::new(secret.to_string()) }
    }

    pub fn try_from_env() -> Result<Self, ServerError> {
        let secret = env::var("HOSTING_JWT_SECRET")
            .map_err(|e| ServerError::ConfigurationError(format!("{e} [HOSTING_JWT_SECRET]")))?;
        let config = Self::new(&secret);
        if config.jwt_secret.is_empty() {
            return Err(ServerError::ConfigurationError("HOSTING_JWT_SECRET is empty".to_string()));
        }
        Ok(config)
    }
}
