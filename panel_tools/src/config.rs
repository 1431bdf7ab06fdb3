use hosting_common::{helpers::trim_base_url, Secret};
use log::*;

use crate::PanelApiError;

#[derive(Debug, Clone, Default)]
pub struct PanelConfig {
    /// Base URL used for API calls, e.g. `https://panel.example.com`
    pub url: String,
    /// Base URL shown to customers. Usually the same as `url`, but may differ when the API is reached over a
    /// private network.
    pub public_url: String,
    /// An Application API key (`ptla_...`)
    pub api_key: Secret<String>,
}

impl PanelConfig {
    pub fn new(url: &str, api_key: &str) -> Self {
        let url = trim_base_url(url);
        Self { public_url: url.clone(), url, api_key: Secret::new(api_key.to_string()) }
    }

    pub fn new_from_env() -> Result<Self, PanelApiError> {
        let url = std::env::var("HOSTING_PANEL_URL")
            .map_err(|_| PanelApiError::Initialization("HOSTING_PANEL_URL is not set".into()))?;
        let api_key = std::env::var("HOSTING_PANEL_API_KEY")
            .map_err(|_| PanelApiError::Initialization("HOSTING_PANEL_API_KEY is not set".into()))?;
        let mut config = Self::new(&url, &api_key);
        match std::env::var("HOSTING_PANEL_PUBLIC_URL") {
            Ok(public) => config.public_url = trim_base_url(&public),
            Err(_) => debug!("🖥️ HOSTING_PANEL_PUBLIC_URL is not set. Customers will be sent to {}", config.url),
        }
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), PanelApiError> {
        if self.url.is_empty() {
            return Err(PanelApiError::Initialization("The panel URL is empty".into()));
        }
        if self.api_key.is_empty() {
            return Err(PanelApiError::Initialization("The panel API key is empty".into()));
        }
        Ok(())
    }

    /// The customer-facing link to a server's console.
    pub fn server_url(&self, identifier: &str) -> String {
        format!("{}/server/{identifier}", self.public_url)
    }
}
