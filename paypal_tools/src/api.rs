use std::sync::Arc;

use hosting_common::Money;
use log::*;
use reqwest::{header::HeaderValue, Client, Method};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use crate::{
    config::PaypalConfig,
    data_objects::{AccessToken, Amount, ApplicationContext, NewCheckoutOrder, PaypalOrder, PurchaseUnit},
    CaptureResult,
    CreatedOrder,
    PaypalApiError,
};

#[derive(Clone)]
pub struct PaypalApi {
    config: PaypalConfig,
    client: Arc<Client>,
}

impl PaypalApi {
    pub fn new(config: PaypalConfig) -> Result<Self, PaypalApiError> {
        config.validate()?;
        let client = Client::builder()
            .user_agent(concat!("hosting-paypal/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| PaypalApiError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    pub fn config(&self) -> &PaypalConfig {
        &self.config
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.api_url)
    }

    /// Exchanges the client credentials for a short-lived bearer token.
    pub async fn access_token(&self) -> Result<AccessToken, PaypalApiError> {
        let url = self.url("/v1/oauth2/token");
        trace!("💳️ Requesting PayPal access token from {url}");
        let response = self
            .client
            .post(url)
            .basic_auth(self.config.client_id.reveal(), Some(self.config.client_secret.reveal()))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .map_err(|e| PaypalApiError::AuthenticationFailed(e.to_string()))?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            warn!("💳️ PayPal rejected the client credentials. Status {status}");
            return Err(PaypalApiError::AuthenticationFailed(format!("Error {status}. {message}")));
        }
        response.json::<AccessToken>().await.map_err(|e| PaypalApiError::JsonError(e.to_string()))
    }

    pub async fn rest_query<T: DeserializeOwned, B: Serialize>(
        &self,
        method: Method,
        path: &str,
        body: Option<B>,
    ) -> Result<T, PaypalApiError> {
        let token = self.access_token().await?;
        let url = self.url(path);
        trace!("💳️ Sending REST query: {url}");
        let bearer = HeaderValue::from_str(&format!("Bearer {}", token.access_token))
            .map_err(|e| PaypalApiError::AuthenticationFailed(e.to_string()))?;
        let mut req = self.client.request(method, url).header("Authorization", bearer);
        if let Some(body) = body {
            req = req.json(&body);
        }
        let response = req.send().await.map_err(|e| PaypalApiError::RestResponseError(e.to_string()))?;
        if response.status().is_success() {
            trace!("💳️ REST query successful. {}", response.status());
            response.json::<T>().await.map_err(|e| PaypalApiError::JsonError(e.to_string()))
        } else {
            let status = response.status().as_u16();
            let message = response.text().await.map_err(|e| PaypalApiError::RestResponseError(e.to_string()))?;
            Err(PaypalApiError::QueryError { status, message })
        }
    }

    /// Creates a CAPTURE-intent order for `amount` and returns the buyer approval link.
    ///
    /// An empty `currency` falls back to the configured one.
    pub async fn create_order(
        &self,
        amount: Money,
        currency: &str,
        description: &str,
        return_url: &str,
        cancel_url: &str,
    ) -> Result<CreatedOrder, PaypalApiError> {
        let currency = if currency.is_empty() { self.config.currency.as_str() } else { currency };
        let unit = PurchaseUnit {
            reference_id: None,
            description: Some(description.to_string()),
            amount: Some(Amount { currency_code: currency.to_uppercase(), value: amount.to_string() }),
            payments: None,
        };
        let context = ApplicationContext::new(return_url, cancel_url, self.config.brand_name.clone());
        let body = NewCheckoutOrder::capture(unit, context);
        debug!("💳️ Creating PayPal order for {amount} {currency}: {description}");
        let order = self.rest_query::<PaypalOrder, _>(Method::POST, "/v2/checkout/orders", Some(body)).await?;
        let created = CreatedOrder::try_from(order)?;
        info!("💳️ Created PayPal order {}", created.order_id);
        Ok(created)
    }

    /// Captures the funds of a previously approved order.
    ///
    /// A capture that PayPal processes but does not complete is still `Ok`. Check [`CaptureResult::is_completed`].
    pub async fn capture_order(&self, order_id: &str) -> Result<CaptureResult, PaypalApiError> {
        let path = format!("/v2/checkout/orders/{order_id}/capture");
        debug!("💳️ Capturing PayPal order {order_id}");
        let order = self.rest_query::<PaypalOrder, Value>(Method::POST, &path, Some(serde_json::json!({}))).await?;
        let result = CaptureResult::from(order);
        info!("💳️ PayPal order {order_id} capture status: {}", result.status);
        Ok(result)
    }

    /// Reads an order without changing it. The result has the same shape as a capture, so the status and capture id of
    /// an order that was captured earlier can be recovered.
    pub async fn fetch_order(&self, order_id: &str) -> Result<CaptureResult, PaypalApiError> {
        let path = format!("/v2/checkout/orders/{order_id}");
        debug!("💳️ Fetching PayPal order {order_id}");
        let order = self.rest_query::<PaypalOrder, Value>(Method::GET, &path, None).await?;
        let result = CaptureResult::from(order);
        debug!("💳️ PayPal order {order_id} is {}", result.status);
        Ok(result)
    }
}
