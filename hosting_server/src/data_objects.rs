use std::str::FromStr;

use provisioning_engine::{
    db_types::{BillingCycle, OrderType},
    order_objects::{CaptureOutcome, CheckoutRequest, CheckoutSession, ServerSummary},
};
use serde::{Deserialize, Serialize};

use crate::errors::ServerError;

/// `POST /api/orders` body. Every field is optional at this level so that missing values produce a specific message
/// instead of a generic deserialization error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderParams {
    pub plan_id: Option<i64>,
    pub server_name: Option<String>,
    /// `month`/`monthly`, `quarter`/`quarterly` or `year`/`yearly`. Defaults to monthly.
    pub billing_cycle: Option<String>,
    /// `new`, `renew` or `upgrade`. Defaults to `new`.
    pub order_type: Option<String>,
    pub user_server_id: Option<i64>,
}

impl TryFrom<CreateOrderParams> for CheckoutRequest {
    type Error = ServerError;

    fn try_from(params: CreateOrderParams) -> Result<Self, Self::Error> {
        let billing_cycle = params
            .billing_cycle
            .filter(|s| !s.trim().is_empty())
            .map(|s| BillingCycle::from_str(s.trim()))
            .transpose()
            .map_err(|e| ServerError::InvalidRequestBody(format!("billingCycle: {e}")))?;
        let order_type = params
            .order_type
            .filter(|s| !s.trim().is_empty())
            .map(|s| OrderType::from_str(s.trim()))
            .transpose()
            .map_err(|e| ServerError::InvalidRequestBody(format!("orderType: {e}")))?;
        Ok(CheckoutRequest {
            plan_id: params.plan_id,
            server_name: params.server_name,
            billing_cycle,
            order_type,
            user_server_id: params.user_server_id,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderResponse {
    /// The PayPal order id
    pub order_id: String,
    pub approve_url: String,
    pub db_order_id: i64,
}

impl From<CheckoutSession> for CreateOrderResponse {
    fn from(session: CheckoutSession) -> Self {
        Self { order_id: session.gateway_order_id, approve_url: session.approve_url, db_order_id: session.order_id }
    }
}

/// `POST /api/orders/capture` body
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureOrderParams {
    #[serde(default)]
    pub paypal_order_id: String,
}

/// The capture result as the storefront sees it. `success` is about the payment; a provisioning problem shows up in
/// `error` alongside `success: true`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureOrderResponse {
    pub success: bool,
    pub message: String,
    pub user_server_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub panel_username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub panel_password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub panel_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<CaptureOutcome> for CaptureOrderResponse {
    fn from(outcome: CaptureOutcome) -> Self {
        Self {
            success: outcome.success,
            message: outcome.message,
            user_server_id: outcome.user_server_id,
            server_id: outcome.server_id,
            panel_username: outcome.panel_username,
            panel_password: outcome.panel_password,
            panel_url: outcome.panel_url,
            error: outcome.error,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerView {
    pub id: i64,
    pub plan_id: i64,
    pub name: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub panel_username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub panel_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<String>,
    pub created_at: String,
}

impl From<ServerSummary> for ServerView {
    fn from(summary: ServerSummary) -> Self {
        let server = summary.server;
        Self {
            id: server.id,
            plan_id: server.plan_id,
            name: server.name,
            status: server.status.to_string(),
            panel_username: server.panel_username,
            server_id: server.panel_server_identifier,
            panel_url: summary.panel_url,
            expires_at: server.expires_at.map(|t| t.to_rfc3339()),
            created_at: server.created_at.to_rfc3339(),
        }
    }
}
