use hosting_common::Money;
use serde::{Deserialize, Serialize};

use crate::db_types::{BillingCycle, OrderType, UserServer};

/// What the customer asked for at checkout. Everything is optional here so that validation happens in one place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutRequest {
    pub plan_id: Option<i64>,
    pub server_name: Option<String>,
    pub billing_cycle: Option<BillingCycle>,
    pub order_type: Option<OrderType>,
    /// The server a renewal or upgrade applies to
    pub user_server_id: Option<i64>,
}

impl CheckoutRequest {
    pub fn new(plan_id: i64, server_name: &str) -> Self {
        Self { plan_id: Some(plan_id), server_name: Some(server_name.to_string()), ..Default::default() }
    }

    pub fn with_billing_cycle(mut self, cycle: BillingCycle) -> Self {
        self.billing_cycle = Some(cycle);
        self
    }

    pub fn with_order_type(mut self, order_type: OrderType, user_server_id: Option<i64>) -> Self {
        self.order_type = Some(order_type);
        self.user_server_id = user_server_id;
        self
    }
}

/// A checkout that is waiting for the buyer to approve the payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutSession {
    pub gateway_order_id: String,
    pub approve_url: String,
    /// Our own order id
    pub order_id: i64,
    pub amount: Money,
    pub user_server_id: Option<i64>,
}

/// Where the payment gateway sends the buyer back to, and the currency orders are raised in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutSettings {
    pub currency: String,
    pub return_url: String,
    pub cancel_url: String,
}

impl Default for CheckoutSettings {
    fn default() -> Self {
        Self {
            currency: hosting_common::DEFAULT_CURRENCY_CODE.to_string(),
            return_url: "http://localhost:3000/checkout/success".to_string(),
            cancel_url: "http://localhost:3000/checkout/cancel".to_string(),
        }
    }
}

/// The result of a capture (or a provisioning retry).
///
/// `success` speaks for the payment only. A failed provisioning attempt after a good payment is still a success,
/// with the reason in `error`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureOutcome {
    pub success: bool,
    pub message: String,
    pub user_server_id: i64,
    /// The panel's short server identifier
    pub server_id: Option<String>,
    pub panel_username: Option<String>,
    /// Only present when a panel account was created by this call. It is never stored.
    pub panel_password: Option<String>,
    pub panel_url: Option<String>,
    pub error: Option<String>,
}

impl CaptureOutcome {
    pub fn paid(user_server_id: i64, message: &str) -> Self {
        Self { success: true, message: message.to_string(), user_server_id, ..Default::default() }
    }

    pub fn with_error(mut self, error: String) -> Self {
        self.error = Some(error);
        self
    }

    pub fn provisioning_failed(&self) -> bool {
        self.error.is_some()
    }
}

/// A customer's server as shown in their dashboard. Carries no credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerSummary {
    #[serde(flatten)]
    pub server: UserServer,
    pub panel_url: Option<String>,
}
