use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::PaypalApiError;

/// The order status PayPal reports once funds have been captured.
pub const COMPLETED_STATUS: &str = "COMPLETED";

#[derive(Clone, Deserialize)]
pub struct AccessToken {
    pub access_token: String,
    pub token_type: String,
    #[serde(default)]
    pub expires_in: u64,
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AccessToken({}, expires in {}s)", self.token_type, self.expires_in)
    }
}

//----------------------------------------------   Requests  ----------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct NewCheckoutOrder {
    pub intent: String,
    pub purchase_units: Vec<PurchaseUnit>,
    pub application_context: ApplicationContext,
}

impl NewCheckoutOrder {
    pub fn capture(unit: PurchaseUnit, context: ApplicationContext) -> Self {
        Self { intent: "CAPTURE".to_string(), purchase_units: vec![unit], application_context: context }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseUnit {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<Amount>,
    #[serde(default, skip_serializing)]
    pub payments: Option<UnitPayments>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Amount {
    pub currency_code: String,
    /// A decimal string with two fractional digits
    pub value: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ApplicationContext {
    pub return_url: String,
    pub cancel_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand_name: Option<String>,
    pub user_action: String,
    pub shipping_preference: String,
}

impl ApplicationContext {
    pub fn new(return_url: &str, cancel_url: &str, brand_name: Option<String>) -> Self {
        Self {
            return_url: return_url.to_string(),
            cancel_url: cancel_url.to_string(),
            brand_name,
            user_action: "PAY_NOW".to_string(),
            shipping_preference: "NO_SHIPPING".to_string(),
        }
    }
}

//----------------------------------------------   Responses  ----------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct Link {
    pub href: String,
    pub rel: String,
    #[serde(default)]
    pub method: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PaypalOrder {
    pub id: String,
    pub status: String,
    #[serde(default)]
    pub links: Vec<Link>,
    #[serde(default)]
    pub purchase_units: Vec<PurchaseUnit>,
    #[serde(default)]
    pub create_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UnitPayments {
    #[serde(default)]
    pub captures: Vec<PaymentCapture>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PaymentCapture {
    pub id: String,
    pub status: String,
    #[serde(default)]
    pub amount: Option<Amount>,
}

/// The result of creating an order: the PayPal order id, and the URL the buyer must visit to approve the payment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedOrder {
    pub order_id: String,
    pub approve_url: String,
}

impl TryFrom<PaypalOrder> for CreatedOrder {
    type Error = PaypalApiError;

    fn try_from(order: PaypalOrder) -> Result<Self, Self::Error> {
        let approve_url = order
            .links
            .iter()
            .find(|l| l.rel == "approve" || l.rel == "payer-action")
            .map(|l| l.href.clone())
            .ok_or_else(|| PaypalApiError::MissingField(format!("an approval link for order {}", order.id)))?;
        Ok(Self { order_id: order.id, approve_url })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureResult {
    pub order_id: String,
    pub status: String,
    /// The id of the first capture in the first purchase unit. Absent when the capture did not go through.
    pub capture_id: Option<String>,
}

impl CaptureResult {
    pub fn is_completed(&self) -> bool {
        self.status == COMPLETED_STATUS
    }
}

impl From<PaypalOrder> for CaptureResult {
    fn from(order: PaypalOrder) -> Self {
        let capture_id = order
            .purchase_units
            .iter()
            .filter_map(|u| u.payments.as_ref())
            .flat_map(|p| p.captures.iter())
            .map(|c| c.id.clone())
            .next();
        Self { order_id: order.id, status: order.status, capture_id }
    }
}
