use hosting_common::Money;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum PaymentGatewayError {
    #[error("Could not authenticate with the payment gateway: {0}")]
    AuthenticationFailed(String),
    #[error("The payment gateway rejected the request. Error {status}. {message}")]
    Rejected { status: u16, message: String },
    #[error("Could not reach the payment gateway: {0}")]
    Unavailable(String),
    #[error("The payment gateway sent a response we could not understand: {0}")]
    MalformedResponse(String),
    /// The gateway refused the capture because the order's funds were captured by an earlier call.
    #[error("Order {0} has already been captured")]
    AlreadyCaptured(String),
}

/// A request to create an order the buyer can approve at the payment gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayableOrder {
    /// The amount to charge, with any discount already applied
    pub amount: Money,
    pub currency: String,
    pub description: String,
    pub return_url: String,
    pub cancel_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayableOrderCreated {
    pub gateway_order_id: String,
    /// Where to send the buyer to approve the payment
    pub approve_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureReceipt {
    pub gateway_order_id: String,
    pub capture_id: Option<String>,
    /// The gateway's raw status string
    pub status: String,
    /// True only when the gateway reports the funds as captured
    pub completed: bool,
}

/// The payment gateway calls a checkout needs.
#[allow(async_fn_in_trait)]
pub trait PaymentGateway {
    async fn create_payable_order(&self, order: PayableOrder) -> Result<PayableOrderCreated, PaymentGatewayError>;

    /// Settles a previously approved order. A capture that the gateway processes but does not complete is returned as
    /// `Ok` with `completed == false`.
    async fn capture_order(&self, gateway_order_id: &str) -> Result<CaptureReceipt, PaymentGatewayError>;

    /// Reads the current state of an order without changing it. Used to recover the receipt of a capture that was made
    /// by an earlier call.
    async fn fetch_capture(&self, gateway_order_id: &str) -> Result<CaptureReceipt, PaymentGatewayError>;
}
