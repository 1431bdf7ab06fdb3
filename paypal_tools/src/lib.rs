//! A thin client for the PayPal Orders v2 REST API.
//!
//! Only the two calls a checkout needs are wrapped: creating a payable order and capturing it once the buyer has
//! approved it. Every call performs its own client-credentials token exchange; tokens are never cached between calls.
mod api;
mod config;
mod data_objects;
mod error;

pub use api::PaypalApi;
pub use config::{PaypalConfig, PAYPAL_LIVE_URL, PAYPAL_SANDBOX_URL};
pub use data_objects::{
    AccessToken,
    Amount,
    ApplicationContext,
    CaptureResult,
    CreatedOrder,
    Link,
    NewCheckoutOrder,
    PaymentCapture,
    PaypalOrder,
    PurchaseUnit,
    COMPLETED_STATUS,
};
pub use error::PaypalApiError;
