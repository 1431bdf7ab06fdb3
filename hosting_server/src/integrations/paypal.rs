use log::*;
use paypal_tools::{CaptureResult, PaypalApi, PaypalApiError, PaypalConfig};
use provisioning_engine::traits::{
    CaptureReceipt,
    PayableOrder,
    PayableOrderCreated,
    PaymentGateway,
    PaymentGatewayError,
};

/// Runs checkout payments through PayPal.
#[derive(Clone)]
pub struct PaypalGateway {
    api: PaypalApi,
}

impl PaypalGateway {
    pub fn new(config: PaypalConfig) -> Result<Self, PaypalApiError> {
        let api = PaypalApi::new(config)?;
        Ok(Self { api })
    }
}

impl PaymentGateway for PaypalGateway {
    async fn create_payable_order(&self, order: PayableOrder) -> Result<PayableOrderCreated, PaymentGatewayError> {
        let created = self
            .api
            .create_order(order.amount, &order.currency, &order.description, &order.return_url, &order.cancel_url)
            .await
            .map_err(gateway_error)?;
        Ok(PayableOrderCreated { gateway_order_id: created.order_id, approve_url: created.approve_url })
    }

    async fn capture_order(&self, gateway_order_id: &str) -> Result<CaptureReceipt, PaymentGatewayError> {
        let result = self.api.capture_order(gateway_order_id).await.map_err(|e| {
            if e.is_already_captured() {
                PaymentGatewayError::AlreadyCaptured(gateway_order_id.to_string())
            } else {
                gateway_error(e)
            }
        })?;
        Ok(receipt(result))
    }

    async fn fetch_capture(&self, gateway_order_id: &str) -> Result<CaptureReceipt, PaymentGatewayError> {
        let result = self.api.fetch_order(gateway_order_id).await.map_err(gateway_error)?;
        Ok(receipt(result))
    }
}

fn receipt(result: CaptureResult) -> CaptureReceipt {
    let completed = result.is_completed();
    if !completed {
        info!("💳️ PayPal order {} is not captured. Status: {}", result.order_id, result.status);
    }
    CaptureReceipt { gateway_order_id: result.order_id, capture_id: result.capture_id, status: result.status, completed }
}

pub fn gateway_error(e: PaypalApiError) -> PaymentGatewayError {
    match e {
        PaypalApiError::AuthenticationFailed(s) => PaymentGatewayError::AuthenticationFailed(s),
        PaypalApiError::QueryError { status, message } => PaymentGatewayError::Rejected { status, message },
        PaypalApiError::RestResponseError(s) | PaypalApiError::Initialization(s) => {
            PaymentGatewayError::Unavailable(s)
        },
        PaypalApiError::JsonError(_) | PaypalApiError::MissingField(_) => {
            PaymentGatewayError::MalformedResponse(e.to_string())
        },
    }
}
