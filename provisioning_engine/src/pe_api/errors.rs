use thiserror::Error;

use crate::traits::{PaymentGatewayError, ProvisioningGatewayError, StoreError};

#[derive(Debug, Clone, Error)]
pub enum OrderFlowError {
    #[error("Invalid request: {0}")]
    InvalidInput(String),
    #[error("Plan {0} does not exist")]
    PlanNotFound(i64),
    #[error("Order {0} does not exist")]
    OrderNotFound(String),
    #[error("Server {0} does not exist")]
    UserServerNotFound(i64),
    /// Checkout should have created this record. Its absence points at a defect, not a user mistake.
    #[error("No pending server record exists for user {user_id} and plan {plan_id}")]
    ServerRecordNotFound { user_id: String, plan_id: i64 },
    /// The order is paid, but a later step failed before a result could be reported. Capturing again resumes it.
    #[error("Payment for order #{order_id} was received, but the order could not be completed yet. {reason}")]
    FulfilmentIncomplete { order_id: i64, reason: String },
    #[error("Payment for order {gateway_order_id} was not completed. Status: {status}")]
    PaymentNotCompleted { gateway_order_id: String, status: String },
    #[error("Payment gateway error: {0}")]
    PaymentGatewayError(#[from] PaymentGatewayError),
    #[error("The request conflicts with the current state: {0}")]
    InvalidState(String),
    #[error("Database error: {0}")]
    DatabaseError(#[from] StoreError),
}

/// Why a single provisioning attempt failed. These are reported inside a successful capture response, never as the
/// capture's own error.
#[derive(Debug, Clone, Error)]
pub enum ProvisioningError {
    #[error("No available allocations on node {0}")]
    NoAvailableAllocation(i64),
    #[error("{0}")]
    Panel(#[from] ProvisioningGatewayError),
    #[error("Could not record the provisioned server: {0}")]
    Database(#[from] StoreError),
}
