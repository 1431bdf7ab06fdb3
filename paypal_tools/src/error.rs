use thiserror::Error;

#[derive(Debug, Error)]
pub enum PaypalApiError {
    #[error("Could not initialize client: {0}")]
    Initialization(String),
    #[error("Could not obtain an access token: {0}")]
    AuthenticationFailed(String),
    #[error("Invalid REST response: {0}")]
    RestResponseError(String),
    #[error("Could not deserialize JSON: {0}")]
    JsonError(String),
    #[error("Query failed. Error {status}. {message}")]
    QueryError { status: u16, message: String },
    #[error("The PayPal response is missing {0}")]
    MissingField(String),
}

impl PaypalApiError {
    /// PayPal answers a second capture of the same order with a 422 and this issue code.
    pub fn is_already_captured(&self) -> bool {
        matches!(self, Self::QueryError { status: 422, message } if message.contains("ORDER_ALREADY_CAPTURED"))
    }
}
