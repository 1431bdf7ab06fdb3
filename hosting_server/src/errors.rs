use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use log::*;
use provisioning_engine::OrderFlowError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("An error occurred on the backend of the server. {0}")]
    BackendError(String),
    #[error("{0}")]
    InvalidRequestBody(String),
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
    #[error("Invalid server configuration. {0}")]
    ConfigurationError(String),
    #[error("{0}")]
    AuthenticationError(#[from] AuthError),
    #[error("{0}")]
    NoRecordFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    PaymentNotCompleted(String),
    #[error("Payment processing failed. {0}")]
    PaymentGatewayError(String),
    /// The checkout left no server record behind. Distinct from a not-found so that support can tell it apart.
    #[error("Server record not found. {0}")]
    MissingServerRecord(String),
    /// The customer has been charged. The message says so, and capturing again picks up where this call stopped.
    #[error("{0}")]
    FulfilmentIncomplete(String),
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequestBody(_) => StatusCode::BAD_REQUEST,
            Self::PaymentNotCompleted(_) => StatusCode::BAD_REQUEST,
            Self::AuthenticationError(e) => match e {
                AuthError::MissingToken => StatusCode::UNAUTHORIZED,
                AuthError::ValidationError(_) => StatusCode::UNAUTHORIZED,
                AuthError::PoorlyFormattedToken(_) => StatusCode::UNAUTHORIZED,
                AuthError::InsufficientPermissions(_) => StatusCode::FORBIDDEN,
            },
            Self::NoRecordFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::InitializeError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BackendError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::IOError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ConfigurationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::PaymentGatewayError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::MissingServerRecord(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::FulfilmentIncomplete(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .body(serde_json::json!({ "error": self.to_string() }).to_string())
    }
}

#[derive(Debug, Clone, Error)]
pub enum AuthError {
    #[error("Authentication required.")]
    MissingToken,
    #[error("Access token is not in the correct format. {0}")]
    PoorlyFormattedToken(String),
    #[error("Access token is invalid. {0}")]
    ValidationError(String),
    #[error("Insufficient permissions. {0}")]
    InsufficientPermissions(String),
}

impl From<OrderFlowError> for ServerError {
    fn from(e: OrderFlowError) -> Self {
        match e {
            OrderFlowError::InvalidInput(s) => Self::InvalidRequestBody(s),
            OrderFlowError::PlanNotFound(_) => Self::NoRecordFound(e.to_string()),
            OrderFlowError::OrderNotFound(_) => Self::NoRecordFound(e.to_string()),
            OrderFlowError::UserServerNotFound(_) => Self::NoRecordFound(e.to_string()),
            OrderFlowError::ServerRecordNotFound { .. } => {
                error!("💻️ {e}");
                Self::MissingServerRecord(e.to_string())
            },
            OrderFlowError::FulfilmentIncomplete { .. } => {
                error!("💻️ {e}");
                Self::FulfilmentIncomplete(e.to_string())
            },
            OrderFlowError::PaymentNotCompleted { .. } => Self::PaymentNotCompleted(e.to_string()),
            OrderFlowError::PaymentGatewayError(inner) => {
                warn!("💻️ Payment gateway call failed. {inner}");
                Self::PaymentGatewayError(inner.to_string())
            },
            OrderFlowError::InvalidState(s) => Self::Conflict(s),
            OrderFlowError::DatabaseError(inner) => Self::BackendError(format!("Database error: {inner}")),
        }
    }
}
