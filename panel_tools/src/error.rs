use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PanelApiError {
    #[error("Could not initialize client: {0}")]
    Initialization(String),
    #[error("Invalid REST response: {0}")]
    RestResponseError(String),
    #[error("Could not deserialize JSON: {0}")]
    JsonError(String),
    #[error("Query failed. Error {status}. {message}")]
    QueryError { status: u16, message: String },
}

impl PanelApiError {
    /// Builds a [`PanelApiError::QueryError`] from a non-success response body.
    ///
    /// The panel reports failures as `{"errors": [{"code", "status", "detail"}]}`. The details are joined into the
    /// message. Bodies in any other shape are passed through verbatim.
    pub fn from_response(status: u16, body: &str) -> Self {
        #[derive(Deserialize)]
        struct ErrorBody {
            errors: Vec<ErrorItem>,
        }
        #[derive(Deserialize)]
        struct ErrorItem {
            #[serde(default)]
            code: String,
            #[serde(default)]
            detail: String,
        }
        let message = match serde_json::from_str::<ErrorBody>(body) {
            Ok(b) if !b.errors.is_empty() => {
                b.errors.iter().map(|e| format!("{}: {}", e.code, e.detail)).collect::<Vec<_>>().join("; ")
            },
            _ => body.to_string(),
        };
        Self::QueryError { status, message }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::QueryError { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The panel rejected the request itself. Repeating it unchanged will not help.
    pub fn is_client_error(&self) -> bool {
        matches!(self.status(), Some(s) if (400..500).contains(&s))
    }

    /// Server-side or network failures that may succeed if tried again later.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::QueryError { status, .. } => *status >= 500,
            Self::RestResponseError(_) => true,
            _ => false,
        }
    }
}
