use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("We have an internal database engine (configuration/uptime etc.) error: {0}")]
    DatabaseError(String),
    #[error("The record already exists: {0}")]
    Duplicate(String),
    #[error("The record does not exist: {0}")]
    NotFound(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => StoreError::Duplicate(db.message().to_string()),
            sqlx::Error::RowNotFound => StoreError::NotFound(e.to_string()),
            _ => StoreError::DatabaseError(e.to_string()),
        }
    }
}
