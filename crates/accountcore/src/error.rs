use thiserror::Error;

#[derive(Error, Debug)]
pub enum AccountError {
    #[error("Invalid Account: {0}")]
    Validation(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl AccountError {
    /// True when the failure was caused by the caller's payload rather than the backend
    pub fn is_client_error(&self) -> bool {
        matches!(self, AccountError::Validation(_))
    }
}
