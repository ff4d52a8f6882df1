//! Application error types.

use thiserror::Error;

/// Main application error type.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] anyhow::Error),

    #[error("{0}")]
    Lookup(#[from] phone_lookup::LookupError),

    #[error("Login did not complete for {0}")]
    NotLoggedIn(String),
}

/// Result type alias for application errors.
pub type AppResult<T> = Result<T, AppError>;
