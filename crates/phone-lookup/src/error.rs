//! Lookup errors.

use telegram_client::TelegramError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LookupError {
    #[error("Telegram error: {0}")]
    Telegram(#[from] TelegramError),

    #[error("Two-step verification is enabled but no password was provided")]
    PasswordRequired,

    #[error("No login code was provided")]
    MissingCode,

    #[error("Prompt failed: {0}")]
    Prompt(String),

    #[error("Session for {0} is not authorized")]
    NotAuthorized(String),

    #[error("No phone numbers to check")]
    EmptyInput,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
