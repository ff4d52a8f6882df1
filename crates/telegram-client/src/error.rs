//! Telegram client errors.

use thiserror::Error;

/// Closed set of failures surfaced by a Telegram session.
///
/// RPC errors are classified once, here, so callers never inspect raw
/// error names.
#[derive(Error, Debug)]
pub enum TelegramError {
    #[error("A wait of {seconds} seconds is required")]
    FloodWait { seconds: u32 },

    #[error("The user has been deleted/deactivated")]
    UserDeactivated,

    #[error("The user is restricted")]
    UserRestricted,

    #[error("The phone number is not yet being used")]
    PhoneNumberUnoccupied,

    #[error("Two-step verification password required")]
    PasswordRequired,

    #[error("Invalid login code")]
    InvalidCode,

    #[error("Invalid two-step verification password")]
    InvalidPassword,

    #[error("No login code has been requested for this session")]
    NoLoginCode,

    #[error("RPC error {code}: {name}")]
    Rpc { code: i32, name: String },

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Session storage error: {0}")]
    Session(String),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl TelegramError {
    /// Classify an RPC error by its name and optional numeric value.
    pub fn from_rpc(code: i32, name: &str, value: Option<u32>) -> Self {
        match name {
            "FLOOD_WAIT" | "FLOOD_PREMIUM_WAIT" => TelegramError::FloodWait {
                seconds: value.unwrap_or_default(),
            },
            "USER_DEACTIVATED" | "USER_DEACTIVATED_BAN" => TelegramError::UserDeactivated,
            "USER_RESTRICTED" => TelegramError::UserRestricted,
            "PHONE_NUMBER_UNOCCUPIED" => TelegramError::PhoneNumberUnoccupied,
            "SESSION_PASSWORD_NEEDED" => TelegramError::PasswordRequired,
            "PHONE_CODE_INVALID" | "PHONE_CODE_EXPIRED" | "PHONE_CODE_EMPTY" => {
                TelegramError::InvalidCode
            }
            "PASSWORD_HASH_INVALID" => TelegramError::InvalidPassword,
            _ => TelegramError::Rpc {
                code,
                name: name.to_string(),
            },
        }
    }
}
