//! API request and response types.

use axum::http::StatusCode;
use serde::{de, Deserialize, Deserializer, Serialize};

/// Body of every API response.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub data: T,
    pub message: String,
    /// Mirrors the HTTP status of the response.
    pub code: u16,
}

impl<T> Envelope<T> {
    pub fn new(data: T, message: impl Into<String>, status: StatusCode) -> Self {
        Self {
            data,
            message: message.into(),
            code: status.as_u16(),
        }
    }
}

/// Serialized as `{}`.
#[derive(Debug, Default, Serialize)]
pub struct EmptyData {}

/// Fields identifying the account a request acts on.
///
/// `app_id` and `api_hash` fall back to the server defaults when omitted.
#[derive(Debug, Deserialize)]
pub struct AccountFields {
    #[serde(default, deserialize_with = "app_id")]
    pub app_id: Option<i32>,

    #[serde(default)]
    pub api_hash: Option<String>,

    pub phone_number: String,
}

/// Request to send a login code.
#[derive(Debug, Deserialize)]
pub struct SendCodeRequest {
    #[serde(flatten)]
    pub account: AccountFields,
}

/// Request to log in, sending a code first when none is pending.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(flatten)]
    pub account: AccountFields,

    /// Login code delivered by Telegram
    #[serde(default)]
    pub code: Option<String>,

    /// Two-step verification password
    #[serde(default)]
    pub password: Option<String>,
}

/// Request to check phone numbers.
#[derive(Debug, Deserialize)]
pub struct AccountsRequest {
    #[serde(flatten)]
    pub account: AccountFields,

    /// Comma separated phone numbers
    #[serde(default)]
    pub phone_numbers: String,
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub pending_logins: usize,
}

/// Accepts `app_id` as a JSON number or a numeric string.
fn app_id<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum AppId {
        Number(i32),
        Text(String),
    }

    match Option::<AppId>::deserialize(deserializer)? {
        None => Ok(None),
        Some(AppId::Number(id)) => Ok(Some(id)),
        Some(AppId::Text(text)) if text.trim().is_empty() => Ok(None),
        Some(AppId::Text(text)) => text
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| de::Error::custom(format!("app_id is not a number: {}", text))),
    }
}
