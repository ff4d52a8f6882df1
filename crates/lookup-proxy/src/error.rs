//! Error types for the lookup proxy.

use crate::api::{EmptyData, Envelope};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use phone_lookup::LookupError;
use thiserror::Error;

/// Proxy error types.
#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("api key is invalid")]
    InvalidApiKey,

    #[error("request body is malformed: {0}")]
    MalformedRequest(String),

    #[error("request body is malformed: phone_numbers is empty")]
    EmptyPhoneNumbers,

    #[error("request body is malformed: code is required once a login code was sent")]
    MissingCode,

    #[error("session is not authorized, login first")]
    NotAuthorized,

    #[error("two-step verification is enabled, resend the login request with password")]
    PasswordRequired,

    #[error("send code request is failed: {0}")]
    SendCodeFailed(String),

    #[error("login is failed: {0}")]
    LoginFailed(String),

    #[error("account lookup is failed: {0}")]
    LookupFailed(String),

    #[error("rate limit exceeded")]
    RateLimitExceeded,

    #[error("internal error: {0}")]
    Internal(String),
}

impl ProxyError {
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::InvalidApiKey
            | ProxyError::NotAuthorized
            | ProxyError::PasswordRequired => StatusCode::UNAUTHORIZED,
            ProxyError::MalformedRequest(_)
            | ProxyError::EmptyPhoneNumbers
            | ProxyError::MissingCode => StatusCode::PAYLOAD_TOO_LARGE,
            ProxyError::RateLimitExceeded => StatusCode::TOO_MANY_REQUESTS,
            ProxyError::SendCodeFailed(_)
            | ProxyError::LoginFailed(_)
            | ProxyError::LookupFailed(_)
            | ProxyError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Map a failed sign-in onto the login endpoint's answers.
    pub fn from_login(e: LookupError) -> Self {
        match e {
            LookupError::PasswordRequired => ProxyError::PasswordRequired,
            LookupError::MissingCode => ProxyError::MissingCode,
            e => ProxyError::LoginFailed(e.to_string()),
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Envelope::new(EmptyData::default(), self.to_string(), status);

        (status, Json(body)).into_response()
    }
}
