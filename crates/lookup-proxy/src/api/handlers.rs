//! HTTP request handlers.

use super::types::{
    AccountsRequest, EmptyData, Envelope, HealthResponse, LoginRequest, SendCodeRequest,
};
use super::AppState;
use crate::error::ProxyError;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use phone_lookup::{
    check_accounts, login as open_authorized, request_code, split_phone_numbers, AccountCheck,
    AuthState, BatchResult, LookupError, SendCode, Session, StaticPrompt, TelegramError,
};
use tracing::{info, warn};

/// Status plus enveloped body.
pub type ApiResponse<T> = (StatusCode, Json<Envelope<T>>);

fn respond(status: StatusCode, message: &str) -> ApiResponse<EmptyData> {
    (
        status,
        Json(Envelope::new(EmptyData::default(), message, status)),
    )
}

fn malformed(rejection: JsonRejection) -> ProxyError {
    ProxyError::MalformedRequest(rejection.body_text())
}

/// Health check endpoint.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        pending_logins: state.pending.len().await,
    })
}

/// Request a login code for an account.
///
/// Answers 201 when a code was sent and 200 when the stored session is
/// already authorized.
pub async fn send_code(
    State(state): State<AppState>,
    body: Result<Json<SendCodeRequest>, JsonRejection>,
) -> Result<ApiResponse<EmptyData>, ProxyError> {
    let Json(request) = body.map_err(malformed)?;
    let credentials = state.credentials(&request.account)?;
    info!(phone_number = %credentials.phone_number, "Send code request received");

    let outcome = request_code(state.connector.as_ref(), &credentials)
        .await
        .map_err(|e| {
            warn!(phone_number = %credentials.phone_number, "Send code failed: {}", e);
            ProxyError::SendCodeFailed(e.to_string())
        })?;

    let status = StatusCode::from_u16(outcome.status_code())
        .map_err(|e| ProxyError::Internal(e.to_string()))?;

    match outcome {
        SendCode::AlreadyAuthorized => Ok(respond(status, "session is already authorized")),
        SendCode::CodeSent(session) => {
            state.pending.park(session).await;
            Ok(respond(status, "login code sent"))
        }
    }
}

/// Log an account in.
///
/// Without a pending code this sends one first. With one pending, the body's
/// `code` (and `password` for two-step accounts) completes the sign-in. A
/// two-step account answered without `password` stays pending, and a later
/// request only needs the `password`.
pub async fn login(
    State(state): State<AppState>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<ApiResponse<EmptyData>, ProxyError> {
    let Json(request) = body.map_err(malformed)?;
    let credentials = state.credentials(&request.account)?;
    let prompt = StaticPrompt::new(request.code, request.password);
    info!(phone_number = %credentials.phone_number, "Login request received");

    let mut session = match state.pending.take(&credentials.phone_number).await {
        Some(session) => session,
        None => Session::open(state.connector.as_ref(), &credentials)
            .await
            .map_err(|e| ProxyError::LoginFailed(e.to_string()))?,
    };

    match session.state() {
        AuthState::Authorized => {
            session.close().await;
            Ok(respond(StatusCode::OK, "session is already authorized"))
        }
        AuthState::Unauthenticated => {
            if let Err(e) = session.send_code().await {
                session.close().await;
                return Err(ProxyError::SendCodeFailed(e.to_string()));
            }
            state.pending.park(session).await;
            Ok(respond(StatusCode::CREATED, "login code sent"))
        }
        AuthState::CodeSent if !prompt.has_code() => {
            state.pending.park(session).await;
            Err(ProxyError::MissingCode)
        }
        AuthState::CodeSent | AuthState::PasswordPending => {
            match session.complete_login(&prompt).await {
                Ok(()) => {
                    session.close().await;
                    Ok(respond(StatusCode::OK, "login is successful"))
                }
                Err(
                    e @ (LookupError::Telegram(TelegramError::InvalidCode)
                    | LookupError::PasswordRequired),
                ) => {
                    // The code or password can be resent on the same session
                    warn!(phone_number = %credentials.phone_number, "Login incomplete: {}", e);
                    state.pending.park(session).await;
                    Err(ProxyError::from_login(e))
                }
                Err(e) => {
                    warn!(phone_number = %credentials.phone_number, "Login failed: {}", e);
                    session.close().await;
                    Err(ProxyError::from_login(e))
                }
            }
        }
    }
}

/// Check registration status of each number on an authorized account.
pub async fn accounts(
    State(state): State<AppState>,
    body: Result<Json<AccountsRequest>, JsonRejection>,
) -> Result<ApiResponse<BatchResult<AccountCheck>>, ProxyError> {
    let Json(request) = body.map_err(malformed)?;
    let credentials = state.credentials(&request.account)?;

    if split_phone_numbers(&request.phone_numbers).is_empty() {
        return Err(ProxyError::EmptyPhoneNumbers);
    }

    let session = open_authorized(state.connector.as_ref(), &credentials, None)
        .await
        .map_err(|e| ProxyError::LookupFailed(e.to_string()))?
        .ok_or(ProxyError::NotAuthorized)?;

    let results = check_accounts(session.client(), &request.phone_numbers).await;
    session.close().await;

    let results = results.map_err(|e| match e {
        LookupError::EmptyInput => ProxyError::EmptyPhoneNumbers,
        e => ProxyError::LookupFailed(e.to_string()),
    })?;
    info!(
        phone_number = %credentials.phone_number,
        "Checked {} phone numbers",
        results.len()
    );

    Ok((
        StatusCode::OK,
        Json(Envelope::new(results, "accounts checked", StatusCode::OK)),
    ))
}
