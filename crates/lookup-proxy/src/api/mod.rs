//! HTTP API for the lookup proxy.

mod handlers;
mod middleware;
mod types;

pub use handlers::*;
pub use middleware::{
    logging_middleware, rate_limit_middleware, require_api_key, ApiKey, RateLimitState,
    API_KEY_HEADER,
};
pub use types::*;

use crate::error::ProxyError;
use crate::pending::PendingLogins;
use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use phone_lookup::{Connector, Credentials};
use secrecy::{ExposeSecret, SecretString};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Opens Telegram sessions
    pub connector: Arc<dyn Connector>,
    /// Sessions waiting for a login code
    pub pending: PendingLogins,
    /// Used when a request omits `app_id`
    pub default_api_id: Option<i32>,
    /// Used when a request omits `api_hash`
    pub default_api_hash: Option<SecretString>,
}

impl AppState {
    /// Create new application state.
    pub fn new(connector: Arc<dyn Connector>, pending: PendingLogins) -> Self {
        Self {
            connector,
            pending,
            default_api_id: None,
            default_api_hash: None,
        }
    }

    /// Set the app credentials used when requests omit them.
    pub fn with_defaults(mut self, api_id: Option<i32>, api_hash: Option<SecretString>) -> Self {
        self.default_api_id = api_id;
        self.default_api_hash = api_hash;
        self
    }

    /// Resolve the credentials a request acts with.
    pub fn credentials(&self, account: &AccountFields) -> Result<Credentials, ProxyError> {
        let api_id = account
            .app_id
            .or(self.default_api_id)
            .ok_or_else(|| ProxyError::MalformedRequest("app_id is required".into()))?;

        let api_hash = match account.api_hash.as_deref().filter(|h| !h.is_empty()) {
            Some(hash) => hash.to_string(),
            None => self
                .default_api_hash
                .as_ref()
                .map(|h| h.expose_secret().clone())
                .ok_or_else(|| ProxyError::MalformedRequest("api_hash is required".into()))?,
        };

        let phone_number = account.phone_number.trim();
        if phone_number.is_empty() {
            return Err(ProxyError::MalformedRequest(
                "phone_number is required".into(),
            ));
        }
        if !is_phone_number(phone_number) {
            return Err(ProxyError::MalformedRequest(format!(
                "phone_number is invalid: {}",
                phone_number
            )));
        }

        Ok(Credentials::new(api_id, api_hash, phone_number))
    }
}

/// An optional leading `+` followed by ASCII digits only.
fn is_phone_number(value: &str) -> bool {
    let digits = value.strip_prefix('+').unwrap_or(value);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

/// Startup settings for the router layers.
#[derive(Clone)]
pub struct RouterConfig {
    pub api_key: ApiKey,
    pub rate_limit: RateLimitState,
    pub cors_permissive: bool,
}

impl RouterConfig {
    pub fn new(api_key: ApiKey, rate_limit: RateLimitState) -> Self {
        Self {
            api_key,
            rate_limit,
            cors_permissive: false,
        }
    }
}

/// Create the API router.
///
/// The api key is checked before the rate limit, so rejected requests never
/// reach a handler or consume quota.
pub fn create_router(state: AppState, config: RouterConfig) -> Router {
    let router = Router::new()
        .route("/v1/api/auth/send-code", post(handlers::send_code))
        .route("/v1/api/auth/login", post(handlers::login))
        .route("/v1/api/accounts", post(handlers::accounts))
        .route_layer(axum_middleware::from_fn_with_state(
            config.rate_limit.clone(),
            rate_limit_middleware,
        ))
        .route_layer(axum_middleware::from_fn_with_state(
            config.api_key.clone(),
            require_api_key,
        ))
        // Health check (no api key, no rate limiting)
        .route("/health", get(handlers::health))
        .layer(axum_middleware::from_fn(logging_middleware))
        .layer(TraceLayer::new_for_http());

    let router = if config.cors_permissive {
        router.layer(CorsLayer::permissive())
    } else {
        router
    };

    router.with_state(state)
}
