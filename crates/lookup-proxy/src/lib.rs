//! Lookup Proxy - HTTP API for Telegram login and phone number lookups.
//!
//! Callers authenticate with a shared `api-key` header and act on a Telegram
//! account identified by its phone number:
//! - Send a login code and complete the login across two requests
//! - Check which phone numbers belong to Telegram accounts

pub mod api;
pub mod config;
pub mod error;
pub mod pending;

pub use config::Config;
pub use error::ProxyError;
pub use pending::PendingLogins;
