//! Telegram MTProto session boundary.
//!
//! [`TelegramApi`] is the narrow set of RPCs the phone checker needs: login,
//! contact import and contact deletion. [`GrammersClient`] implements it on
//! top of grammers; everything vendor-specific (RPC error names, TL enums,
//! login tokens) stays inside this crate.

mod api;
mod client;
mod error;
mod types;

pub use api::{Connector, TelegramApi};
#[cfg(any(test, feature = "mock"))]
pub use api::{MockConnector, MockTelegramApi};
pub use client::{session_path, GrammersClient, GrammersConnector};
pub use error::TelegramError;
pub use types::*;
