//! Check whether phone numbers belong to Telegram accounts.
//!
//! A number is probed by importing it as a contact on an authorized account,
//! reading the matched user, and deleting the contact again. This crate holds
//! the login flow, the probes, batching and result output; the Telegram
//! transport lives in `telegram-client`.

pub mod batch;
pub mod error;
pub mod probe;
pub mod prompt;
pub mod report;
pub mod session;

pub use batch::{check_accounts, split_phone_numbers, validate_users, BatchResult};
pub use error::LookupError;
pub use probe::{
    check_account, humanize_presence, probe, AccountCheck, AccountStatus, LookupResult,
    ProbeError, UserInfo,
};
pub use prompt::{CredentialPrompt, StaticPrompt};
pub use report::{render_results, write_results};
pub use session::{login, request_code, AuthState, SendCode, Session};

pub use telegram_client::{Connector, Credentials, GrammersConnector, TelegramApi, TelegramError};
