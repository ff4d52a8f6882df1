//! Session traits implemented by the grammers client and by test mocks.

use crate::error::TelegramError;
use crate::types::{Credentials, ImportedUser, SignInOutcome, UserRecord};
use async_trait::async_trait;

/// One connected Telegram session.
///
/// Login tokens handed out by the server are kept inside the session, so
/// `request_login_code` must precede `sign_in`, and a `PasswordRequired`
/// outcome must be followed by `check_password` on the same session.
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait]
pub trait TelegramApi: Send + Sync {
    /// Whether the stored session is already signed in.
    async fn is_authorized(&self) -> Result<bool, TelegramError>;

    /// Ask Telegram to deliver a login code to `phone_number`.
    async fn request_login_code(&self, phone_number: &str) -> Result<(), TelegramError>;

    /// Submit the login code received for the last requested number.
    async fn sign_in(&self, code: &str) -> Result<SignInOutcome, TelegramError>;

    /// Complete a two-step verification login.
    async fn check_password(&self, password: &str) -> Result<(), TelegramError>;

    /// Import a single phone contact with empty names.
    async fn import_contact(&self, phone_number: &str) -> Result<Vec<ImportedUser>, TelegramError>;

    /// Delete a contact; returns the user records carried by the response.
    async fn delete_contact(&self, user: &ImportedUser) -> Result<Vec<UserRecord>, TelegramError>;

    /// Persist the session and release the connection.
    async fn disconnect(&self) -> Result<(), TelegramError>;
}

/// Opens sessions for a set of credentials.
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(
        &self,
        credentials: &Credentials,
    ) -> Result<Box<dyn TelegramApi>, TelegramError>;
}
