//! Sources for the login code and two-step verification password.

use crate::error::LookupError;
use async_trait::async_trait;
use secrecy::SecretString;

/// Supplies the values a login needs once Telegram has sent a code.
///
/// The CLI asks the terminal; the HTTP surface answers from the request body.
#[async_trait]
pub trait CredentialPrompt: Send + Sync {
    /// The login code delivered to `phone_number`.
    async fn login_code(&self, phone_number: &str) -> Result<String, LookupError>;

    /// The two-step verification password of `phone_number`.
    async fn password(&self, phone_number: &str) -> Result<SecretString, LookupError>;
}

/// Prompt answering with values known up front.
#[derive(Debug, Default)]
pub struct StaticPrompt {
    code: Option<String>,
    password: Option<SecretString>,
}

impl StaticPrompt {
    pub fn new(code: Option<String>, password: Option<String>) -> Self {
        Self {
            code: code.map(|c| c.trim().to_string()).filter(|c| !c.is_empty()),
            password: password.filter(|p| !p.is_empty()).map(SecretString::new),
        }
    }

    pub fn has_code(&self) -> bool {
        self.code.is_some()
    }
}

#[async_trait]
impl CredentialPrompt for StaticPrompt {
    async fn login_code(&self, _phone_number: &str) -> Result<String, LookupError> {
        self.code.clone().ok_or(LookupError::MissingCode)
    }

    async fn password(&self, _phone_number: &str) -> Result<SecretString, LookupError> {
        self.password.clone().ok_or(LookupError::PasswordRequired)
    }
}
