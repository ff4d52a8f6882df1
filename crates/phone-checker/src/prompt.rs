//! Terminal prompts.

use async_trait::async_trait;
use dialoguer::{theme::ColorfulTheme, Input, Password};
use phone_lookup::{CredentialPrompt, Credentials, LookupError};
use secrecy::SecretString;

/// Asks the user on the terminal.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalPrompt;

impl TerminalPrompt {
    /// Fill in credentials missing from flags and environment.
    pub async fn credentials(
        &self,
        api_id: Option<i32>,
        api_hash: Option<String>,
        phone_number: Option<String>,
    ) -> Result<Credentials, LookupError> {
        let api_id = match api_id {
            Some(id) => id,
            None => {
                blocking(|| {
                    Input::<i32>::with_theme(&ColorfulTheme::default())
                        .with_prompt("Enter your Telegram App app_id")
                        .interact_text()
                })
                .await?
            }
        };

        let api_hash = match api_hash.filter(|h| !h.is_empty()) {
            Some(hash) => hash,
            None => {
                blocking(|| {
                    Password::with_theme(&ColorfulTheme::default())
                        .with_prompt("Enter your Telegram App api_hash")
                        .interact()
                })
                .await?
            }
        };

        let phone_number = match phone_number.filter(|p| !p.trim().is_empty()) {
            Some(phone) => phone,
            None => {
                blocking(|| {
                    Input::<String>::with_theme(&ColorfulTheme::default())
                        .with_prompt("Enter the number associated with your Telegram account")
                        .interact_text()
                })
                .await?
            }
        };

        Ok(Credentials::new(api_id, api_hash, phone_number.trim()))
    }

    /// Ask for the comma separated numbers to check.
    pub async fn phone_numbers(&self) -> Result<String, LookupError> {
        blocking(|| {
            Input::<String>::with_theme(&ColorfulTheme::default())
                .with_prompt("Enter the phone numbers to check, separated by commas")
                .interact_text()
        })
        .await
    }
}

#[async_trait]
impl CredentialPrompt for TerminalPrompt {
    async fn login_code(&self, _phone_number: &str) -> Result<String, LookupError> {
        let code = blocking(|| {
            Input::<String>::with_theme(&ColorfulTheme::default())
                .with_prompt("Enter the code (sent on telegram)")
                .interact_text()
        })
        .await?;
        Ok(code.trim().to_string())
    }

    async fn password(&self, _phone_number: &str) -> Result<SecretString, LookupError> {
        let password = blocking(|| {
            Password::with_theme(&ColorfulTheme::default())
                .with_prompt("Two-Step Verification enabled. Please enter your account password")
                .interact()
        })
        .await?;
        Ok(SecretString::new(password))
    }
}

/// Run a dialoguer prompt off the async runtime.
async fn blocking<T, F>(prompt: F) -> Result<T, LookupError>
where
    F: FnOnce() -> dialoguer::Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(prompt)
        .await
        .map_err(|e| LookupError::Prompt(e.to_string()))?
        .map_err(|e| LookupError::Prompt(e.to_string()))
}
