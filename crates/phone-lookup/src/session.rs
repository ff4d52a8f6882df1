//! Session lifecycle and the login flow.

use crate::error::LookupError;
use crate::prompt::CredentialPrompt;
use secrecy::ExposeSecret;
use std::fmt;
use telegram_client::{Connector, Credentials, SignInOutcome, TelegramApi};
use tracing::{debug, info, instrument, warn};

/// Authorization state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    Unauthenticated,
    /// A login code was requested and sign-in is pending.
    CodeSent,
    /// The code was accepted; the two-step verification password is pending.
    PasswordPending,
    Authorized,
}

/// An open connection to Telegram for one account phone number.
///
/// Call [`Session::close`] when done; it persists the vendor session file.
pub struct Session {
    phone_number: String,
    state: AuthState,
    client: Box<dyn TelegramApi>,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("phone_number", &self.phone_number)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Connect and read the authorization state.
    #[instrument(skip(connector, credentials), fields(phone_number = %credentials.phone_number))]
    pub async fn open(
        connector: &dyn Connector,
        credentials: &Credentials,
    ) -> Result<Self, LookupError> {
        let client = connector.connect(credentials).await?;

        let authorized = match client.is_authorized().await {
            Ok(authorized) => authorized,
            Err(e) => {
                if let Err(close_err) = client.disconnect().await {
                    warn!("Failed to close session: {}", close_err);
                }
                return Err(e.into());
            }
        };

        let state = if authorized {
            AuthState::Authorized
        } else {
            AuthState::Unauthenticated
        };
        debug!(?state, "Session opened");

        Ok(Self {
            phone_number: credentials.phone_number.clone(),
            state,
            client,
        })
    }

    pub fn phone_number(&self) -> &str {
        &self.phone_number
    }

    pub fn state(&self) -> AuthState {
        self.state
    }

    pub fn is_authorized(&self) -> bool {
        self.state == AuthState::Authorized
    }

    /// The underlying Telegram client.
    pub fn client(&self) -> &dyn TelegramApi {
        self.client.as_ref()
    }

    /// Ask Telegram to send a login code to the session's phone number.
    pub async fn send_code(&mut self) -> Result<(), LookupError> {
        self.client.request_login_code(&self.phone_number).await?;
        self.state = AuthState::CodeSent;
        info!(phone_number = %self.phone_number, "Login code sent");
        Ok(())
    }

    /// Finish a login started with [`Session::send_code`].
    ///
    /// Asks `prompt` for the code, and for the password when the account has
    /// two-step verification enabled. If the prompt has no password the
    /// session moves to [`AuthState::PasswordPending`], and a later call only
    /// asks for the password.
    pub async fn complete_login(
        &mut self,
        prompt: &dyn CredentialPrompt,
    ) -> Result<(), LookupError> {
        match self.state {
            AuthState::Authorized => return Ok(()),
            AuthState::Unauthenticated => {
                return Err(telegram_client::TelegramError::NoLoginCode.into())
            }
            AuthState::CodeSent => {
                let code = prompt.login_code(&self.phone_number).await?;
                if let SignInOutcome::Authorized = self.client.sign_in(&code).await? {
                    self.mark_authorized();
                    return Ok(());
                }
                info!(phone_number = %self.phone_number, "Two-step verification enabled");
                self.state = AuthState::PasswordPending;
            }
            AuthState::PasswordPending => {}
        }

        let password = prompt.password(&self.phone_number).await?;
        self.client.check_password(password.expose_secret()).await?;
        self.mark_authorized();
        Ok(())
    }

    fn mark_authorized(&mut self) {
        self.state = AuthState::Authorized;
        info!(phone_number = %self.phone_number, "Signed in");
    }

    /// Persist and release the session. Failures are logged, not returned.
    pub async fn close(self) {
        match self.client.disconnect().await {
            Ok(()) => debug!(phone_number = %self.phone_number, "Session closed"),
            Err(e) => warn!(phone_number = %self.phone_number, "Failed to close session: {}", e),
        }
    }
}

/// Establish a session, or reuse the stored one.
///
/// Without a `prompt` no code is ever sent: an unauthorized session is closed
/// and `None` is returned. With a prompt, a login code is requested and the
/// prompt supplies the code and, if needed, the two-step password. The session
/// is closed before any error is returned.
pub async fn login(
    connector: &dyn Connector,
    credentials: &Credentials,
    prompt: Option<&dyn CredentialPrompt>,
) -> Result<Option<Session>, LookupError> {
    let mut session = Session::open(connector, credentials).await?;

    if session.is_authorized() {
        info!(phone_number = %session.phone_number, "Reusing authorized session");
        return Ok(Some(session));
    }

    let Some(prompt) = prompt else {
        info!(phone_number = %session.phone_number, "Session not authorized");
        session.close().await;
        return Ok(None);
    };

    if let Err(e) = session.send_code().await {
        session.close().await;
        return Err(e);
    }
    if let Err(e) = session.complete_login(prompt).await {
        session.close().await;
        return Err(e);
    }

    Ok(Some(session))
}

/// Result of the send-code half of a login.
#[derive(Debug)]
pub enum SendCode {
    AlreadyAuthorized,
    /// The session holding the pending login; pass it to
    /// [`Session::complete_login`] once the code is known.
    CodeSent(Session),
}

impl SendCode {
    /// Numeric status reported to API callers.
    pub fn status_code(&self) -> u16 {
        match self {
            SendCode::AlreadyAuthorized => 200,
            SendCode::CodeSent(_) => 201,
        }
    }
}

/// Open a session and request a login code unless it is already authorized.
pub async fn request_code(
    connector: &dyn Connector,
    credentials: &Credentials,
) -> Result<SendCode, LookupError> {
    let mut session = Session::open(connector, credentials).await?;

    if session.is_authorized() {
        session.close().await;
        return Ok(SendCode::AlreadyAuthorized);
    }

    match session.send_code().await {
        Ok(()) => Ok(SendCode::CodeSent(session)),
        Err(e) => {
            session.close().await;
            Err(e)
        }
    }
}
