//! Telegram session backed by grammers.

use crate::api::{Connector, TelegramApi};
use crate::error::TelegramError;
use crate::types::*;
use async_trait::async_trait;
use chrono::DateTime;
use grammers_client::types::{LoginToken, PasswordToken};
use grammers_client::{Client, Config, InitParams, InvocationError, SignInError};
use grammers_mtsender::AuthorizationError;
use grammers_session::Session;
use grammers_tl_types as tl;
use secrecy::ExposeSecret;
use std::path::{Component, Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

impl From<InvocationError> for TelegramError {
    fn from(err: InvocationError) -> Self {
        match err {
            InvocationError::Rpc(rpc) => TelegramError::from_rpc(rpc.code, &rpc.name, rpc.value),
            other => TelegramError::Connection(other.to_string()),
        }
    }
}

impl From<SignInError> for TelegramError {
    fn from(err: SignInError) -> Self {
        match err {
            SignInError::PasswordRequired(_) => TelegramError::PasswordRequired,
            SignInError::InvalidCode => TelegramError::InvalidCode,
            SignInError::InvalidPassword => TelegramError::InvalidPassword,
            SignInError::Other(e) => e.into(),
            other => TelegramError::Unexpected(other.to_string()),
        }
    }
}

impl From<AuthorizationError> for TelegramError {
    fn from(err: AuthorizationError) -> Self {
        match err {
            AuthorizationError::Invoke(e) => e.into(),
            AuthorizationError::Gen(e) => TelegramError::Connection(e.to_string()),
        }
    }
}

/// Session file used for a phone number inside `session_dir`.
///
/// The file name must stay a single plain path component, so a phone number
/// can never address a file outside `session_dir`.
pub fn session_path(session_dir: &Path, phone_number: &str) -> Result<PathBuf, TelegramError> {
    let file_name = format!("{}.session", phone_number);
    let mut components = Path::new(&file_name).components();

    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) if !phone_number.is_empty() => {
            Ok(session_dir.join(file_name))
        }
        _ => Err(TelegramError::Session(format!(
            "invalid session name: {:?}",
            phone_number
        ))),
    }
}

/// A connected grammers client plus the login state of an ongoing sign-in.
pub struct GrammersClient {
    client: Client,
    session_path: PathBuf,
    login_token: Mutex<Option<LoginToken>>,
    password_token: Mutex<Option<PasswordToken>>,
}

impl GrammersClient {
    /// Connect using the session file for `credentials.phone_number`,
    /// creating it when missing.
    #[instrument(skip(credentials), fields(phone_number = %credentials.phone_number))]
    pub async fn connect(
        credentials: &Credentials,
        session_dir: &Path,
    ) -> Result<Self, TelegramError> {
        let session_path = session_path(session_dir, &credentials.phone_number)?;
        let session = Session::load_file_or_create(&session_path)
            .map_err(|e| TelegramError::Session(e.to_string()))?;

        let client = Client::connect(Config {
            session,
            api_id: credentials.api_id,
            api_hash: credentials.api_hash.expose_secret().clone(),
            params: InitParams::default(),
        })
        .await?;

        debug!(path = %session_path.display(), "Connected to Telegram");

        Ok(Self {
            client,
            session_path,
            login_token: Mutex::new(None),
            password_token: Mutex::new(None),
        })
    }

    fn save_session(&self) -> Result<(), TelegramError> {
        self.client
            .session()
            .save_to_file(&self.session_path)
            .map_err(|e| TelegramError::Session(e.to_string()))
    }
}

#[async_trait]
impl TelegramApi for GrammersClient {
    async fn is_authorized(&self) -> Result<bool, TelegramError> {
        Ok(self.client.is_authorized().await?)
    }

    #[instrument(skip(self))]
    async fn request_login_code(&self, phone_number: &str) -> Result<(), TelegramError> {
        let token = self
            .client
            .request_login_code(phone_number)
            .await?;

        *self.login_token.lock().await = Some(token);
        info!("Login code requested");
        Ok(())
    }

    #[instrument(skip(self, code))]
    async fn sign_in(&self, code: &str) -> Result<SignInOutcome, TelegramError> {
        let mut login_token = self.login_token.lock().await;
        let token = login_token.as_ref().ok_or(TelegramError::NoLoginCode)?;

        match self.client.sign_in(token, code).await {
            Ok(_) => {
                login_token.take();
                self.save_session()?;
                Ok(SignInOutcome::Authorized)
            }
            Err(SignInError::PasswordRequired(password_token)) => {
                login_token.take();
                *self.password_token.lock().await = Some(password_token);
                Ok(SignInOutcome::PasswordRequired)
            }
            Err(e) => Err(e.into()),
        }
    }

    #[instrument(skip(self, password))]
    async fn check_password(&self, password: &str) -> Result<(), TelegramError> {
        let token = self
            .password_token
            .lock()
            .await
            .take()
            .ok_or(TelegramError::PasswordRequired)?;

        self.client
            .check_password(token, password.as_bytes())
            .await?;
        self.save_session()
    }

    #[instrument(skip(self))]
    async fn import_contact(&self, phone_number: &str) -> Result<Vec<ImportedUser>, TelegramError> {
        let request = tl::functions::contacts::ImportContacts {
            contacts: vec![tl::types::InputPhoneContact {
                client_id: 0,
                phone: phone_number.to_string(),
                first_name: String::new(),
                last_name: String::new(),
            }
            .into()],
        };

        let tl::enums::contacts::ImportedContacts::Contacts(imported) =
            self.client.invoke(&request).await?;

        let users: Vec<ImportedUser> = imported
            .users
            .into_iter()
            .filter_map(|user| match user {
                tl::enums::User::User(user) => Some(ImportedUser {
                    id: user.id,
                    access_hash: user.access_hash,
                }),
                tl::enums::User::Empty(_) => None,
            })
            .collect();

        debug!("Import matched {} users", users.len());
        Ok(users)
    }

    #[instrument(skip(self, user), fields(user_id = user.id))]
    async fn delete_contact(&self, user: &ImportedUser) -> Result<Vec<UserRecord>, TelegramError> {
        let request = tl::functions::contacts::DeleteContacts {
            id: vec![tl::types::InputUser {
                user_id: user.id,
                access_hash: user.access_hash.unwrap_or_default(),
            }
            .into()],
        };

        let users = match self.client.invoke(&request).await? {
            tl::enums::Updates::Updates(updates) => updates.users,
            tl::enums::Updates::Combined(updates) => updates.users,
            _ => Vec::new(),
        };

        Ok(users
            .into_iter()
            .filter_map(|user| match user {
                tl::enums::User::User(user) => Some(user_record(user)),
                tl::enums::User::Empty(_) => None,
            })
            .collect())
    }

    async fn disconnect(&self) -> Result<(), TelegramError> {
        if let Err(e) = self.save_session() {
            warn!("Failed to save session: {}", e);
            return Err(e);
        }
        debug!(path = %self.session_path.display(), "Session saved");
        Ok(())
    }
}

fn user_record(user: tl::types::User) -> UserRecord {
    UserRecord {
        id: user.id,
        username: user.username,
        usernames: user
            .usernames
            .unwrap_or_default()
            .into_iter()
            .map(|tl::enums::Username::Username(u)| u.username)
            .collect(),
        first_name: user.first_name,
        last_name: user.last_name,
        fake: user.fake,
        verified: user.verified,
        premium: user.premium,
        mutual_contact: user.mutual_contact,
        bot: user.bot,
        bot_chat_history: user.bot_chat_history,
        restricted: user.restricted,
        restriction_reason: user
            .restriction_reason
            .unwrap_or_default()
            .into_iter()
            .map(|tl::enums::RestrictionReason::Reason(r)| RestrictionReason {
                platform: r.platform,
                reason: r.reason,
                text: r.text,
            })
            .collect(),
        presence: presence(user.status),
        phone: user.phone,
    }
}

fn presence(status: Option<tl::enums::UserStatus>) -> UserPresence {
    match status {
        Some(tl::enums::UserStatus::Online(_)) => UserPresence::Online,
        Some(tl::enums::UserStatus::Offline(offline)) => {
            DateTime::from_timestamp(i64::from(offline.was_online), 0)
                .map(|was_online| UserPresence::Offline { was_online })
                .unwrap_or(UserPresence::Unknown)
        }
        Some(tl::enums::UserStatus::Recently(_)) => UserPresence::Recently,
        Some(tl::enums::UserStatus::LastWeek(_)) => UserPresence::LastWeek,
        Some(tl::enums::UserStatus::LastMonth(_)) => UserPresence::LastMonth,
        _ => UserPresence::Unknown,
    }
}

/// Opens grammers sessions stored under a directory.
#[derive(Debug, Clone)]
pub struct GrammersConnector {
    session_dir: PathBuf,
}

impl GrammersConnector {
    pub fn new(session_dir: impl Into<PathBuf>) -> Self {
        Self {
            session_dir: session_dir.into(),
        }
    }

    pub fn session_dir(&self) -> &Path {
        &self.session_dir
    }
}

#[async_trait]
impl Connector for GrammersConnector {
    async fn connect(
        &self,
        credentials: &Credentials,
    ) -> Result<Box<dyn TelegramApi>, TelegramError> {
        let client = GrammersClient::connect(credentials, &self.session_dir).await?;
        Ok(Box::new(client))
    }
}
