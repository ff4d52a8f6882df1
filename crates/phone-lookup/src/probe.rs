//! Contact-import probes for a single phone number.
//!
//! A number is looked up by importing it as a contact and reading back the
//! matched user. Any contact that gets imported is deleted again before the
//! probe returns; a failed delete becomes the probe's result.

use chrono::{DateTime, Utc};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use telegram_client::{RestrictionReason, TelegramApi, TelegramError, UserPresence, UserRecord};
use thiserror::Error;
use tracing::{info, instrument, warn};

/// Profile of the user behind a phone number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserInfo {
    pub id: i64,
    pub username: Option<String>,
    pub usernames: Vec<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub fake: bool,
    pub verified: bool,
    pub premium: bool,
    pub mutual_contact: bool,
    pub bot: bool,
    pub bot_chat_history: bool,
    pub restricted: bool,
    pub restriction_reason: Vec<RestrictionReason>,
    pub user_was_online: String,
    pub phone: Option<String>,
}

impl From<UserRecord> for UserInfo {
    fn from(record: UserRecord) -> Self {
        Self {
            user_was_online: humanize_presence(&record.presence),
            id: record.id,
            username: record.username,
            usernames: record.usernames,
            first_name: record.first_name,
            last_name: record.last_name,
            fake: record.fake,
            verified: record.verified,
            premium: record.premium,
            mutual_contact: record.mutual_contact,
            bot: record.bot,
            bot_chat_history: record.bot_chat_history,
            restricted: record.restricted,
            restriction_reason: record.restriction_reason,
            phone: record.phone,
        }
    }
}

/// Human readable last-seen text.
pub fn humanize_presence(presence: &UserPresence) -> String {
    match presence {
        UserPresence::Online => "Currently online".to_string(),
        UserPresence::Offline { was_online } => format_timestamp(was_online),
        UserPresence::Recently => "Last seen recently".to_string(),
        UserPresence::LastWeek => "Last seen last week".to_string(),
        UserPresence::LastMonth => "Last seen last month".to_string(),
        UserPresence::Unknown => "Unknown".to_string(),
    }
}

fn format_timestamp(at: &DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M:%S %Z").to_string()
}

/// Why a probe produced no profile.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProbeError {
    #[error("No response, the phone number is not on Telegram or has blocked contact adding.")]
    NotRegistered,

    #[error("This phone number matched {0} Telegram accounts, which is unexpected.")]
    AmbiguousMatch(usize),

    #[error("Failed to delete {phone} from the contact list: {reason}")]
    DeleteFailed { phone: String, reason: String },

    #[error("Rate limited by Telegram, a wait of {seconds} seconds is required.")]
    FloodWait { seconds: u32 },

    #[error("The account is deactivated.")]
    Deactivated,

    #[error("The account is restricted.")]
    Restricted,

    #[error("Unexpected error: {0}.")]
    Unexpected(String),
}

impl From<TelegramError> for ProbeError {
    fn from(err: TelegramError) -> Self {
        match err {
            TelegramError::FloodWait { seconds } => ProbeError::FloodWait { seconds },
            TelegramError::UserDeactivated => ProbeError::Deactivated,
            TelegramError::UserRestricted => ProbeError::Restricted,
            TelegramError::PhoneNumberUnoccupied => ProbeError::NotRegistered,
            other => ProbeError::Unexpected(other.to_string()),
        }
    }
}

/// Outcome of a full probe.
///
/// Serializes as the user object, or as `{"error": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupResult {
    Found(Box<UserInfo>),
    Failed(ProbeError),
}

impl LookupResult {
    pub fn user(&self) -> Option<&UserInfo> {
        match self {
            LookupResult::Found(user) => Some(user),
            LookupResult::Failed(_) => None,
        }
    }

    pub fn error(&self) -> Option<&ProbeError> {
        match self {
            LookupResult::Found(_) => None,
            LookupResult::Failed(err) => Some(err),
        }
    }
}

impl Serialize for LookupResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            LookupResult::Found(user) => user.serialize(serializer),
            LookupResult::Failed(err) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("error", &err.to_string())?;
                map.end()
            }
        }
    }
}

/// Look up the full profile registered to `phone_number`.
///
/// Never fails: every error is reported as [`LookupResult::Failed`].
#[instrument(skip(client))]
pub async fn probe(client: &dyn TelegramApi, phone_number: &str) -> LookupResult {
    info!("Checking phone number");

    let users = match client.import_contact(phone_number).await {
        Ok(users) => users,
        Err(e) => {
            let err = ProbeError::from(e);
            warn!(error = %err, "Contact import failed");
            return LookupResult::Failed(err);
        }
    };

    let result = match users.as_slice() {
        [] => LookupResult::Failed(ProbeError::NotRegistered),
        [user] => match client.delete_contact(user).await {
            // The delete response carries more profile fields than the import.
            Ok(records) => match records.into_iter().find(|r| r.id == user.id) {
                Some(record) => LookupResult::Found(Box::new(record.into())),
                None => LookupResult::Failed(ProbeError::DeleteFailed {
                    phone: phone_number.to_string(),
                    reason: format!("user {} missing from the delete response", user.id),
                }),
            },
            Err(e) => LookupResult::Failed(ProbeError::DeleteFailed {
                phone: phone_number.to_string(),
                reason: e.to_string(),
            }),
        },
        many => LookupResult::Failed(ProbeError::AmbiguousMatch(many.len())),
    };

    match &result {
        LookupResult::Found(user) => info!(user_id = user.id, "Done"),
        LookupResult::Failed(err) => warn!(error = %err, "Lookup failed"),
    }
    result
}

/// Coarse registration status returned by [`check_account`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountStatus {
    Registered,
    NotRegistered,
    FloodWait,
    Deactivated,
    Restricted,
    DeleteFailed,
    UnexpectedError,
}

/// Result of the lightweight probe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountCheck {
    pub status: AccountStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl AccountCheck {
    pub fn new(status: AccountStatus) -> Self {
        Self {
            status,
            detail: None,
        }
    }

    pub fn with_detail(status: AccountStatus, detail: impl Into<String>) -> Self {
        Self {
            status,
            detail: Some(detail.into()),
        }
    }
}

impl From<TelegramError> for AccountCheck {
    fn from(err: TelegramError) -> Self {
        match err {
            TelegramError::FloodWait { .. } => {
                AccountCheck::with_detail(AccountStatus::FloodWait, err.to_string())
            }
            TelegramError::UserDeactivated => AccountCheck::new(AccountStatus::Deactivated),
            TelegramError::UserRestricted => AccountCheck::new(AccountStatus::Restricted),
            TelegramError::PhoneNumberUnoccupied => AccountCheck::new(AccountStatus::NotRegistered),
            other => AccountCheck::with_detail(AccountStatus::UnexpectedError, other.to_string()),
        }
    }
}

/// Check whether `phone_number` has an account, without collecting the profile.
#[instrument(skip(client))]
pub async fn check_account(client: &dyn TelegramApi, phone_number: &str) -> AccountCheck {
    let users = match client.import_contact(phone_number).await {
        Ok(users) => users,
        Err(e) => {
            let check = AccountCheck::from(e);
            warn!(status = ?check.status, "Contact import failed");
            return check;
        }
    };

    if users.is_empty() {
        return AccountCheck::new(AccountStatus::NotRegistered);
    }

    for user in &users {
        if let Err(e) = client.delete_contact(user).await {
            warn!(user_id = user.id, error = %e, "Failed to delete imported contact");
            return AccountCheck::with_detail(AccountStatus::DeleteFailed, e.to_string());
        }
    }

    AccountCheck::new(AccountStatus::Registered)
}
