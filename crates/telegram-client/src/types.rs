//! Telegram API types.

use chrono::{DateTime, Utc};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

/// Application credentials plus the account phone number a session belongs to.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub api_id: i32,
    pub api_hash: SecretString,
    pub phone_number: String,
}

impl Credentials {
    pub fn new(
        api_id: i32,
        api_hash: impl Into<String>,
        phone_number: impl Into<String>,
    ) -> Self {
        Self {
            api_id,
            api_hash: SecretString::new(api_hash.into()),
            phone_number: phone_number.into(),
        }
    }
}

/// A user returned by a contact import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportedUser {
    pub id: i64,
    pub access_hash: Option<i64>,
}

/// Outcome of submitting a login code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignInOutcome {
    Authorized,
    /// The account has two-step verification enabled.
    PasswordRequired,
}

/// Last-seen presence of a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserPresence {
    Online,
    Offline { was_online: DateTime<Utc> },
    Recently,
    LastWeek,
    LastMonth,
    Unknown,
}

/// Why a user is restricted on a given platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestrictionReason {
    pub platform: String,
    pub reason: String,
    pub text: String,
}

/// Full user record as returned alongside a contact deletion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
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
    pub presence: UserPresence,
    pub phone: Option<String>,
}

impl UserRecord {
    /// A record with only the id set, everything else empty.
    pub fn with_id(id: i64) -> Self {
        Self {
            id,
            username: None,
            usernames: Vec::new(),
            first_name: None,
            last_name: None,
            fake: false,
            verified: false,
            premium: false,
            mutual_contact: false,
            bot: false,
            bot_chat_history: false,
            restricted: false,
            restriction_reason: Vec::new(),
            presence: UserPresence::Unknown,
            phone: None,
        }
    }
}
