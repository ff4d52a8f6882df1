//! Batch lookups over comma separated phone number lists.

use crate::error::LookupError;
use crate::probe::{check_account, probe, AccountCheck, LookupResult};
use indexmap::IndexMap;
use telegram_client::TelegramApi;
use tracing::{debug, info};

/// Results keyed by normalized phone number, in input order.
pub type BatchResult<T> = IndexMap<String, T>;

/// Split a comma separated list and strip all whitespace from each entry.
///
/// Entries left empty after stripping are dropped.
pub fn split_phone_numbers(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(|entry| entry.chars().filter(|c| !c.is_whitespace()).collect::<String>())
        .filter(|entry| !entry.is_empty())
        .collect()
}

fn phone_numbers(input: &str) -> Result<Vec<String>, LookupError> {
    let phones = split_phone_numbers(input);
    if phones.is_empty() {
        return Err(LookupError::EmptyInput);
    }
    Ok(phones)
}

/// Probe each distinct number for its full profile, one at a time.
///
/// Failures are stored per number and never stop the batch.
pub async fn validate_users(
    client: &dyn TelegramApi,
    input: &str,
) -> Result<BatchResult<LookupResult>, LookupError> {
    let mut results = BatchResult::new();

    for phone in phone_numbers(input)? {
        if results.contains_key(&phone) {
            debug!(phone_number = %phone, "Skipping duplicate");
            continue;
        }
        let result = probe(client, &phone).await;
        results.insert(phone, result);
    }

    info!("Checked {} phone numbers", results.len());
    Ok(results)
}

/// Lightweight variant of [`validate_users`] reporting only registration status.
pub async fn check_accounts(
    client: &dyn TelegramApi,
    input: &str,
) -> Result<BatchResult<AccountCheck>, LookupError> {
    let mut results = BatchResult::new();

    for phone in phone_numbers(input)? {
        if results.contains_key(&phone) {
            debug!(phone_number = %phone, "Skipping duplicate");
            continue;
        }
        let check = check_account(client, &phone).await;
        results.insert(phone, check);
    }

    info!("Checked {} phone numbers", results.len());
    Ok(results)
}
