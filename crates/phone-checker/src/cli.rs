//! Command line arguments.

use clap::Parser;
use std::path::PathBuf;

/// Check whether phone numbers are registered on Telegram.
///
/// Each number is added to your contacts, the matching account (if any) is
/// read back, and the contact is removed again.
#[derive(Parser, Debug)]
#[command(name = "phone-checker", version)]
#[command(
    after_help = "Credentials missing from both flags and environment are asked for interactively."
)]
pub struct Args {
    /// List of phone numbers to check, separated by commas
    #[arg(short, long)]
    pub phone_numbers: Option<String>,

    /// Your Telegram app api_id
    #[arg(long, env = "API_ID", help_heading = "Telegram")]
    pub api_id: Option<i32>,

    /// Your Telegram app api_hash
    #[arg(long, env = "API_HASH", hide_env_values = true, help_heading = "Telegram")]
    pub api_hash: Option<String>,

    /// The number associated with your Telegram account
    #[arg(long, env = "PHONE_NUMBER", help_heading = "Telegram")]
    pub api_phone_number: Option<String>,

    /// Directory holding Telegram session files
    #[arg(long, env = "SESSION_DIR", default_value = ".", help_heading = "Telegram")]
    pub session_dir: PathBuf,

    /// Filename to store results
    #[arg(long, default_value = "results.json")]
    pub output: PathBuf,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}
