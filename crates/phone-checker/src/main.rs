//! Telegram phone number checker - command line entry point.

mod cli;
mod error;
mod prompt;

use crate::cli::Args;
use crate::error::{AppError, AppResult};
use crate::prompt::TerminalPrompt;
use anyhow::Context;
use clap::Parser;
use phone_lookup::{login, split_phone_numbers, validate_users, write_results, GrammersConnector};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> AppResult<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();
    init_logging(if args.verbose { "debug" } else { "info" });

    if let Err(e) = run(args).await {
        error!("{}", e);
        return Err(e);
    }
    Ok(())
}

async fn run(args: Args) -> AppResult<()> {
    let prompt = TerminalPrompt;

    let credentials = prompt
        .credentials(args.api_id, args.api_hash, args.api_phone_number)
        .await?;

    std::fs::create_dir_all(&args.session_dir).with_context(|| {
        format!(
            "Failed to create session directory {}",
            args.session_dir.display()
        )
    })?;
    let connector = GrammersConnector::new(args.session_dir.clone());

    let session = login(&connector, &credentials, Some(&prompt))
        .await?
        .ok_or_else(|| AppError::NotLoggedIn(credentials.phone_number.clone()))?;
    info!("Logged in as {}", session.phone_number());

    let phone_numbers = match args.phone_numbers {
        Some(numbers) if !split_phone_numbers(&numbers).is_empty() => numbers,
        _ => match prompt.phone_numbers().await {
            Ok(numbers) => numbers,
            Err(e) => {
                session.close().await;
                return Err(e.into());
            }
        },
    };

    let results = validate_users(session.client(), &phone_numbers).await;
    session.close().await;
    let results = results?;

    let rendered = write_results(&args.output, &results).await?;
    println!("{}", rendered);
    println!("Results saved to {}", args.output.display());

    Ok(())
}

fn init_logging(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
