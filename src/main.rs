use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use intake::cli::{self, Args};
use intake::config::Config;
use intake::store::SubmissionStore;

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env if present
    let _ = dotenvy::dotenv();

    let args = Args::parse();

    let mut config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            return ExitCode::FAILURE;
        }
    };
    // Flag or INTAKE_DATABASE_URL, resolved by clap
    if let Some(url) = args.database_url.clone() {
        config.database_url = url;
    }

    // Logs go to stderr; stdout carries command output
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!("Opening {}", config.database_url);

    let store = match SubmissionStore::open(&config.database_url).await {
        Ok(store) => store,
        Err(e) => {
            tracing::error!("Failed to open database: {e}");
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let state = match intake::build_state(store.clone(), config).await {
        Ok(state) => state,
        Err(e) => {
            eprintln!("{e}");
            store.close().await;
            return ExitCode::FAILURE;
        }
    };

    let outcome = cli::run(&state, args.command).await;
    store.close().await;

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}
