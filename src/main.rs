//! tubescript CLI entry point.

use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use tubescript::cli::{commands, Cli, Output};
use tubescript::config::Settings;
use tubescript::ScribeError;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(code) => ExitCode::from(code),
        Err(e) => match e.downcast_ref::<ScribeError>() {
            // Already reported by the command.
            Some(err) => ExitCode::from(err.exit_code()),
            None => {
                Output::error(&format!("{:#}", e));
                ExitCode::FAILURE
            }
        },
    }
}

async fn run(cli: Cli) -> anyhow::Result<u8> {
    // Load configuration
    let mut settings = match &cli.config {
        Some(path) => Settings::load_from(Some(std::path::Path::new(path))),
        None => Settings::load(),
    }
    .inspect_err(|e| Output::error(&e.to_string()))?;
    cli.apply_to(&mut settings);

    // Initialize logging
    let log_level = match cli.verbose {
        0 => settings.general.log_level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("tubescript={}", log_level)),
        ))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    commands::run_fetch(&cli.url, settings).await
}
