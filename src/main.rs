//! wsprobe entry point.
//!
//! Connects to the target, runs one interactive session, and maps its
//! outcome to the process exit code.

use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use crossterm::tty::IsTty;
use tracing_subscriber::EnvFilter;

use wsprobe::config::{Args, ClientConfig, color_enabled};
use wsprobe::format::{Style, paint};
use wsprobe::session::Session;
use wsprobe::{console, ws};

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env before clap reads its environment fallbacks
    dotenvy::dotenv().ok();
    let args = Args::parse();

    // Initialize tracing on stderr so it never mixes with frame output
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(args.log_level())),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let colored = color_enabled(args.no_color, std::io::stderr().is_tty());
    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{}", paint(Style::Error, &format!("error: {err:#}"), colored));
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> anyhow::Result<()> {
    let config = ClientConfig::from_args(args)?;
    tracing::info!(url = %config.url, origin = %config.origin, "connecting");

    let connection = ws::connect(&config.connect_options()).await?;
    let console = console::stdio(&config.prompt).context("failed to open console")?;

    let outcome = Session::new(connection, console, config.colored).run().await;
    if outcome.is_clean_exit() {
        tracing::info!(%outcome, "session finished");
        Ok(())
    } else {
        Err(outcome.into())
    }
}
