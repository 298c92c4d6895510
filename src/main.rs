//! telegrammer CLI - main entry point
//!
//! Sends a message (or a file) to the configured chat, or with `--server`
//! prints the next message the bot receives.

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, error, warn};
use tracing_subscriber::EnvFilter;

use telegrammer::commands::{self, ListenOptions};
use telegrammer::{Overrides, Settings};

#[derive(Parser, Debug)]
#[command(name = "telegrammer")]
#[command(about = "Send a Telegram message or file to yourself", long_about = None)]
#[command(version)]
struct Cli {
    /// Message text; used as the caption when sending a file
    message: Option<String>,

    /// Extra positional arguments are ignored
    #[arg(hide = true)]
    extra: Vec<String>,

    /// Filepath to file; an empty value sends plain text
    #[arg(short, long, value_name = "PATH")]
    file: Option<String>,

    /// Run in server mode to listen for new messages
    #[arg(long)]
    server: bool,

    /// Config file to use instead of ~/.config/telegrammer/config.yaml or ./config.yaml
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            config: self.config.clone(),
            file: self.file.as_deref().map(PathBuf::from),
            server: self.server,
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<ExitCode> {
    // Load .env for local development
    let _ = dotenvy::dotenv();

    // Initialize logging; stdout is reserved for the confirmation and the update dump
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("telegrammer=info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if !cli.extra.is_empty() {
        warn!("Ignoring extra arguments: {:?}", cli.extra);
    }

    let settings = Settings::resolve(&cli.overrides());
    debug!(?settings, "Resolved settings");

    let outcome = execute(&settings, cli.message.as_deref().unwrap_or_default()).await;
    Ok(ExitCode::from(exit_status(&outcome)))
}

/// Process exit status for a run: 0 on success, 1 after logging the error.
fn exit_status(outcome: &anyhow::Result<()>) -> u8 {
    match outcome {
        Ok(()) => 0,
        Err(err) => {
            error!("{:#}", err);
            1
        }
    }
}

async fn execute(settings: &Settings, message: &str) -> anyhow::Result<()> {
    if settings.server {
        if !message.is_empty() {
            warn!("Server mode does not send; ignoring message text");
        }
        commands::listen::run(settings, &ListenOptions::default()).await?;
    } else {
        commands::send_message::run(settings, message).await?;
    }
    Ok(())
}
