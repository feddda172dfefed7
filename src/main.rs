mod api;
mod cli;
mod config;
mod error;
mod history;
mod player;
mod providers;
mod settings;
mod shell;
mod store;
mod ui;

use std::fs::{self, OpenOptions};
use std::sync::Mutex;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::cli::{Cli, Commands};
use crate::config::app_dir;
use crate::error::Result;

/// Log to a file while the full-screen console owns the terminal, else to stderr
fn init_tracing(to_file: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let registry = tracing_subscriber::registry().with(filter);

    let log_file = to_file
        .then(|| {
            let dir = app_dir();
            fs::create_dir_all(&dir).ok()?;
            OpenOptions::new()
                .create(true)
                .append(true)
                .open(dir.join("ratflix.log"))
                .ok()
        })
        .flatten();

    match log_file {
        Some(file) => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            )
            .init(),
        None if to_file => {
            // No writable log file; stay quiet rather than draw over the console
        }
        None => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .init(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.command.is_none());

    match cli.command {
        Some(Commands::Init) => {
            cli::commands::init().await?;
        }
        Some(Commands::Config { show, set, reset }) => {
            cli::commands::config(show, set, reset).await?;
        }
        Some(Commands::Exec { lines }) => {
            cli::commands::exec(lines, cli.ephemeral).await?;
        }
        None => {
            cli::commands::interactive(cli.ephemeral).await?;
        }
    }

    Ok(())
}
