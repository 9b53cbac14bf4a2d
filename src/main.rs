//! CLI entry point for the bookshelf library client.

use anyhow::Result;
use clap::Parser;
use tracing::debug;

mod cli;
mod commands;
mod config;

use cli::{Cli, Command};
use commands::Context;
use config::{Settings, load_default_file_config};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let cli = Cli::parse();

    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_log_level(&cli)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    debug!(?cli, "CLI arguments parsed");

    let loaded = load_default_file_config()?;
    let settings = Settings::resolve(&cli, loaded.config.as_ref())?;
    debug!(?settings, config_path = ?loaded.path, "configuration resolved");
    let ctx = Context::new(settings, loaded.path)?;

    match cli.command {
        Command::Books(args) => commands::run_books_command(&ctx, &args).await,
        Command::Book { id } => commands::run_book_command(&ctx, &id).await,
        Command::AddBook(fields) => commands::run_add_book_command(&ctx, fields).await,
        Command::UpdateBook { id, fields } => {
            commands::run_update_book_command(&ctx, &id, fields).await
        }
        Command::Borrowed => commands::run_borrowed_command(&ctx).await,
        Command::Borrow(args) => commands::run_borrow_command(&ctx, &args).await,
        Command::Return { record_id } => commands::run_return_command(&ctx, &record_id).await,
        Command::Watch => commands::run_watch_command(&ctx).await,
        Command::Config => commands::run_config_show_command(&ctx),
    }
}

fn default_log_level(cli: &Cli) -> &'static str {
    if cli.quiet {
        "error"
    } else {
        match cli.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }
}
