//! calscrape - pulls deadline-tagged events from Google Calendar.
//!
//! Credentials and the OAuth session live in ~/.config/calscrape/;
//! the output document is written to ~/deadlines.json.

mod auth;
mod config;
mod event;
mod google;
mod scrape;
mod session;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use scrape::{DEADLINE_MARKER, ScrapeArgs};

#[derive(Parser)]
#[command(name = "calscrape")]
#[command(about = "Pull deadline-tagged events from Google Calendar into a local JSON file")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Marker substring that flags an event description as a deadline
    #[arg(long, default_value = DEADLINE_MARKER)]
    marker: String,

    /// Calendar to scan
    #[arg(long, default_value = "primary")]
    calendar: String,

    /// Where to write the deadlines document (defaults to ~/deadlines.json)
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the interactive Google OAuth flow and store the session
    Auth,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Auth) => {
            let creds = config::load_credentials()?;
            auth::run(&creds).await?;
            Ok(())
        }
        None => {
            scrape::run(ScrapeArgs {
                marker: cli.marker,
                calendar: cli.calendar,
                output: cli.output,
            })
            .await
        }
    }
}
