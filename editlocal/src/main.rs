//! editlocal - forwards an editlocal:// URL to a local editor.
//!
//! Registered as the handler for the editlocal:// URL scheme; the
//! browser hands the clicked URL over as the single argument.

mod config;
mod scheme;

use anyhow::{Context, Result};
use clap::Parser;
use std::io;
use std::process::Command;

use config::EditorConfig;
use scheme::SCHEME_PREFIX;

#[derive(Parser)]
#[command(name = "editlocal")]
#[command(about = "Open an editlocal:// URL in the local editor")]
struct Cli {
    /// URL of the form editlocal://<percent-encoded-path>
    url: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let Some(raw) = scheme::strip_scheme(&cli.url) else {
        // Launched from a GUI scheme handler; pause so the window stays
        // readable before it closes.
        eprintln!("expected url to start with {SCHEME_PREFIX}, press enter to exit");
        let mut line = String::new();
        io::stdin().read_line(&mut line).ok();
        return Ok(());
    };

    let target = scheme::decode(raw)?;
    let editor = EditorConfig::load()?.editor;

    // Spawn and return; the editor outlives this process.
    Command::new(&editor)
        .arg(&target)
        .spawn()
        .with_context(|| format!("Failed to launch editor: {}", editor))?;

    Ok(())
}
