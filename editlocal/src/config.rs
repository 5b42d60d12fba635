//! Editor configuration.
//!
//! ~/.config/editlocal/config.toml may override the editor binary:
//!
//!   editor = "/usr/local/bin/gvim"

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::PathBuf;

/// Editor used when no config file is present.
pub const DEFAULT_EDITOR: &str = "gvim";

#[derive(Debug, Clone, Deserialize)]
pub struct EditorConfig {
    pub editor: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        EditorConfig {
            editor: DEFAULT_EDITOR.to_string(),
        }
    }
}

impl EditorConfig {
    pub fn load() -> Result<Self> {
        let path = config_path()?;

        if !path.exists() {
            return Ok(EditorConfig::default());
        }

        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        let config: EditorConfig = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config from {}", path.display()))?;

        Ok(config)
    }
}

fn config_path() -> Result<PathBuf> {
    Ok(dirs::config_dir()
        .context("Could not determine config directory")?
        .join("editlocal")
        .join("config.toml"))
}
