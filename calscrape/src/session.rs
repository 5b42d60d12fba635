//! Stored OAuth session (access/refresh token) for the Calendar API.
//!
//! The session lives at ~/.config/calscrape/session.toml and is written
//! with owner-only permissions since it contains OAuth tokens.

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::config::{self, Credentials};

pub const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionData {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
}

/// Raw response from the token endpoint.
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    pub expires_in: i64,
}

impl SessionData {
    /// Build session data from a token endpoint response. Google usually
    /// omits the refresh token when refreshing, so fall back to the
    /// previous one.
    pub fn from_response(response: TokenResponse, previous_refresh: Option<&str>) -> Result<Self> {
        let refresh_token = response
            .refresh_token
            .filter(|t| !t.is_empty())
            .or_else(|| previous_refresh.map(str::to_string))
            .context("Token endpoint returned no refresh token")?;

        Ok(SessionData {
            access_token: response.access_token,
            refresh_token,
            expires_at: Utc::now() + Duration::seconds(response.expires_in),
        })
    }

    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }
}

pub struct Session {
    data: SessionData,
}

impl Session {
    pub fn new(data: SessionData) -> Self {
        Session { data }
    }

    pub fn access_token(&self) -> &str {
        &self.data.access_token
    }

    fn path() -> Result<PathBuf> {
        Ok(config::base_dir()?.join("session.toml"))
    }

    pub fn exists() -> bool {
        Self::path().map(|p| p.exists()).unwrap_or(false)
    }

    /// Load the stored session, refreshing the access token if expired.
    pub async fn load_valid(creds: &Credentials) -> Result<Self> {
        let mut session = Self::load()?;

        if session.data.is_expired() {
            eprintln!("Access token expired, refreshing...");
            session.refresh(creds).await?;
        }

        Ok(session)
    }

    fn load() -> Result<Self> {
        let path = Self::path()?;

        if !path.exists() {
            anyhow::bail!(
                "No stored Google session found.\n\
                Run `calscrape auth` first."
            );
        }

        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read session from {}", path.display()))?;

        let data: SessionData = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse session from {}", path.display()))?;

        Ok(Session { data })
    }

    pub fn save(&self) -> Result<()> {
        let contents = toml::to_string_pretty(&self.data).context("Failed to serialize session")?;

        let path = Self::path()?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        std::fs::write(&path, contents)
            .with_context(|| format!("Failed to write session to {}", path.display()))?;

        // Set to owner-only (0600) since the file contains OAuth tokens:
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o600))
                .with_context(|| format!("Failed to set permissions on {}", path.display()))?;
        }

        Ok(())
    }

    async fn refresh(&mut self, creds: &Credentials) -> Result<()> {
        let client = reqwest::Client::new();

        let response = client
            .post(TOKEN_URL)
            .form(&[
                ("client_id", creds.client_id.as_str()),
                ("client_secret", creds.client_secret.as_str()),
                ("refresh_token", self.data.refresh_token.as_str()),
                ("grant_type", "refresh_token"),
            ])
            .send()
            .await
            .context("Failed to send refresh request")?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("Failed to refresh access token: {}", error_text);
        }

        let tokens: TokenResponse = response
            .json()
            .await
            .context("Failed to parse refresh response")?;

        self.data = SessionData::from_response(tokens, Some(&self.data.refresh_token))?;
        self.save()?;

        Ok(())
    }
}
