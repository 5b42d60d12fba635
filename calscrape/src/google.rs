//! Google Calendar REST client.

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::event::Event;

const API_BASE: &str = "https://www.googleapis.com/calendar/v3";

/// How many upcoming events to ask for per run.
pub const MAX_RESULTS: u32 = 50;

pub struct CalendarClient {
    http: reqwest::Client,
    access_token: String,
    base_url: String,
}

/// An entry from the user's calendar list.
#[derive(Debug, Clone, Deserialize)]
pub struct CalendarListEntry {
    pub id: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub primary: bool,
}

#[derive(Deserialize)]
struct CalendarListResponse {
    #[serde(default)]
    items: Vec<CalendarListEntry>,
}

#[derive(Deserialize)]
struct EventListResponse {
    #[serde(default)]
    items: Vec<Event>,
}

impl CalendarClient {
    pub fn new(access_token: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            access_token: access_token.to_string(),
            base_url: API_BASE.to_string(),
        }
    }

    #[cfg(test)]
    pub fn with_base_url(access_token: &str, base_url: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            access_token: access_token.to_string(),
            base_url: base_url.to_string(),
        }
    }

    /// GET /users/me/calendarList
    pub async fn list_calendars(&self) -> Result<Vec<CalendarListEntry>> {
        let url = format!("{}/users/me/calendarList", self.base_url);

        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.access_token)
            .send()
            .await
            .context("Failed to fetch calendar list")?;

        let list: CalendarListResponse = read_json(response).await?;
        Ok(list.items)
    }

    /// GET /calendars/:id/events
    ///
    /// Upcoming events from `time_min`, recurrence expanded to single
    /// occurrences, ascending by start time, at most [`MAX_RESULTS`].
    pub async fn upcoming_events(&self, calendar_id: &str, time_min: &str) -> Result<Vec<Event>> {
        let url = format!(
            "{}/calendars/{}/events?timeMin={}&maxResults={}&singleEvents=true&orderBy=startTime",
            self.base_url,
            urlencoding::encode(calendar_id),
            urlencoding::encode(time_min),
            MAX_RESULTS,
        );

        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.access_token)
            .send()
            .await
            .context("Failed to fetch events")?;

        let list: EventListResponse = read_json(response).await?;
        Ok(list.items)
    }
}

/// Deserialize a response body, surfacing the API's error text on non-2xx.
async fn read_json<T: serde::de::DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let status = response.status();

    if !status.is_success() {
        let error_text = response.text().await.unwrap_or_default();
        anyhow::bail!("Calendar API returned {}: {}", status, error_text);
    }

    response
        .json()
        .await
        .context("Failed to parse Calendar API response")
}
