//! The scrape run: list calendars, fetch upcoming events, keep the ones
//! tagged as deadlines, write the output document.

use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use owo_colors::OwoColorize;
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::auth;
use crate::config;
use crate::event::Event;
use crate::google::CalendarClient;
use crate::session::Session;

/// Marker substring that tags an event description as a deadline.
pub const DEADLINE_MARKER: &str = "#deadline";

/// The document written to disk: a single `deadlines` key holding the
/// matched raw event records in provider order (ascending start time).
#[derive(Debug, Serialize)]
pub struct DeadlineDoc {
    pub deadlines: Vec<Event>,
}

pub struct ScrapeArgs {
    pub marker: String,
    pub calendar: String,
    pub output: Option<PathBuf>,
}

pub async fn run(args: ScrapeArgs) -> Result<()> {
    let creds = config::load_credentials()?;

    // First run goes through the interactive flow, like the stored-
    // credential bootstrap in the original setup.
    let session = if Session::exists() {
        Session::load_valid(&creds).await?
    } else {
        auth::run(&creds).await?
    };

    let client = CalendarClient::new(session.access_token());

    let calendars = client.list_calendars().await?;
    println!("{}", "Calendars:".bold());
    for cal in &calendars {
        let tag = if cal.primary { " (primary)" } else { "" };
        println!("  {} {}{}", cal.summary, cal.id.dimmed(), tag);
    }
    println!();

    let now = Utc::now().to_rfc3339();
    let events = client.upcoming_events(&args.calendar, &now).await?;

    let deadlines = filter_deadlines(events, &args.marker);

    if deadlines.is_empty() {
        println!("{}", "No upcoming deadlines found".dimmed());
    }

    let today = Utc::now().date_naive();
    for event in &deadlines {
        print_deadline(event, today)?;
    }

    let doc = DeadlineDoc { deadlines };

    let path = match args.output {
        Some(path) => path,
        None => config::default_output_path()?,
    };
    write_document(&doc, &path)?;

    println!("---");
    println!(
        "saved {} events to {}",
        doc.deadlines.len().to_string().bold(),
        path.display()
    );

    Ok(())
}

/// Keep the events whose description contains the marker, preserving
/// provider order. Matching is literal and case-sensitive.
pub fn filter_deadlines(events: Vec<Event>, marker: &str) -> Vec<Event> {
    events
        .into_iter()
        .filter(|event| event.description.contains(marker))
        .collect()
}

fn print_deadline(event: &Event, today: NaiveDate) -> Result<()> {
    let start_label = event
        .start
        .as_ref()
        .map(|start| start.label())
        .unwrap_or_default();

    match event.start.as_ref().and_then(|start| start.to_naive_date()) {
        Some(date) => println!(
            "{} {} {}",
            start_label.bold(),
            event.summary,
            format!("({})", format_relative(date, today)).dimmed()
        ),
        None => println!("{} {}", start_label.bold(), event.summary),
    }

    let record = serde_json::to_string_pretty(event).context("Failed to serialize event")?;
    println!("{}", record);

    Ok(())
}

/// "today", "in 3 days", "2 days ago"
fn format_relative(date: NaiveDate, today: NaiveDate) -> String {
    let days = (date - today).num_days();
    match days {
        0 => "today".to_string(),
        1 => "in 1 day".to_string(),
        -1 => "1 day ago".to_string(),
        d if d > 0 => format!("in {} days", d),
        d => format!("{} days ago", -d),
    }
}

fn write_document(doc: &DeadlineDoc, path: &Path) -> Result<()> {
    let contents = serde_json::to_string_pretty(doc).context("Failed to serialize deadlines")?;

    std::fs::write(path, contents)
        .with_context(|| format!("Failed to write deadlines to {}", path.display()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(id: &str, description: Option<&str>) -> Event {
        let mut raw = serde_json::json!({"id": id, "summary": "some event"});
        if let Some(description) = description {
            raw["description"] = serde_json::Value::String(description.to_string());
        }
        serde_json::from_value(raw).unwrap()
    }

    // --- filter_deadlines ---

    #[test]
    fn marked_event_is_included() {
        let events = vec![event("e1", Some("#deadline hand in thesis"))];
        let deadlines = filter_deadlines(events, DEADLINE_MARKER);
        assert_eq!(deadlines.len(), 1);
        assert_eq!(deadlines[0].id, "e1");
    }

    #[test]
    fn unmarked_event_is_excluded() {
        let events = vec![event("e1", Some("weekly sync"))];
        assert!(filter_deadlines(events, DEADLINE_MARKER).is_empty());
    }

    #[test]
    fn missing_description_is_excluded() {
        let events = vec![event("e1", None)];
        assert!(filter_deadlines(events, DEADLINE_MARKER).is_empty());
    }

    #[test]
    fn marker_can_appear_mid_text() {
        let events = vec![event("e1", Some("submit draft #deadline by midnight"))];
        assert_eq!(filter_deadlines(events, DEADLINE_MARKER).len(), 1);
    }

    #[test]
    fn matching_is_case_sensitive() {
        let events = vec![event("e1", Some("#DEADLINE hand in thesis"))];
        assert!(filter_deadlines(events, DEADLINE_MARKER).is_empty());
    }

    #[test]
    fn custom_marker_overrides_default() {
        let events = vec![
            event("e1", Some("#due pay rent")),
            event("e2", Some("#deadline taxes")),
        ];
        let deadlines = filter_deadlines(events, "#due");
        assert_eq!(deadlines.len(), 1);
        assert_eq!(deadlines[0].id, "e1");
    }

    #[test]
    fn provider_order_is_preserved() {
        let events = vec![
            event("first", Some("#deadline a")),
            event("second", Some("no marker")),
            event("third", Some("#deadline b")),
        ];
        let deadlines = filter_deadlines(events, DEADLINE_MARKER);
        let ids: Vec<&str> = deadlines.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["first", "third"]);
    }

    // --- output document ---

    #[test]
    fn document_always_has_deadlines_array() {
        let doc = DeadlineDoc { deadlines: vec![] };
        let value = serde_json::to_value(&doc).unwrap();
        assert!(value["deadlines"].is_array());
        assert_eq!(value["deadlines"].as_array().unwrap().len(), 0);
    }

    #[test]
    fn written_document_parses_back_with_deadlines_key() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deadlines.json");

        let doc = DeadlineDoc {
            deadlines: vec![event("e1", Some("#deadline taxes"))],
        };
        write_document(&doc, &path).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&contents).unwrap();

        assert_eq!(value["deadlines"].as_array().unwrap().len(), 1);
        assert_eq!(value["deadlines"][0]["id"], "e1");
    }

    // --- format_relative ---

    #[test]
    fn relative_labels() {
        let today = NaiveDate::from_ymd_opt(2018, 5, 4).unwrap();
        assert_eq!(format_relative(today, today), "today");
        assert_eq!(
            format_relative(today.succ_opt().unwrap(), today),
            "in 1 day"
        );
        assert_eq!(
            format_relative(NaiveDate::from_ymd_opt(2018, 5, 14).unwrap(), today),
            "in 10 days"
        );
        assert_eq!(
            format_relative(NaiveDate::from_ymd_opt(2018, 5, 1).unwrap(), today),
            "3 days ago"
        );
        assert_eq!(
            format_relative(today.pred_opt().unwrap(), today),
            "1 day ago"
        );
    }
}
