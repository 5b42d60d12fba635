//! Calendar event model.
//!
//! Only the fields the scraper inspects are typed; everything else the
//! provider sends is carried through untouched so the output document
//! holds the raw event records.

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};

/// A calendar event as returned by the provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub summary: String,

    /// Scanned for the deadline marker. Events without a description
    /// never match.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<EventStart>,

    /// All remaining provider fields (htmlLink, creator, etag, ...).
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// The provider's date-or-datetime union: all-day events carry `date`,
/// timed events carry `dateTime`. `timeZone` is kept in the record but
/// never interpreted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventStart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,

    #[serde(rename = "dateTime", default, skip_serializing_if = "Option::is_none")]
    pub date_time: Option<DateTime<FixedOffset>>,

    #[serde(rename = "timeZone", default, skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
}

impl EventStart {
    /// Display string for the start: the datetime when present, the date
    /// otherwise.
    pub fn label(&self) -> String {
        match (&self.date_time, &self.date) {
            (Some(dt), _) => dt.to_rfc3339(),
            (None, Some(d)) => d.to_string(),
            (None, None) => String::new(),
        }
    }

    /// The calendar date of the start, as given by the provider.
    pub fn to_naive_date(&self) -> Option<NaiveDate> {
        match (&self.date_time, &self.date) {
            (Some(dt), _) => Some(dt.date_naive()),
            (None, Some(d)) => Some(*d),
            (None, None) => None,
        }
    }
}
