//! Provider-neutral event types.
//!
//! The Google client converts API payloads into these types; selection and
//! link extraction work exclusively with them.

use std::fmt;

use chrono::{DateTime, FixedOffset, NaiveDate, SecondsFormat};

/// Opaque identifier of one calendar (e.g. "primary" or an email address).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CalendarId(String);

impl CalendarId {
    pub fn new(id: impl Into<String>) -> Self {
        CalendarId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for CalendarId {
    fn from(id: String) -> Self {
        CalendarId(id)
    }
}

impl From<&str> for CalendarId {
    fn from(id: &str) -> Self {
        CalendarId(id.to_string())
    }
}

impl fmt::Display for CalendarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// When an event starts.
#[derive(Debug, Clone, PartialEq)]
pub enum EventTime {
    /// A timed start. The offset reported by the API is kept for display.
    DateTime(DateTime<FixedOffset>),
    /// An all-day event.
    Date(NaiveDate),
    /// A start object that carries neither a date nor a time.
    Unspecified,
}

impl EventTime {
    /// The start instant, or `None` for all-day events.
    pub fn timed(&self) -> Option<&DateTime<FixedOffset>> {
        match self {
            EventTime::DateTime(dt) => Some(dt),
            EventTime::Date(_) | EventTime::Unspecified => None,
        }
    }
}

impl fmt::Display for EventTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventTime::DateTime(dt) => {
                write!(f, "{}", dt.to_rfc3339_opts(SecondsFormat::AutoSi, true))
            }
            EventTime::Date(d) => write!(f, "{} (all-day)", d.format("%Y-%m-%d")),
            EventTime::Unspecified => f.write_str("(no start time)"),
        }
    }
}

/// A calendar event (provider-neutral).
#[derive(Debug, Clone)]
pub struct Event {
    pub id: String,
    pub summary: String,
    pub start: EventTime,

    // Meeting data
    /// Structured video-call link attached to the event
    pub hangout_link: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
}

impl Event {
    /// A bare event with only the required fields set.
    pub fn new(id: impl Into<String>, summary: impl Into<String>, start: EventTime) -> Self {
        Event {
            id: id.into(),
            summary: summary.into(),
            start,
            hangout_link: None,
            description: None,
            location: None,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}", self.summary, self.start)
    }
}
