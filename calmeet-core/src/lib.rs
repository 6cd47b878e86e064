//! Core types for calmeet.
//!
//! This crate holds everything that does not talk to the network:
//! - `event` for the provider-neutral calendar event
//! - `select` for picking the next timed event across calendars
//! - `meet_link` for finding a Google Meet URL inside an event
//! - `token`, `credentials` and `paths` for the on-disk OAuth artifacts

pub mod credentials;
pub mod error;
pub mod event;
pub mod meet_link;
pub mod paths;
pub mod select;
pub mod token;

pub use error::{CalmeetError, CalmeetResult};
pub use event::{CalendarId, Event, EventTime};
pub use meet_link::{MEET_URL_PREFIX, extract_meet_link};
pub use select::{EventSource, find_next_event};
