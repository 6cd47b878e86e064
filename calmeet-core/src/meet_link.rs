//! Google Meet link extraction.

use crate::event::Event;

/// Every Meet URL starts with this.
pub const MEET_URL_PREFIX: &str = "https://meet.google.com/";

/// Find the Meet link of an event.
///
/// Looks, in order, at:
/// 1. the structured hangout link, if non-empty
/// 2. the first whitespace-separated word of the description containing
///    [`MEET_URL_PREFIX`]
/// 3. the whole location, if it contains [`MEET_URL_PREFIX`]
///
/// The returned text is not validated or cleaned up in any way.
pub fn extract_meet_link(event: &Event) -> Option<&str> {
    if let Some(link) = event.hangout_link.as_deref().filter(|l| !l.is_empty()) {
        return Some(link);
    }

    let from_description = event
        .description
        .as_deref()
        .and_then(|d| d.split_whitespace().find(|word| word.contains(MEET_URL_PREFIX)));
    if from_description.is_some() {
        return from_description;
    }

    event
        .location
        .as_deref()
        .filter(|l| l.contains(MEET_URL_PREFIX))
}
