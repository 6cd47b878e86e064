//! Picking the next meeting across calendars.

use tracing::debug;

use crate::event::{CalendarId, Event};

/// Something that can report the next upcoming event of a calendar.
///
/// Implementations return at most one event, already restricted to the
/// future and ordered by start time.
#[allow(async_fn_in_trait)]
pub trait EventSource {
    type Error;

    async fn next_event(&self, calendar: &CalendarId) -> Result<Option<Event>, Self::Error>;
}

/// Ask every calendar for its next event and keep the one that starts first.
///
/// Only timed events can win; all-day events and events without a start
/// time are skipped. Ties go to the calendar that came first.
/// Errors from the source stop the scan and are returned as-is.
pub async fn find_next_event<S: EventSource>(
    source: &S,
    calendars: &[CalendarId],
) -> Result<Option<Event>, S::Error> {
    let mut closest: Option<Event> = None;

    for calendar in calendars {
        let Some(event) = source.next_event(calendar).await? else {
            debug!(%calendar, "no upcoming event");
            continue;
        };

        if starts_before(&event, closest.as_ref()) {
            debug!(%calendar, event_id = %event.id, "new closest event");
            closest = Some(event);
        }
    }

    Ok(closest)
}

fn starts_before(candidate: &Event, current: Option<&Event>) -> bool {
    let Some(start) = candidate.start.timed() else {
        return false;
    };

    match current.and_then(|c| c.start.timed()) {
        Some(best) => start < best,
        None => true,
    }
}
