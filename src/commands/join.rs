use std::io::Write;

use anyhow::Result;
use calmeet_core::paths::AppPaths;
use calmeet_core::{CalendarId, EventSource, extract_meet_link, find_next_event};
use chrono::Utc;
use owo_colors::OwoColorize;

use crate::google::GoogleCalendar;
use crate::session;
use crate::utils::tui::create_spinner;

pub async fn run(paths: &AppPaths, open_browser: bool) -> Result<()> {
    let token = session::login(paths).await?;

    // "now" is taken once so every calendar is asked about the same window
    let google = GoogleCalendar::new(&token.access_token, Utc::now())?;

    let spinner = create_spinner("Fetching calendars");
    let calendar_ids = google.list_calendar_ids().await;
    spinner.finish_and_clear();
    let calendar_ids = calendar_ids?;

    report_next(&google, &calendar_ids, open_browser, &mut std::io::stdout()).await
}

/// Find the next meeting across `calendar_ids` and report it on `out`,
/// opening its Meet link in the browser unless `open_browser` is false.
pub async fn report_next<S>(
    source: &S,
    calendar_ids: &[CalendarId],
    open_browser: bool,
    out: &mut impl Write,
) -> Result<()>
where
    S: EventSource<Error = anyhow::Error>,
{
    writeln!(out, "Found {} calendars.", calendar_ids.len())?;

    let spinner = create_spinner("Looking for your next meeting");
    let next = find_next_event(source, calendar_ids).await;
    spinner.finish_and_clear();

    let Some(event) = next? else {
        writeln!(out, "{}", "No upcoming events found.".dimmed())?;
        return Ok(());
    };

    writeln!(out, "Next event: {}", event)?;

    let Some(link) = extract_meet_link(&event) else {
        writeln!(out, "No Google Meet link found for the next event.")?;
        return Ok(());
    };

    if !open_browser {
        writeln!(out, "Google Meet link: {}", link)?;
        return Ok(());
    }

    writeln!(out, "Opening Google Meet link: {}", link)?;

    if open::that(link).is_err() {
        writeln!(
            out,
            "{}",
            "(Could not open browser automatically, please copy the link above)".dimmed()
        )?;
    }

    Ok(())
}
