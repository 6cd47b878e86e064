use anyhow::Result;
use calmeet_core::paths::AppPaths;
use chrono::Utc;
use owo_colors::OwoColorize;

use crate::google::GoogleCalendar;
use crate::session;
use crate::utils::tui::create_spinner;

pub async fn run(paths: &AppPaths) -> Result<()> {
    let token = session::login(paths).await?;
    let google = GoogleCalendar::new(&token.access_token, Utc::now())?;

    let spinner = create_spinner("Fetching calendars");
    let calendars = google.list_calendars().await;
    spinner.finish_and_clear();
    let calendars = calendars?;

    if calendars.is_empty() {
        println!("{}", "No calendars found".dimmed());
        return Ok(());
    }

    for cal in &calendars {
        let marker = if cal.primary { " (primary)" } else { "" };
        println!("{}{} {}", cal.summary, marker.bold(), cal.id.dimmed());
    }

    Ok(())
}
