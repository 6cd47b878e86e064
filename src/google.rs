//! Google Calendar v3 REST client.
//!
//! Only the two read calls calmeet needs: the user's calendar list and the
//! single next event of one calendar.

use anyhow::{Context, Result, bail};
use calmeet_core::{CalendarId, Event, EventSource, EventTime};
use chrono::{DateTime, FixedOffset, NaiveDate, SecondsFormat, Utc};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

const CALENDAR_API_BASE: &str = "https://www.googleapis.com/calendar/v3";

pub struct GoogleCalendar {
    http: reqwest::Client,
    base_url: Url,
    access_token: String,
    /// Lower bound for "upcoming", fixed for the whole run
    time_min: DateTime<Utc>,
}

/// A calendar from the user's calendar list
#[derive(Debug, Clone)]
pub struct CalendarEntry {
    pub id: CalendarId,
    pub summary: String,
    pub primary: bool,
}

impl GoogleCalendar {
    pub fn new(access_token: &str, time_min: DateTime<Utc>) -> Result<Self> {
        Self::with_base_url(CALENDAR_API_BASE, access_token, time_min)
    }

    pub fn with_base_url(base_url: &str, access_token: &str, time_min: DateTime<Utc>) -> Result<Self> {
        let base_url =
            Url::parse(base_url).with_context(|| format!("Invalid API base URL: {}", base_url))?;

        Ok(GoogleCalendar {
            http: reqwest::Client::new(),
            base_url,
            access_token: access_token.to_string(),
            time_min,
        })
    }

    /// Fetch every calendar the user can see, following pagination.
    pub async fn list_calendars(&self) -> Result<Vec<CalendarEntry>> {
        let url = self.endpoint(&["users", "me", "calendarList"])?;

        let mut calendars = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut query = Vec::new();
            if let Some(token) = page_token.take() {
                query.push(("pageToken", token));
            }

            let page: CalendarListPage = self
                .get_json(url.clone(), &query)
                .await
                .context("Failed to fetch calendars")?;

            calendars.extend(
                page.items
                    .into_iter()
                    .filter(|c| !c.id.is_empty())
                    .map(|c| CalendarEntry {
                        id: CalendarId::from(c.id),
                        summary: if c.summary.is_empty() {
                            "(unnamed)".to_string()
                        } else {
                            c.summary
                        },
                        primary: c.primary,
                    }),
            );

            match page.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        debug!(count = calendars.len(), "fetched calendar list");

        Ok(calendars)
    }

    pub async fn list_calendar_ids(&self) -> Result<Vec<CalendarId>> {
        Ok(self
            .list_calendars()
            .await?
            .into_iter()
            .map(|c| c.id)
            .collect())
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| anyhow::anyhow!("API base URL cannot take a path: {}", self.base_url))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url, query: &[(&str, String)]) -> Result<T> {
        debug!(path = url.path(), "GET");

        let response = self
            .http
            .get(url.clone())
            .bearer_auth(&self.access_token)
            .query(query)
            .send()
            .await
            .with_context(|| format!("Failed to send request to {}", url.path()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            bail!("Google Calendar API error ({}): {}", status, error_text);
        }

        response
            .json()
            .await
            .with_context(|| format!("Failed to parse response from {}", url.path()))
    }
}

impl EventSource for GoogleCalendar {
    type Error = anyhow::Error;

    async fn next_event(&self, calendar: &CalendarId) -> Result<Option<Event>> {
        let url = self.endpoint(&["calendars", calendar.as_str(), "events"])?;

        let query = [
            ("timeMin", self.time_min.to_rfc3339_opts(SecondsFormat::Secs, true)),
            ("maxResults", "1".to_string()),
            ("singleEvents", "true".to_string()),
            ("orderBy", "startTime".to_string()),
            ("eventTypes", "default".to_string()),
        ];

        let page: EventsPage = self
            .get_json(url, &query)
            .await
            .with_context(|| format!("Failed to fetch events for calendar {}", calendar))?;

        page.items.into_iter().next().map(Event::from_google).transpose()
    }
}

// =============================================================================
// API payloads
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CalendarListPage {
    #[serde(default)]
    items: Vec<GoogleCalendarListEntry>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GoogleCalendarListEntry {
    #[serde(default)]
    id: String,
    #[serde(default)]
    summary: String,
    #[serde(default)]
    primary: bool,
}

#[derive(Debug, Deserialize)]
struct EventsPage {
    #[serde(default)]
    items: Vec<GoogleEvent>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GoogleEvent {
    #[serde(default)]
    id: String,
    summary: Option<String>,
    description: Option<String>,
    location: Option<String>,
    hangout_link: Option<String>,
    start: Option<GoogleEventDateTime>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GoogleEventDateTime {
    date_time: Option<DateTime<FixedOffset>>,
    date: Option<NaiveDate>,
}

trait FromGoogle {
    fn from_google(event: GoogleEvent) -> Result<Self>
    where
        Self: Sized;
}

impl FromGoogle for Event {
    fn from_google(event: GoogleEvent) -> Result<Self> {
        let start = match event.start {
            Some(GoogleEventDateTime {
                date_time: Some(dt),
                ..
            }) => EventTime::DateTime(dt),
            Some(GoogleEventDateTime { date: Some(d), .. }) => EventTime::Date(d),
            Some(_) => EventTime::Unspecified,
            None => bail!("Event {} has no start time", event.id),
        };

        Ok(Event {
            id: event.id,
            summary: non_empty(event.summary).unwrap_or_else(|| "(No title)".to_string()),
            start,
            hangout_link: non_empty(event.hangout_link),
            description: non_empty(event.description),
            location: non_empty(event.location),
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use calmeet_core::find_next_event;
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn time_min() -> DateTime<Utc> {
        "2024-01-01T08:00:00Z".parse().unwrap()
    }

    fn client(server: &MockServer) -> GoogleCalendar {
        GoogleCalendar::with_base_url(&server.uri(), "token-123", time_min()).unwrap()
    }

    #[tokio::test]
    async fn next_event_asks_for_one_upcoming_instance() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/calendars/primary/events"))
            .and(header("authorization", "Bearer token-123"))
            .and(query_param("timeMin", "2024-01-01T08:00:00Z"))
            .and(query_param("maxResults", "1"))
            .and(query_param("singleEvents", "true"))
            .and(query_param("orderBy", "startTime"))
            .and(query_param("eventTypes", "default"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [{
                    "id": "evt1",
                    "summary": "Standup",
                    "hangoutLink": "https://meet.google.com/abc-defg-hij",
                    "description": "Daily sync",
                    "start": { "dateTime": "2024-01-01T09:00:00-05:00" }
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let event = client(&server)
            .next_event(&CalendarId::from("primary"))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(event.id, "evt1");
        assert_eq!(event.summary, "Standup");
        assert_eq!(
            event.hangout_link.as_deref(),
            Some("https://meet.google.com/abc-defg-hij")
        );
        assert_eq!(event.location, None);
        assert_eq!(
            event.start,
            EventTime::DateTime(DateTime::parse_from_rfc3339("2024-01-01T09:00:00-05:00").unwrap())
        );
    }

    #[tokio::test]
    async fn calendar_id_is_encoded_as_path_segment() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/calendars/en.usa%23holiday@group.v.calendar.google.com/events"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "items": [] })))
            .expect(1)
            .mount(&server)
            .await;

        let event = client(&server)
            .next_event(&CalendarId::from("en.usa#holiday@group.v.calendar.google.com"))
            .await
            .unwrap();

        assert!(event.is_none());
    }

    #[tokio::test]
    async fn all_day_event_keeps_its_date() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/calendars/primary/events"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [{
                    "id": "holiday",
                    "summary": "",
                    "start": { "date": "2024-01-02" }
                }]
            })))
            .mount(&server)
            .await;

        let event = client(&server)
            .next_event(&CalendarId::from("primary"))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(event.summary, "(No title)");
        assert_eq!(
            event.start,
            EventTime::Date(NaiveDate::from_ymd_opt(2024, 1, 2).unwrap())
        );
    }

    #[tokio::test]
    async fn event_without_start_is_an_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/calendars/primary/events"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [{ "id": "broken", "summary": "No start" }]
            })))
            .mount(&server)
            .await;

        let err = client(&server)
            .next_event(&CalendarId::from("primary"))
            .await
            .unwrap_err();

        assert!(format!("{:#}", err).contains("Event broken has no start time"));
    }

    #[tokio::test]
    async fn start_without_date_or_time_is_skipped() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/calendars/a/events"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [{ "id": "odd", "start": { "timeZone": "UTC" } }]
            })))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/calendars/b/events"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [{ "id": "sync", "start": { "dateTime": "2024-01-01T09:00:00Z" } }]
            })))
            .mount(&server)
            .await;

        let google = client(&server);
        let odd = google.next_event(&CalendarId::from("a")).await.unwrap().unwrap();
        assert_eq!(odd.start, EventTime::Unspecified);

        let next = find_next_event(&google, &[CalendarId::from("a"), CalendarId::from("b")])
            .await
            .unwrap();

        assert_eq!(next.map(|e| e.id).as_deref(), Some("sync"));
    }

    #[tokio::test]
    async fn api_error_status_is_reported() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/calendars/primary/events"))
            .respond_with(ResponseTemplate::new(401).set_body_string("invalid credentials"))
            .mount(&server)
            .await;

        let err = client(&server)
            .next_event(&CalendarId::from("primary"))
            .await
            .unwrap_err();

        let message = format!("{:#}", err);
        assert!(message.contains("Failed to fetch events for calendar primary"));
        assert!(message.contains("401"));
        assert!(message.contains("invalid credentials"));
    }

    #[tokio::test]
    async fn calendar_list_follows_pages() {
        let server = MockServer::start().await;

        // Registered first so it takes precedence for the second request
        Mock::given(method("GET"))
            .and(path("/users/me/calendarList"))
            .and(query_param("pageToken", "page-2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [{ "id": "team@group.calendar.google.com", "summary": "Team" }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/users/me/calendarList"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [
                    { "id": "me@example.com", "summary": "Me", "primary": true },
                    { "id": "", "summary": "Ghost" },
                    { "id": "untitled@group.calendar.google.com" }
                ],
                "nextPageToken": "page-2"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let calendars = client(&server).list_calendars().await.unwrap();

        let ids: Vec<&str> = calendars.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(
            ids,
            vec![
                "me@example.com",
                "untitled@group.calendar.google.com",
                "team@group.calendar.google.com"
            ]
        );
        assert!(calendars[0].primary);
        assert_eq!(calendars[1].summary, "(unnamed)");
    }
}
