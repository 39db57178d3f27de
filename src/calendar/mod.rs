//! Calendar API client
//!
//! Lists the next few upcoming events from the primary calendar. Failures
//! degrade to placeholder text at the call sites; the schedule and the
//! conversation loop never stop over a calendar error.

pub mod auth;

pub use auth::Authenticator;

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, NaiveTime, SecondsFormat, Utc};
use serde::Deserialize;

use crate::{Error, Result};

/// Events list endpoint for the primary calendar
const EVENTS_URL: &str = "https://www.googleapis.com/calendar/v3/calendars/primary/events";

/// Upper bound on listed events
pub const MAX_UPCOMING: usize = 5;

/// Title substituted when an event has no summary
const UNTITLED: &str = "No Title";

/// One upcoming event, ready for display
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpcomingEvent {
    /// Formatted start: `2026-08-08 14:30`, or `2026-08-08` for all-day
    pub start: String,

    /// Event title
    pub summary: String,

    sort_key: DateTime<Utc>,
}

impl UpcomingEvent {
    /// Agenda line: `2026-08-08 14:30: Dentist`
    #[must_use]
    pub fn agenda_line(&self) -> String {
        format!("{}: {}", self.start, self.summary)
    }
}

/// Events list response (only the fields the kiosk reads)
#[derive(Deserialize)]
struct EventsResponse {
    #[serde(default)]
    items: Vec<EventItem>,
}

#[derive(Deserialize)]
struct EventItem {
    start: EventStart,
    summary: Option<String>,
}

/// Event start: timed events carry `dateTime`, all-day events carry `date`
#[derive(Deserialize)]
struct EventStart {
    #[serde(rename = "dateTime")]
    date_time: Option<String>,
    date: Option<String>,
}

/// Lists upcoming calendar events
#[derive(Clone)]
pub struct CalendarClient {
    client: reqwest::Client,
    auth: Arc<Authenticator>,
}

impl CalendarClient {
    /// Create a new calendar client
    #[must_use]
    pub fn new(auth: Arc<Authenticator>) -> Self {
        Self {
            client: reqwest::Client::new(),
            auth,
        }
    }

    /// List the next upcoming singly-occurring events, ascending by start
    ///
    /// # Errors
    ///
    /// Returns error on authorization failure, transport failure, or a
    /// malformed response
    pub async fn upcoming(&self) -> Result<Vec<UpcomingEvent>> {
        let token = self.auth.access_token().await?;
        let time_min = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);

        let response = self
            .client
            .get(EVENTS_URL)
            .bearer_auth(token)
            .query(&[
                ("timeMin", time_min.as_str()),
                ("maxResults", "5"),
                ("singleEvents", "true"),
                ("orderBy", "startTime"),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = %status, body = %body, "calendar API error");
            return Err(Error::Calendar(format!(
                "calendar API error {status}: {body}"
            )));
        }

        let body: EventsResponse = response.json().await?;
        let events = parse_events(body);

        tracing::debug!(count = events.len(), "calendar events fetched");
        Ok(events)
    }
}

/// Convert a raw listing into display events: ascending by start, at most
/// [`MAX_UPCOMING`], untitled events labeled
fn parse_events(response: EventsResponse) -> Vec<UpcomingEvent> {
    let mut events: Vec<UpcomingEvent> = response
        .items
        .into_iter()
        .filter_map(|item| {
            let (sort_key, start) = parse_start(&item.start)?;
            Some(UpcomingEvent {
                start,
                summary: item.summary.unwrap_or_else(|| UNTITLED.to_string()),
                sort_key,
            })
        })
        .collect();

    events.sort_by_key(|e| e.sort_key);
    events.truncate(MAX_UPCOMING);
    events
}

/// Parse an event start into a sort key and a display string
fn parse_start(start: &EventStart) -> Option<(DateTime<Utc>, String)> {
    if let Some(ref raw) = start.date_time {
        let parsed = DateTime::parse_from_rfc3339(raw).ok()?;
        let display = parsed.format("%Y-%m-%d %H:%M").to_string();
        return Some((parsed.with_timezone(&Utc), display));
    }

    if let Some(ref raw) = start.date {
        let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()?;
        let midnight = date.and_time(NaiveTime::MIN).and_utc();
        return Some((midnight, date.format("%Y-%m-%d").to_string()));
    }

    None
}

/// Render an agenda block, or `None` when there are no events
#[must_use]
pub fn format_agenda(events: &[UpcomingEvent]) -> Option<String> {
    if events.is_empty() {
        return None;
    }

    let lines: Vec<String> = events.iter().map(UpcomingEvent::agenda_line).collect();
    Some(format!("Upcoming Events:\n{}", lines.join("\n")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(json: &str) -> EventsResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn events_sorted_ascending_and_capped() {
        let response = listing(
            r#"{"items": [
                {"start": {"dateTime": "2026-08-12T09:00:00-04:00"}, "summary": "F"},
                {"start": {"dateTime": "2026-08-08T14:30:00-04:00"}, "summary": "A"},
                {"start": {"dateTime": "2026-08-09T08:00:00-04:00"}, "summary": "B"},
                {"start": {"dateTime": "2026-08-11T10:00:00-04:00"}, "summary": "E"},
                {"start": {"dateTime": "2026-08-10T16:15:00-04:00"}, "summary": "C"},
                {"start": {"dateTime": "2026-08-10T18:00:00-04:00"}, "summary": "D"}
            ]}"#,
        );

        let events = parse_events(response);
        assert_eq!(events.len(), MAX_UPCOMING);
        let titles: Vec<&str> = events.iter().map(|e| e.summary.as_str()).collect();
        assert_eq!(titles, ["A", "B", "C", "D", "E"]);

        let mut keys: Vec<_> = events.iter().map(|e| e.sort_key).collect();
        let sorted = keys.clone();
        keys.sort();
        assert_eq!(keys, sorted);
    }

    #[test]
    fn timed_event_formats_date_and_time() {
        let events = parse_events(listing(
            r#"{"items": [{"start": {"dateTime": "2026-08-08T14:30:00-04:00"}, "summary": "Dentist"}]}"#,
        ));
        assert_eq!(events[0].start, "2026-08-08 14:30");
        assert_eq!(events[0].agenda_line(), "2026-08-08 14:30: Dentist");
    }

    #[test]
    fn all_day_event_formats_date_only() {
        let events = parse_events(listing(
            r#"{"items": [{"start": {"date": "2026-08-09"}, "summary": "Trip"}]}"#,
        ));
        assert_eq!(events[0].start, "2026-08-09");
    }

    #[test]
    fn missing_summary_falls_back_to_no_title() {
        let events = parse_events(listing(
            r#"{"items": [{"start": {"date": "2026-08-09"}}]}"#,
        ));
        assert_eq!(events[0].summary, "No Title");
    }

    #[test]
    fn unparseable_start_is_skipped() {
        let events = parse_events(listing(
            r#"{"items": [
                {"start": {"dateTime": "not-a-date"}, "summary": "Bad"},
                {"start": {"date": "2026-08-09"}, "summary": "Good"}
            ]}"#,
        ));
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].summary, "Good");
    }

    #[test]
    fn empty_listing_parses_and_formats_as_none() {
        let events = parse_events(listing("{}"));
        assert!(events.is_empty());
        assert!(format_agenda(&events).is_none());
    }

    #[test]
    fn agenda_block_has_heading_and_lines() {
        let events = parse_events(listing(
            r#"{"items": [
                {"start": {"dateTime": "2026-08-08T14:30:00-04:00"}, "summary": "Dentist"},
                {"start": {"date": "2026-08-09"}, "summary": "Trip"}
            ]}"#,
        ));

        let agenda = format_agenda(&events).unwrap();
        assert!(agenda.starts_with("Upcoming Events:\n"));
        assert!(agenda.contains("2026-08-08 14:30: Dentist"));
        assert!(agenda.contains("2026-08-09: Trip"));
    }
}
