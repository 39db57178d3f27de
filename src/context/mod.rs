//! Session context assembly for prompt augmentation
//!
//! Every conversation turn rebuilds an ephemeral context from live time,
//! weather and calendar data. Fetch failures degrade to fixed sentinel text;
//! building a context never fails and never blocks a turn on a partial
//! outage (weather failing does not hide time or calendar).

use async_trait::async_trait;
use chrono::{DateTime, Local};

use crate::calendar::{self, CalendarClient, UpcomingEvent};
use crate::config::{TimeFormat, Units};
use crate::weather::{CurrentWeather, WeatherClient};
use crate::Result;

/// Sentinel shown when weather cannot be fetched
pub const WEATHER_UNAVAILABLE: &str = "Weather data unavailable.";

/// Sentinel shown when the calendar is empty or unreachable
pub const NO_UPCOMING_EVENTS: &str = "No upcoming events found.";

/// Ephemeral per-turn context; lifetime is one prompt construction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContext {
    /// Formatted local timestamp
    pub current_time: String,

    /// Weather summary line, or [`WEATHER_UNAVAILABLE`]
    pub weather_summary: String,

    /// Agenda block, or [`NO_UPCOMING_EVENTS`]
    pub calendar_summary: String,
}

impl SessionContext {
    /// Render the augmented prompt. Section order is stable across turns:
    /// time, weather, calendar, then the labeled user prompt.
    #[must_use]
    pub fn render_prompt(&self, user_text: &str) -> String {
        format!(
            "Current Time: {}.\n{}\n{}\n\nUser Prompt: {}",
            self.current_time, self.weather_summary, self.calendar_summary, user_text
        )
    }
}

/// Source of per-turn session context
///
/// The conversation loop depends on this seam rather than concrete network
/// clients so it can be exercised without live services.
#[async_trait(?Send)]
pub trait ContextSource {
    /// Build a fresh context; degrades internally, never fails
    async fn build(&self) -> SessionContext;
}

/// Builds session context from live time, weather and calendar
pub struct ContextBuilder {
    weather: WeatherClient,
    calendar: CalendarClient,
    units: Units,
    time_format: TimeFormat,
}

impl ContextBuilder {
    /// Create a new context builder
    #[must_use]
    pub const fn new(
        weather: WeatherClient,
        calendar: CalendarClient,
        units: Units,
        time_format: TimeFormat,
    ) -> Self {
        Self {
            weather,
            calendar,
            units,
            time_format,
        }
    }
}

#[async_trait(?Send)]
impl ContextSource for ContextBuilder {
    async fn build(&self) -> SessionContext {
        let now = Local::now();
        let current_time = format_context_time(now, self.time_format);

        let weather_summary = weather_summary(self.weather.current().await, self.units);
        let calendar_summary = calendar_summary(self.calendar.upcoming().await);

        SessionContext {
            current_time,
            weather_summary,
            calendar_summary,
        }
    }
}

/// Summarize a weather fetch result, degrading to the sentinel
#[must_use]
pub fn weather_summary(result: Result<CurrentWeather>, units: Units) -> String {
    match result {
        Ok(weather) => weather.summary_line(units),
        Err(e) => {
            tracing::warn!(error = %e, "weather unavailable for context");
            WEATHER_UNAVAILABLE.to_string()
        }
    }
}

/// Summarize a calendar fetch result, degrading to the sentinel
#[must_use]
pub fn calendar_summary(result: Result<Vec<UpcomingEvent>>) -> String {
    match result {
        Ok(events) => {
            calendar::format_agenda(&events).unwrap_or_else(|| NO_UPCOMING_EVENTS.to_string())
        }
        Err(e) => {
            tracing::warn!(error = %e, "calendar unavailable for context");
            NO_UPCOMING_EVENTS.to_string()
        }
    }
}

/// Format a timestamp for the context block
/// (12h: `02:30 PM, Saturday, August 08, 2026`)
#[must_use]
pub fn format_context_time(now: DateTime<Local>, format: TimeFormat) -> String {
    let pattern = match format {
        TimeFormat::TwelveHour => "%I:%M %p, %A, %B %d, %Y",
        TimeFormat::TwentyFourHour => "%H:%M, %A, %B %d, %Y",
    };
    now.format(pattern).to_string()
}

/// Format a timestamp for the clock panel
#[must_use]
pub fn format_clock(now: DateTime<Local>, format: TimeFormat) -> String {
    let pattern = match format {
        TimeFormat::TwelveHour => "%I:%M %p",
        TimeFormat::TwentyFourHour => "%H:%M",
    };
    now.format(pattern).to_string()
}

/// Format the date line for the clock panel (`Saturday, August 08`)
#[must_use]
pub fn format_date(now: DateTime<Local>) -> String {
    now.format("%A, %B %d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use chrono::TimeZone;

    fn fixed_local() -> DateTime<Local> {
        Local.with_ymd_and_hms(2026, 8, 8, 14, 30, 0).unwrap()
    }

    #[test]
    fn prompt_sections_render_in_order() {
        let ctx = SessionContext {
            current_time: "14:30, Saturday, August 08, 2026".to_string(),
            weather_summary: "Weather: Kingston, 21°C, Light rain.".to_string(),
            calendar_summary: "Upcoming Events:\n2026-08-09: Trip".to_string(),
        };

        let prompt = ctx.render_prompt("What's on my calendar?");

        let time_pos = prompt.find("Current Time:").unwrap();
        let weather_pos = prompt.find("Weather:").unwrap();
        let calendar_pos = prompt.find("Upcoming Events:").unwrap();
        let user_pos = prompt.find("User Prompt: What's on my calendar?").unwrap();
        assert!(time_pos < weather_pos);
        assert!(weather_pos < calendar_pos);
        assert!(calendar_pos < user_pos);
    }

    #[test]
    fn weather_failure_degrades_to_sentinel() {
        let summary = weather_summary(
            Err(Error::Weather("weather API error 500".to_string())),
            Units::Metric,
        );
        assert_eq!(summary, WEATHER_UNAVAILABLE);
    }

    #[test]
    fn calendar_failure_and_empty_both_degrade_to_sentinel() {
        assert_eq!(
            calendar_summary(Err(Error::Calendar("boom".to_string()))),
            NO_UPCOMING_EVENTS
        );
        assert_eq!(calendar_summary(Ok(Vec::new())), NO_UPCOMING_EVENTS);
    }

    #[test]
    fn context_time_honors_clock_format() {
        let now = fixed_local();
        assert_eq!(
            format_context_time(now, TimeFormat::TwentyFourHour),
            "14:30, Saturday, August 08, 2026"
        );
        assert_eq!(
            format_context_time(now, TimeFormat::TwelveHour),
            "02:30 PM, Saturday, August 08, 2026"
        );
    }

    #[test]
    fn clock_and_date_formats() {
        let now = fixed_local();
        assert_eq!(format_clock(now, TimeFormat::TwentyFourHour), "14:30");
        assert_eq!(format_clock(now, TimeFormat::TwelveHour), "02:30 PM");
        assert_eq!(format_date(now), "Saturday, August 08");
    }
}
