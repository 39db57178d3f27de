//! Display surface and panel refreshers
//!
//! The display is driven entirely by a message queue: refresher tasks and
//! the voice thread post [`DisplayUpdate`] values, and a single consumer on
//! the main task applies them. No producer ever touches display state
//! directly; the queue is the only cross-thread synchronization point.

mod screen;

pub use screen::Screen;

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::calendar::{self, CalendarClient};
use crate::config::{TimeFormat, Units};
use crate::context::{self, NO_UPCOMING_EVENTS};
use crate::weather::{WeatherClient, icon_for_description};

/// Clock refresh cadence
pub const CLOCK_INTERVAL: Duration = Duration::from_secs(1);

/// Weather refresh cadence
pub const WEATHER_REFRESH: Duration = Duration::from_secs(600);

/// Calendar refresh cadence
pub const CALENDAR_REFRESH: Duration = Duration::from_secs(600);

/// Placeholder shown when a weather refresh fails
pub const WEATHER_FETCH_ERROR: &str = "Error fetching weather data.";

/// Queue depth; updates are tiny, the consumer is fast
const QUEUE_CAPACITY: usize = 64;

/// One update posted to the display surface
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayUpdate {
    /// Clock panel: formatted time and date
    Clock { time: String, date: String },

    /// Weather panel: heading, condition line, icon file name
    Weather {
        heading: String,
        description: String,
        icon: Option<String>,
    },

    /// Calendar panel text
    Calendar(String),

    /// A line appended to the conversation transcript
    Transcript(String),
}

/// Sending side of the display queue, cloned into every producer
#[derive(Clone)]
pub struct DisplayHandle {
    tx: mpsc::Sender<DisplayUpdate>,
}

impl DisplayHandle {
    /// Post an update; a full or closed queue drops the update
    ///
    /// Dropping is acceptable: every panel update is superseded by the next
    /// refresh, and the consumer only falls behind if the display is gone.
    pub fn post(&self, update: DisplayUpdate) {
        if let Err(e) = self.tx.try_send(update) {
            tracing::debug!(error = %e, "display update dropped");
        }
    }

    /// Append a line to the conversation transcript
    pub fn transcript(&self, line: impl Into<String>) {
        self.post(DisplayUpdate::Transcript(line.into()));
    }
}

/// Create the display queue
#[must_use]
pub fn channel() -> (DisplayHandle, mpsc::Receiver<DisplayUpdate>) {
    let (tx, rx) = mpsc::channel(QUEUE_CAPACITY);
    (DisplayHandle { tx }, rx)
}

/// Spawn the clock refresher: fires every second, always succeeds
pub fn spawn_clock(handle: DisplayHandle, time_format: TimeFormat) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(CLOCK_INTERVAL);

        loop {
            interval.tick().await;
            let now = chrono::Local::now();
            handle.post(DisplayUpdate::Clock {
                time: context::format_clock(now, time_format),
                date: context::format_date(now),
            });
        }
    })
}

/// Spawn the weather refresher: fires every ten minutes, degrades to a
/// placeholder on failure, never stops the schedule
pub fn spawn_weather(
    handle: DisplayHandle,
    client: WeatherClient,
    units: Units,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(WEATHER_REFRESH);

        loop {
            interval.tick().await;
            let update = match client.current().await {
                Ok(weather) => DisplayUpdate::Weather {
                    heading: weather.panel_heading(units),
                    description: weather.description.clone(),
                    icon: Some(icon_for_description(&weather.description).to_string()),
                },
                Err(e) => {
                    tracing::warn!(error = %e, "weather refresh failed");
                    DisplayUpdate::Weather {
                        heading: WEATHER_FETCH_ERROR.to_string(),
                        description: String::new(),
                        icon: None,
                    }
                }
            };
            handle.post(update);
        }
    })
}

/// Spawn the calendar refresher: fires every ten minutes, degrades to a
/// placeholder on failure or an empty agenda
pub fn spawn_calendar(handle: DisplayHandle, client: CalendarClient) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(CALENDAR_REFRESH);

        loop {
            interval.tick().await;
            let text = match client.upcoming().await {
                Ok(events) => calendar::format_agenda(&events)
                    .unwrap_or_else(|| NO_UPCOMING_EVENTS.to_string()),
                Err(e) => {
                    tracing::warn!(error = %e, "calendar refresh failed");
                    NO_UPCOMING_EVENTS.to_string()
                }
            };
            handle.post(DisplayUpdate::Calendar(text));
        }
    })
}
