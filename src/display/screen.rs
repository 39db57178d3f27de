//! Terminal rendering of the kiosk panels
//!
//! A full-redraw renderer: each applied update repaints the whole surface.
//! At one clock tick per second this is far below any terminal's limits.

use std::fmt::Write as _;

use tokio::sync::mpsc;

use super::DisplayUpdate;

/// Transcript lines kept on screen
const TRANSCRIPT_LINES: usize = 12;

/// Current panel contents
#[derive(Debug, Default)]
pub struct Screen {
    time: String,
    date: String,
    weather_heading: String,
    weather_description: String,
    weather_icon: Option<String>,
    calendar: String,
    transcript: Vec<String>,
}

impl Screen {
    /// Create an empty screen with loading placeholders
    #[must_use]
    pub fn new() -> Self {
        Self {
            weather_heading: "Loading weather...".to_string(),
            calendar: "Loading calendar...".to_string(),
            ..Self::default()
        }
    }

    /// Apply one update to the panel state
    pub fn apply(&mut self, update: DisplayUpdate) {
        match update {
            DisplayUpdate::Clock { time, date } => {
                self.time = time;
                self.date = date;
            }
            DisplayUpdate::Weather {
                heading,
                description,
                icon,
            } => {
                self.weather_heading = heading;
                self.weather_description = description;
                self.weather_icon = icon;
            }
            DisplayUpdate::Calendar(text) => {
                self.calendar = text;
            }
            DisplayUpdate::Transcript(line) => {
                self.transcript.push(line);
                if self.transcript.len() > TRANSCRIPT_LINES {
                    let excess = self.transcript.len() - TRANSCRIPT_LINES;
                    self.transcript.drain(..excess);
                }
            }
        }
    }

    /// Render the full surface as text
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::new();

        let _ = writeln!(out, "{}    {}", self.time, self.date);
        let _ = writeln!(out);
        let _ = writeln!(out, "{}", self.weather_heading);
        if !self.weather_description.is_empty() {
            let _ = writeln!(out, "{}", self.weather_description);
        }
        if let Some(ref icon) = self.weather_icon {
            let _ = writeln!(out, "[{icon}]");
        }
        let _ = writeln!(out);
        let _ = writeln!(out, "{}", self.calendar);
        let _ = writeln!(out);
        for line in &self.transcript {
            let _ = writeln!(out, "{line}");
        }

        out
    }

    /// Consume the display queue until every sender is gone
    ///
    /// This is the only place panel state changes; producers communicate
    /// exclusively through the queue.
    pub async fn run(mut self, mut rx: mpsc::Receiver<DisplayUpdate>) {
        use std::io::Write as _;

        while let Some(update) = rx.recv().await {
            self.apply(update);
            // Repaint from the top-left on every update
            print!("\x1b[2J\x1b[H{}", self.render());
            let _ = std::io::stdout().flush();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn applies_clock_and_panels() {
        let mut screen = Screen::new();
        screen.apply(DisplayUpdate::Clock {
            time: "14:30".to_string(),
            date: "Saturday, August 08".to_string(),
        });
        screen.apply(DisplayUpdate::Weather {
            heading: "Kingston\n21°C".to_string(),
            description: "Light rain".to_string(),
            icon: Some("rainy.png".to_string()),
        });
        screen.apply(DisplayUpdate::Calendar(
            "Upcoming Events:\n2026-08-09: Trip".to_string(),
        ));

        let rendered = screen.render();
        assert!(rendered.contains("14:30"));
        assert!(rendered.contains("Saturday, August 08"));
        assert!(rendered.contains("Kingston"));
        assert!(rendered.contains("Light rain"));
        assert!(rendered.contains("[rainy.png]"));
        assert!(rendered.contains("2026-08-09: Trip"));
    }

    #[test]
    fn weather_placeholder_renders_without_icon() {
        let mut screen = Screen::new();
        screen.apply(DisplayUpdate::Weather {
            heading: super::super::WEATHER_FETCH_ERROR.to_string(),
            description: String::new(),
            icon: None,
        });

        let rendered = screen.render();
        assert!(rendered.contains("Error fetching weather data."));
        assert!(!rendered.contains('['));
    }

    #[test]
    fn transcript_keeps_most_recent_lines() {
        let mut screen = Screen::new();
        for i in 0..20 {
            screen.apply(DisplayUpdate::Transcript(format!("line {i}")));
        }

        let rendered = screen.render();
        assert!(!rendered.contains("line 0"));
        assert!(rendered.contains("line 19"));
        assert_eq!(screen.transcript.len(), TRANSCRIPT_LINES);
    }
}
