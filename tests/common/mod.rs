//! Shared test utilities

use hearth_display::SessionContext;

/// A fixed session context for conversation loop tests
#[must_use]
pub fn test_context() -> SessionContext {
    SessionContext {
        current_time: "14:30, Saturday, August 08, 2026".to_string(),
        weather_summary: "Weather: Kingston, 21°C, Light rain.".to_string(),
        calendar_summary: "Upcoming Events:\n2026-08-09 10:00: Dentist".to_string(),
    }
}
