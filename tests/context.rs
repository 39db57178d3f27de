//! Context assembly integration tests
//!
//! Exercises the prompt contract end to end: section ordering, sentinel
//! substitution, and the weather parse failure paths that feed it.

use hearth_display::config::{TimeFormat, Units};
use hearth_display::context::{
    self, NO_UPCOMING_EVENTS, WEATHER_UNAVAILABLE, calendar_summary, weather_summary,
};
use hearth_display::weather::parse_current;
use hearth_display::Error;

mod common;

#[test]
fn rendered_prompt_orders_time_weather_calendar_user() {
    let ctx = common::test_context();
    let prompt = ctx.render_prompt("Will it rain during my appointment?");

    let time_pos = prompt.find("Current Time:").unwrap();
    let weather_pos = prompt.find("Weather:").unwrap();
    let calendar_pos = prompt.find("Upcoming Events:").unwrap();
    let user_pos = prompt
        .find("User Prompt: Will it rain during my appointment?")
        .unwrap();

    assert!(time_pos < weather_pos);
    assert!(weather_pos < calendar_pos);
    assert!(calendar_pos < user_pos);
}

#[test]
fn ordering_is_stable_when_sections_are_sentinels() {
    let mut ctx = common::test_context();
    ctx.weather_summary = WEATHER_UNAVAILABLE.to_string();
    ctx.calendar_summary = NO_UPCOMING_EVENTS.to_string();

    let prompt = ctx.render_prompt("hello");

    let weather_pos = prompt.find(WEATHER_UNAVAILABLE).unwrap();
    let calendar_pos = prompt.find(NO_UPCOMING_EVENTS).unwrap();
    let user_pos = prompt.find("User Prompt: hello").unwrap();
    assert!(weather_pos < calendar_pos);
    assert!(calendar_pos < user_pos);
}

#[test]
fn weather_body_missing_temp_degrades_to_sentinel() {
    let body = r#"{"main": {}, "weather": [{"description": "mist"}], "name": "Kingston"}"#;
    let summary = weather_summary(parse_current(body), Units::Metric);
    assert_eq!(summary, WEATHER_UNAVAILABLE);
}

#[test]
fn weather_body_missing_description_degrades_to_sentinel() {
    let body = r#"{"main": {"temp": 12.0}, "weather": [], "name": "Kingston"}"#;
    let summary = weather_summary(parse_current(body), Units::Metric);
    assert_eq!(summary, WEATHER_UNAVAILABLE);
}

#[test]
fn weather_body_missing_name_degrades_to_sentinel() {
    let body = r#"{"main": {"temp": 12.0}, "weather": [{"description": "mist"}]}"#;
    let summary = weather_summary(parse_current(body), Units::Metric);
    assert_eq!(summary, WEATHER_UNAVAILABLE);
}

#[test]
fn weather_success_renders_summary_line() {
    let body = r#"{"main": {"temp": 21.4}, "weather": [{"description": "light rain"}], "name": "Kingston"}"#;
    let summary = weather_summary(parse_current(body), Units::Metric);
    assert_eq!(summary, "Weather: Kingston, 21°C, Light rain.");
}

#[test]
fn calendar_transport_failure_degrades_to_sentinel() {
    let summary = calendar_summary(Err(Error::Calendar("timed out".to_string())));
    assert_eq!(summary, NO_UPCOMING_EVENTS);
}

#[test]
fn context_time_formats_follow_configuration() {
    use chrono::TimeZone;
    let now = chrono::Local.with_ymd_and_hms(2026, 8, 8, 20, 5, 0).unwrap();

    assert_eq!(
        context::format_context_time(now, TimeFormat::TwentyFourHour),
        "20:05, Saturday, August 08, 2026"
    );
    assert_eq!(
        context::format_context_time(now, TimeFormat::TwelveHour),
        "08:05 PM, Saturday, August 08, 2026"
    );
}
