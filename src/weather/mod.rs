//! Weather API client
//!
//! Single GET against an OpenWeatherMap-compatible endpoint. Any non-2xx
//! response or missing field is a failure; callers degrade to placeholder
//! text rather than propagating.

mod icon;

pub use icon::icon_for_description;

use serde::Deserialize;

use crate::config::{Units, WeatherConfig};
use crate::{Error, Result};

/// Current conditions at the configured location
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentWeather {
    /// Location name reported by the API
    pub location: String,

    /// Temperature in the requested unit system
    pub temperature: f64,

    /// Capitalized condition description (e.g. "Light rain")
    pub description: String,
}

impl CurrentWeather {
    /// One-line summary for prompt context:
    /// `Weather: Kingston, 21°C, Light rain.`
    #[must_use]
    pub fn summary_line(&self, units: Units) -> String {
        format!(
            "Weather: {}, {}{}, {}.",
            self.location,
            self.temperature.round(),
            units.symbol(),
            self.description
        )
    }

    /// Two-line panel heading: location over rounded temperature
    #[must_use]
    pub fn panel_heading(&self, units: Units) -> String {
        format!("{}\n{}{}", self.location, self.temperature.round(), units.symbol())
    }
}

/// Response body schema (only the fields the kiosk reads)
#[derive(Deserialize)]
struct ApiResponse {
    main: MainFields,
    weather: Vec<Condition>,
    name: String,
}

#[derive(Deserialize)]
struct MainFields {
    temp: f64,
}

#[derive(Deserialize)]
struct Condition {
    description: String,
}

/// Fetches current weather conditions
#[derive(Clone)]
pub struct WeatherClient {
    client: reqwest::Client,
    config: WeatherConfig,
    units: Units,
}

impl WeatherClient {
    /// Create a new weather client
    #[must_use]
    pub fn new(config: WeatherConfig, units: Units) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
            units,
        }
    }

    /// Fetch current conditions
    ///
    /// # Errors
    ///
    /// Returns error on transport failure, non-2xx response, or a body
    /// missing any required field
    pub async fn current(&self) -> Result<CurrentWeather> {
        let response = self
            .client
            .get(&self.config.base_url)
            .query(&[
                ("lat", self.config.lat.to_string()),
                ("lon", self.config.lon.to_string()),
                ("units", self.units.as_str().to_string()),
                ("appid", self.config.api_key.clone()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = %status, body = %body, "weather API error");
            return Err(Error::Weather(format!("weather API error {status}: {body}")));
        }

        let body = response.text().await?;
        let weather = parse_current(&body)?;

        tracing::debug!(
            location = %weather.location,
            temperature = weather.temperature,
            description = %weather.description,
            "weather fetched"
        );

        Ok(weather)
    }
}

/// Parse a response body into [`CurrentWeather`]
///
/// Missing `main.temp`, `weather[0].description` or `name` is an error.
///
/// # Errors
///
/// Returns error if the body is not valid JSON or lacks a required field
pub fn parse_current(body: &str) -> Result<CurrentWeather> {
    let parsed: ApiResponse = serde_json::from_str(body)?;

    let description = parsed
        .weather
        .first()
        .map(|c| capitalize(&c.description))
        .ok_or_else(|| Error::Weather("response has no weather conditions".to_string()))?;

    Ok(CurrentWeather {
        location: parsed.name,
        temperature: parsed.main.temp,
        description,
    })
}

/// Uppercase the first character, leaving the rest untouched
fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().collect::<String>() + chars.as_str()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL_BODY: &str = r#"{
        "main": {"temp": 21.4, "humidity": 40},
        "weather": [{"id": 500, "main": "Rain", "description": "light rain"}],
        "name": "Kingston"
    }"#;

    #[test]
    fn parses_complete_response() {
        let weather = parse_current(FULL_BODY).unwrap();
        assert_eq!(weather.location, "Kingston");
        assert!((weather.temperature - 21.4).abs() < f64::EPSILON);
        assert_eq!(weather.description, "Light rain");
    }

    #[test]
    fn missing_temp_is_error() {
        let body = r#"{"main": {}, "weather": [{"description": "mist"}], "name": "Kingston"}"#;
        assert!(parse_current(body).is_err());
    }

    #[test]
    fn missing_description_is_error() {
        let body = r#"{"main": {"temp": 3.0}, "weather": [], "name": "Kingston"}"#;
        assert!(parse_current(body).is_err());
    }

    #[test]
    fn missing_name_is_error() {
        let body = r#"{"main": {"temp": 3.0}, "weather": [{"description": "mist"}]}"#;
        assert!(parse_current(body).is_err());
    }

    #[test]
    fn summary_line_rounds_and_labels() {
        let weather = parse_current(FULL_BODY).unwrap();
        assert_eq!(
            weather.summary_line(Units::Metric),
            "Weather: Kingston, 21°C, Light rain."
        );
    }

    #[test]
    fn panel_heading_uses_unit_symbol() {
        let weather = CurrentWeather {
            location: "Kingston".to_string(),
            temperature: 70.6,
            description: "Clear sky".to_string(),
        };
        assert_eq!(weather.panel_heading(Units::Imperial), "Kingston\n71°F");
    }
}
