//! Configuration management for the Hearth kiosk
//!
//! Configuration is resolved once at startup (env > config file > default)
//! and passed to components as an immutable value. Nothing mutates it during
//! the run.

pub mod file;

use std::path::PathBuf;

use crate::{Error, Result};

/// Unit system for weather data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Units {
    /// Celsius
    #[default]
    Metric,
    /// Fahrenheit
    Imperial,
}

impl Units {
    /// Value used in weather API query strings
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Metric => "metric",
            Self::Imperial => "imperial",
        }
    }

    /// Temperature unit symbol for display
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Metric => "°C",
            Self::Imperial => "°F",
        }
    }

    fn parse(s: &str) -> Result<Self> {
        match s {
            "metric" => Ok(Self::Metric),
            "imperial" => Ok(Self::Imperial),
            other => Err(Error::Config(format!(
                "units must be \"metric\" or \"imperial\", got \"{other}\""
            ))),
        }
    }
}

/// Clock rendering format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeFormat {
    /// 12-hour clock with AM/PM
    TwelveHour,
    /// 24-hour clock
    #[default]
    TwentyFourHour,
}

impl TimeFormat {
    fn from_hours(hours: u8) -> Result<Self> {
        match hours {
            12 => Ok(Self::TwelveHour),
            24 => Ok(Self::TwentyFourHour),
            other => Err(Error::Config(format!(
                "time_format must be 12 or 24, got {other}"
            ))),
        }
    }
}

/// Hearth kiosk configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Bind address (carried from the original surface; unused by the core)
    pub address: String,

    /// Bind port (unused by the core)
    pub port: u16,

    /// Language tag (e.g. "en")
    pub language: String,

    /// Unit system for weather
    pub units: Units,

    /// Clock format
    pub time_format: TimeFormat,

    /// Weather API access
    pub weather: WeatherConfig,

    /// Calendar credential and token-cache paths
    pub calendar: CalendarConfig,

    /// Voice pipeline configuration
    pub voice: VoiceConfig,

    /// Language model endpoint
    pub llm: LlmConfig,

    /// API keys for external services
    pub api_keys: ApiKeys,
}

/// Weather API configuration
#[derive(Debug, Clone)]
pub struct WeatherConfig {
    /// API key (`appid` query parameter)
    pub api_key: String,

    /// Latitude of the kiosk location
    pub lat: f64,

    /// Longitude of the kiosk location
    pub lon: f64,

    /// Base endpoint URL (OpenWeatherMap-compatible)
    pub base_url: String,
}

/// Calendar OAuth configuration
#[derive(Debug, Clone)]
pub struct CalendarConfig {
    /// Path to the OAuth client secrets JSON
    pub credentials_path: PathBuf,

    /// Path where the serialized token is cached across runs
    pub token_cache_path: PathBuf,
}

/// Voice pipeline configuration
#[derive(Debug, Clone)]
pub struct VoiceConfig {
    /// Enable the voice conversation loop
    pub enabled: bool,

    /// STT model (e.g. "whisper-1")
    pub stt_model: String,

    /// TTS model (e.g. "tts-1")
    pub tts_model: String,

    /// TTS voice identifier
    pub tts_voice: String,

    /// TTS speed multiplier (0.25 to 4.0)
    pub tts_speed: f64,
}

/// Language model endpoint configuration
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Model identifier served by the endpoint
    pub model: String,

    /// Endpoint base URL (Ollama-compatible)
    pub base_url: String,
}

/// API keys for external services
#[derive(Debug, Clone, Default)]
pub struct ApiKeys {
    /// `OpenAI` API key (for Whisper STT and TTS)
    pub openai: Option<String>,
}

impl Config {
    /// Load configuration (env > config file > default)
    ///
    /// # Errors
    ///
    /// Returns error if a value fails validation (units, time format,
    /// malformed numbers)
    pub fn load() -> Result<Self> {
        Self::load_with_options(None, false)
    }

    /// Load configuration with an explicit file path and voice toggle
    ///
    /// # Errors
    ///
    /// Returns error if the explicit config file cannot be read or a value
    /// fails validation
    pub fn load_with_options(config_path: Option<&std::path::Path>, disable_voice: bool) -> Result<Self> {
        let fc = match config_path {
            Some(path) => file::load_config_file_at(path)?,
            None => file::load_config_file(),
        };

        let address = std::env::var("HEARTH_ADDRESS")
            .ok()
            .or(fc.address)
            .unwrap_or_else(|| "localhost".to_string());

        let port = env_parsed("HEARTH_PORT")?
            .or(fc.port)
            .unwrap_or(8080);

        let language = std::env::var("HEARTH_LANGUAGE")
            .ok()
            .or(fc.language)
            .unwrap_or_else(|| "en".to_string());

        let units = std::env::var("HEARTH_UNITS")
            .ok()
            .or(fc.units)
            .map_or(Ok(Units::default()), |s| Units::parse(&s))?;

        let time_format = env_parsed::<u8>("HEARTH_TIME_FORMAT")?
            .or(fc.time_format)
            .map_or(Ok(TimeFormat::default()), TimeFormat::from_hours)?;

        let fw = fc.weather;
        let weather = WeatherConfig {
            api_key: std::env::var("HEARTH_WEATHER_API_KEY")
                .ok()
                .or(fw.api_key)
                .unwrap_or_default(),
            lat: env_parsed("HEARTH_WEATHER_LAT")?.or(fw.lat).unwrap_or(0.0),
            lon: env_parsed("HEARTH_WEATHER_LON")?.or(fw.lon).unwrap_or(0.0),
            base_url: std::env::var("HEARTH_WEATHER_URL")
                .ok()
                .or(fw.base_url)
                .unwrap_or_else(|| "https://api.openweathermap.org/data/2.5/weather".to_string()),
        };

        let data_dir = data_dir();
        let fcal = fc.calendar;
        let calendar = CalendarConfig {
            credentials_path: std::env::var("HEARTH_CALENDAR_CREDENTIALS")
                .ok()
                .map(PathBuf::from)
                .or_else(|| fcal.credentials_path.map(PathBuf::from))
                .unwrap_or_else(|| config_dir().join("credentials.json")),
            token_cache_path: std::env::var("HEARTH_CALENDAR_TOKEN_CACHE")
                .ok()
                .map(PathBuf::from)
                .or_else(|| fcal.token_cache_path.map(PathBuf::from))
                .unwrap_or_else(|| data_dir.join("token.json")),
        };

        let fv = fc.voice;
        let voice = VoiceConfig {
            enabled: if disable_voice {
                false
            } else {
                fv.enabled.unwrap_or(true)
            },
            stt_model: std::env::var("HEARTH_STT_MODEL")
                .ok()
                .or(fv.stt_model)
                .unwrap_or_else(|| "whisper-1".to_string()),
            tts_model: std::env::var("HEARTH_TTS_MODEL")
                .ok()
                .or(fv.tts_model)
                .unwrap_or_else(|| "tts-1".to_string()),
            tts_voice: std::env::var("HEARTH_TTS_VOICE")
                .ok()
                .or(fv.tts_voice)
                .unwrap_or_else(|| "alloy".to_string()),
            tts_speed: env_parsed("HEARTH_TTS_SPEED")?.or(fv.tts_speed).unwrap_or(1.0),
        };

        if disable_voice {
            tracing::info!("voice explicitly disabled via --disable-voice");
        }

        let fl = fc.llm;
        let llm = LlmConfig {
            model: std::env::var("HEARTH_LLM_MODEL")
                .ok()
                .or(fl.model)
                .unwrap_or_else(|| "llama3.2".to_string()),
            base_url: std::env::var("HEARTH_LLM_URL")
                .ok()
                .or(fl.base_url)
                .unwrap_or_else(|| "http://localhost:11434".to_string()),
        };

        let api_keys = ApiKeys {
            openai: std::env::var("OPENAI_API_KEY").ok().or(fc.api_keys.openai),
        };

        Ok(Self {
            address,
            port,
            language,
            units,
            time_format,
            weather,
            calendar,
            voice,
            llm,
            api_keys,
        })
    }
}

/// Parse an env var into `T`, erroring on malformed values instead of
/// silently falling through
fn env_parsed<T: std::str::FromStr>(name: &str) -> Result<Option<T>> {
    match std::env::var(name) {
        Ok(raw) => raw
            .parse()
            .map(Some)
            .map_err(|_| Error::Config(format!("invalid value for {name}: \"{raw}\""))),
        Err(_) => Ok(None),
    }
}

/// Data directory for runtime state (token cache): `~/.local/share/hearth/`
pub fn data_dir() -> PathBuf {
    let dir = directories::BaseDirs::new().map_or_else(
        || PathBuf::from(".local/share/hearth"),
        |d| d.data_dir().join("hearth"),
    );

    if let Err(e) = std::fs::create_dir_all(&dir) {
        tracing::warn!(path = %dir.display(), error = %e, "failed to create data directory");
    }

    dir
}

/// Config directory: `~/.config/hearth/`
pub fn config_dir() -> PathBuf {
    directories::BaseDirs::new().map_or_else(
        || PathBuf::from(".config/hearth"),
        |d| d.config_dir().join("hearth"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn units_parse_accepts_both_systems() {
        assert_eq!(Units::parse("metric").unwrap(), Units::Metric);
        assert_eq!(Units::parse("imperial").unwrap(), Units::Imperial);
        assert!(Units::parse("kelvin").is_err());
    }

    #[test]
    fn units_symbols() {
        assert_eq!(Units::Metric.symbol(), "°C");
        assert_eq!(Units::Imperial.symbol(), "°F");
    }

    #[test]
    fn time_format_from_hours() {
        assert_eq!(TimeFormat::from_hours(12).unwrap(), TimeFormat::TwelveHour);
        assert_eq!(TimeFormat::from_hours(24).unwrap(), TimeFormat::TwentyFourHour);
        assert!(TimeFormat::from_hours(10).is_err());
    }
}
