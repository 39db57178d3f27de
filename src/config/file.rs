//! TOML configuration file loading
//!
//! Supports `~/.config/hearth/config.toml` as a persistent config source.
//! All fields are optional — the file is a partial overlay on top of defaults.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::Result;

/// Top-level TOML configuration file schema
#[derive(Debug, Default, Deserialize)]
pub struct HearthConfigFile {
    /// Bind address (e.g. "localhost")
    #[serde(default)]
    pub address: Option<String>,

    /// Bind port
    #[serde(default)]
    pub port: Option<u16>,

    /// Language tag (e.g. "en")
    #[serde(default)]
    pub language: Option<String>,

    /// Unit system ("metric" or "imperial")
    #[serde(default)]
    pub units: Option<String>,

    /// Clock format (12 or 24)
    #[serde(default)]
    pub time_format: Option<u8>,

    /// Weather API configuration
    #[serde(default)]
    pub weather: WeatherFileConfig,

    /// Calendar OAuth configuration
    #[serde(default)]
    pub calendar: CalendarFileConfig,

    /// Voice pipeline configuration
    #[serde(default)]
    pub voice: VoiceFileConfig,

    /// LLM endpoint configuration
    #[serde(default)]
    pub llm: LlmFileConfig,

    /// API keys for external services
    #[serde(default)]
    pub api_keys: ApiKeysFileConfig,
}

/// Weather API configuration
#[derive(Debug, Default, Deserialize)]
pub struct WeatherFileConfig {
    pub api_key: Option<String>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub base_url: Option<String>,
}

/// Calendar OAuth configuration
#[derive(Debug, Default, Deserialize)]
pub struct CalendarFileConfig {
    /// Path to the OAuth client secrets JSON
    pub credentials_path: Option<String>,

    /// Path for the cached token
    pub token_cache_path: Option<String>,
}

/// Voice processing configuration
#[derive(Debug, Default, Deserialize)]
pub struct VoiceFileConfig {
    /// Enable voice input/output
    pub enabled: Option<bool>,

    /// STT model (e.g. "whisper-1")
    pub stt_model: Option<String>,

    /// TTS model (e.g. "tts-1")
    pub tts_model: Option<String>,

    /// TTS voice identifier (e.g. "alloy")
    pub tts_voice: Option<String>,

    /// TTS speed multiplier
    pub tts_speed: Option<f64>,
}

/// LLM endpoint configuration
#[derive(Debug, Default, Deserialize)]
pub struct LlmFileConfig {
    /// Model identifier (e.g. "llama3.2")
    pub model: Option<String>,

    /// Endpoint base URL (e.g. "http://localhost:11434")
    pub base_url: Option<String>,
}

/// API keys configuration
#[derive(Debug, Default, Deserialize)]
pub struct ApiKeysFileConfig {
    pub openai: Option<String>,
}

/// Load the TOML config file from the standard path
///
/// Returns `HearthConfigFile::default()` if the file doesn't exist or can't
/// be parsed.
pub fn load_config_file() -> HearthConfigFile {
    let Some(path) = config_file_path() else {
        return HearthConfigFile::default();
    };

    if !path.exists() {
        return HearthConfigFile::default();
    }

    match std::fs::read_to_string(&path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(config) => {
                tracing::info!(path = %path.display(), "loaded config file");
                config
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "failed to parse config file, using defaults"
                );
                HearthConfigFile::default()
            }
        },
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "failed to read config file"
            );
            HearthConfigFile::default()
        }
    }
}

/// Load an explicitly named config file
///
/// Unlike [`load_config_file`], an unreadable or malformed explicit file is
/// an error rather than a silent fallback.
///
/// # Errors
///
/// Returns error if the file cannot be read or parsed.
pub fn load_config_file_at(path: &Path) -> Result<HearthConfigFile> {
    let content = std::fs::read_to_string(path)?;
    let config = toml::from_str(&content)?;
    tracing::info!(path = %path.display(), "loaded config file");
    Ok(config)
}

/// Return the config file path: `~/.config/hearth/config.toml`
pub fn config_file_path() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| d.config_dir().join("hearth").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_parses_with_defaults() {
        let file: HearthConfigFile = toml::from_str(
            r#"
            units = "imperial"
            time_format = 12

            [weather]
            api_key = "abc123"
            lat = 44.23048
            lon = -76.481247
            "#,
        )
        .unwrap();

        assert_eq!(file.units.as_deref(), Some("imperial"));
        assert_eq!(file.time_format, Some(12));
        assert_eq!(file.weather.api_key.as_deref(), Some("abc123"));
        assert!(file.llm.model.is_none());
        assert!(file.voice.enabled.is_none());
    }

    #[test]
    fn empty_file_is_all_defaults() {
        let file: HearthConfigFile = toml::from_str("").unwrap();
        assert!(file.address.is_none());
        assert!(file.weather.api_key.is_none());
        assert!(file.calendar.credentials_path.is_none());
    }
}
