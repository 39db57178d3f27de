//! OAuth2 authorization for the calendar API
//!
//! Tokens are cached as JSON in a local file and reused across runs. An
//! expired token is refreshed with the stored refresh token; a missing or
//! unusable cache re-triggers the interactive authorization flow (print the
//! consent URL, read the pasted code).

use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::config::CalendarConfig;
use crate::{Error, Result};

/// Read-only calendar scope
const SCOPE: &str = "https://www.googleapis.com/auth/calendar.readonly";

/// Out-of-band redirect: the provider displays the code for the user to paste
const REDIRECT_URI: &str = "urn:ietf:wg:oauth:2.0:oob";

/// Tokens expiring within this window are treated as already expired
const EXPIRY_LEEWAY_SECS: i64 = 60;

/// OAuth client secrets file (the provider's `credentials.json` layout)
#[derive(Debug, Clone, Deserialize)]
pub struct ClientSecrets {
    installed: InstalledApp,
}

#[derive(Debug, Clone, Deserialize)]
struct InstalledApp {
    client_id: String,
    client_secret: String,
    #[serde(default = "default_auth_uri")]
    auth_uri: String,
    #[serde(default = "default_token_uri")]
    token_uri: String,
}

fn default_auth_uri() -> String {
    "https://accounts.google.com/o/oauth2/auth".to_string()
}

fn default_token_uri() -> String {
    "https://oauth2.googleapis.com/token".to_string()
}

impl ClientSecrets {
    /// Load client secrets from a JSON file
    ///
    /// # Errors
    ///
    /// Returns error if the file is missing or malformed
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Auth(format!(
                "cannot read credentials file {}: {e}",
                path.display()
            ))
        })?;
        let secrets = serde_json::from_str(&content)
            .map_err(|e| Error::Auth(format!("malformed credentials file: {e}")))?;
        Ok(secrets)
    }
}

/// Cached token, serialized to the token-cache file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredToken {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_at: DateTime<Utc>,
}

impl StoredToken {
    /// Whether the access token is still usable at `now`
    #[must_use]
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        now + Duration::seconds(EXPIRY_LEEWAY_SECS) < self.expires_at
    }
}

/// Token endpoint response
#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: Option<String>,
    expires_in: i64,
}

/// Manages the OAuth token lifecycle for the calendar client
///
/// Client secrets are loaded lazily, so a missing credentials file surfaces
/// as a per-call failure (degraded to placeholder text by callers) rather
/// than failing startup.
pub struct Authenticator {
    credentials_path: PathBuf,
    token_path: PathBuf,
    client: reqwest::Client,
    cached: Mutex<Option<StoredToken>>,
}

impl Authenticator {
    /// Create an authenticator from the calendar configuration
    #[must_use]
    pub fn new(config: &CalendarConfig) -> Self {
        Self {
            credentials_path: config.credentials_path.clone(),
            token_path: config.token_cache_path.clone(),
            client: reqwest::Client::new(),
            cached: Mutex::new(None),
        }
    }

    /// Return a usable access token, refreshing or re-authorizing as needed
    ///
    /// # Errors
    ///
    /// Returns error if refresh and interactive authorization both fail
    pub async fn access_token(&self) -> Result<String> {
        let mut cached = self.cached.lock().await;
        let now = Utc::now();

        let token = match cached.take().or_else(|| load_token(&self.token_path)) {
            Some(token) if token.is_valid_at(now) => token,
            Some(token) => match token.refresh_token {
                Some(ref refresh) => {
                    tracing::debug!("access token expired, refreshing");
                    let secrets = ClientSecrets::load(&self.credentials_path)?;
                    self.refresh(&secrets, refresh).await?
                }
                None => {
                    tracing::info!("expired token has no refresh token, re-authorizing");
                    let secrets = ClientSecrets::load(&self.credentials_path)?;
                    self.authorize_interactive(&secrets).await?
                }
            },
            None => {
                tracing::info!(path = %self.token_path.display(), "no cached token, authorizing");
                let secrets = ClientSecrets::load(&self.credentials_path)?;
                self.authorize_interactive(&secrets).await?
            }
        };

        let access = token.access_token.clone();
        *cached = Some(token);
        Ok(access)
    }

    /// Exchange a refresh token for a fresh access token
    async fn refresh(&self, secrets: &ClientSecrets, refresh_token: &str) -> Result<StoredToken> {
        let app = &secrets.installed;
        let params = [
            ("client_id", app.client_id.as_str()),
            ("client_secret", app.client_secret.as_str()),
            ("refresh_token", refresh_token),
            ("grant_type", "refresh_token"),
        ];

        let response = self.client.post(&app.token_uri).form(&params).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Auth(format!("token refresh failed {status}: {body}")));
        }

        let parsed: TokenResponse = response.json().await?;
        // Refresh responses usually omit the refresh token; keep the old one
        let token = StoredToken {
            access_token: parsed.access_token,
            refresh_token: parsed
                .refresh_token
                .or_else(|| Some(refresh_token.to_string())),
            expires_at: Utc::now() + Duration::seconds(parsed.expires_in),
        };

        store_token(&self.token_path, &token)?;
        tracing::debug!("access token refreshed");
        Ok(token)
    }

    /// Run the interactive authorization flow on the console
    async fn authorize_interactive(&self, secrets: &ClientSecrets) -> Result<StoredToken> {
        let auth_url = authorization_url(secrets)?;

        // dialoguer blocks on stdin; keep it off the async runtime
        let code = tokio::task::spawn_blocking(move || {
            println!("\nOpen this URL in a browser and grant calendar access:\n\n{auth_url}\n");
            dialoguer::Input::<String>::new()
                .with_prompt("Paste the authorization code")
                .interact_text()
        })
        .await
        .map_err(|e| Error::Auth(format!("authorization prompt failed: {e}")))?
        .map_err(|e| Error::Auth(format!("authorization prompt failed: {e}")))?;

        let app = &secrets.installed;
        let params = [
            ("client_id", app.client_id.as_str()),
            ("client_secret", app.client_secret.as_str()),
            ("code", code.trim()),
            ("grant_type", "authorization_code"),
            ("redirect_uri", REDIRECT_URI),
        ];

        let response = self.client.post(&app.token_uri).form(&params).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Auth(format!(
                "authorization code exchange failed {status}: {body}"
            )));
        }

        let parsed: TokenResponse = response.json().await?;
        let token = StoredToken {
            access_token: parsed.access_token,
            refresh_token: parsed.refresh_token,
            expires_at: Utc::now() + Duration::seconds(parsed.expires_in),
        };

        store_token(&self.token_path, &token)?;
        tracing::info!(path = %self.token_path.display(), "authorization complete, token cached");
        Ok(token)
    }

}

/// Build the consent page URL
fn authorization_url(secrets: &ClientSecrets) -> Result<String> {
    let app = &secrets.installed;
    let url = url::Url::parse_with_params(
        &app.auth_uri,
        &[
            ("client_id", app.client_id.as_str()),
            ("redirect_uri", REDIRECT_URI),
            ("response_type", "code"),
            ("scope", SCOPE),
            ("access_type", "offline"),
            ("prompt", "consent"),
        ],
    )
    .map_err(|e| Error::Auth(format!("invalid auth_uri: {e}")))?;
    Ok(url.into())
}

/// Load a cached token, returning `None` if absent or unreadable
pub fn load_token(path: &Path) -> Option<StoredToken> {
    let content = std::fs::read_to_string(path).ok()?;
    match serde_json::from_str(&content) {
        Ok(token) => Some(token),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "discarding unreadable token cache");
            None
        }
    }
}

/// Write the token cache file
///
/// # Errors
///
/// Returns error if the file cannot be written
pub fn store_token(path: &Path, token: &StoredToken) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(token)?;
    std::fs::write(path, json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_token(expires_at: DateTime<Utc>) -> StoredToken {
        StoredToken {
            access_token: "ya29.sample".to_string(),
            refresh_token: Some("1//refresh".to_string()),
            expires_at,
        }
    }

    #[test]
    fn token_round_trips_through_cache_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token.json");

        let token = sample_token(Utc::now() + Duration::hours(1));
        store_token(&path, &token).unwrap();

        let loaded = load_token(&path).unwrap();
        assert_eq!(loaded.access_token, token.access_token);
        assert_eq!(loaded.refresh_token, token.refresh_token);
        assert_eq!(loaded.expires_at, token.expires_at);
    }

    #[test]
    fn absent_cache_loads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_token(&dir.path().join("missing.json")).is_none());
    }

    #[test]
    fn corrupt_cache_loads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(load_token(&path).is_none());
    }

    #[test]
    fn expiry_honors_leeway() {
        let now = Utc::now();
        assert!(sample_token(now + Duration::hours(1)).is_valid_at(now));
        // Inside the 60s leeway window counts as expired
        assert!(!sample_token(now + Duration::seconds(30)).is_valid_at(now));
        assert!(!sample_token(now - Duration::hours(1)).is_valid_at(now));
    }

    #[test]
    fn authorization_url_carries_offline_readonly_request() {
        let secrets: ClientSecrets = serde_json::from_str(
            r#"{"installed": {"client_id": "id.apps.example.com", "client_secret": "shhh"}}"#,
        )
        .unwrap();

        let url = authorization_url(&secrets).unwrap();
        assert!(url.starts_with("https://accounts.google.com/o/oauth2/auth?"));
        assert!(url.contains("client_id=id.apps.example.com"));
        assert!(url.contains("response_type=code"));
        assert!(url.contains("access_type=offline"));
        assert!(url.contains("calendar.readonly"));
    }

    #[test]
    fn secrets_parse_with_default_endpoints() {
        let secrets: ClientSecrets = serde_json::from_str(
            r#"{"installed": {"client_id": "id.apps.example.com", "client_secret": "shhh"}}"#,
        )
        .unwrap();
        assert_eq!(secrets.installed.client_id, "id.apps.example.com");
        assert_eq!(secrets.installed.token_uri, default_token_uri());
    }
}
