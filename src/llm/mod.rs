//! Language model client
//!
//! Non-streaming completion against an Ollama-compatible endpoint:
//! `POST {base}/api/generate` with `{model, prompt, stream: false}`.

use serde::{Deserialize, Serialize};

use crate::config::LlmConfig;
use crate::{Error, Result};

/// Request body for the generate endpoint
#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

/// Response body (only the reply text is read)
#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

/// Generates replies from a local model server
#[derive(Clone)]
pub struct OllamaClient {
    client: reqwest::Client,
    base_url: String,
    model: String,
}

impl OllamaClient {
    /// Create a new client for the configured endpoint
    #[must_use]
    pub fn new(config: &LlmConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
        }
    }

    /// The model identifier sent with each request
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Request a full reply for the prompt
    ///
    /// Blocks for the model's entire generation time; there is no streaming
    /// and no cancellation of an in-flight call.
    ///
    /// # Errors
    ///
    /// Returns error on transport failure, non-2xx response, or a malformed
    /// body
    pub async fn complete(&self, prompt: &str) -> Result<String> {
        let request = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
        };

        tracing::debug!(model = %self.model, prompt_len = prompt.len(), "generating reply");

        let response = self
            .client
            .post(format!("{}/api/generate", self.base_url))
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "generate API error");
            return Err(Error::Llm(format!("generate API error {status}: {body}")));
        }

        let parsed: GenerateResponse = response.json().await?;
        tracing::debug!(reply_len = parsed.response.len(), "reply generated");
        Ok(parsed.response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let client = OllamaClient::new(&LlmConfig {
            model: "llama3.2".to_string(),
            base_url: "http://localhost:11434/".to_string(),
        });
        assert_eq!(client.base_url, "http://localhost:11434");
        assert_eq!(client.model(), "llama3.2");
    }

    #[test]
    fn request_serializes_with_stream_disabled() {
        let request = GenerateRequest {
            model: "llama3.2",
            prompt: "hello",
            stream: false,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "llama3.2");
        assert_eq!(json["stream"], false);
    }

    #[test]
    fn response_parses_reply_text() {
        let parsed: GenerateResponse = serde_json::from_str(
            r#"{"model": "llama3.2", "response": "The capital of Canada is Ottawa.", "done": true}"#,
        )
        .unwrap();
        assert_eq!(parsed.response, "The capital of Canada is Ottawa.");
    }
}
