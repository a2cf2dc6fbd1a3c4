//! Ollama provider: native `/api/chat` over HTTP.
//!
//! Non-streaming only. The request carries the model name, the full message
//! list (system prompt included), `stream: false` and `options.temperature`;
//! the reply text is read from `message.content`.

use async_trait::async_trait;
use pitcrew_core::error::ProviderError;
use pitcrew_core::message::Message;
use pitcrew_core::provider::{ProviderRequest, ProviderResponse};
use serde::Deserialize;
use tracing::{debug, warn};

/// A single Ollama endpoint.
pub struct OllamaProvider {
    name: String,
    base_url: String,
    client: reqwest::Client,
}

impl OllamaProvider {
    /// Create a provider for the Ollama server at `base_url`.
    ///
    /// No client-level timeout is set: the failover chain bounds each
    /// attempt.
    pub fn new(name: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self::with_client(name, base_url, reqwest::Client::new())
    }

    /// Create a provider that shares an existing HTTP client.
    pub fn with_client(
        name: impl Into<String>,
        base_url: impl Into<String>,
        client: reqwest::Client,
    ) -> Self {
        Self {
            name: name.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl pitcrew_core::Provider for OllamaProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn complete(
        &self,
        request: ProviderRequest,
    ) -> std::result::Result<ProviderResponse, ProviderError> {
        let url = format!("{}/api/chat", self.base_url);

        let body = serde_json::json!({
            "model": request.model,
            "messages": request.messages,
            "stream": false,
            "options": { "temperature": request.temperature },
        });

        debug!(provider = %self.name, url = %url, model = %request.model, "Sending chat request");

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            warn!(provider = %self.name, status = status.as_u16(), body = %error_body, "Backend returned error");
            return Err(ProviderError::ApiError {
                status_code: status.as_u16(),
                message: error_body,
            });
        }

        let api_response: ChatApiResponse =
            response.json().await.map_err(|e| ProviderError::ApiError {
                status_code: status.as_u16(),
                message: format!("Failed to parse response: {e}"),
            })?;

        let content = api_response
            .message
            .and_then(|m| m.content)
            .unwrap_or_default();

        Ok(ProviderResponse {
            message: Message::assistant(content),
            model: api_response.model.unwrap_or(request.model),
            provider: self.name.clone(),
        })
    }

    async fn health_check(&self) -> std::result::Result<bool, ProviderError> {
        let url = format!("{}/api/tags", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        Ok(response.status().is_success())
    }
}

// ── Wire types ────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct ChatApiResponse {
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    message: Option<ChatApiMessage>,
}

#[derive(Deserialize)]
struct ChatApiMessage {
    #[serde(default)]
    content: Option<String>,
}
