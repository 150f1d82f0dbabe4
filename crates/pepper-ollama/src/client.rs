// SPDX-FileCopyrightText: 2026 Pepper Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the Ollama chat API.
//!
//! Transient statuses (429, 500, 502, 503) are retried after one second up
//! to `max_retries` times. A server that cannot be reached, or that stays
//! transiently failing, is reported as [`PepperError::Unavailable`].

use std::time::Duration;

use pepper_config::model::OllamaConfig;
use pepper_core::types::ProviderResponse;
use pepper_core::{ChatMessage, PepperError, ProviderStream};
use tracing::{debug, warn};

use crate::ndjson::decode_ndjson;
use crate::types::{ChatChunk, ChatRequest, ErrorBody, TagsResponse};

const SERVICE: &str = "ollama";

#[derive(Debug, Clone)]
pub struct OllamaClient {
    client: reqwest::Client,
    base_url: String,
    model: String,
    max_retries: u32,
}

impl OllamaClient {
    pub fn new(config: &OllamaConfig) -> Result<Self, PepperError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| PepperError::Provider {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            max_retries: config.max_retries,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Sends a chat request and waits for the whole answer.
    pub async fn chat(&self, messages: &[ChatMessage]) -> Result<ProviderResponse, PepperError> {
        let response = self.send_chat(messages, false).await?;
        let body = response.text().await.map_err(|e| {
            PepperError::unavailable(SERVICE, format!("failed to read response body: {e}"))
        })?;
        let chunk: ChatChunk = serde_json::from_str(&body).map_err(|e| PepperError::Provider {
            message: format!("failed to parse chat response: {e}"),
            source: Some(Box::new(e)),
        })?;
        if let Some(error) = chunk.error {
            return Err(PepperError::Provider {
                message: format!("ollama error: {error}"),
                source: None,
            });
        }
        Ok(ProviderResponse {
            content: chunk.text().to_string(),
            model: if chunk.model.is_empty() {
                self.model.clone()
            } else {
                chunk.model
            },
        })
    }

    /// Sends a chat request and streams the answer as it is generated.
    pub async fn chat_stream(&self, messages: &[ChatMessage]) -> Result<ProviderStream, PepperError> {
        let response = self.send_chat(messages, true).await?;
        Ok(decode_ndjson(response.bytes_stream()))
    }

    /// Names of the models pulled on the server.
    pub async fn list_models(&self) -> Result<Vec<String>, PepperError> {
        let url = format!("{}/api/tags", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| PepperError::unavailable(SERVICE, e.to_string()))?;
        if !response.status().is_success() {
            return Err(PepperError::unavailable(
                SERVICE,
                format!("{url} returned {}", response.status()),
            ));
        }
        let tags: TagsResponse = response.json().await.map_err(|e| PepperError::Provider {
            message: format!("failed to parse model list: {e}"),
            source: Some(Box::new(e)),
        })?;
        Ok(tags.models.into_iter().map(|m| m.name).collect())
    }

    async fn send_chat(
        &self,
        messages: &[ChatMessage],
        stream: bool,
    ) -> Result<reqwest::Response, PepperError> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: messages.iter().map(Into::into).collect(),
            stream,
        };
        let url = format!("{}/api/chat", self.base_url);
        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                warn!(attempt, "retrying chat request after transient error");
                tokio::time::sleep(Duration::from_secs(1)).await;
            }

            let response = self
                .client
                .post(&url)
                .json(&request)
                .send()
                .await
                .map_err(|e| PepperError::unavailable(SERVICE, e.to_string()))?;

            let status = response.status();
            debug!(status = %status, attempt, stream, "chat response received");

            if status.is_success() {
                return Ok(response);
            }

            let body = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<ErrorBody>(&body)
                .map(|b| b.error)
                .unwrap_or(body);

            if is_transient_error(status) {
                warn!(status = %status, body = %detail, "transient error");
                last_error = Some(PepperError::unavailable(
                    SERVICE,
                    format!("server returned {status}: {detail}"),
                ));
                continue;
            }

            return Err(PepperError::Provider {
                message: format!("ollama returned {status}: {detail}"),
                source: None,
            });
        }

        Err(last_error.unwrap_or_else(|| {
            PepperError::unavailable(SERVICE, "chat request failed after retries")
        }))
    }
}

/// Statuses worth one more attempt.
fn is_transient_error(status: reqwest::StatusCode) -> bool {
    matches!(status.as_u16(), 429 | 500 | 502 | 503)
}
