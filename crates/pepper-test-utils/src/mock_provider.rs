// SPDX-FileCopyrightText: 2026 Pepper Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Scripted language model for deterministic tests.
//!
//! Each `complete` or `stream` call pops the next scripted step. When the
//! script is empty the reply is `"mock response"`.

use std::collections::VecDeque;

use async_trait::async_trait;
use futures::stream;
use tokio::sync::Mutex;

use pepper_core::types::{ProviderRequest, ProviderResponse, ProviderStreamChunk};
use pepper_core::{
    AdapterType, HealthStatus, PepperError, PluginAdapter, ProviderAdapter, ProviderStream,
};

#[derive(Debug, Clone)]
enum Step {
    Reply(String),
    /// The call itself fails as if the backend were down.
    Unavailable(String),
    /// The stream yields `partial` and then an error item.
    BreakAfter { partial: String, message: String },
}

pub struct MockProvider {
    script: Mutex<VecDeque<Step>>,
    requests: Mutex<Vec<ProviderRequest>>,
    chunk_chars: usize,
}

impl MockProvider {
    pub fn new() -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
            chunk_chars: 8,
        }
    }

    /// Pre-loads replies in call order.
    pub fn with_responses<S: Into<String>>(responses: impl IntoIterator<Item = S>) -> Self {
        Self {
            script: Mutex::new(
                responses
                    .into_iter()
                    .map(|r| Step::Reply(r.into()))
                    .collect(),
            ),
            ..Self::new()
        }
    }

    /// Streamed replies are cut into fragments of this many characters.
    pub fn chunk_chars(mut self, chars: usize) -> Self {
        self.chunk_chars = chars.max(1);
        self
    }

    pub async fn add_response(&self, text: impl Into<String>) {
        self.script.lock().await.push_back(Step::Reply(text.into()));
    }

    /// The next call fails with [`PepperError::Unavailable`].
    pub async fn fail_next(&self, message: impl Into<String>) {
        self.script
            .lock()
            .await
            .push_back(Step::Unavailable(message.into()));
    }

    /// The next stream delivers `partial` and then fails.
    pub async fn break_stream_after(&self, partial: impl Into<String>, message: impl Into<String>) {
        self.script.lock().await.push_back(Step::BreakAfter {
            partial: partial.into(),
            message: message.into(),
        });
    }

    /// Every request received so far.
    pub async fn requests(&self) -> Vec<ProviderRequest> {
        self.requests.lock().await.clone()
    }

    async fn next_step(&self, request: ProviderRequest) -> Step {
        self.requests.lock().await.push(request);
        self.script
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| Step::Reply("mock response".to_string()))
    }

    fn fragments(&self, text: &str) -> Vec<Result<ProviderStreamChunk, PepperError>> {
        let chars: Vec<char> = text.chars().collect();
        chars
            .chunks(self.chunk_chars)
            .map(|c| {
                Ok(ProviderStreamChunk {
                    text: c.iter().collect(),
                    done: false,
                })
            })
            .collect()
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

fn unavailable(message: String) -> PepperError {
    PepperError::unavailable("mock", message)
}

#[async_trait]
impl PluginAdapter for MockProvider {
    fn name(&self) -> &str {
        "mock-provider"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Provider
    }

    async fn health_check(&self) -> Result<HealthStatus, PepperError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), PepperError> {
        Ok(())
    }
}

#[async_trait]
impl ProviderAdapter for MockProvider {
    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, PepperError> {
        match self.next_step(request).await {
            Step::Reply(content) => Ok(ProviderResponse {
                content,
                model: "mock".to_string(),
            }),
            Step::Unavailable(message) | Step::BreakAfter { message, .. } => {
                Err(unavailable(message))
            }
        }
    }

    async fn stream(&self, request: ProviderRequest) -> Result<ProviderStream, PepperError> {
        let items = match self.next_step(request).await {
            Step::Reply(text) => {
                let mut items = self.fragments(&text);
                items.push(Ok(ProviderStreamChunk {
                    text: String::new(),
                    done: true,
                }));
                items
            }
            Step::Unavailable(message) => return Err(unavailable(message)),
            Step::BreakAfter { partial, message } => {
                let mut items = self.fragments(&partial);
                items.push(Err(unavailable(message)));
                items
            }
        };
        Ok(Box::pin(stream::iter(items)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use pepper_core::ChatMessage;

    fn request(text: &str) -> ProviderRequest {
        ProviderRequest::new(vec![ChatMessage::user(text)])
    }

    #[tokio::test]
    async fn replies_in_order_then_default() {
        let provider = MockProvider::with_responses(["first", "second"]);
        assert_eq!(provider.complete(request("a")).await.unwrap().content, "first");
        assert_eq!(provider.complete(request("b")).await.unwrap().content, "second");
        assert_eq!(
            provider.complete(request("c")).await.unwrap().content,
            "mock response"
        );
        assert_eq!(provider.requests().await.len(), 3);
    }

    #[tokio::test]
    async fn stream_concatenates_to_reply() {
        let provider = MockProvider::with_responses(["Привет, мир! Как дела?"]).chunk_chars(3);
        let mut stream = provider.stream(request("q")).await.unwrap();
        let mut text = String::new();
        let mut fragments = 0;
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.unwrap();
            text.push_str(&chunk.text);
            fragments += 1;
        }
        assert_eq!(text, "Привет, мир! Как дела?");
        assert!(fragments > 2);
    }

    #[tokio::test]
    async fn injected_failures() {
        let provider = MockProvider::new();
        provider.fail_next("down").await;
        assert!(matches!(
            provider.stream(request("q")).await,
            Err(PepperError::Unavailable { .. })
        ));

        provider.break_stream_after("half", "reset").await;
        let items: Vec<_> = provider.stream(request("q")).await.unwrap().collect().await;
        assert!(items.last().unwrap().is_err());
    }
}
