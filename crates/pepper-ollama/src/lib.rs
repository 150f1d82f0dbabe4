// SPDX-FileCopyrightText: 2026 Pepper Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ollama provider adapter for Pepper.
//!
//! Implements [`ProviderAdapter`] over a local Ollama server, with both
//! single-shot completion and newline-delimited JSON streaming.

pub mod client;
pub mod ndjson;
pub mod types;

use async_trait::async_trait;
use pepper_config::model::OllamaConfig;
use pepper_core::types::{ProviderRequest, ProviderResponse};
use pepper_core::{
    AdapterType, HealthStatus, PepperError, PluginAdapter, ProviderAdapter, ProviderStream,
};
use tracing::info;

pub use crate::client::OllamaClient;

/// Language model backed by an Ollama server.
pub struct OllamaProvider {
    client: OllamaClient,
}

impl OllamaProvider {
    pub fn new(config: &OllamaConfig) -> Result<Self, PepperError> {
        let client = OllamaClient::new(config)?;
        info!(model = %config.model, base_url = %config.base_url, "ollama provider initialized");
        Ok(Self { client })
    }
}

/// True if `available` holds `model`, with or without an explicit tag.
fn has_model(available: &[String], model: &str) -> bool {
    available.iter().any(|name| {
        name == model
            || name
                .strip_prefix(model)
                .is_some_and(|tag| tag.starts_with(':'))
    })
}

#[async_trait]
impl PluginAdapter for OllamaProvider {
    fn name(&self) -> &str {
        "ollama"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Provider
    }

    async fn health_check(&self) -> Result<HealthStatus, PepperError> {
        match self.client.list_models().await {
            Ok(models) if has_model(&models, self.client.model()) => Ok(HealthStatus::Healthy),
            Ok(_) => Ok(HealthStatus::Degraded(format!(
                "model `{}` is not pulled, run `ollama pull {}`",
                self.client.model(),
                self.client.model()
            ))),
            Err(e) => Ok(HealthStatus::Unhealthy(e.to_string())),
        }
    }

    async fn shutdown(&self) -> Result<(), PepperError> {
        Ok(())
    }
}

#[async_trait]
impl ProviderAdapter for OllamaProvider {
    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, PepperError> {
        self.client.chat(&request.messages).await
    }

    async fn stream(&self, request: ProviderRequest) -> Result<ProviderStream, PepperError> {
        self.client.chat_stream(&request.messages).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_matches_with_or_without_tag() {
        let available = vec!["gemma2:latest".to_string(), "llama3".to_string()];
        assert!(has_model(&available, "gemma2"));
        assert!(has_model(&available, "gemma2:latest"));
        assert!(has_model(&available, "llama3"));
        assert!(!has_model(&available, "gemma"));
        assert!(!has_model(&available, "mistral"));
    }
}
