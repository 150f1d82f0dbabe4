// SPDX-FileCopyrightText: 2026 Pepper Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Semantic checks that serde attributes cannot express.

use crate::diagnostic::ConfigError;
use crate::model::PepperConfig;

/// Validates a deserialized configuration, collecting every problem.
pub fn validate_config(config: &PepperConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    let non_empty = [
        ("storage.database_path", &config.storage.database_path),
        ("ollama.model", &config.ollama.model),
        ("retrieval.model_name", &config.retrieval.model_name),
        ("retrieval.model_dir", &config.retrieval.model_dir),
        ("retrieval.index_language", &config.retrieval.index_language),
        ("chat.user_language", &config.chat.user_language),
    ];
    for (key, value) in non_empty {
        if value.trim().is_empty() {
            errors.push(ConfigError::validation(format!("{key} must not be empty")));
        }
    }

    let url = config.ollama.base_url.trim();
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        errors.push(ConfigError::validation(format!(
            "ollama.base_url `{url}` must start with http:// or https://"
        )));
    }

    if config.ollama.timeout_secs == 0 {
        errors.push(ConfigError::validation("ollama.timeout_secs must be at least 1"));
    }

    if config.retrieval.top_k == 0 {
        errors.push(ConfigError::validation("retrieval.top_k must be at least 1"));
    }

    if config.chat.flush_threshold == 0 {
        errors.push(ConfigError::validation(
            "chat.flush_threshold must be at least 1",
        ));
    }

    if config.chat.history_limit == Some(0) {
        errors.push(ConfigError::validation(
            "chat.history_limit must be at least 1 when set",
        ));
    }

    if let Some(token) = &config.telegram.bot_token
        && token.trim().is_empty()
    {
        errors.push(ConfigError::validation(
            "telegram.bot_token must not be empty when set",
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(validate_config(&PepperConfig::default()).is_ok());
    }

    #[test]
    fn collects_every_error() {
        let mut config = PepperConfig::default();
        config.retrieval.top_k = 0;
        config.chat.flush_threshold = 0;
        config.ollama.base_url = "localhost:11434".into();

        let errors = validate_config(&config).expect_err("should fail");
        assert_eq!(errors.len(), 3);
        let text: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
        assert!(text.iter().any(|t| t.contains("retrieval.top_k")));
        assert!(text.iter().any(|t| t.contains("chat.flush_threshold")));
        assert!(text.iter().any(|t| t.contains("ollama.base_url")));
    }

    #[test]
    fn zero_history_limit_is_rejected() {
        let mut config = PepperConfig::default();
        config.chat.history_limit = Some(0);
        assert!(validate_config(&config).is_err());
    }
}
