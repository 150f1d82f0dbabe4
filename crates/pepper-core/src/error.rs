// SPDX-FileCopyrightText: 2026 Pepper Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types shared by every Pepper adapter and the chat core.

use thiserror::Error;

/// The primary error type used across all Pepper adapter traits and core operations.
#[derive(Debug, Error)]
pub enum PepperError {
    /// Configuration errors (invalid TOML, missing required fields, bad values).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (database connection, query failure, migrations).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Chat transport errors (send/edit failure, rate limiting).
    #[error("channel error: {message}")]
    Channel {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Language model or embedding errors that are not availability problems
    /// (malformed response, model rejected the request).
    #[error("provider error: {message}")]
    Provider {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// An upstream service (language model, retrieval index) could not be reached.
    #[error("{service} unavailable: {message}")]
    Unavailable { service: String, message: String },

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl PepperError {
    /// Builds an [`PepperError::Unavailable`] for the named service.
    pub fn unavailable(service: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Unavailable {
            service: service.into(),
            message: message.into(),
        }
    }

    /// True for failures of an upstream dependency rather than local bugs.
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            Self::Unavailable { .. } | Self::Provider { .. } | Self::Timeout { .. }
        )
    }
}
