// SPDX-FileCopyrightText: 2026 Pepper Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! A user-visible message that is rewritten while an answer is generated.

use async_trait::async_trait;

use crate::error::PepperError;

/// Handle on an already posted placeholder message.
///
/// Implementations decide how text is escaped for their transport.
#[async_trait]
pub trait LiveReply: Send + Sync {
    /// Shows an unfinished answer. Callers treat failures as best-effort.
    async fn preview(&self, text: &str) -> Result<(), PepperError>;

    /// Shows the finished answer with rich formatting.
    async fn render(&self, text: &str) -> Result<(), PepperError>;

    /// Replaces the message with unformatted text.
    async fn plain(&self, text: &str) -> Result<(), PepperError>;
}
