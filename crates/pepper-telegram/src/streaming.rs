// SPDX-FileCopyrightText: 2026 Pepper Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Edit-in-place delivery of streamed answers.
//!
//! The answer grows inside the "thinking" placeholder message. Every update
//! goes out as MarkdownV2; the final text is split at paragraph boundaries
//! when it does not fit into one Telegram message.

use std::time::Duration;

use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{ChatAction, ChatId, MessageId, ParseMode};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use pepper_core::{LiveReply, PepperError};

use crate::{channel_error, markdown};

/// Characters per message, leaving room below Telegram's 4096 for escaping.
pub const SPLIT_THRESHOLD: usize = 3800;

const TYPING_INTERVAL: Duration = Duration::from_secs(5);

/// [`LiveReply`] that edits one placeholder message.
pub struct TelegramReply {
    bot: Bot,
    chat_id: ChatId,
    message_id: MessageId,
}

impl TelegramReply {
    pub fn new(bot: Bot, chat_id: ChatId, message_id: MessageId) -> Self {
        Self {
            bot,
            chat_id,
            message_id,
        }
    }

    async fn edit_markdown(&self, text: &str) -> Result<(), teloxide::RequestError> {
        let escaped = markdown::format_for_telegram(text);
        match self
            .bot
            .edit_message_text(self.chat_id, self.message_id, escaped)
            .parse_mode(ParseMode::MarkdownV2)
            .await
        {
            Ok(_) => Ok(()),
            Err(e) if e.to_string().contains("message is not modified") => {
                debug!("message unchanged, skipping edit");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }
}

#[async_trait]
impl LiveReply for TelegramReply {
    async fn preview(&self, text: &str) -> Result<(), PepperError> {
        let (head, _) = split_at_paragraph_boundary(text, SPLIT_THRESHOLD);
        match self.edit_markdown(head).await {
            Ok(()) => Ok(()),
            Err(e) if e.to_string().contains("can't parse entities") => {
                debug!(error = %e, "preview markup rejected, editing as plain text");
                self.bot
                    .edit_message_text(self.chat_id, self.message_id, head)
                    .await
                    .map(|_| ())
                    .map_err(|e| {
                        pepper_chat::metrics::record_failed_edit();
                        channel_error("edit message", e)
                    })
            }
            Err(e) => {
                pepper_chat::metrics::record_failed_edit();
                Err(channel_error("edit message", e))
            }
        }
    }

    async fn render(&self, text: &str) -> Result<(), PepperError> {
        let parts = split_message(text, SPLIT_THRESHOLD);
        let mut parts = parts.iter();
        if let Some(first) = parts.next() {
            self.edit_markdown(first).await.map_err(|e| {
                pepper_chat::metrics::record_failed_edit();
                channel_error("edit message", e)
            })?;
        }
        for part in parts {
            self.bot
                .send_message(self.chat_id, markdown::format_for_telegram(part))
                .parse_mode(ParseMode::MarkdownV2)
                .await
                .map_err(|e| channel_error("send message", e))?;
        }
        Ok(())
    }

    async fn plain(&self, text: &str) -> Result<(), PepperError> {
        self.bot
            .edit_message_text(self.chat_id, self.message_id, text)
            .await
            .map(|_| ())
            .map_err(|e| channel_error("edit message", e))
    }
}

/// Byte offset of the `chars`-th character, or `None` if `text` is shorter.
fn char_boundary(text: &str, chars: usize) -> Option<usize> {
    text.char_indices().nth(chars).map(|(i, _)| i)
}

/// Splits text before `max_chars` characters at the best boundary.
///
/// Priority: double newline > single newline > space > hard split.
pub fn split_at_paragraph_boundary(text: &str, max_chars: usize) -> (&str, &str) {
    let Some(limit) = char_boundary(text, max_chars) else {
        return (text, "");
    };
    let search_region = &text[..limit];

    if let Some(pos) = search_region.rfind("\n\n").filter(|p| *p > 0) {
        return (&text[..pos], text[pos + 2..].trim_start());
    }
    if let Some(pos) = search_region.rfind('\n').filter(|p| *p > 0) {
        return (&text[..pos], text[pos + 1..].trim_start());
    }
    if let Some(pos) = search_region.rfind(' ').filter(|p| *p > 0) {
        return (&text[..pos], &text[pos + 1..]);
    }
    (&text[..limit], &text[limit..])
}

/// Cuts `text` into message-sized parts. Blank parts are dropped since
/// Telegram rejects empty messages.
pub fn split_message(text: &str, max_chars: usize) -> Vec<String> {
    let mut parts = Vec::new();
    let mut rest = text;
    loop {
        let (head, tail) = split_at_paragraph_boundary(rest, max_chars);
        if !head.trim().is_empty() {
            parts.push(head.to_string());
        }
        if tail.is_empty() {
            break;
        }
        rest = tail;
    }
    if parts.is_empty() {
        parts.push(text.to_string());
    }
    parts
}

/// Sends a typing indicator now and every few seconds until `cancel` fires.
pub fn start_typing_indicator(
    bot: Bot,
    chat_id: ChatId,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            if let Err(e) = bot.send_chat_action(chat_id, ChatAction::Typing).await {
                warn!(error = %e, "failed to send typing indicator");
            }
            tokio::select! {
                _ = cancel.cancelled() => {
                    debug!("typing indicator cancelled");
                    break;
                }
                _ = tokio::time::sleep(TYPING_INTERVAL) => {}
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_at_double_newline() {
        let text = "First paragraph.\n\nSecond paragraph that is longer.";
        let (first, rest) = split_at_paragraph_boundary(text, 30);
        assert_eq!(first, "First paragraph.");
        assert_eq!(rest, "Second paragraph that is longer.");
    }

    #[test]
    fn split_at_single_newline() {
        let (first, rest) = split_at_paragraph_boundary("First line\nSecond line that is longer", 20);
        assert_eq!(first, "First line");
        assert_eq!(rest, "Second line that is longer");
    }

    #[test]
    fn split_at_space() {
        let (first, rest) = split_at_paragraph_boundary("OneLongWordThen another word", 20);
        assert_eq!(first, "OneLongWordThen");
        assert_eq!(rest, "another word");
    }

    #[test]
    fn hard_split_respects_char_boundaries() {
        let (first, rest) = split_at_paragraph_boundary("абвгдеёжзийклмн", 10);
        assert_eq!(first, "абвгдеёжзи");
        assert_eq!(rest, "йклмн");
    }

    #[test]
    fn short_text_is_whole() {
        assert_eq!(split_at_paragraph_boundary("Короткий", 100), ("Короткий", ""));
    }

    #[test]
    fn prefers_double_newline_over_single() {
        let (first, _) = split_at_paragraph_boundary("A\nB\n\nC\nD", 6);
        assert_eq!(first, "A\nB");
    }

    #[test]
    fn leading_separator_does_not_produce_empty_parts() {
        let parts = split_message("\n\nабвгд еёжзи", 8);
        assert_eq!(parts, vec!["абвгд", "еёжзи"]);
    }

    #[test]
    fn message_parts_cover_the_text() {
        let paragraph = "Смешайте муку с молоком и яйцами.";
        let text = vec![paragraph; 5].join("\n\n");
        let parts = split_message(&text, 80);
        assert_eq!(parts.len(), 3);
        assert!(parts.iter().all(|p| p.chars().count() <= 80));
        assert_eq!(parts.join("\n\n"), text);
    }
}
