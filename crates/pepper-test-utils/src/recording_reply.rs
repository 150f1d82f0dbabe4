// SPDX-FileCopyrightText: 2026 Pepper Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! A [`LiveReply`] that records what would have been shown.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;

use pepper_core::{LiveReply, PepperError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyEvent {
    Preview(String),
    Render(String),
    Plain(String),
}

#[derive(Default)]
pub struct RecordingReply {
    events: Mutex<Vec<ReplyEvent>>,
    fail_previews: AtomicBool,
    fail_renders: AtomicBool,
}

impl RecordingReply {
    pub fn new() -> Self {
        Self::default()
    }

    /// Later previews are recorded and then reported as failed.
    pub fn fail_previews(&self) {
        self.fail_previews.store(true, Ordering::SeqCst);
    }

    /// Later renders are recorded and then reported as failed.
    pub fn fail_renders(&self) {
        self.fail_renders.store(true, Ordering::SeqCst);
    }

    pub fn events(&self) -> Vec<ReplyEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    pub fn previews(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                ReplyEvent::Preview(t) => Some(t),
                _ => None,
            })
            .collect()
    }

    /// The text currently visible to the user.
    pub fn last_text(&self) -> Option<String> {
        self.events().into_iter().last().map(|e| match e {
            ReplyEvent::Preview(t) | ReplyEvent::Render(t) | ReplyEvent::Plain(t) => t,
        })
    }

    fn record(&self, event: ReplyEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}

fn refused(what: &str) -> PepperError {
    PepperError::Channel {
        message: format!("{what} refused"),
        source: None,
    }
}

#[async_trait]
impl LiveReply for RecordingReply {
    async fn preview(&self, text: &str) -> Result<(), PepperError> {
        self.record(ReplyEvent::Preview(text.to_string()));
        if self.fail_previews.load(Ordering::SeqCst) {
            return Err(refused("preview"));
        }
        Ok(())
    }

    async fn render(&self, text: &str) -> Result<(), PepperError> {
        self.record(ReplyEvent::Render(text.to_string()));
        if self.fail_renders.load(Ordering::SeqCst) {
            return Err(refused("render"));
        }
        Ok(())
    }

    async fn plain(&self, text: &str) -> Result<(), PepperError> {
        self.record(ReplyEvent::Plain(text.to_string()));
        Ok(())
    }
}
