// SPDX-FileCopyrightText: 2026 Pepper Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Incremental decoding of Ollama's newline-delimited JSON stream.
//!
//! Bytes are buffered until a full line is available, so multi-byte
//! characters split across network chunks decode correctly. The stream
//! ends after a `done: true` line or after the first error item.

use std::fmt::Display;
use std::pin::Pin;

use bytes::Bytes;
use futures::stream::{self, Stream, StreamExt};
use pepper_core::types::ProviderStreamChunk;
use pepper_core::{PepperError, ProviderStream};

use crate::types::ChatChunk;

struct Decoder<S> {
    body: Pin<Box<S>>,
    buffer: Vec<u8>,
    finished: bool,
}

/// Turns a response body into provider stream chunks.
pub fn decode_ndjson<S, E>(body: S) -> ProviderStream
where
    S: Stream<Item = Result<Bytes, E>> + Send + 'static,
    E: Display + Send + 'static,
{
    let state = Decoder {
        body: Box::pin(body),
        buffer: Vec::new(),
        finished: false,
    };

    Box::pin(stream::unfold(state, |mut state| async move {
        loop {
            if state.finished {
                return None;
            }

            if let Some(pos) = state.buffer.iter().position(|b| *b == b'\n') {
                let line: Vec<u8> = state.buffer.drain(..=pos).collect();
                if let Some(item) = decode_line(&line) {
                    state.finished = matches!(&item, Ok(chunk) if chunk.done) || item.is_err();
                    return Some((item, state));
                }
                continue;
            }

            match state.body.next().await {
                Some(Ok(bytes)) => state.buffer.extend_from_slice(&bytes),
                Some(Err(e)) => {
                    state.finished = true;
                    let err = PepperError::unavailable("ollama", format!("stream interrupted: {e}"));
                    return Some((Err(err), state));
                }
                None => {
                    state.finished = true;
                    let rest = std::mem::take(&mut state.buffer);
                    return decode_line(&rest).map(|item| (item, state));
                }
            }
        }
    }))
}

fn decode_line(line: &[u8]) -> Option<Result<ProviderStreamChunk, PepperError>> {
    let text = String::from_utf8_lossy(line);
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    let chunk: ChatChunk = match serde_json::from_str(text) {
        Ok(chunk) => chunk,
        Err(e) => {
            return Some(Err(PepperError::Provider {
                message: format!("malformed stream line: {e}"),
                source: Some(Box::new(e)),
            }));
        }
    };

    if let Some(error) = chunk.error {
        return Some(Err(PepperError::Provider {
            message: format!("ollama error: {error}"),
            source: None,
        }));
    }

    Some(Ok(ProviderStreamChunk {
        text: chunk.text().to_string(),
        done: chunk.done,
    }))
}
