// SPDX-FileCopyrightText: 2026 Pepper Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Language model client trait.

use std::pin::Pin;

use async_trait::async_trait;
use futures_core::Stream;

use crate::error::PepperError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{ProviderRequest, ProviderResponse, ProviderStreamChunk};

/// Stream of response increments. Finite and not restartable.
pub type ProviderStream =
    Pin<Box<dyn Stream<Item = Result<ProviderStreamChunk, PepperError>> + Send>>;

/// Adapter for language model backends.
///
/// Both calls fail with [`PepperError::Unavailable`] when the backend
/// cannot be reached.
#[async_trait]
pub trait ProviderAdapter: PluginAdapter {
    /// Sends a request and waits for the whole response.
    async fn complete(&self, request: ProviderRequest)
    -> Result<ProviderResponse, PepperError>;

    /// Sends a request and returns the response as a stream of fragments
    /// whose concatenation is the full response.
    async fn stream(&self, request: ProviderRequest) -> Result<ProviderStream, PepperError>;
}
