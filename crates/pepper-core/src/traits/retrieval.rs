// SPDX-FileCopyrightText: 2026 Pepper Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Recipe retrieval index trait.

use async_trait::async_trait;

use crate::error::PepperError;
use crate::traits::adapter::PluginAdapter;
use crate::types::RecipeDocument;

/// Vector similarity search over the recipe corpus.
#[async_trait]
pub trait RetrievalIndex: PluginAdapter {
    /// Embeds a query in the index's vector space.
    async fn embed(&self, text: &str) -> Result<Vec<f32>, PepperError>;

    /// Returns at most `k` documents nearest to `vector`, best match first.
    async fn query(&self, vector: &[f32], k: usize) -> Result<Vec<RecipeDocument>, PepperError>;
}
