// SPDX-FileCopyrightText: 2026 Pepper Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Brute-force cosine search over the stored recipe vectors.
//!
//! The corpus is loaded from SQLite on first query and cached until
//! [`RecipeIndex::invalidate`] is called after an import.

use std::cmp::Ordering;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use pepper_core::traits::EmbeddingAdapter;
use pepper_core::types::EmbeddingInput;
use pepper_core::{
    AdapterType, HealthStatus, PepperError, PluginAdapter, RecipeDocument, RetrievalIndex,
};

use crate::store::{RecipeStore, StoredRecipe};
use crate::vector::cosine_similarity;

/// Retrieval index backed by a [`RecipeStore`] and an embedding adapter.
pub struct RecipeIndex {
    store: RecipeStore,
    embedder: Arc<dyn EmbeddingAdapter>,
    cache: RwLock<Option<Arc<Vec<StoredRecipe>>>>,
}

impl RecipeIndex {
    pub fn new(store: RecipeStore, embedder: Arc<dyn EmbeddingAdapter>) -> Self {
        Self {
            store,
            embedder,
            cache: RwLock::new(None),
        }
    }

    /// Drops the cached corpus so the next query reloads it.
    pub async fn invalidate(&self) {
        *self.cache.write().await = None;
    }

    async fn corpus(&self) -> Result<Arc<Vec<StoredRecipe>>, PepperError> {
        if let Some(corpus) = self.cache.read().await.as_ref() {
            return Ok(Arc::clone(corpus));
        }
        let mut guard = self.cache.write().await;
        if let Some(corpus) = guard.as_ref() {
            return Ok(Arc::clone(corpus));
        }
        let loaded = Arc::new(self.store.load_all().await?);
        debug!(recipes = loaded.len(), "recipe corpus loaded");
        *guard = Some(Arc::clone(&loaded));
        Ok(loaded)
    }
}

/// Ranks `corpus` against `vector`: highest similarity first, ties by id,
/// at most `k` results. Vectors of another dimension are skipped.
pub fn rank(corpus: &[StoredRecipe], vector: &[f32], k: usize) -> Vec<RecipeDocument> {
    let mut scored: Vec<(f32, &StoredRecipe)> = corpus
        .iter()
        .filter_map(|r| cosine_similarity(vector, &r.embedding).map(|s| (s, r)))
        .collect();
    scored.sort_by(|a, b| {
        b.0.partial_cmp(&a.0)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.1.id.cmp(&b.1.id))
    });
    scored
        .into_iter()
        .take(k)
        .map(|(score, r)| RecipeDocument {
            id: r.id.clone(),
            name: r.name.clone(),
            document: r.document.clone(),
            score,
        })
        .collect()
}

#[async_trait]
impl PluginAdapter for RecipeIndex {
    fn name(&self) -> &str {
        "recipe-index"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Retrieval
    }

    async fn health_check(&self) -> Result<HealthStatus, PepperError> {
        match self.store.count().await? {
            0 => Ok(HealthStatus::Degraded(
                "recipe index is empty, run `pepper recipes import`".to_string(),
            )),
            _ => self.embedder.health_check().await,
        }
    }

    async fn shutdown(&self) -> Result<(), PepperError> {
        self.embedder.shutdown().await
    }
}

#[async_trait]
impl RetrievalIndex for RecipeIndex {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, PepperError> {
        let output = self
            .embedder
            .embed(EmbeddingInput {
                texts: vec![text.to_string()],
            })
            .await?;
        output
            .embeddings
            .into_iter()
            .next()
            .ok_or_else(|| PepperError::Internal("embedder returned no vector".to_string()))
    }

    async fn query(&self, vector: &[f32], k: usize) -> Result<Vec<RecipeDocument>, PepperError> {
        let corpus = self.corpus().await?;
        Ok(rank(&corpus, vector, k))
    }
}
