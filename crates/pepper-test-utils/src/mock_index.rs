// SPDX-FileCopyrightText: 2026 Pepper Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fixed-corpus retrieval index and a deterministic embedder.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;

use pepper_core::traits::EmbeddingAdapter;
use pepper_core::types::{EmbeddingInput, EmbeddingOutput};
use pepper_core::{
    AdapterType, HealthStatus, PepperError, PluginAdapter, RecipeDocument, RetrievalIndex,
};

/// Returns the first `k` of a fixed document list and records every text
/// it was asked to embed.
pub struct MockIndex {
    documents: Vec<RecipeDocument>,
    embedded: Mutex<Vec<String>>,
    fail: AtomicBool,
}

impl MockIndex {
    pub fn new(documents: impl IntoIterator<Item = impl Into<String>>) -> Self {
        let documents = documents
            .into_iter()
            .enumerate()
            .map(|(i, doc)| {
                let document = doc.into();
                RecipeDocument {
                    id: format!("recipe-{i}"),
                    name: document.lines().next().unwrap_or_default().to_string(),
                    document,
                    score: 1.0 - i as f32 / 100.0,
                }
            })
            .collect();
        Self {
            documents,
            embedded: Mutex::new(Vec::new()),
            fail: AtomicBool::new(false),
        }
    }

    /// Makes every later `embed` call fail as unavailable.
    pub fn fail(&self) {
        self.fail.store(true, Ordering::SeqCst);
    }

    /// Texts passed to `embed`, in call order.
    pub fn embedded(&self) -> Vec<String> {
        self.embedded.lock().map(|e| e.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl PluginAdapter for MockIndex {
    fn name(&self) -> &str {
        "mock-index"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Retrieval
    }

    async fn health_check(&self) -> Result<HealthStatus, PepperError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), PepperError> {
        Ok(())
    }
}

#[async_trait]
impl RetrievalIndex for MockIndex {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, PepperError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(PepperError::unavailable("recipe index", "mock failure"));
        }
        if let Ok(mut embedded) = self.embedded.lock() {
            embedded.push(text.to_string());
        }
        Ok(vec![1.0, 0.0, 0.0])
    }

    async fn query(&self, _vector: &[f32], k: usize) -> Result<Vec<RecipeDocument>, PepperError> {
        Ok(self.documents.iter().take(k).cloned().collect())
    }
}

/// Embeds text as normalized letter counts over 26 buckets, so texts that
/// share words land close together.
#[derive(Default)]
pub struct MockEmbedder {
    calls: AtomicUsize,
}

impl MockEmbedder {
    pub const DIM: usize = 26;

    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `embed` calls (batches) so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn vector(text: &str) -> Vec<f32> {
        let mut v = vec![0.0f32; Self::DIM];
        for c in text.chars().filter(char::is_ascii_alphabetic) {
            v[(c.to_ascii_lowercase() as u8 - b'a') as usize] += 1.0;
        }
        let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            v.iter_mut().for_each(|x| *x /= norm);
        }
        v
    }
}

#[async_trait]
impl PluginAdapter for MockEmbedder {
    fn name(&self) -> &str {
        "mock-embedder"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Embedding
    }

    async fn health_check(&self) -> Result<HealthStatus, PepperError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), PepperError> {
        Ok(())
    }
}

#[async_trait]
impl EmbeddingAdapter for MockEmbedder {
    async fn embed(&self, input: EmbeddingInput) -> Result<EmbeddingOutput, PepperError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(EmbeddingOutput {
            embeddings: input.texts.iter().map(|t| Self::vector(t)).collect(),
            dimensions: Self::DIM,
        })
    }
}
