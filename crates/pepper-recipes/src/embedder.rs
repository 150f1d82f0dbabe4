// SPDX-FileCopyrightText: 2026 Pepper Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Local sentence embeddings with ONNX Runtime.
//!
//! Runs all-MiniLM-L6-v2 style encoders on CPU and produces L2-normalized
//! vectors by attention-masked mean pooling of the last hidden state.

use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;
use ndarray::Array2;
use ort::session::Session;
use ort::session::builder::GraphOptimizationLevel;
use ort::value::TensorRef;

use pepper_core::traits::EmbeddingAdapter;
use pepper_core::types::{EmbeddingInput, EmbeddingOutput};
use pepper_core::{AdapterType, HealthStatus, PepperError, PluginAdapter};

/// Output width of all-MiniLM-L6-v2.
pub const EMBEDDING_DIM: usize = 384;

/// ONNX sentence encoder.
pub struct OnnxEmbedder {
    session: Mutex<Session>,
    tokenizer: tokenizers::Tokenizer,
}

// Safety: the session is only reached through the Mutex and tokenizer
// encoding takes `&self` without interior mutability.
unsafe impl Send for OnnxEmbedder {}
unsafe impl Sync for OnnxEmbedder {}

fn internal(context: &str, e: impl std::fmt::Display) -> PepperError {
    PepperError::Internal(format!("{context}: {e}"))
}

impl OnnxEmbedder {
    /// Loads `model.onnx` and the sibling `tokenizer.json`.
    pub fn new(model_path: &Path) -> Result<Self, PepperError> {
        let model_dir = model_path
            .parent()
            .ok_or_else(|| PepperError::Internal("invalid model path".to_string()))?;

        let tokenizer_path = model_dir.join("tokenizer.json");
        let tokenizer = tokenizers::Tokenizer::from_file(&tokenizer_path).map_err(|e| {
            internal(
                &format!("failed to load tokenizer from {}", tokenizer_path.display()),
                e,
            )
        })?;

        let session = Session::builder()
            .map_err(|e| internal("failed to create ONNX session builder", e))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| internal("failed to set optimization level", e))?
            .with_intra_threads(1)
            .map_err(|e| internal("failed to set thread count", e))?
            .commit_from_file(model_path)
            .map_err(|e| {
                internal(
                    &format!("failed to load ONNX model from {}", model_path.display()),
                    e,
                )
            })?;

        Ok(Self {
            session: Mutex::new(session),
            tokenizer,
        })
    }

    /// Embeds one text.
    pub fn embed_text(&self, text: &str) -> Result<Vec<f32>, PepperError> {
        let encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| internal("tokenization failed", e))?;

        let to_i64 = |values: &[u32]| values.iter().map(|&v| v as i64).collect::<Vec<i64>>();
        let input_ids = to_i64(encoding.get_ids());
        let attention_mask = to_i64(encoding.get_attention_mask());
        let token_type_ids = to_i64(encoding.get_type_ids());
        let seq_len = input_ids.len();

        let shape = (1, seq_len);
        let input_ids = Array2::from_shape_vec(shape, input_ids)
            .map_err(|e| internal("failed to shape input_ids", e))?;
        let mask = Array2::from_shape_vec(shape, attention_mask.clone())
            .map_err(|e| internal("failed to shape attention_mask", e))?;
        let token_types = Array2::from_shape_vec(shape, token_type_ids)
            .map_err(|e| internal("failed to shape token_type_ids", e))?;

        let mut session = self
            .session
            .lock()
            .map_err(|e| internal("failed to lock ONNX session", e))?;

        let outputs = session
            .run(ort::inputs![
                "input_ids" => TensorRef::from_array_view(&input_ids)
                    .map_err(|e| internal("input_ids tensor", e))?,
                "attention_mask" => TensorRef::from_array_view(&mask)
                    .map_err(|e| internal("attention_mask tensor", e))?,
                "token_type_ids" => TensorRef::from_array_view(&token_types)
                    .map_err(|e| internal("token_type_ids tensor", e))?
            ])
            .map_err(|e| internal("ONNX inference failed", e))?;

        // Last hidden state: [1, seq_len, hidden]
        let (shape, data) = outputs[0]
            .try_extract_tensor::<f32>()
            .map_err(|e| internal("failed to extract output tensor", e))?;
        let hidden_size = shape[shape.len() - 1] as usize;

        let pooled = mean_pool_with_attention(data, &attention_mask, seq_len, hidden_size);
        Ok(l2_normalize(&pooled))
    }
}

fn mean_pool_with_attention(
    embeddings: &[f32],
    attention_mask: &[i64],
    seq_len: usize,
    hidden_size: usize,
) -> Vec<f32> {
    let mut sum = vec![0.0f32; hidden_size];
    let mut count = 0.0f32;

    for (token, &mask) in attention_mask.iter().enumerate().take(seq_len) {
        if mask > 0 {
            let row = &embeddings[token * hidden_size..(token + 1) * hidden_size];
            for (acc, value) in sum.iter_mut().zip(row) {
                *acc += value;
            }
            count += 1.0;
        }
    }

    if count > 0.0 {
        for val in &mut sum {
            *val /= count;
        }
    }
    sum
}

fn l2_normalize(vec: &[f32]) -> Vec<f32> {
    let norm: f32 = vec.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm > f32::EPSILON {
        vec.iter().map(|v| v / norm).collect()
    } else {
        vec.to_vec()
    }
}

#[async_trait]
impl PluginAdapter for OnnxEmbedder {
    fn name(&self) -> &str {
        "onnx-embedder"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Embedding
    }

    async fn health_check(&self) -> Result<HealthStatus, PepperError> {
        match self.session.lock() {
            Ok(_) => Ok(HealthStatus::Healthy),
            Err(e) => Ok(HealthStatus::Unhealthy(format!("session lock poisoned: {e}"))),
        }
    }

    async fn shutdown(&self) -> Result<(), PepperError> {
        Ok(())
    }
}

#[async_trait]
impl EmbeddingAdapter for OnnxEmbedder {
    async fn embed(&self, input: EmbeddingInput) -> Result<EmbeddingOutput, PepperError> {
        let embeddings = input
            .texts
            .iter()
            .map(|text| self.embed_text(text))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(EmbeddingOutput {
            embeddings,
            dimensions: EMBEDDING_DIM,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn l2_normalize_general_vector() {
        let n = l2_normalize(&[3.0, 4.0]);
        assert!((n[0] - 0.6).abs() < 0.001);
        assert!((n[1] - 0.8).abs() < 0.001);
    }

    #[test]
    fn l2_normalize_keeps_zero_vector() {
        assert_eq!(l2_normalize(&[0.0, 0.0]), vec![0.0, 0.0]);
    }

    #[test]
    fn padding_tokens_are_ignored() {
        let embeddings = vec![
            1.0, 2.0, 3.0, // real
            9.0, 9.0, 9.0, // padding
        ];
        let result = mean_pool_with_attention(&embeddings, &[1, 0], 2, 3);
        assert_eq!(result, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn mean_over_real_tokens() {
        let embeddings = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let result = mean_pool_with_attention(&embeddings, &[1, 1, 1], 3, 2);
        assert!((result[0] - 3.0).abs() < f32::EPSILON);
        assert!((result[1] - 4.0).abs() < f32::EPSILON);
    }
}
