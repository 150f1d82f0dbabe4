// SPDX-FileCopyrightText: 2026 Pepper Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! First-run download of the sentence embedding model.

use std::path::{Path, PathBuf};

use pepper_core::PepperError;
use tracing::info;

const HUB: &str = "https://huggingface.co/sentence-transformers";

/// Resolves and fetches `model.onnx` and `tokenizer.json` for one model.
pub struct ModelManager {
    model_dir: PathBuf,
    model_name: String,
}

impl ModelManager {
    pub fn new(model_dir: impl Into<PathBuf>, model_name: impl Into<String>) -> Self {
        Self {
            model_dir: model_dir.into(),
            model_name: model_name.into(),
        }
    }

    /// Directory holding this model's files.
    pub fn model_dir(&self) -> PathBuf {
        self.model_dir.join(&self.model_name)
    }

    pub fn model_path(&self) -> PathBuf {
        self.model_dir().join("model.onnx")
    }

    pub fn tokenizer_path(&self) -> PathBuf {
        self.model_dir().join("tokenizer.json")
    }

    pub fn is_model_available(&self) -> bool {
        self.model_path().exists() && self.tokenizer_path().exists()
    }

    fn urls(&self) -> [(&'static str, String); 2] {
        [
            (
                "model.onnx",
                format!("{HUB}/{}/resolve/main/onnx/model.onnx", self.model_name),
            ),
            (
                "tokenizer.json",
                format!("{HUB}/{}/resolve/main/tokenizer.json", self.model_name),
            ),
        ]
    }

    /// Downloads missing files and returns the model path.
    pub async fn ensure_model(&self) -> Result<PathBuf, PepperError> {
        if self.is_model_available() {
            return Ok(self.model_path());
        }

        info!(model = %self.model_name, "embedding model not found, downloading");
        let model_dir = self.model_dir();
        tokio::fs::create_dir_all(&model_dir).await.map_err(|e| {
            PepperError::Internal(format!("failed to create model directory: {e}"))
        })?;

        for (filename, url) in self.urls() {
            let dest = model_dir.join(filename);
            if dest.exists() {
                continue;
            }
            info!("downloading {filename}");
            match download_file(&url, &dest).await {
                Ok(size) => info!(bytes = size, "downloaded {filename}"),
                Err(e) => {
                    let _ = tokio::fs::remove_file(&dest).await;
                    return Err(e);
                }
            }
        }

        info!(path = %model_dir.display(), "embedding model ready");
        Ok(self.model_path())
    }
}

async fn download_file(url: &str, dest: &Path) -> Result<usize, PepperError> {
    let response = reqwest::get(url)
        .await
        .map_err(|e| PepperError::unavailable("model hub", format!("{url}: {e}")))?;

    if !response.status().is_success() {
        return Err(PepperError::unavailable(
            "model hub",
            format!("download failed with status {}: {url}", response.status()),
        ));
    }

    let bytes = response.bytes().await.map_err(|e| {
        PepperError::unavailable("model hub", format!("failed to read body of {url}: {e}"))
    })?;

    tokio::fs::write(dest, &bytes)
        .await
        .map_err(|e| PepperError::Internal(format!("failed to write {}: {e}", dest.display())))?;
    Ok(bytes.len())
}
