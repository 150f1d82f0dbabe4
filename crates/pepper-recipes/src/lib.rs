// SPDX-FileCopyrightText: 2026 Pepper Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Recipe retrieval for the Pepper fridge assistant.
//!
//! Recipes are rendered into plain-text documents, embedded locally with an
//! ONNX sentence encoder and stored next to their vectors in SQLite. Queries
//! rank the whole corpus by cosine similarity.

pub mod document;
pub mod embedder;
pub mod importer;
pub mod index;
pub mod model_manager;
pub mod store;
pub mod vector;

pub use document::{RecipeRecord, parse_list};
pub use embedder::{EMBEDDING_DIM, OnnxEmbedder};
pub use importer::{ImportOptions, ImportReport, RecipeImporter};
pub use index::RecipeIndex;
pub use model_manager::ModelManager;
pub use store::{RecipeStore, StoredRecipe};
