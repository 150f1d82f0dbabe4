// SPDX-FileCopyrightText: 2026 Pepper Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter trait definitions.
//!
//! Collaborators extend the [`PluginAdapter`] base trait and use
//! `#[async_trait]` so they can be held as `Arc<dyn Trait>`.

pub mod adapter;
pub mod embedding;
pub mod inventory;
pub mod provider;
pub mod reply;
pub mod retrieval;

pub use adapter::PluginAdapter;
pub use embedding::EmbeddingAdapter;
pub use inventory::InventoryStore;
pub use provider::{ProviderAdapter, ProviderStream};
pub use reply::LiveReply;
pub use retrieval::RetrievalIndex;
