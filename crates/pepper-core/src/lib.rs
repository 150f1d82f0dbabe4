// SPDX-FileCopyrightText: 2026 Pepper Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Pepper fridge assistant.
//!
//! Holds the error type, the fridge/product model and the traits every
//! external collaborator implements: inventory store, retrieval index,
//! language model client and live reply.

pub mod error;
pub mod inventory;
pub mod traits;
pub mod types;

pub use error::PepperError;
pub use inventory::{
    AddOutcome, DEFAULT_UNIT, DeleteOutcome, Fridge, FridgeSummary, NewProduct, Product,
    RemoveOutcome,
};
pub use types::{
    Actor, AdapterType, ChatMessage, ConversationEntry, FridgeId, HealthStatus, OwnerId,
    ProductId, RecipeDocument, Role, UserId,
};

pub use traits::{
    EmbeddingAdapter, InventoryStore, LiveReply, PluginAdapter, ProviderAdapter, ProviderStream,
    RetrievalIndex,
};
