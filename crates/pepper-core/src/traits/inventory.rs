// SPDX-FileCopyrightText: 2026 Pepper Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Persistence of fridges, products and conversation logs.

use async_trait::async_trait;

use crate::error::PepperError;
use crate::inventory::{AddOutcome, DeleteOutcome, Fridge, NewProduct, RemoveOutcome};
use crate::traits::adapter::PluginAdapter;
use crate::types::{ConversationEntry, FridgeId, OwnerId, Role, UserId};

/// Durable store for inventory and conversation data.
///
/// Product mutations return `Ok(None)` when the fridge does not exist; no
/// state is touched in that case.
#[async_trait]
pub trait InventoryStore: PluginAdapter {
    async fn get_fridge(&self, id: FridgeId) -> Result<Option<Fridge>, PepperError>;

    /// Fridges whose owner set contains `owner`, oldest first.
    async fn list_owned(&self, owner: &OwnerId) -> Result<Vec<Fridge>, PepperError>;

    /// Creates a fridge with `owner` as its sole owner.
    async fn create_fridge(&self, name: &str, owner: &OwnerId) -> Result<Fridge, PepperError>;

    async fn delete_fridge(
        &self,
        id: FridgeId,
        owner: &OwnerId,
    ) -> Result<DeleteOutcome, PepperError>;

    async fn add_product(
        &self,
        fridge: FridgeId,
        product: NewProduct,
    ) -> Result<Option<AddOutcome>, PepperError>;

    async fn remove_product(
        &self,
        fridge: FridgeId,
        name: &str,
        quantity: u32,
    ) -> Result<Option<RemoveOutcome>, PepperError>;

    /// The user's conversation in chronological order.
    async fn get_conversation(&self, user: &UserId)
    -> Result<Vec<ConversationEntry>, PepperError>;

    async fn append_conversation(
        &self,
        user: &UserId,
        role: Role,
        content: &str,
    ) -> Result<(), PepperError>;

    async fn clear_conversation(&self, user: &UserId) -> Result<(), PepperError>;
}
