// SPDX-FileCopyrightText: 2026 Pepper Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the [`InventoryStore`] trait.

use async_trait::async_trait;
use tracing::debug;

use pepper_config::model::StorageConfig;
use pepper_core::{
    AddOutcome, AdapterType, ConversationEntry, DeleteOutcome, Fridge, FridgeId, HealthStatus,
    InventoryStore, NewProduct, OwnerId, PepperError, PluginAdapter, RemoveOutcome, Role, UserId,
};

use crate::database::{Database, map_tr_err};
use crate::queries::{conversations, fridges};

/// SQLite-backed inventory and conversation store.
///
/// Product mutations load the fridge, apply the shared arithmetic from
/// [`Fridge`] and write the result back inside one transaction.
#[derive(Clone)]
pub struct SqliteInventory {
    db: Database,
}

impl SqliteInventory {
    /// Opens the database described by `config`.
    pub async fn open(config: &StorageConfig) -> Result<Self, PepperError> {
        let db = Database::open(&config.database_path, config.wal_mode).await?;
        Ok(Self { db })
    }

    pub async fn open_in_memory() -> Result<Self, PepperError> {
        Ok(Self {
            db: Database::open_in_memory().await?,
        })
    }

    pub fn from_database(db: Database) -> Self {
        Self { db }
    }

    /// Shared database handle, also used by the recipe store.
    pub fn database(&self) -> &Database {
        &self.db
    }

    async fn mutate_fridge<T, F>(&self, id: FridgeId, apply: F) -> Result<Option<T>, PepperError>
    where
        T: Send + 'static,
        F: FnOnce(&mut Fridge) -> T + Send + 'static,
    {
        self.db
            .connection()
            .call(move |conn| -> Result<Option<T>, rusqlite::Error> {
                let tx = conn.transaction()?;
                let Some(mut fridge) = fridges::load_fridge(&tx, id)? else {
                    return Ok(None);
                };
                let outcome = apply(&mut fridge);
                fridges::save_products(&tx, &fridge)?;
                tx.commit()?;
                Ok(Some(outcome))
            })
            .await
            .map_err(map_tr_err)
    }
}

#[async_trait]
impl PluginAdapter for SqliteInventory {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, PepperError> {
        self.db
            .connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("SELECT 1;")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), PepperError> {
        self.db
            .connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        debug!("shutdown: WAL checkpoint complete");
        Ok(())
    }
}

#[async_trait]
impl InventoryStore for SqliteInventory {
    async fn get_fridge(&self, id: FridgeId) -> Result<Option<Fridge>, PepperError> {
        self.db
            .connection()
            .call(move |conn| -> Result<_, rusqlite::Error> { fridges::load_fridge(conn, id) })
            .await
            .map_err(map_tr_err)
    }

    async fn list_owned(&self, owner: &OwnerId) -> Result<Vec<Fridge>, PepperError> {
        let owner = owner.clone();
        self.db
            .connection()
            .call(move |conn| -> Result<Vec<Fridge>, rusqlite::Error> {
                let mut owned = Vec::new();
                for id in fridges::owned_ids(conn, &owner)? {
                    if let Some(fridge) = fridges::load_fridge(conn, id)? {
                        owned.push(fridge);
                    }
                }
                Ok(owned)
            })
            .await
            .map_err(map_tr_err)
    }

    async fn create_fridge(&self, name: &str, owner: &OwnerId) -> Result<Fridge, PepperError> {
        let name = name.trim().to_string();
        let owner = owner.clone();
        let fridge = self
            .db
            .connection()
            .call(move |conn| -> Result<Fridge, rusqlite::Error> {
                let tx = conn.transaction()?;
                let fridge = fridges::insert_fridge(&tx, &name, &owner)?;
                tx.commit()?;
                Ok(fridge)
            })
            .await
            .map_err(map_tr_err)?;
        debug!(fridge = %fridge.id, "fridge created");
        Ok(fridge)
    }

    async fn delete_fridge(
        &self,
        id: FridgeId,
        owner: &OwnerId,
    ) -> Result<DeleteOutcome, PepperError> {
        let owner = owner.clone();
        self.db
            .connection()
            .call(move |conn| -> Result<DeleteOutcome, rusqlite::Error> {
                let tx = conn.transaction()?;
                let Some(fridge) = fridges::load_fridge(&tx, id)? else {
                    return Ok(DeleteOutcome::NotFound);
                };
                if !fridge.is_owned_by(&owner) {
                    return Ok(DeleteOutcome::Unauthorized);
                }
                fridges::delete_fridge(&tx, id)?;
                tx.commit()?;
                Ok(DeleteOutcome::Deleted { name: fridge.name })
            })
            .await
            .map_err(map_tr_err)
    }

    async fn add_product(
        &self,
        fridge: FridgeId,
        product: NewProduct,
    ) -> Result<Option<AddOutcome>, PepperError> {
        self.mutate_fridge(fridge, move |f| f.add_product(product))
            .await
    }

    async fn remove_product(
        &self,
        fridge: FridgeId,
        name: &str,
        quantity: u32,
    ) -> Result<Option<RemoveOutcome>, PepperError> {
        let name = name.to_string();
        self.mutate_fridge(fridge, move |f| f.remove_product(&name, quantity))
            .await
    }

    async fn get_conversation(
        &self,
        user: &UserId,
    ) -> Result<Vec<ConversationEntry>, PepperError> {
        let user = user.clone();
        self.db
            .connection()
            .call(move |conn| -> Result<_, rusqlite::Error> {
                conversations::entries(conn, &user)
            })
            .await
            .map_err(map_tr_err)
    }

    async fn append_conversation(
        &self,
        user: &UserId,
        role: Role,
        content: &str,
    ) -> Result<(), PepperError> {
        let user = user.clone();
        let content = content.to_string();
        self.db
            .connection()
            .call(move |conn| -> Result<(), rusqlite::Error> {
                conversations::append(conn, &user, role, &content)
            })
            .await
            .map_err(map_tr_err)
    }

    async fn clear_conversation(&self, user: &UserId) -> Result<(), PepperError> {
        let user = user.clone();
        let removed = self
            .db
            .connection()
            .call(move |conn| -> Result<usize, rusqlite::Error> {
                conversations::clear(conn, &user)
            })
            .await
            .map_err(map_tr_err)?;
        debug!(removed, "conversation cleared");
        Ok(())
    }
}
