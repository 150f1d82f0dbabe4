// SPDX-FileCopyrightText: 2026 Pepper Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Recipe rows with their embedding vectors.

use pepper_core::PepperError;
use pepper_storage::{Database, map_tr_err};
use rusqlite::params;

use crate::vector::{blob_to_vec, vec_to_blob};

/// A recipe document ready to be stored or ranked.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredRecipe {
    pub id: String,
    pub name: String,
    pub document: String,
    pub embedding: Vec<f32>,
}

/// Access to the `recipes` table.
#[derive(Clone)]
pub struct RecipeStore {
    db: Database,
}

impl RecipeStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub async fn count(&self) -> Result<u64, PepperError> {
        self.db
            .connection()
            .call(|conn| -> Result<u64, rusqlite::Error> {
                conn.query_row("SELECT COUNT(*) FROM recipes", [], |row| row.get(0))
            })
            .await
            .map_err(map_tr_err)
    }

    /// Removes every recipe.
    pub async fn clear(&self) -> Result<(), PepperError> {
        self.db
            .connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute("DELETE FROM recipes", [])?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)
    }

    /// Inserts a batch in one transaction, replacing rows with the same id.
    pub async fn insert_batch(&self, batch: Vec<StoredRecipe>) -> Result<(), PepperError> {
        self.db
            .connection()
            .call(move |conn| -> Result<(), rusqlite::Error> {
                let tx = conn.transaction()?;
                {
                    let mut stmt = tx.prepare(
                        "INSERT OR REPLACE INTO recipes (id, name, document, embedding)
                         VALUES (?1, ?2, ?3, ?4)",
                    )?;
                    for recipe in &batch {
                        stmt.execute(params![
                            recipe.id,
                            recipe.name,
                            recipe.document,
                            vec_to_blob(&recipe.embedding),
                        ])?;
                    }
                }
                tx.commit()
            })
            .await
            .map_err(map_tr_err)
    }

    /// Loads every recipe with its vector.
    pub async fn load_all(&self) -> Result<Vec<StoredRecipe>, PepperError> {
        self.db
            .connection()
            .call(|conn| -> Result<Vec<StoredRecipe>, rusqlite::Error> {
                let mut stmt =
                    conn.prepare("SELECT id, name, document, embedding FROM recipes ORDER BY id")?;
                stmt.query_map([], |row| {
                    let blob: Vec<u8> = row.get(3)?;
                    Ok(StoredRecipe {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        document: row.get(2)?,
                        embedding: blob_to_vec(&blob),
                    })
                })?
                .collect()
            })
            .await
            .map_err(map_tr_err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recipe(id: &str, embedding: Vec<f32>) -> StoredRecipe {
        StoredRecipe {
            id: id.into(),
            name: format!("name {id}"),
            document: format!("Recipe: {id}"),
            embedding,
        }
    }

    #[tokio::test]
    async fn insert_count_load_clear() {
        let store = RecipeStore::new(Database::open_in_memory().await.unwrap());
        assert_eq!(store.count().await.unwrap(), 0);

        store
            .insert_batch(vec![recipe("recipe-0", vec![1.0, 0.0]), recipe("recipe-1", vec![0.0, 1.0])])
            .await
            .unwrap();
        assert_eq!(store.count().await.unwrap(), 2);

        let all = store.load_all().await.unwrap();
        assert_eq!(all[0].id, "recipe-0");
        assert_eq!(all[1].embedding, vec![0.0, 1.0]);

        store.clear().await.unwrap();
        assert_eq!(store.count().await.unwrap(), 0);
    }
}
