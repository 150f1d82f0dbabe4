// SPDX-FileCopyrightText: 2026 Pepper Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fridge, owner and product rows.

use std::collections::BTreeSet;

use pepper_core::{Fridge, FridgeId, OwnerId, Product, ProductId};
use rusqlite::{Connection, OptionalExtension, params};

/// Loads a fridge with its owners and products, or `None` if it does not exist.
pub fn load_fridge(conn: &Connection, id: FridgeId) -> rusqlite::Result<Option<Fridge>> {
    let head = conn
        .query_row(
            "SELECT name, next_product_id FROM fridges WHERE id = ?1",
            params![id.0],
            |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)),
        )
        .optional()?;
    let Some((name, next_product_id)) = head else {
        return Ok(None);
    };

    let mut stmt = conn.prepare("SELECT owner FROM fridge_owners WHERE fridge_id = ?1")?;
    let owners = stmt
        .query_map(params![id.0], |row| row.get::<_, String>(0).map(OwnerId))?
        .collect::<rusqlite::Result<BTreeSet<_>>>()?;

    let mut stmt = conn.prepare(
        "SELECT id, name, quantity, unit, expires FROM products
         WHERE fridge_id = ?1 ORDER BY id ASC",
    )?;
    let products = stmt
        .query_map(params![id.0], |row| {
            Ok(Product {
                id: ProductId(row.get(0)?),
                name: row.get(1)?,
                quantity: row.get(2)?,
                unit: row.get(3)?,
                expires: row.get(4)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(Some(Fridge {
        id,
        name,
        owners,
        products,
        next_product_id,
    }))
}

/// Ids of fridges owned by `owner`, oldest first.
pub fn owned_ids(conn: &Connection, owner: &OwnerId) -> rusqlite::Result<Vec<FridgeId>> {
    let mut stmt = conn.prepare(
        "SELECT f.id FROM fridges f
         JOIN fridge_owners o ON o.fridge_id = f.id
         WHERE o.owner = ?1 ORDER BY f.id ASC",
    )?;
    stmt.query_map(params![owner.0], |row| row.get(0).map(FridgeId))?
        .collect()
}

/// Inserts a fridge with a single owner and returns it.
pub fn insert_fridge(conn: &Connection, name: &str, owner: &OwnerId) -> rusqlite::Result<Fridge> {
    conn.execute("INSERT INTO fridges (name) VALUES (?1)", params![name])?;
    let id = FridgeId(conn.last_insert_rowid());
    conn.execute(
        "INSERT INTO fridge_owners (fridge_id, owner) VALUES (?1, ?2)",
        params![id.0, owner.0],
    )?;
    Ok(Fridge {
        id,
        name: name.to_string(),
        owners: BTreeSet::from([owner.clone()]),
        products: Vec::new(),
        next_product_id: 1,
    })
}

/// Replaces the stored products and id counter with the in-memory state.
pub fn save_products(conn: &Connection, fridge: &Fridge) -> rusqlite::Result<()> {
    conn.execute(
        "DELETE FROM products WHERE fridge_id = ?1",
        params![fridge.id.0],
    )?;
    let mut stmt = conn.prepare(
        "INSERT INTO products (fridge_id, id, name, quantity, unit, expires)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
    )?;
    for product in &fridge.products {
        stmt.execute(params![
            fridge.id.0,
            product.id.0,
            product.name,
            product.quantity,
            product.unit,
            product.expires,
        ])?;
    }
    conn.execute(
        "UPDATE fridges SET next_product_id = ?1 WHERE id = ?2",
        params![fridge.next_product_id, fridge.id.0],
    )?;
    Ok(())
}

/// Deletes a fridge; owners and products cascade.
pub fn delete_fridge(conn: &Connection, id: FridgeId) -> rusqlite::Result<()> {
    conn.execute("DELETE FROM fridges WHERE id = ?1", params![id.0])?;
    Ok(())
}
