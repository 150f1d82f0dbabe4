// SPDX-FileCopyrightText: 2026 Pepper Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-user conversation log.

use std::str::FromStr;

use pepper_core::{ConversationEntry, Role, UserId};
use rusqlite::types::Type;
use rusqlite::{Connection, params};

/// Entries for `user` in insertion order.
pub fn entries(conn: &Connection, user: &UserId) -> rusqlite::Result<Vec<ConversationEntry>> {
    let mut stmt = conn.prepare(
        "SELECT role, content FROM conversation_entries
         WHERE user_id = ?1 ORDER BY id ASC",
    )?;
    stmt.query_map(params![user.0], |row| {
        let raw: String = row.get(0)?;
        let role = Role::from_str(&raw)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(0, Type::Text, Box::new(e)))?;
        Ok(ConversationEntry {
            role,
            content: row.get(1)?,
        })
    })?
    .collect()
}

pub fn append(conn: &Connection, user: &UserId, role: Role, content: &str) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO conversation_entries (user_id, role, content) VALUES (?1, ?2, ?3)",
        params![user.0, role.to_string(), content],
    )?;
    Ok(())
}

/// Removes every entry for `user`; returns the number deleted.
pub fn clear(conn: &Connection, user: &UserId) -> rusqlite::Result<usize> {
    conn.execute(
        "DELETE FROM conversation_entries WHERE user_id = ?1",
        params![user.0],
    )
}
