// SPDX-FileCopyrightText: 2026 Pepper Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Connection management with PRAGMA setup and migrations.
//!
//! All statements run on tokio-rusqlite's single background thread, which
//! serializes writes. Open one [`Database`] per process and share it.

use std::path::Path;

use pepper_core::PepperError;
use tokio_rusqlite::Connection;
use tracing::{debug, info};

use crate::migrations;

/// Maps tokio-rusqlite failures to [`PepperError::Storage`].
pub fn map_tr_err(e: tokio_rusqlite::Error) -> PepperError {
    PepperError::Storage {
        source: Box::new(e),
    }
}

/// Handle on the migrated SQLite database.
#[derive(Clone)]
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Opens (creating if needed) the database file and applies migrations.
    pub async fn open(path: &str, wal_mode: bool) -> Result<Self, PepperError> {
        if let Some(parent) = Path::new(path).parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| PepperError::Storage {
                source: Box::new(e),
            })?;
        }

        let conn = Connection::open(path).await.map_err(|e| PepperError::Storage {
            source: Box::new(e),
        })?;
        let db = Self { conn };
        db.prepare(wal_mode).await?;
        info!(path, "database opened");
        Ok(db)
    }

    /// Opens a private in-memory database, used by tests and dry runs.
    pub async fn open_in_memory() -> Result<Self, PepperError> {
        let conn = Connection::open_in_memory().await.map_err(|e| PepperError::Storage {
            source: Box::new(e),
        })?;
        let db = Self { conn };
        db.prepare(false).await?;
        Ok(db)
    }

    async fn prepare(&self, wal_mode: bool) -> Result<(), PepperError> {
        self.conn
            .call(move |conn| -> Result<(), rusqlite::Error> {
                if wal_mode {
                    conn.execute_batch("PRAGMA journal_mode = WAL;")?;
                }
                conn.execute_batch(
                    "PRAGMA foreign_keys = ON;
                     PRAGMA busy_timeout = 5000;
                     PRAGMA synchronous = NORMAL;",
                )?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;

        self.conn
            .call(|conn| -> Result<_, rusqlite::Error> {
                Ok(migrations::run_migrations(conn))
            })
            .await
            .map_err(map_tr_err)?
            .map_err(|e| PepperError::Storage {
                source: Box::new(e),
            })?;
        debug!("migrations applied");
        Ok(())
    }

    /// The underlying async connection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Checkpoints the WAL and closes the connection.
    pub async fn close(self) -> Result<(), PepperError> {
        self.conn
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        self.conn.close().await.map_err(map_tr_err)
    }
}
