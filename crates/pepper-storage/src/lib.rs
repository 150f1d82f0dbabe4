// SPDX-FileCopyrightText: 2026 Pepper Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence for the Pepper fridge assistant.
//!
//! Fridges, their owners and products, the per-user conversation log and
//! the recipe index table all live in one WAL-mode database. Schema changes
//! are embedded refinery migrations.

pub mod adapter;
pub mod database;
pub mod migrations;
pub mod queries;

pub use adapter::SqliteInventory;
pub use database::{Database, map_tr_err};
