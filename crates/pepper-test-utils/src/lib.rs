// SPDX-FileCopyrightText: 2026 Pepper Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test doubles shared by Pepper's integration tests.

pub mod mock_index;
pub mod mock_provider;
pub mod recording_reply;

pub use mock_index::{MockEmbedder, MockIndex};
pub use mock_provider::MockProvider;
pub use recording_reply::{RecordingReply, ReplyEvent};

use pepper_storage::SqliteInventory;

/// A migrated inventory store on a private in-memory database.
pub async fn memory_inventory() -> SqliteInventory {
    SqliteInventory::open_in_memory()
        .await
        .expect("in-memory database should open")
}
