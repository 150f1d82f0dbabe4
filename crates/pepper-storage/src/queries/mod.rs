// SPDX-FileCopyrightText: 2026 Pepper Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Synchronous query helpers, run inside `Connection::call` closures.

pub mod conversations;
pub mod fridges;
