// SPDX-FileCopyrightText: 2026 Pepper Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Transport-independent core of the Pepper bot.
//!
//! [`flow`] walks users through fridge and product management, [`rag`]
//! answers free-form cooking questions, and [`listing`] renders fridge
//! contents for both.

pub mod flow;
pub mod listing;
pub mod metrics;
pub mod rag;

pub use flow::{Action, AddStep, FlowEngine, FlowReply, RemoveStep, TextOutcome, UserState};
pub use listing::{EMPTY_FRIDGE, render_listing};
pub use rag::{RagOrchestrator, RagSettings};
