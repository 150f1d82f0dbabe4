// SPDX-FileCopyrightText: 2026 Pepper Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Metric registration and recording helpers.
//!
//! Uses the metrics facade; nothing is collected until the embedding
//! process installs a recorder.

use metrics::{describe_counter, describe_histogram};

/// Registers every Pepper metric description.
pub fn register_metrics() {
    describe_counter!(
        "pepper_flow_events_total",
        "Replies produced by the conversation flow, by kind"
    );
    describe_counter!("pepper_rag_answers_total", "Answers generated by the orchestrator");
    describe_counter!(
        "pepper_rag_upstream_errors_total",
        "Upstream failures during answering, by stage"
    );
    describe_histogram!(
        "pepper_rag_generation_seconds",
        "Time from question to final answer in seconds"
    );
    describe_counter!(
        "pepper_telegram_edits_failed_total",
        "Live message edits rejected by Telegram"
    );
}

pub fn record_flow_event(kind: &'static str) {
    metrics::counter!("pepper_flow_events_total", "kind" => kind).increment(1);
}

pub fn record_answer(seconds: f64) {
    metrics::counter!("pepper_rag_answers_total").increment(1);
    metrics::histogram!("pepper_rag_generation_seconds").record(seconds);
}

pub fn record_upstream_error(stage: &'static str) {
    metrics::counter!("pepper_rag_upstream_errors_total", "stage" => stage).increment(1);
}

pub fn record_failed_edit() {
    metrics::counter!("pepper_telegram_edits_failed_total").increment(1);
}
