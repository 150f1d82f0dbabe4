// SPDX-FileCopyrightText: 2026 Pepper Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `pepper serve` command implementation.
//!
//! Builds every component once (storage, embedder, recipe index, Ollama
//! provider, flow engine, orchestrator), hands them to the Telegram bot and
//! polls until SIGINT or SIGTERM.

use std::sync::Arc;

use pepper_chat::{FlowEngine, RagOrchestrator, RagSettings};
use pepper_config::PepperConfig;
use pepper_core::{HealthStatus, PepperError, PluginAdapter};
use pepper_ollama::OllamaProvider;
use pepper_recipes::{RecipeIndex, RecipeStore};
use pepper_storage::SqliteInventory;
use pepper_telegram::TelegramBot;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::recipes;

/// Runs the `pepper serve` command.
pub async fn run_serve(config: PepperConfig) -> Result<(), PepperError> {
    init_tracing(&config.bot.log_level);

    info!("starting pepper serve");

    // Fail fast before the model download.
    if !has_bot_token(&config) {
        return Err(PepperError::Config(
            "telegram.bot_token is required (or set PEPPER_TELEGRAM_BOT_TOKEN)".to_string(),
        ));
    }

    let inventory = Arc::new(SqliteInventory::open(&config.storage).await?);
    info!(path = %config.storage.database_path, "inventory store opened");

    let embedder = recipes::load_embedder(&config.retrieval).await?;
    recipes::bootstrap_index(&config, inventory.database(), embedder.clone()).await?;
    let recipe_store = RecipeStore::new(inventory.database().clone());
    let recipe_count = recipe_store.count().await?;
    if recipe_count == 0 {
        warn!("recipe index is empty, answers will have no recipes to draw on");
    } else {
        info!(recipes = recipe_count, "recipe index ready");
    }
    let index = Arc::new(RecipeIndex::new(recipe_store, embedder));

    let provider = Arc::new(OllamaProvider::new(&config.ollama)?);
    match provider.health_check().await {
        Ok(HealthStatus::Healthy) => debug!("ollama reachable"),
        Ok(HealthStatus::Degraded(reason)) | Ok(HealthStatus::Unhealthy(reason)) => {
            warn!(reason = %reason, "ollama is not ready, questions will report it as unavailable");
        }
        Err(e) => warn!(error = %e, "ollama health check failed"),
    }

    pepper_chat::metrics::register_metrics();

    let settings = RagSettings::from_config(&config);
    info!(
        top_k = settings.top_k,
        translation = settings.translation_enabled(),
        "orchestrator configured"
    );
    let flow = Arc::new(FlowEngine::new(inventory.clone()));
    let rag = Arc::new(RagOrchestrator::new(
        inventory.clone(),
        index,
        provider,
        settings,
    ));

    let bot = TelegramBot::new(&config.telegram, flow, rag)?;
    let cancel = install_signal_handler();
    bot.run(cancel).await;

    inventory.shutdown().await?;
    info!("pepper serve shutdown complete");
    Ok(())
}

fn has_bot_token(config: &PepperConfig) -> bool {
    config
        .telegram
        .bot_token
        .as_deref()
        .is_some_and(|token| !token.trim().is_empty())
}

/// Returns a token that is cancelled on SIGINT or SIGTERM.
fn install_signal_handler() -> CancellationToken {
    let token = CancellationToken::new();
    let trigger = token.clone();

    tokio::spawn(async move {
        wait_for_signal().await;
        trigger.cancel();
        debug!("shutdown signal handler completed");
    });

    token
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigterm = match signal(SignalKind::terminate()) {
        Ok(sigterm) => sigterm,
        Err(e) => {
            warn!(error = %e, "failed to install SIGTERM handler, only Ctrl+C will stop the bot");
            let _ = tokio::signal::ctrl_c().await;
            info!("received SIGINT (Ctrl+C), initiating shutdown");
            return;
        }
    };

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("received SIGINT (Ctrl+C), initiating shutdown");
        }
        _ = sigterm.recv() => {
            info!("received SIGTERM, initiating shutdown");
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("received Ctrl+C, initiating shutdown");
}

fn default_filter(log_level: &str) -> String {
    format!("pepper={log_level},warn")
}

/// Initializes the tracing subscriber with the given log level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(log_level)));

    // A subscriber may already be installed when embedded in tests.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_scopes_level_to_pepper_crates() {
        assert_eq!(default_filter("debug"), "pepper=debug,warn");
    }

    #[test]
    fn blank_token_counts_as_missing() {
        let mut config = PepperConfig::default();
        assert!(!has_bot_token(&config));
        config.telegram.bot_token = Some("   ".to_string());
        assert!(!has_bot_token(&config));
        config.telegram.bot_token = Some("123:ABC".to_string());
        assert!(has_bot_token(&config));
    }

    #[tokio::test]
    async fn serve_without_token_fails_before_opening_storage() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = PepperConfig::default();
        config.storage.database_path = dir.path().join("pepper.db").display().to_string();

        let err = run_serve(config).await.unwrap_err();
        assert!(matches!(err, PepperError::Config(_)));
        assert!(!dir.path().join("pepper.db").exists());
    }
}
