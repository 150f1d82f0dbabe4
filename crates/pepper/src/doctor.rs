// SPDX-FileCopyrightText: 2026 Pepper Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `pepper doctor` command implementation.
//!
//! Runs diagnostic checks against the configured database, embedding model,
//! Ollama server and Telegram bot, and prints a pass/warn/fail table.

use std::io::IsTerminal;
use std::path::Path;
use std::time::{Duration, Instant};

use pepper_config::PepperConfig;
use pepper_core::{HealthStatus, PepperError, PluginAdapter};
use pepper_ollama::OllamaProvider;
use pepper_recipes::{ModelManager, RecipeStore};
use pepper_storage::SqliteInventory;
use teloxide::prelude::*;

const TELEGRAM_TIMEOUT: Duration = Duration::from_secs(10);

/// Status of a diagnostic check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckStatus {
    Pass,
    Warn,
    Fail,
}

/// Result of a single diagnostic check.
#[derive(Debug, Clone)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub duration: Duration,
}

impl CheckResult {
    fn new(name: &str, status: CheckStatus, message: impl Into<String>, start: Instant) -> Self {
        Self {
            name: name.to_string(),
            status,
            message: message.into(),
            duration: start.elapsed(),
        }
    }

    /// Maps an adapter health check onto a table row.
    fn from_health(
        name: &str,
        health: Result<HealthStatus, PepperError>,
        healthy: &str,
        start: Instant,
    ) -> Self {
        match health {
            Ok(HealthStatus::Healthy) => Self::new(name, CheckStatus::Pass, healthy, start),
            Ok(HealthStatus::Degraded(reason)) => Self::new(name, CheckStatus::Warn, reason, start),
            Ok(HealthStatus::Unhealthy(reason)) => Self::new(name, CheckStatus::Fail, reason, start),
            Err(e) => Self::new(name, CheckStatus::Fail, e.to_string(), start),
        }
    }
}

/// Run the `pepper doctor` command.
///
/// With `plain`, or when stdout is not a terminal, the table is uncolored.
pub async fn run_doctor(config: &PepperConfig, plain: bool) -> Result<(), PepperError> {
    let use_color = !plain && std::io::stdout().is_terminal();

    let results = vec![
        check_config(config),
        check_database(config).await,
        check_recipe_index(config).await,
        check_embedding_model(config),
        check_ollama(config).await,
        check_telegram(config).await,
    ];

    println!();
    println!("  pepper doctor");
    println!("  {}", "-".repeat(50));
    for result in &results {
        println!("{}", render_line(result, use_color));
    }
    println!();
    println!("  {}", summary(&results));
    println!();

    Ok(())
}

fn render_line(result: &CheckResult, use_color: bool) -> String {
    let duration_ms = result.duration.as_millis();
    if use_color {
        use colored::Colorize;
        let (symbol, message) = match result.status {
            CheckStatus::Pass => ("✓".green(), result.message.normal()),
            CheckStatus::Warn => ("!".yellow(), result.message.yellow()),
            CheckStatus::Fail => ("✗".red(), result.message.red()),
        };
        format!(
            "    {symbol} {:<16} {message} ({duration_ms}ms)",
            result.name
        )
    } else {
        let tag = match result.status {
            CheckStatus::Pass => "[OK]  ",
            CheckStatus::Warn => "[WARN]",
            CheckStatus::Fail => "[FAIL]",
        };
        format!(
            "    {tag} {:<16} {} ({duration_ms}ms)",
            result.name, result.message
        )
    }
}

fn summary(results: &[CheckResult]) -> String {
    let issues = results
        .iter()
        .filter(|r| r.status != CheckStatus::Pass)
        .count();
    match issues {
        0 => "All checks passed.".to_string(),
        1 => "1 issue found.".to_string(),
        n => format!("{n} issues found."),
    }
}

fn check_config(config: &PepperConfig) -> CheckResult {
    let start = Instant::now();
    let translation = if config.translation_enabled() {
        format!(
            "{} -> {} translation",
            config.chat.user_language, config.retrieval.index_language
        )
    } else {
        "no translation".to_string()
    };
    CheckResult::new(
        "Configuration",
        CheckStatus::Pass,
        format!("valid, {translation}"),
        start,
    )
}

fn database_exists(path: &str) -> bool {
    path == ":memory:" || Path::new(path).exists()
}

async fn check_database(config: &PepperConfig) -> CheckResult {
    let start = Instant::now();
    let path = &config.storage.database_path;
    if !database_exists(path) {
        return CheckResult::new(
            "Database",
            CheckStatus::Warn,
            format!("not found: {path} (will be created on first run)"),
            start,
        );
    }

    match SqliteInventory::open(&config.storage).await {
        Ok(inventory) => {
            CheckResult::from_health("Database", inventory.health_check().await, "connected", start)
        }
        Err(e) => CheckResult::new("Database", CheckStatus::Fail, format!("open failed: {e}"), start),
    }
}

async fn check_recipe_index(config: &PepperConfig) -> CheckResult {
    let start = Instant::now();
    if !database_exists(&config.storage.database_path) {
        return CheckResult::new("Recipe index", CheckStatus::Warn, "no database yet", start);
    }

    let count = match SqliteInventory::open(&config.storage).await {
        Ok(inventory) => RecipeStore::new(inventory.database().clone()).count().await,
        Err(e) => Err(e),
    };
    match count {
        Ok(0) => CheckResult::new(
            "Recipe index",
            CheckStatus::Warn,
            "empty, run `pepper recipes import <CSV>`",
            start,
        ),
        Ok(n) => CheckResult::new("Recipe index", CheckStatus::Pass, format!("{n} recipes"), start),
        Err(e) => CheckResult::new("Recipe index", CheckStatus::Fail, e.to_string(), start),
    }
}

fn check_embedding_model(config: &PepperConfig) -> CheckResult {
    let start = Instant::now();
    let manager = ModelManager::new(
        config.retrieval.model_dir.clone(),
        config.retrieval.model_name.clone(),
    );
    if manager.is_model_available() {
        CheckResult::new(
            "Embedding model",
            CheckStatus::Pass,
            manager.model_dir().display().to_string(),
            start,
        )
    } else {
        CheckResult::new(
            "Embedding model",
            CheckStatus::Warn,
            format!("{} not downloaded yet (fetched on first use)", config.retrieval.model_name),
            start,
        )
    }
}

async fn check_ollama(config: &PepperConfig) -> CheckResult {
    let start = Instant::now();
    match OllamaProvider::new(&config.ollama) {
        Ok(provider) => CheckResult::from_health(
            "Ollama",
            provider.health_check().await,
            &format!("model {} available", config.ollama.model),
            start,
        ),
        Err(e) => CheckResult::new("Ollama", CheckStatus::Fail, e.to_string(), start),
    }
}

async fn check_telegram(config: &PepperConfig) -> CheckResult {
    let start = Instant::now();
    let Some(token) = config
        .telegram
        .bot_token
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
    else {
        return CheckResult::new(
            "Telegram",
            CheckStatus::Fail,
            "no bot token (set telegram.bot_token or PEPPER_TELEGRAM_BOT_TOKEN)",
            start,
        );
    };

    let bot = Bot::new(token);
    match tokio::time::timeout(TELEGRAM_TIMEOUT, bot.get_me().send()).await {
        Ok(Ok(me)) => {
            let username = me.username.clone().unwrap_or_default();
            CheckResult::new("Telegram", CheckStatus::Pass, format!("@{username}"), start)
        }
        Ok(Err(e)) => CheckResult::new("Telegram", CheckStatus::Fail, e.to_string(), start),
        Err(_) => CheckResult::new(
            "Telegram",
            CheckStatus::Fail,
            format!("timeout ({}s)", TELEGRAM_TIMEOUT.as_secs()),
            start,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(status: CheckStatus) -> CheckResult {
        CheckResult {
            name: "Database".to_string(),
            status,
            message: "connected".to_string(),
            duration: Duration::from_millis(3),
        }
    }

    #[test]
    fn plain_lines_carry_status_tags() {
        assert_eq!(
            render_line(&row(CheckStatus::Pass), false),
            "    [OK]   Database         connected (3ms)"
        );
        assert!(render_line(&row(CheckStatus::Fail), false).starts_with("    [FAIL] Database"));
    }

    #[test]
    fn summary_counts_warnings_and_failures() {
        assert_eq!(summary(&[row(CheckStatus::Pass)]), "All checks passed.");
        assert_eq!(
            summary(&[row(CheckStatus::Warn), row(CheckStatus::Pass)]),
            "1 issue found."
        );
        assert_eq!(
            summary(&[row(CheckStatus::Warn), row(CheckStatus::Fail)]),
            "2 issues found."
        );
    }

    #[test]
    fn health_maps_onto_status() {
        let start = Instant::now();
        let degraded = CheckResult::from_health(
            "Ollama",
            Ok(HealthStatus::Degraded("model missing".into())),
            "ok",
            start,
        );
        assert_eq!(degraded.status, CheckStatus::Warn);
        assert_eq!(degraded.message, "model missing");

        let failed = CheckResult::from_health(
            "Ollama",
            Err(PepperError::unavailable("ollama", "connection refused")),
            "ok",
            start,
        );
        assert_eq!(failed.status, CheckStatus::Fail);
    }

    #[tokio::test]
    async fn missing_database_is_a_warning() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = PepperConfig::default();
        config.storage.database_path = dir.path().join("absent.db").display().to_string();

        assert_eq!(check_database(&config).await.status, CheckStatus::Warn);
        assert_eq!(check_recipe_index(&config).await.status, CheckStatus::Warn);
        assert!(!dir.path().join("absent.db").exists());
    }

    #[tokio::test]
    async fn existing_database_passes_and_empty_index_warns() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = PepperConfig::default();
        config.storage.database_path = dir.path().join("pepper.db").display().to_string();
        SqliteInventory::open(&config.storage).await.unwrap();

        assert_eq!(check_database(&config).await.status, CheckStatus::Pass);
        let index = check_recipe_index(&config).await;
        assert_eq!(index.status, CheckStatus::Warn);
        assert!(index.message.contains("pepper recipes import"));
    }

    #[tokio::test]
    async fn missing_token_fails_without_network() {
        let config = PepperConfig::default();
        let result = check_telegram(&config).await;
        assert_eq!(result.status, CheckStatus::Fail);
        assert!(result.message.contains("PEPPER_TELEGRAM_BOT_TOKEN"));
    }

    #[test]
    fn missing_model_is_a_warning() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = PepperConfig::default();
        config.retrieval.model_dir = dir.path().display().to_string();
        assert_eq!(check_embedding_model(&config).status, CheckStatus::Warn);
    }
}
