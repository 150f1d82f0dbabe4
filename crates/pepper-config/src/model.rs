// SPDX-FileCopyrightText: 2026 Pepper Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs.
//!
//! All structs use `#[serde(deny_unknown_fields)]` so a misspelled key is
//! reported at startup instead of silently ignored.

use serde::{Deserialize, Serialize};

/// Top-level Pepper configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PepperConfig {
    /// Process-wide settings.
    #[serde(default)]
    pub bot: BotConfig,

    /// Telegram bot integration settings.
    #[serde(default)]
    pub telegram: TelegramConfig,

    /// Ollama language model server settings.
    #[serde(default)]
    pub ollama: OllamaConfig,

    /// Recipe retrieval index settings.
    #[serde(default)]
    pub retrieval: RetrievalConfig,

    /// SQLite storage settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Answer generation settings.
    #[serde(default)]
    pub chat: ChatConfig,
}

impl PepperConfig {
    /// Whether queries and retrieved recipes go through a translation pass.
    pub fn translation_enabled(&self) -> bool {
        self.retrieval.index_language.trim().to_lowercase()
            != self.chat.user_language.trim().to_lowercase()
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BotConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TelegramConfig {
    /// Telegram Bot API token. Required by `pepper serve`.
    #[serde(default)]
    pub bot_token: Option<String>,
}

/// Ollama server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct OllamaConfig {
    /// Base URL of the Ollama HTTP API.
    #[serde(default = "default_ollama_url")]
    pub base_url: String,

    /// Model used for answers and translations.
    #[serde(default = "default_ollama_model")]
    pub model: String,

    /// Whole-request timeout, covering the full streamed answer.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Retries after a transient HTTP status.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: default_ollama_url(),
            model: default_ollama_model(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
        }
    }
}

fn default_ollama_url() -> String {
    "http://localhost:11434".to_string()
}

fn default_ollama_model() -> String {
    "gemma2".to_string()
}

fn default_timeout_secs() -> u64 {
    300
}

fn default_max_retries() -> u32 {
    1
}

/// Recipe retrieval configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RetrievalConfig {
    /// Sentence embedding model name.
    #[serde(default = "default_model_name")]
    pub model_name: String,

    /// Directory holding downloaded embedding models.
    #[serde(default = "default_model_dir")]
    pub model_dir: String,

    /// Number of recipes fetched per question.
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Language the recipe corpus is written in.
    #[serde(default = "default_index_language")]
    pub index_language: String,

    /// CSV file loaded into the index at startup when the index is empty.
    #[serde(default)]
    pub import_path: Option<String>,

    /// Column names of the recipe CSV.
    #[serde(default)]
    pub columns: RecipeColumns,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            model_name: default_model_name(),
            model_dir: default_model_dir(),
            top_k: default_top_k(),
            index_language: default_index_language(),
            import_path: None,
            columns: RecipeColumns::default(),
        }
    }
}

fn default_model_name() -> String {
    "all-MiniLM-L6-v2".to_string()
}

fn default_model_dir() -> String {
    dirs::data_dir()
        .map(|p| p.join("pepper").join("models"))
        .unwrap_or_else(|| std::path::PathBuf::from("models"))
        .to_string_lossy()
        .into_owned()
}

fn default_top_k() -> usize {
    3
}

fn default_index_language() -> String {
    "English".to_string()
}

/// Recipe CSV column mapping. Defaults match the food.com recipe dump.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RecipeColumns {
    #[serde(default = "default_id_column")]
    pub id: String,
    #[serde(default = "default_name_column")]
    pub name: String,
    #[serde(default = "default_ingredients_column")]
    pub ingredients: String,
    #[serde(default = "default_instructions_column")]
    pub instructions: String,
}

impl Default for RecipeColumns {
    fn default() -> Self {
        Self {
            id: default_id_column(),
            name: default_name_column(),
            ingredients: default_ingredients_column(),
            instructions: default_instructions_column(),
        }
    }
}

fn default_id_column() -> String {
    "RecipeId".to_string()
}

fn default_name_column() -> String {
    "Name".to_string()
}

fn default_ingredients_column() -> String {
    "RecipeIngredientParts".to_string()
}

fn default_instructions_column() -> String {
    "RecipeInstructions".to_string()
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("pepper").join("pepper.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("pepper.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_wal_mode() -> bool {
    true
}

/// Answer generation configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ChatConfig {
    /// Language the assistant answers in.
    #[serde(default = "default_user_language")]
    pub user_language: String,

    /// Characters accumulated between live preview edits.
    #[serde(default = "default_flush_threshold")]
    pub flush_threshold: usize,

    /// Most recent conversation entries passed to the model. `None` sends all.
    #[serde(default)]
    pub history_limit: Option<usize>,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            user_language: default_user_language(),
            flush_threshold: default_flush_threshold(),
            history_limit: None,
        }
    }
}

fn default_user_language() -> String {
    "Russian".to_string()
}

fn default_flush_threshold() -> usize {
    50
}
