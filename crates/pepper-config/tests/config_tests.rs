// SPDX-FileCopyrightText: 2026 Pepper Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for configuration loading and diagnostics.

use figment::Jail;
use pepper_config::diagnostic::ConfigError;
use pepper_config::{load_and_validate_path, load_and_validate_str, load_config_from_str};

#[test]
fn full_toml_deserializes() {
    let toml = r#"
[bot]
log_level = "debug"

[telegram]
bot_token = "123:ABC"

[ollama]
base_url = "http://ollama:11434"
model = "llama3"
timeout_secs = 60
max_retries = 2

[retrieval]
model_name = "all-MiniLM-L6-v2"
model_dir = "/var/lib/pepper/models"
top_k = 5
index_language = "English"
import_path = "/data/recipes.csv"

[retrieval.columns]
name = "title"
instructions = "directions"

[storage]
database_path = "/tmp/pepper.db"
wal_mode = false

[chat]
user_language = "Russian"
flush_threshold = 80
history_limit = 20
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.bot.log_level, "debug");
    assert_eq!(config.telegram.bot_token.as_deref(), Some("123:ABC"));
    assert_eq!(config.ollama.model, "llama3");
    assert_eq!(config.ollama.max_retries, 2);
    assert_eq!(config.retrieval.top_k, 5);
    assert_eq!(config.retrieval.columns.name, "title");
    assert_eq!(config.retrieval.columns.id, "RecipeId");
    assert_eq!(config.storage.database_path, "/tmp/pepper.db");
    assert!(!config.storage.wal_mode);
    assert_eq!(config.chat.flush_threshold, 80);
    assert_eq!(config.chat.history_limit, Some(20));
    assert!(config.translation_enabled());
}

#[test]
fn empty_toml_uses_defaults() {
    let config = load_config_from_str("").expect("empty config is valid");
    assert_eq!(config.ollama.base_url, "http://localhost:11434");
    assert_eq!(config.ollama.model, "gemma2");
    assert_eq!(config.retrieval.top_k, 3);
    assert_eq!(config.chat.flush_threshold, 50);
    assert_eq!(config.chat.user_language, "Russian");
    assert!(config.telegram.bot_token.is_none());
    assert!(config.storage.database_path.ends_with("pepper.db"));
}

#[test]
fn same_language_disables_translation() {
    let config = load_config_from_str(
        r#"
[retrieval]
index_language = "english"
[chat]
user_language = "English"
"#,
    )
    .expect("valid");
    assert!(!config.translation_enabled());
}

#[test]
fn unknown_key_gets_suggestion_and_span() {
    let toml = "[ollama]\nmodle = \"gemma2\"\n";
    let errors = load_and_validate_str(toml).expect_err("unknown key must fail");
    match &errors[0] {
        ConfigError::UnknownKey {
            key,
            suggestion,
            valid_keys,
            span,
            ..
        } => {
            assert_eq!(key, "modle");
            assert_eq!(suggestion.as_deref(), Some("model"));
            assert!(valid_keys.contains("base_url"));
            let span = span.as_ref().expect("inline source should be located");
            assert_eq!(span.offset(), toml.find("modle").expect("present"));
        }
        other => panic!("expected UnknownKey, got {other:?}"),
    }
}

#[test]
fn unknown_section_is_rejected() {
    let errors = load_and_validate_str("[anthropic]\napi_key = \"x\"\n").expect_err("must fail");
    assert!(matches!(&errors[0], ConfigError::UnknownKey { key, .. } if key == "anthropic"));
}

#[test]
fn wrong_type_is_reported() {
    let errors = load_and_validate_str("[retrieval]\ntop_k = \"three\"\n").expect_err("must fail");
    assert!(matches!(&errors[0], ConfigError::InvalidType { key, .. } if key == "retrieval.top_k"));
}

#[test]
fn validation_runs_after_parsing() {
    let errors = load_and_validate_str("[chat]\nflush_threshold = 0\n").expect_err("must fail");
    assert!(matches!(&errors[0], ConfigError::Validation { .. }));
}

#[test]
fn env_overrides_file_values() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "custom.toml",
            "[ollama]\nmodel = \"from-file\"\n[chat]\nflush_threshold = 10\n",
        )?;
        jail.set_env("PEPPER_OLLAMA_MODEL", "from-env");
        jail.set_env("PEPPER_TELEGRAM_BOT_TOKEN", "42:XYZ");
        jail.set_env("PEPPER_RETRIEVAL_TOP_K", "7");

        let config = load_and_validate_path(std::path::Path::new("custom.toml"))
            .map_err(|e| format!("{e:?}"))?;
        assert_eq!(config.ollama.model, "from-env");
        assert_eq!(config.telegram.bot_token.as_deref(), Some("42:XYZ"));
        assert_eq!(config.retrieval.top_k, 7);
        assert_eq!(config.chat.flush_threshold, 10);
        Ok(())
    });
}

#[test]
fn rendered_toml_masks_token() {
    let config = load_config_from_str("[telegram]\nbot_token = \"secret\"\n").expect("valid");
    let rendered = pepper_config::render_toml(&config).expect("serializes");
    assert!(!rendered.contains("secret"));
    assert!(rendered.contains("***"));
    assert!(rendered.contains("[ollama]"));
}
