// SPDX-FileCopyrightText: 2026 Pepper Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Layered configuration loading with Figment.
//!
//! Lookup order: `/etc/pepper/pepper.toml`, `~/.config/pepper/pepper.toml`,
//! `./pepper.toml`, then `PEPPER_*` environment variables.

#![allow(clippy::result_large_err)] // figment::Error is external

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::PepperConfig;

/// Name of the config file searched in every location.
pub const CONFIG_FILE: &str = "pepper.toml";

/// Every config file location, lowest priority first.
pub fn config_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from("/etc/pepper").join(CONFIG_FILE)];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("pepper").join(CONFIG_FILE));
    }
    paths.push(PathBuf::from(CONFIG_FILE));
    paths
}

/// Builds the full layered Figment without extracting it.
pub fn build_figment() -> Figment {
    let mut figment = Figment::new().merge(Serialized::defaults(PepperConfig::default()));
    for path in config_paths() {
        figment = figment.merge(Toml::file(path));
    }
    figment.merge(env_provider())
}

/// Loads configuration from the standard locations with env overrides.
pub fn load_config() -> Result<PepperConfig, figment::Error> {
    build_figment().extract()
}

/// Loads configuration from an explicit file with env overrides.
pub fn load_config_from_path(path: &Path) -> Result<PepperConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(PepperConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Loads configuration from a TOML string only.
pub fn load_config_from_str(toml_content: &str) -> Result<PepperConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(PepperConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Environment provider mapping `PEPPER_<SECTION>_<KEY>` to `section.key`.
///
/// Uses `map` rather than `split("_")` because keys themselves contain
/// underscores (`PEPPER_TELEGRAM_BOT_TOKEN` is `telegram.bot_token`).
pub(crate) fn env_provider() -> Env {
    Env::prefixed("PEPPER_").map(|key| {
        let key = key.as_str().to_ascii_lowercase();
        for section in ["bot", "telegram", "ollama", "retrieval", "storage", "chat"] {
            if let Some(rest) = key
                .strip_prefix(section)
                .and_then(|r| r.strip_prefix('_'))
            {
                return format!("{section}.{rest}").into();
            }
        }
        key.into()
    })
}
