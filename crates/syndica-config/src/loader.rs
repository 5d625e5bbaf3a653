// SPDX-FileCopyrightText: 2026 Syndica Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./syndica.toml` > `~/.config/syndica/syndica.toml` > `/etc/syndica/syndica.toml`
//! with environment variable overrides via `SYNDICA_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::SyndicaConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/syndica/syndica.toml` (system-wide)
/// 3. `~/.config/syndica/syndica.toml` (user XDG config)
/// 4. `./syndica.toml` (local directory)
/// 5. `SYNDICA_*` environment variables
pub fn load_config() -> Result<SyndicaConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup).
///
/// Used for testing and explicit config specification.
pub fn load_config_from_str(toml_content: &str) -> Result<SyndicaConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(SyndicaConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<SyndicaConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(SyndicaConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used internally for config loading (exposed for diagnostic use).
///
/// Returns the Figment before extraction so callers can inspect metadata.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(SyndicaConfig::default()))
        .merge(Toml::file("/etc/syndica/syndica.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("syndica/syndica.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("syndica.toml"))
        .merge(env_provider())
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` NOT `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names: `SYNDICA_STORAGE_DATABASE_PATH` must map
/// to `storage.database_path`, not `storage.database.path`. Provider
/// sections are nested one level deeper, so `SYNDICA_PROVIDERS_FACEBOOK_API_BASE`
/// maps to `providers.facebook.api_base`.
fn env_provider() -> Env {
    Env::prefixed("SYNDICA_").map(|key| {
        // `key` is the lowercased env var name with prefix stripped.
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("engine_", "engine.", 1)
            .replacen("storage_", "storage.", 1)
            .replacen("scheduler_", "scheduler.", 1)
            .replacen("providers_facebook_", "providers.facebook.", 1)
            .replacen("providers_instagram_", "providers.instagram.", 1)
            .replacen("providers_tiktok_", "providers.tiktok.", 1);
        mapped.into()
    })
}
