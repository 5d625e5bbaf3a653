// SPDX-FileCopyrightText: 2026 Syndica Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Syndica sync engine.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Syndica configuration.
///
/// Loaded from TOML files following the XDG hierarchy, with environment
/// variable overrides. All sections are optional and default to sensible
/// values. The engine receives this struct at construction time; nothing
/// reads ambient global state.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SyndicaConfig {
    /// Engine identity and logging settings.
    #[serde(default)]
    pub engine: EngineConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Job cadences and worker pool settings.
    #[serde(default)]
    pub scheduler: SchedulerConfig,

    /// Per-platform provider adapter settings.
    #[serde(default)]
    pub providers: ProvidersConfig,
}

/// Engine identity and logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    /// Display name of this engine instance.
    #[serde(default = "default_engine_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Operator contact surfaced in remediation log lines.
    #[serde(default)]
    pub admin_email: Option<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            name: default_engine_name(),
            log_level: default_log_level(),
            admin_email: None,
        }
    }
}

fn default_engine_name() -> String {
    "syndica".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
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
        .map(|p| p.join("syndica").join("syndica.db"))
        .and_then(|p| p.to_str().map(String::from))
        .unwrap_or_else(|| "syndica.db".to_string())
}

fn default_wal_mode() -> bool {
    true
}

/// Job cadence and worker pool configuration.
///
/// Each named job runs on its own interval; within one invocation, work
/// units run concurrently up to `max_concurrent_units`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SchedulerConfig {
    /// Interval between token check passes, in seconds.
    #[serde(default = "default_token_check_interval")]
    pub token_check_interval_secs: u64,

    /// Interval between inbox message fetches, in seconds.
    #[serde(default = "default_message_fetch_interval")]
    pub message_fetch_interval_secs: u64,

    /// Interval between post-insight fetches, in seconds.
    #[serde(default = "default_post_insights_interval")]
    pub post_insights_interval_secs: u64,

    /// Interval between account-stat fetches, in seconds.
    #[serde(default = "default_account_insights_interval")]
    pub account_insights_interval_secs: u64,

    /// Upper bound on concurrently processed work units per job invocation.
    #[serde(default = "default_max_concurrent_units")]
    pub max_concurrent_units: usize,

    /// Average per-unit wall time above which a job logs a slow-job warning,
    /// in seconds.
    #[serde(default = "default_slow_unit_warn")]
    pub slow_unit_warn_secs: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            token_check_interval_secs: default_token_check_interval(),
            message_fetch_interval_secs: default_message_fetch_interval(),
            post_insights_interval_secs: default_post_insights_interval(),
            account_insights_interval_secs: default_account_insights_interval(),
            max_concurrent_units: default_max_concurrent_units(),
            slow_unit_warn_secs: default_slow_unit_warn(),
        }
    }
}

fn default_token_check_interval() -> u64 {
    3600
}

fn default_message_fetch_interval() -> u64 {
    300
}

fn default_post_insights_interval() -> u64 {
    3600
}

fn default_account_insights_interval() -> u64 {
    21600
}

fn default_max_concurrent_units() -> usize {
    4
}

fn default_slow_unit_warn() -> u64 {
    30
}

/// Container for per-platform provider settings.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ProvidersConfig {
    #[serde(default)]
    pub facebook: ProviderConfig,

    #[serde(default)]
    pub instagram: ProviderConfig,

    #[serde(default)]
    pub tiktok: ProviderConfig,
}

/// Settings for one provider adapter.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ProviderConfig {
    /// Whether this platform's adapter is registered at startup.
    #[serde(default)]
    pub enabled: bool,

    /// Override for the provider API base URL. `None` uses the adapter's
    /// built-in default; tests point this at a local mock server.
    #[serde(default)]
    pub api_base: Option<String>,

    /// Per-call HTTP timeout, in seconds. Calls exceeding it fail as
    /// provider-unavailable and are retried on the next scheduled pass.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Token lifetime assumed when the provider does not report an expiry
    /// on refresh. Provider-reported expiry always wins when present.
    #[serde(default = "default_fallback_token_ttl")]
    pub fallback_token_ttl_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            api_base: None,
            request_timeout_secs: default_request_timeout(),
            fallback_token_ttl_secs: default_fallback_token_ttl(),
        }
    }
}

fn default_request_timeout() -> u64 {
    10
}

fn default_fallback_token_ttl() -> u64 {
    7200
}
