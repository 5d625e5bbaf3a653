// SPDX-FileCopyrightText: 2026 Syndica Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `syndica serve` command implementation.
//!
//! Wires together SQLite storage, the enabled provider adapters, and the
//! job scheduler, then runs until SIGINT/SIGTERM. Also hosts `syndica run`,
//! which drives one job invocation through the same wiring and exits.

use std::str::FromStr;
use std::sync::Arc;

use tracing::{info, warn};

use syndica_config::model::SyndicaConfig;
use syndica_core::{PlatformAdapter, Store, SyndicaError};
use syndica_engine::ProviderRegistry;
use syndica_providers::{FacebookAdapter, InstagramAdapter, TiktokAdapter};
use syndica_scheduler::{JobName, Scheduler};
use syndica_storage::SqliteStore;

use crate::shutdown;

fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("syndica={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}

async fn build_store(config: &SyndicaConfig) -> Result<Arc<SqliteStore>, SyndicaError> {
    let store = SqliteStore::new(config.storage.clone());
    store.initialize().await?;
    Ok(Arc::new(store))
}

/// Build the adapter registry from the enabled providers in config.
fn build_registry(config: &SyndicaConfig) -> Result<ProviderRegistry, SyndicaError> {
    let mut registry = ProviderRegistry::new();
    if config.providers.facebook.enabled {
        registry.register(Arc::new(FacebookAdapter::new(&config.providers.facebook)?));
    }
    if config.providers.instagram.enabled {
        registry.register(Arc::new(InstagramAdapter::new(&config.providers.instagram)?));
    }
    if config.providers.tiktok.enabled {
        registry.register(Arc::new(TiktokAdapter::new(&config.providers.tiktok)?));
    }
    Ok(registry)
}

/// Runs the `syndica serve` command.
pub async fn run_serve(config: SyndicaConfig) -> Result<(), SyndicaError> {
    init_tracing(&config.engine.log_level);
    info!(engine = %config.engine.name, "starting syndica serve");

    let store = build_store(&config).await?;
    let registry = build_registry(&config)?;
    if registry.is_empty() {
        warn!("no providers enabled; jobs will have no work units");
    } else {
        info!(providers = ?registry.providers(), "provider registry initialized");
    }

    let cancel = shutdown::install_signal_handler();
    let store_dyn: Arc<dyn Store> = store.clone();
    let scheduler = Scheduler::new(&config, store_dyn, Arc::new(registry), cancel.clone());

    scheduler.run().await;

    store.shutdown().await?;
    info!("syndica stopped");
    Ok(())
}

/// Runs the `syndica run <job>` command: one invocation, then exit.
pub async fn run_once(config: SyndicaConfig, job: &str) -> Result<(), SyndicaError> {
    init_tracing(&config.engine.log_level);

    let job = JobName::from_str(job).map_err(|_| {
        SyndicaError::Config(format!(
            "unknown job '{job}' (expected one of: token-check, message-fetch, \
             post-insights, account-insights)"
        ))
    })?;

    let store = build_store(&config).await?;
    let registry = build_registry(&config)?;
    let store_dyn: Arc<dyn Store> = store.clone();
    let scheduler = Scheduler::new(
        &config,
        store_dyn,
        Arc::new(registry),
        tokio_util::sync::CancellationToken::new(),
    );

    let report = scheduler.run_job(job).await?;
    println!(
        "{}: {} (succeeded={} failed={} cancelled={})",
        report.job, report.outcome, report.succeeded, report.failed, report.cancelled
    );

    store.shutdown().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_db(dir: &tempfile::TempDir) -> SyndicaConfig {
        let mut config = SyndicaConfig::default();
        config.storage.database_path = dir
            .path()
            .join("syndica.db")
            .to_string_lossy()
            .into_owned();
        config
    }

    #[test]
    fn registry_tracks_enabled_providers_only() {
        let mut config = SyndicaConfig::default();
        config.providers.facebook.enabled = true;
        config.providers.instagram.enabled = false;
        config.providers.tiktok.enabled = false;

        let registry = build_registry(&config).unwrap();
        assert_eq!(
            registry.providers(),
            vec![syndica_core::types::Provider::Facebook]
        );
    }

    #[test]
    fn empty_registry_when_nothing_is_enabled() {
        let mut config = SyndicaConfig::default();
        config.providers.facebook.enabled = false;
        config.providers.instagram.enabled = false;
        config.providers.tiktok.enabled = false;

        assert!(build_registry(&config).unwrap().is_empty());
    }

    #[tokio::test]
    async fn store_initializes_against_a_fresh_database() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_with_db(&dir);

        let store = build_store(&config).await.unwrap();
        assert!(store.list_active_accounts().await.unwrap().is_empty());
        store.shutdown().await.unwrap();
    }
}
