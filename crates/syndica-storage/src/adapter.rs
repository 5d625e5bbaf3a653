// SPDX-FileCopyrightText: 2026 Syndica Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the Store trait.

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::debug;

use syndica_config::model::StorageConfig;
use syndica_core::types::{
    AccountStatus, AutoReplyRule, ConnectedAccount, InboxMessage, Provider, RawAccountStats,
    RawPostStats, TrackedPost,
};
use syndica_core::{AdapterKind, HealthStatus, PlatformAdapter, Store, SyndicaError};

use crate::database::Database;
use crate::queries;

/// SQLite-backed store.
///
/// Wraps a [`Database`] handle and delegates all query operations to the
/// typed query modules. The database is lazily initialized on the first
/// call to [`Store::initialize`].
pub struct SqliteStore {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteStore {
    /// Create a new SqliteStore with the given configuration.
    ///
    /// The database connection is not opened until [`initialize`] is called.
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    /// Returns a reference to the underlying Database, or an error if not initialized.
    fn db(&self) -> Result<&Database, SyndicaError> {
        self.db.get().ok_or_else(|| SyndicaError::Storage {
            source: "storage not initialized -- call initialize() first".into(),
        })
    }
}

#[async_trait]
impl PlatformAdapter for SqliteStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_kind(&self) -> AdapterKind {
        AdapterKind::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, SyndicaError> {
        let db = self.db()?;
        db.connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("SELECT 1;")?;
                Ok(())
            })
            .await
            .map_err(crate::database::map_tr_err)?;
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), SyndicaError> {
        // Shutdown delegates to close if the DB was initialized.
        if let Some(db) = self.db.get() {
            db.close().await?;
            debug!("shutdown: WAL checkpoint complete");
        }
        Ok(())
    }
}

#[async_trait]
impl Store for SqliteStore {
    async fn initialize(&self) -> Result<(), SyndicaError> {
        let db =
            Database::open_with_options(&self.config.database_path, self.config.wal_mode).await?;
        self.db.set(db).map_err(|_| SyndicaError::Storage {
            source: "storage already initialized".into(),
        })?;
        debug!(path = %self.config.database_path, "SQLite store initialized");
        Ok(())
    }

    async fn close(&self) -> Result<(), SyndicaError> {
        self.db()?.close().await
    }

    async fn list_active_accounts(&self) -> Result<Vec<ConnectedAccount>, SyndicaError> {
        queries::accounts::list_active_accounts(self.db()?).await
    }

    async fn get_account(&self, id: &str) -> Result<Option<ConnectedAccount>, SyndicaError> {
        queries::accounts::get_account(self.db()?, id).await
    }

    async fn update_account_token(
        &self,
        id: &str,
        access_token: &str,
        expires_at: &str,
    ) -> Result<(), SyndicaError> {
        queries::accounts::update_account_token(self.db()?, id, access_token, expires_at).await
    }

    async fn set_account_status(
        &self,
        id: &str,
        status: AccountStatus,
    ) -> Result<(), SyndicaError> {
        queries::accounts::set_account_status(self.db()?, id, status).await
    }

    async fn insert_message_if_absent(
        &self,
        message: &InboxMessage,
    ) -> Result<bool, SyndicaError> {
        queries::messages::insert_message_if_absent(self.db()?, message).await
    }

    async fn get_message(&self, id: &str) -> Result<Option<InboxMessage>, SyndicaError> {
        queries::messages::get_message(self.db()?, id).await
    }

    async fn mark_message_replied(&self, id: &str) -> Result<(), SyndicaError> {
        queries::messages::mark_message_replied(self.db()?, id).await
    }

    async fn rules_for(
        &self,
        tenant_id: &str,
        provider: Provider,
    ) -> Result<Vec<AutoReplyRule>, SyndicaError> {
        queries::rules::rules_for(self.db()?, tenant_id, provider).await
    }

    async fn list_tracked_posts(&self) -> Result<Vec<TrackedPost>, SyndicaError> {
        queries::posts::list_tracked_posts(self.db()?).await
    }

    async fn append_account_snapshot(
        &self,
        account_id: &str,
        provider: Provider,
        stats: &RawAccountStats,
        fetched_at: &str,
    ) -> Result<(), SyndicaError> {
        queries::snapshots::append_account_snapshot(self.db()?, account_id, provider, stats, fetched_at)
            .await
    }

    async fn append_post_snapshot(
        &self,
        post_id: &str,
        provider: Provider,
        stats: &RawPostStats,
        fetched_at: &str,
    ) -> Result<(), SyndicaError> {
        queries::snapshots::append_post_snapshot(self.db()?, post_id, provider, stats, fetched_at)
            .await
    }
}
