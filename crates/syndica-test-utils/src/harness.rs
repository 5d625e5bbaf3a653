// SPDX-FileCopyrightText: 2026 Syndica Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness assembling a temp SQLite store with seed helpers.
//!
//! The harness owns the temp directory for the database file, an
//! initialized [`SqliteStore`] for code under test, and a direct
//! [`Database`] handle for seeding rows that are externally managed in
//! production (accounts, rules, tracked posts).

use std::sync::Arc;

use syndica_config::model::StorageConfig;
use syndica_core::types::{
    AccountStatus, AutoReplyRule, ConnectedAccount, InboxMessage, MessageKind, MessageStatus,
    Provider, TrackedPost,
};
use syndica_core::{Store, SyndicaError};
use syndica_storage::database::Database;
use syndica_storage::{queries, SqliteStore};

pub struct TestHarness {
    store: Arc<SqliteStore>,
    db: Database,
    _temp_dir: tempfile::TempDir,
}

impl TestHarness {
    /// Create a fresh harness with an empty, migrated database.
    pub async fn new() -> Result<Self, SyndicaError> {
        let temp_dir = tempfile::TempDir::new()
            .map_err(|e| SyndicaError::Storage { source: e.into() })?;
        let db_path = temp_dir.path().join("syndica-test.db");
        let db_path_str = db_path.to_string_lossy().to_string();

        let store = SqliteStore::new(StorageConfig {
            database_path: db_path_str.clone(),
            wal_mode: true,
        });
        store.initialize().await?;

        // Second connection to the same WAL file, used for seeding and
        // direct assertions.
        let db = Database::open(&db_path_str).await?;

        Ok(Self {
            store: Arc::new(store),
            db,
            _temp_dir: temp_dir,
        })
    }

    pub fn store(&self) -> Arc<SqliteStore> {
        Arc::clone(&self.store)
    }

    pub fn store_dyn(&self) -> Arc<dyn Store> {
        self.store()
    }

    pub fn db(&self) -> &Database {
        &self.db
    }

    // --- Seed helpers for externally managed rows ---

    pub async fn seed_account(&self, account: &ConnectedAccount) -> Result<(), SyndicaError> {
        queries::accounts::insert_account(&self.db, account).await
    }

    pub async fn seed_rule(&self, rule: &AutoReplyRule) -> Result<(), SyndicaError> {
        queries::rules::insert_rule(&self.db, rule).await
    }

    pub async fn seed_post(&self, post: &TrackedPost) -> Result<(), SyndicaError> {
        queries::posts::insert_tracked_post(&self.db, post).await
    }

    // --- Row builders with plausible defaults ---

    pub fn account(id: &str, provider: Provider) -> ConnectedAccount {
        ConnectedAccount {
            id: id.to_string(),
            tenant_id: "tenant-1".to_string(),
            provider,
            provider_account_id: format!("{provider}-{id}"),
            access_token: format!("tok-{id}"),
            refresh_token: Some(format!("refresh-{id}")),
            token_expires_at: None,
            status: AccountStatus::Active,
        }
    }

    pub fn rule(id: &str, provider: Provider, keyword: &str, position: i64) -> AutoReplyRule {
        AutoReplyRule {
            id: id.to_string(),
            tenant_id: "tenant-1".to_string(),
            provider,
            trigger_keyword: keyword.to_string(),
            response_text: format!("auto-reply for {keyword}"),
            position,
        }
    }

    pub fn post(id: &str, provider: Provider, account_id: &str) -> TrackedPost {
        TrackedPost {
            id: id.to_string(),
            tenant_id: "tenant-1".to_string(),
            provider,
            provider_post_id: format!("{provider}-post-{id}"),
            account_id: account_id.to_string(),
        }
    }

    pub fn message(id: &str, provider: Provider, provider_message_id: &str) -> InboxMessage {
        InboxMessage {
            id: id.to_string(),
            tenant_id: "tenant-1".to_string(),
            provider,
            provider_message_id: provider_message_id.to_string(),
            sender_name: "seeded sender".to_string(),
            body: "seeded body".to_string(),
            kind: MessageKind::Message,
            status: MessageStatus::New,
            is_automated: false,
            received_at: syndica_storage::now_utc(),
        }
    }
}
