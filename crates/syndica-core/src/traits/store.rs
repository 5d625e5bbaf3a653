// SPDX-FileCopyrightText: 2026 Syndica Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Store trait for persistence backends (SQLite, etc.).

use async_trait::async_trait;

use crate::error::SyndicaError;
use crate::traits::adapter::PlatformAdapter;
use crate::types::{
    AccountStatus, AutoReplyRule, ConnectedAccount, InboxMessage, Provider, RawAccountStats,
    RawPostStats, TrackedPost,
};

/// Persistence operations the engine and scheduler depend on.
///
/// Write scopes are deliberately narrow: account token/status fields are
/// written only by the token lifecycle manager, message status transitions
/// only by the auto-reply matcher, and snapshots are append-only.
#[async_trait]
pub trait Store: PlatformAdapter {
    /// Initializes the storage backend (migrations, connections).
    async fn initialize(&self) -> Result<(), SyndicaError>;

    /// Closes the storage backend, flushing pending writes.
    async fn close(&self) -> Result<(), SyndicaError>;

    // --- Connected accounts (identity read; token/status write) ---

    /// All accounts in status `active`, the enumeration for sync jobs.
    async fn list_active_accounts(&self) -> Result<Vec<ConnectedAccount>, SyndicaError>;

    async fn get_account(&self, id: &str) -> Result<Option<ConnectedAccount>, SyndicaError>;

    /// Atomically replaces an account's token and expiry after a refresh,
    /// keeping status `active`.
    async fn update_account_token(
        &self,
        id: &str,
        access_token: &str,
        expires_at: &str,
    ) -> Result<(), SyndicaError>;

    /// Marks an account's lifecycle status (e.g. `error` after a failed
    /// refresh, for operator remediation).
    async fn set_account_status(
        &self,
        id: &str,
        status: AccountStatus,
    ) -> Result<(), SyndicaError>;

    // --- Inbox messages (create + matcher-owned status transition) ---

    /// Inserts a message unless one already exists for the same
    /// (provider, provider_message_id). Returns `true` only for a genuinely
    /// new insert; a duplicate is a successful no-op.
    async fn insert_message_if_absent(
        &self,
        message: &InboxMessage,
    ) -> Result<bool, SyndicaError>;

    async fn get_message(&self, id: &str) -> Result<Option<InboxMessage>, SyndicaError>;

    /// Transitions a message to `replied` with `is_automated = true`.
    async fn mark_message_replied(&self, id: &str) -> Result<(), SyndicaError>;

    // --- Auto-reply rules (read-only) ---

    /// Rules for one tenant and provider, in stored evaluation order.
    async fn rules_for(
        &self,
        tenant_id: &str,
        provider: Provider,
    ) -> Result<Vec<AutoReplyRule>, SyndicaError>;

    // --- Tracked posts (read-only) ---

    async fn list_tracked_posts(&self) -> Result<Vec<TrackedPost>, SyndicaError>;

    // --- Metric snapshots (append-only) ---

    async fn append_account_snapshot(
        &self,
        account_id: &str,
        provider: Provider,
        stats: &RawAccountStats,
        fetched_at: &str,
    ) -> Result<(), SyndicaError>;

    async fn append_post_snapshot(
        &self,
        post_id: &str,
        provider: Provider,
        stats: &RawPostStats,
        fetched_at: &str,
    ) -> Result<(), SyndicaError>;
}
