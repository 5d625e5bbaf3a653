// SPDX-FileCopyrightText: 2026 Syndica Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Append-only metric snapshot recording.
//!
//! The recorder fetches current counters and appends one timestamped row
//! per call. It never reads history: trend computation belongs to the
//! external reporting layer.

use std::sync::Arc;

use tracing::debug;

use syndica_core::types::{ConnectedAccount, PostRef, TrackedPost};
use syndica_core::{format_utc, ProviderAdapter, Store, SyndicaError};

pub struct InsightRecorder {
    store: Arc<dyn Store>,
}

impl InsightRecorder {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Fetch and append one account-level snapshot. Counters the provider
    /// does not report are recorded as absent, never as zero.
    pub async fn record_account(
        &self,
        account: &ConnectedAccount,
        adapter: &dyn ProviderAdapter,
    ) -> Result<(), SyndicaError> {
        let stats = adapter.fetch_account_stats(&account.account_ref()).await?;
        let fetched_at = format_utc(chrono::Utc::now());
        self.store
            .append_account_snapshot(&account.id, account.provider, &stats, &fetched_at)
            .await?;
        debug!(account = %account.id, fetched_at, "account snapshot recorded");
        Ok(())
    }

    /// Fetch and append one post-level snapshot, using the owning
    /// account's credential.
    pub async fn record_post(
        &self,
        post: &TrackedPost,
        access_token: &str,
        adapter: &dyn ProviderAdapter,
    ) -> Result<(), SyndicaError> {
        let post_ref = PostRef {
            provider_post_id: post.provider_post_id.clone(),
            access_token: access_token.to_string(),
        };
        let stats = adapter.fetch_post_stats(&post_ref).await?;
        let fetched_at = format_utc(chrono::Utc::now());
        self.store
            .append_post_snapshot(&post.id, post.provider, &stats, &fetched_at)
            .await?;
        debug!(post = %post.id, fetched_at, "post snapshot recorded");
        Ok(())
    }
}
