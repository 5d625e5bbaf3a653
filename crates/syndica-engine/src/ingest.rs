// SPDX-FileCopyrightText: 2026 Syndica Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ingestion pipeline: canonicalize, deduplicate, store, and hand newly
//! inserted messages to the auto-reply matcher.
//!
//! Idempotence rests entirely on the store's insert-if-absent keyed on
//! (provider, provider message id); the pipeline never reads before
//! writing. Failures are isolated per message: one bad item never aborts
//! the rest of the batch.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::StreamExt;
use tracing::{info, warn};

use syndica_core::types::{ConnectedAccount, InboxMessage, MessageStatus, RawMessage};
use syndica_core::{format_utc, ProviderAdapter, Store, SyndicaError};

use crate::autoreply::AutoReplyMatcher;

/// Counters for one ingestion run over one account.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct IngestReport {
    /// Items yielded by the adapter, including ones that later failed.
    pub fetched: u64,
    /// Genuinely new messages inserted.
    pub inserted: u64,
    /// Items already present, skipped as no-ops.
    pub duplicates: u64,
    /// New messages answered by the auto-reply matcher.
    pub replied: u64,
    /// Items that failed (fetch, insert, or reply dispatch).
    pub failed: u64,
}

impl IngestReport {
    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }
}

/// Pulls inbound items for one account and persists them canonically.
pub struct IngestionPipeline {
    store: Arc<dyn Store>,
    matcher: AutoReplyMatcher,
}

impl IngestionPipeline {
    pub fn new(store: Arc<dyn Store>, matcher: AutoReplyMatcher) -> Self {
        Self { store, matcher }
    }

    /// Fetch and ingest one account's inbound items.
    ///
    /// The stream is drained in adapter order. Each item is mapped to a
    /// canonical [`InboxMessage`], inserted if absent, and — only when the
    /// insert created a new row — offered to the auto-reply matcher.
    pub async fn sync_account(
        &self,
        account: &ConnectedAccount,
        adapter: &dyn ProviderAdapter,
        since: Option<DateTime<Utc>>,
    ) -> Result<IngestReport, SyndicaError> {
        let mut stream = adapter
            .fetch_messages(&account.account_ref(), since)
            .await?;

        let mut report = IngestReport::default();
        while let Some(item) = stream.next().await {
            report.fetched += 1;
            let raw = match item {
                Ok(raw) => raw,
                Err(e) => {
                    warn!(account = %account.id, error = %e, "skipping undecodable inbound item");
                    report.failed += 1;
                    continue;
                }
            };
            self.ingest_one(account, adapter, raw, &mut report).await;
        }

        info!(
            account = %account.id,
            provider = %account.provider,
            fetched = report.fetched,
            inserted = report.inserted,
            duplicates = report.duplicates,
            replied = report.replied,
            failed = report.failed,
            "ingestion pass complete"
        );
        Ok(report)
    }

    async fn ingest_one(
        &self,
        account: &ConnectedAccount,
        adapter: &dyn ProviderAdapter,
        raw: RawMessage,
        report: &mut IngestReport,
    ) {
        let message = canonicalize(account, raw);

        let inserted = match self.store.insert_message_if_absent(&message).await {
            Ok(inserted) => inserted,
            Err(e) => {
                warn!(
                    account = %account.id,
                    provider_message_id = %message.provider_message_id,
                    error = %e,
                    "failed to store inbound message"
                );
                report.failed += 1;
                return;
            }
        };
        if !inserted {
            report.duplicates += 1;
            return;
        }
        report.inserted += 1;

        match self.matcher.evaluate(account, adapter, &message).await {
            Ok(true) => report.replied += 1,
            Ok(false) => {}
            Err(e) => {
                // The message is stored; only the reply dispatch failed.
                warn!(message = %message.id, error = %e, "auto-reply dispatch failed");
                report.failed += 1;
            }
        }
    }
}

fn canonicalize(account: &ConnectedAccount, raw: RawMessage) -> InboxMessage {
    InboxMessage {
        id: uuid::Uuid::new_v4().to_string(),
        tenant_id: account.tenant_id.clone(),
        provider: account.provider,
        provider_message_id: raw.provider_message_id,
        sender_name: raw.sender_name,
        body: raw.body,
        kind: raw.kind,
        status: MessageStatus::New,
        is_automated: false,
        received_at: format_utc(raw.received_at),
    }
}
