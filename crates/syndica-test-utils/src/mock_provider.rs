// SPDX-FileCopyrightText: 2026 Syndica Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Scriptable mock provider adapter for deterministic testing.
//!
//! `MockProvider` implements `ProviderAdapter` with pre-scripted outcomes,
//! popped FIFO per operation. When a script queue is empty, a benign
//! default is returned (valid token, empty message batch, empty stats,
//! successful reply). Dispatched replies are captured for assertions.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::stream;
use tokio::sync::Mutex;

use syndica_core::types::{
    AccountRef, AdapterKind, HealthStatus, PostRef, Provider, RawAccountStats, RawMessage,
    RawPostStats, ReplyTarget, TokenRefresh,
};
use syndica_core::{MessageStream, PlatformAdapter, ProviderAdapter, SyndicaError};

/// Failure kinds a script can inject, mapped onto the engine error
/// taxonomy when popped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockFailure {
    Auth,
    Unavailable,
    NotFound,
    Timeout,
}

impl MockFailure {
    fn into_error(self, provider: Provider) -> SyndicaError {
        match self {
            MockFailure::Auth => SyndicaError::Auth {
                provider,
                message: "scripted auth failure".into(),
            },
            MockFailure::Unavailable => SyndicaError::ProviderUnavailable {
                provider,
                message: "scripted outage".into(),
                source: None,
            },
            MockFailure::NotFound => SyndicaError::NotFound {
                provider,
                what: "scripted entity".into(),
            },
            MockFailure::Timeout => SyndicaError::Timeout {
                duration: std::time::Duration::from_secs(10),
            },
        }
    }
}

type Script<T> = Arc<Mutex<VecDeque<Result<T, MockFailure>>>>;

fn script<T>() -> Script<T> {
    Arc::new(Mutex::new(VecDeque::new()))
}

/// A scriptable provider adapter. Cloning shares scripts and captures.
#[derive(Clone)]
pub struct MockProvider {
    provider: Provider,
    validations: Script<bool>,
    refreshes: Script<TokenRefresh>,
    message_batches: Script<Vec<Result<RawMessage, MockFailure>>>,
    account_stats: Script<RawAccountStats>,
    post_stats: Script<RawPostStats>,
    replies: Script<()>,
    sent_replies: Arc<Mutex<Vec<(String, String)>>>,
}

impl MockProvider {
    pub fn new(provider: Provider) -> Self {
        Self {
            provider,
            validations: script(),
            refreshes: script(),
            message_batches: script(),
            account_stats: script(),
            post_stats: script(),
            replies: script(),
            sent_replies: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub async fn script_validation(&self, result: Result<bool, MockFailure>) {
        self.validations.lock().await.push_back(result);
    }

    pub async fn script_refresh(&self, result: Result<TokenRefresh, MockFailure>) {
        self.refreshes.lock().await.push_back(result);
    }

    /// Queue one fetch_messages batch. Per-item failures let tests exercise
    /// per-message isolation in the ingestion pipeline.
    pub async fn script_messages(&self, batch: Vec<Result<RawMessage, MockFailure>>) {
        self.message_batches.lock().await.push_back(Ok(batch));
    }

    /// Queue a fetch_messages call that fails outright.
    pub async fn script_messages_failure(&self, failure: MockFailure) {
        self.message_batches.lock().await.push_back(Err(failure));
    }

    pub async fn script_account_stats(&self, result: Result<RawAccountStats, MockFailure>) {
        self.account_stats.lock().await.push_back(result);
    }

    pub async fn script_post_stats(&self, result: Result<RawPostStats, MockFailure>) {
        self.post_stats.lock().await.push_back(result);
    }

    pub async fn script_reply(&self, result: Result<(), MockFailure>) {
        self.replies.lock().await.push_back(result);
    }

    /// Replies dispatched so far, as (target provider message id, text).
    pub async fn sent_replies(&self) -> Vec<(String, String)> {
        self.sent_replies.lock().await.clone()
    }

    /// A raw message with the given upstream id and body.
    pub fn raw_message(provider_message_id: &str, body: &str) -> RawMessage {
        RawMessage {
            provider_message_id: provider_message_id.to_string(),
            sender_name: "mock sender".to_string(),
            body: body.to_string(),
            kind: syndica_core::types::MessageKind::Message,
            received_at: Utc::now(),
        }
    }

    async fn pop<T>(
        &self,
        queue: &Script<T>,
        default: impl FnOnce() -> T,
    ) -> Result<T, SyndicaError> {
        match queue.lock().await.pop_front() {
            Some(Ok(value)) => Ok(value),
            Some(Err(failure)) => Err(failure.into_error(self.provider)),
            None => Ok(default()),
        }
    }
}

#[async_trait]
impl PlatformAdapter for MockProvider {
    fn name(&self) -> &str {
        "mock-provider"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_kind(&self) -> AdapterKind {
        AdapterKind::Provider
    }

    async fn health_check(&self) -> Result<HealthStatus, SyndicaError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), SyndicaError> {
        Ok(())
    }
}

#[async_trait]
impl ProviderAdapter for MockProvider {
    fn provider(&self) -> Provider {
        self.provider
    }

    async fn validate_token(&self, _access_token: &str) -> Result<bool, SyndicaError> {
        self.pop(&self.validations, || true).await
    }

    async fn refresh_token(&self, _refresh_token: &str) -> Result<TokenRefresh, SyndicaError> {
        self.pop(&self.refreshes, || TokenRefresh {
            access_token: format!("mock-refreshed-{}", uuid::Uuid::new_v4()),
            expires_at: None,
        })
        .await
    }

    async fn fetch_messages(
        &self,
        _account: &AccountRef,
        _since: Option<DateTime<Utc>>,
    ) -> Result<MessageStream, SyndicaError> {
        let provider = self.provider;
        let batch = self.pop(&self.message_batches, Vec::new).await?;
        let items: Vec<Result<RawMessage, SyndicaError>> = batch
            .into_iter()
            .map(|item| item.map_err(|f| f.into_error(provider)))
            .collect();
        Ok(Box::pin(stream::iter(items)))
    }

    async fn fetch_account_stats(
        &self,
        _account: &AccountRef,
    ) -> Result<RawAccountStats, SyndicaError> {
        self.pop(&self.account_stats, RawAccountStats::default).await
    }

    async fn fetch_post_stats(&self, _post: &PostRef) -> Result<RawPostStats, SyndicaError> {
        self.pop(&self.post_stats, RawPostStats::default).await
    }

    async fn send_reply(
        &self,
        _account: &AccountRef,
        target: &ReplyTarget,
        text: &str,
    ) -> Result<(), SyndicaError> {
        let result = self.pop(&self.replies, || ()).await;
        if result.is_ok() {
            self.sent_replies
                .lock()
                .await
                .push((target.provider_message_id.clone(), text.to_string()));
        }
        result
    }
}
