// SPDX-FileCopyrightText: 2026 Syndica Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! First-match-wins auto-reply evaluation.

use std::sync::Arc;

use tracing::{debug, info};

use syndica_core::types::{ConnectedAccount, InboxMessage, ReplyTarget};
use syndica_core::{ProviderAdapter, Store, SyndicaError};

/// Evaluates tenant auto-reply rules against newly ingested messages and
/// dispatches the matching response.
pub struct AutoReplyMatcher {
    store: Arc<dyn Store>,
}

impl AutoReplyMatcher {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Evaluate rules against one newly inserted message.
    ///
    /// Rules are checked in stored order; the first whose trigger keyword
    /// appears (case-insensitively) in the body wins, and no further rules
    /// are considered. Returns `Ok(true)` when a reply was dispatched and
    /// the message transitioned to `replied`.
    ///
    /// A failed dispatch propagates as an error and leaves the message in
    /// its prior status; the next scheduled pass will not see it again
    /// (ingestion is insert-once), so the failure is surfaced to the
    /// caller's report instead of retried here.
    pub async fn evaluate(
        &self,
        account: &ConnectedAccount,
        adapter: &dyn ProviderAdapter,
        message: &InboxMessage,
    ) -> Result<bool, SyndicaError> {
        let rules = self
            .store
            .rules_for(&message.tenant_id, message.provider)
            .await?;
        if rules.is_empty() {
            return Ok(false);
        }

        let body = message.body.to_lowercase();
        for rule in &rules {
            if !body.contains(&rule.trigger_keyword.to_lowercase()) {
                continue;
            }
            debug!(
                message = %message.id,
                rule = %rule.id,
                keyword = %rule.trigger_keyword,
                "auto-reply rule matched"
            );

            let target = ReplyTarget {
                provider_message_id: message.provider_message_id.clone(),
                kind: message.kind,
            };
            adapter
                .send_reply(&account.account_ref(), &target, &rule.response_text)
                .await?;
            self.store.mark_message_replied(&message.id).await?;

            info!(
                message = %message.id,
                rule = %rule.id,
                provider = %message.provider,
                "auto-reply dispatched"
            );
            return Ok(true);
        }

        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use syndica_core::types::{MessageStatus, Provider};
    use syndica_test_utils::{MockFailure, MockProvider, TestHarness};

    async fn seeded_message(harness: &TestHarness, body: &str) -> InboxMessage {
        let mut message = TestHarness::message("m1", Provider::Facebook, "fb-m1");
        message.body = body.to_string();
        assert!(harness
            .store()
            .insert_message_if_absent(&message)
            .await
            .unwrap());
        message
    }

    #[tokio::test]
    async fn first_matching_rule_wins_in_stored_order() {
        let harness = TestHarness::new().await.unwrap();
        let account = TestHarness::account("a1", Provider::Facebook);
        harness.seed_account(&account).await.unwrap();
        harness
            .seed_rule(&TestHarness::rule("r1", Provider::Facebook, "sale", 1))
            .await
            .unwrap();
        harness
            .seed_rule(&TestHarness::rule("r2", Provider::Facebook, "hello", 2))
            .await
            .unwrap();

        let message = seeded_message(&harness, "Hello, is there a sale?").await;
        let mock = MockProvider::new(Provider::Facebook);

        let matcher = AutoReplyMatcher::new(harness.store_dyn());
        assert!(matcher.evaluate(&account, &mock, &message).await.unwrap());

        // Only the "sale" rule fired, despite "hello" also matching.
        let replies = mock.sent_replies().await;
        assert_eq!(replies.len(), 1);
        assert_eq!(replies[0].0, "fb-m1");
        assert_eq!(replies[0].1, "auto-reply for sale");

        let stored = harness.store().get_message("m1").await.unwrap().unwrap();
        assert_eq!(stored.status, MessageStatus::Replied);
        assert!(stored.is_automated);
    }

    #[tokio::test]
    async fn matching_is_case_insensitive_substring() {
        let harness = TestHarness::new().await.unwrap();
        let account = TestHarness::account("a1", Provider::Facebook);
        harness.seed_account(&account).await.unwrap();
        harness
            .seed_rule(&TestHarness::rule("r1", Provider::Facebook, "SHIPPING", 1))
            .await
            .unwrap();

        let message = seeded_message(&harness, "what about free shipping?").await;
        let mock = MockProvider::new(Provider::Facebook);

        let matcher = AutoReplyMatcher::new(harness.store_dyn());
        assert!(matcher.evaluate(&account, &mock, &message).await.unwrap());
    }

    #[tokio::test]
    async fn no_match_leaves_status_new() {
        let harness = TestHarness::new().await.unwrap();
        let account = TestHarness::account("a1", Provider::Facebook);
        harness.seed_account(&account).await.unwrap();
        harness
            .seed_rule(&TestHarness::rule("r1", Provider::Facebook, "sale", 1))
            .await
            .unwrap();

        let message = seeded_message(&harness, "just saying hi").await;
        let mock = MockProvider::new(Provider::Facebook);

        let matcher = AutoReplyMatcher::new(harness.store_dyn());
        assert!(!matcher.evaluate(&account, &mock, &message).await.unwrap());
        assert!(mock.sent_replies().await.is_empty());

        let stored = harness.store().get_message("m1").await.unwrap().unwrap();
        assert_eq!(stored.status, MessageStatus::New);
    }

    #[tokio::test]
    async fn failed_dispatch_keeps_prior_status() {
        let harness = TestHarness::new().await.unwrap();
        let account = TestHarness::account("a1", Provider::Facebook);
        harness.seed_account(&account).await.unwrap();
        harness
            .seed_rule(&TestHarness::rule("r1", Provider::Facebook, "sale", 1))
            .await
            .unwrap();

        let message = seeded_message(&harness, "sale?").await;
        let mock = MockProvider::new(Provider::Facebook);
        mock.script_reply(Err(MockFailure::Unavailable)).await;

        let matcher = AutoReplyMatcher::new(harness.store_dyn());
        let err = matcher.evaluate(&account, &mock, &message).await.unwrap_err();
        assert!(err.is_transient());

        let stored = harness.store().get_message("m1").await.unwrap().unwrap();
        assert_eq!(stored.status, MessageStatus::New);
        assert!(!stored.is_automated);
    }

    #[tokio::test]
    async fn rules_from_other_providers_are_ignored() {
        let harness = TestHarness::new().await.unwrap();
        let account = TestHarness::account("a1", Provider::Facebook);
        harness.seed_account(&account).await.unwrap();
        harness
            .seed_rule(&TestHarness::rule("r1", Provider::Instagram, "sale", 1))
            .await
            .unwrap();

        let message = seeded_message(&harness, "big sale today").await;
        let mock = MockProvider::new(Provider::Facebook);

        let matcher = AutoReplyMatcher::new(harness.store_dyn());
        assert!(!matcher.evaluate(&account, &mock, &message).await.unwrap());
    }
}
