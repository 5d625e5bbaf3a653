// SPDX-FileCopyrightText: 2026 Syndica Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end flow through the scheduler against a temp database and
//! scripted mock providers: token upkeep, message ingestion with
//! auto-reply, and both insight jobs, across two tenants' accounts.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use syndica_config::model::SyndicaConfig;
use syndica_core::types::{AccountStatus, Provider, RawAccountStats, RawPostStats, TokenRefresh};
use syndica_core::Store;
use syndica_engine::ProviderRegistry;
use syndica_scheduler::{JobName, JobOutcome, Scheduler};
use syndica_storage::queries::snapshots;
use syndica_test_utils::{MockProvider, TestHarness};

fn scheduler_for(harness: &TestHarness, mocks: Vec<Arc<MockProvider>>) -> Arc<Scheduler> {
    let mut registry = ProviderRegistry::new();
    for mock in mocks {
        registry.register(mock);
    }
    Scheduler::new(
        &SyndicaConfig::default(),
        harness.store_dyn(),
        Arc::new(registry),
        CancellationToken::new(),
    )
}

#[tokio::test]
async fn full_sync_cycle_across_jobs() {
    let harness = TestHarness::new().await.unwrap();

    // One Facebook account with an auto-reply rule and a tracked post,
    // one Instagram account whose token needs refreshing.
    let fb_account = TestHarness::account("acc-fb", Provider::Facebook);
    harness.seed_account(&fb_account).await.unwrap();
    harness
        .seed_rule(&TestHarness::rule("r1", Provider::Facebook, "price", 1))
        .await
        .unwrap();
    harness
        .seed_post(&TestHarness::post("post-1", Provider::Facebook, "acc-fb"))
        .await
        .unwrap();

    let ig_account = TestHarness::account("acc-ig", Provider::Instagram);
    harness.seed_account(&ig_account).await.unwrap();

    let fb = Arc::new(MockProvider::new(Provider::Facebook));
    fb.script_messages(vec![
        Ok(MockProvider::raw_message("fb-m1", "What is the PRICE of the blue one?")),
        Ok(MockProvider::raw_message("fb-m2", "love this")),
    ])
    .await;
    fb.script_post_stats(Ok(RawPostStats {
        likes: Some(12),
        comments: Some(3),
        shares: None,
        ..Default::default()
    }))
    .await;
    fb.script_account_stats(Ok(RawAccountStats {
        followers: Some(1000),
        ..Default::default()
    }))
    .await;

    let ig = Arc::new(MockProvider::new(Provider::Instagram));
    ig.script_validation(Ok(false)).await;
    ig.script_refresh(Ok(TokenRefresh {
        access_token: "ig-tok-fresh".into(),
        expires_at: None,
    }))
    .await;

    let scheduler = scheduler_for(&harness, vec![Arc::clone(&fb), Arc::clone(&ig)]);

    // Token upkeep: fb stays valid, ig refreshes.
    let report = scheduler.run_job(JobName::TokenCheck).await.unwrap();
    assert_eq!(report.outcome, JobOutcome::Completed);
    assert_eq!(report.succeeded, 2);

    let stored_ig = harness.store().get_account("acc-ig").await.unwrap().unwrap();
    assert_eq!(stored_ig.access_token, "ig-tok-fresh");
    assert_eq!(stored_ig.status, AccountStatus::Active);
    assert!(stored_ig.token_expires_at.is_some());

    // Message fetch: both fb messages land, the price question is answered.
    let report = scheduler.run_job(JobName::MessageFetch).await.unwrap();
    assert_eq!(report.outcome, JobOutcome::Completed);
    let replies = fb.sent_replies().await;
    assert_eq!(replies.len(), 1);
    assert_eq!(replies[0].0, "fb-m1");
    assert_eq!(replies[0].1, "auto-reply for price");

    // Re-running the fetch with the same upstream window stays idempotent.
    fb.script_messages(vec![
        Ok(MockProvider::raw_message("fb-m1", "What is the PRICE of the blue one?")),
        Ok(MockProvider::raw_message("fb-m2", "love this")),
    ])
    .await;
    let report = scheduler.run_job(JobName::MessageFetch).await.unwrap();
    assert_eq!(report.outcome, JobOutcome::Completed);
    assert_eq!(fb.sent_replies().await.len(), 1);

    // Insights: one snapshot per account and per tracked post.
    let report = scheduler.run_job(JobName::AccountInsights).await.unwrap();
    assert_eq!(report.outcome, JobOutcome::Completed);
    assert_eq!(report.succeeded, 2);

    let report = scheduler.run_job(JobName::PostInsights).await.unwrap();
    assert_eq!(report.outcome, JobOutcome::Completed);
    assert_eq!(report.succeeded, 1);

    let account_series = snapshots::account_snapshots(harness.db(), "acc-fb")
        .await
        .unwrap();
    assert_eq!(account_series.len(), 1);
    assert_eq!(account_series[0].stats.followers, Some(1000));

    let post_series = snapshots::post_snapshots(harness.db(), "post-1").await.unwrap();
    assert_eq!(post_series.len(), 1);
    assert_eq!(post_series[0].stats.likes, Some(12));
    // Counters the provider never reported stay absent.
    assert_eq!(post_series[0].stats.shares, None);
}

#[tokio::test]
async fn errored_account_drops_out_of_subsequent_jobs() {
    let harness = TestHarness::new().await.unwrap();
    let mut account = TestHarness::account("acc-1", Provider::Tiktok);
    account.refresh_token = None;
    harness.seed_account(&account).await.unwrap();

    let tt = Arc::new(MockProvider::new(Provider::Tiktok));
    tt.script_validation(Ok(false)).await;

    let scheduler = scheduler_for(&harness, vec![Arc::clone(&tt)]);

    // No refresh token: the check parks the account in error.
    let report = scheduler.run_job(JobName::TokenCheck).await.unwrap();
    assert_eq!(report.outcome, JobOutcome::CompletedWithErrors);

    // Later jobs enumerate no units for it.
    let report = scheduler.run_job(JobName::MessageFetch).await.unwrap();
    assert_eq!(report.succeeded + report.failed, 0);
    let report = scheduler.run_job(JobName::AccountInsights).await.unwrap();
    assert_eq!(report.succeeded + report.failed, 0);
}
