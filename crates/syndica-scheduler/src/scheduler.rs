// SPDX-FileCopyrightText: 2026 Syndica Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The scheduler proper: enumerates work units for each named job and
//! drives them through the bounded runner on fixed cadences.
//!
//! One invocation of a job is independent of the others; the only shared
//! state between invocations is the per-account fetch watermark and the
//! running flags in [`JobTracker`].

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use syndica_config::model::SyndicaConfig;
use syndica_core::types::{AccountStatus, ConnectedAccount};
use syndica_core::{Store, SyndicaError};
use syndica_engine::{
    AutoReplyMatcher, IngestionPipeline, InsightRecorder, ProviderRegistry, TokenLifecycleManager,
    TokenOutcome,
};

use crate::job::{JobName, JobReport, JobTracker};
use crate::recording;
use crate::runner::{run_units, WorkUnit};

pub struct Scheduler {
    config: syndica_config::model::SchedulerConfig,
    store: Arc<dyn Store>,
    registry: Arc<ProviderRegistry>,
    tokens: Arc<TokenLifecycleManager>,
    pipeline: Arc<IngestionPipeline>,
    insights: Arc<InsightRecorder>,
    tracker: JobTracker,
    cancel: CancellationToken,
    /// Per-account watermark: start of the last fully clean fetch pass.
    last_fetch: Arc<DashMap<String, DateTime<Utc>>>,
}

impl Scheduler {
    pub fn new(
        config: &SyndicaConfig,
        store: Arc<dyn Store>,
        registry: Arc<ProviderRegistry>,
        cancel: CancellationToken,
    ) -> Arc<Self> {
        let tokens = Arc::new(TokenLifecycleManager::new(
            Arc::clone(&store),
            config.providers.clone(),
            config.engine.admin_email.clone(),
        ));
        let pipeline = Arc::new(IngestionPipeline::new(
            Arc::clone(&store),
            AutoReplyMatcher::new(Arc::clone(&store)),
        ));
        let insights = Arc::new(InsightRecorder::new(Arc::clone(&store)));
        Arc::new(Self {
            config: config.scheduler.clone(),
            store,
            registry,
            tokens,
            pipeline,
            insights,
            tracker: JobTracker::new(),
            cancel,
            last_fetch: Arc::new(DashMap::new()),
        })
    }

    /// Run every job on its configured cadence until cancellation.
    ///
    /// Each job fires once immediately, then on its interval. A tick that
    /// lands while the previous invocation of the same job is still
    /// running resolves to a skip inside [`Self::run_job`].
    pub async fn run(self: Arc<Self>) {
        recording::describe_metrics();
        let mut loops = JoinSet::new();
        for job in JobName::ALL {
            let scheduler = Arc::clone(&self);
            loops.spawn(async move { scheduler.job_loop(job).await });
        }
        while loops.join_next().await.is_some() {}
        info!("scheduler stopped");
    }

    async fn job_loop(self: Arc<Self>, job: JobName) {
        let period = Duration::from_secs(self.interval_secs(job).max(1));
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        info!(job = %job, period_secs = period.as_secs(), "job loop started");
        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => {
                    debug!(job = %job, "job loop exiting");
                    return;
                }
                _ = ticker.tick() => {
                    if let Err(e) = self.run_job(job).await {
                        error!(job = %job, error = %e, "job invocation failed before any unit ran");
                    }
                }
            }
        }
    }

    fn interval_secs(&self, job: JobName) -> u64 {
        match job {
            JobName::TokenCheck => self.config.token_check_interval_secs,
            JobName::MessageFetch => self.config.message_fetch_interval_secs,
            JobName::PostInsights => self.config.post_insights_interval_secs,
            JobName::AccountInsights => self.config.account_insights_interval_secs,
        }
    }

    /// Run one invocation of `job` to completion.
    ///
    /// Returns `Err` only when the unit list itself cannot be built; unit
    /// failures are absorbed into the report.
    pub async fn run_job(&self, job: JobName) -> Result<JobReport, SyndicaError> {
        let Some(_guard) = self.tracker.try_begin(job) else {
            info!(job = %job, "previous invocation still running, skipping");
            let report = JobReport::skipped(job);
            recording::record_job_outcome(job, report.outcome);
            return Ok(report);
        };

        let units = match job {
            JobName::TokenCheck => self.token_check_units().await?,
            JobName::MessageFetch => self.message_fetch_units().await?,
            JobName::PostInsights => self.post_insights_units().await?,
            JobName::AccountInsights => self.account_insights_units().await?,
        };
        let total = units.len();

        let report = run_units(
            job,
            units,
            self.config.max_concurrent_units,
            Duration::from_secs(self.config.slow_unit_warn_secs),
            self.cancel.clone(),
        )
        .await;

        info!(
            job = %job,
            outcome = %report.outcome,
            units = total,
            succeeded = report.succeeded,
            failed = report.failed,
            cancelled = report.cancelled,
            "job invocation finished"
        );
        recording::record_job_outcome(job, report.outcome);
        Ok(report)
    }

    async fn active_accounts(&self) -> Result<Vec<ConnectedAccount>, SyndicaError> {
        self.store.list_active_accounts().await
    }

    async fn token_check_units(&self) -> Result<Vec<WorkUnit>, SyndicaError> {
        let mut units = Vec::new();
        for account in self.active_accounts().await? {
            let Ok(adapter) = self.registry.get(account.provider) else {
                warn!(account = %account.id, provider = %account.provider, "no adapter registered, skipping");
                continue;
            };
            let tokens = Arc::clone(&self.tokens);
            let id = format!("token-check/{}", account.id);
            units.push(WorkUnit::new(
                id,
                Box::pin(async move {
                    match tokens.check_account(&account, adapter.as_ref()).await? {
                        TokenOutcome::Valid | TokenOutcome::Refreshed => Ok(()),
                        TokenOutcome::Failed => Err(SyndicaError::Auth {
                            provider: account.provider,
                            message: "credential could not be refreshed".into(),
                        }),
                    }
                }),
            ));
        }
        Ok(units)
    }

    async fn message_fetch_units(&self) -> Result<Vec<WorkUnit>, SyndicaError> {
        let mut units = Vec::new();
        for account in self.active_accounts().await? {
            let Ok(adapter) = self.registry.get(account.provider) else {
                warn!(account = %account.id, provider = %account.provider, "no adapter registered, skipping");
                continue;
            };
            let pipeline = Arc::clone(&self.pipeline);
            let last_fetch = Arc::clone(&self.last_fetch);
            let id = format!("message-fetch/{}", account.id);
            units.push(WorkUnit::new(
                id,
                Box::pin(async move {
                    let since = last_fetch.get(&account.id).map(|entry| *entry.value());
                    let started = Utc::now();
                    let report = pipeline
                        .sync_account(&account, adapter.as_ref(), since)
                        .await?;
                    if report.has_failures() {
                        // Watermark stays put so failed items are refetched;
                        // duplicate inserts are no-ops.
                        return Err(SyndicaError::Internal(format!(
                            "{} of {} inbound items failed",
                            report.failed, report.fetched
                        )));
                    }
                    last_fetch.insert(account.id.clone(), started);
                    Ok(())
                }),
            ));
        }
        Ok(units)
    }

    async fn account_insights_units(&self) -> Result<Vec<WorkUnit>, SyndicaError> {
        let mut units = Vec::new();
        for account in self.active_accounts().await? {
            let Ok(adapter) = self.registry.get(account.provider) else {
                warn!(account = %account.id, provider = %account.provider, "no adapter registered, skipping");
                continue;
            };
            let insights = Arc::clone(&self.insights);
            let id = format!("account-insights/{}", account.id);
            units.push(WorkUnit::new(
                id,
                Box::pin(async move { insights.record_account(&account, adapter.as_ref()).await }),
            ));
        }
        Ok(units)
    }

    async fn post_insights_units(&self) -> Result<Vec<WorkUnit>, SyndicaError> {
        let mut units = Vec::new();
        for post in self.store.list_tracked_posts().await? {
            let Some(account) = self.store.get_account(&post.account_id).await? else {
                warn!(post = %post.id, account = %post.account_id, "owning account missing, skipping");
                continue;
            };
            if account.status != AccountStatus::Active {
                debug!(post = %post.id, account = %account.id, status = %account.status, "owning account not active, skipping");
                continue;
            }
            let Ok(adapter) = self.registry.get(post.provider) else {
                warn!(post = %post.id, provider = %post.provider, "no adapter registered, skipping");
                continue;
            };
            let insights = Arc::clone(&self.insights);
            let id = format!("post-insights/{}", post.id);
            units.push(WorkUnit::new(
                id,
                Box::pin(async move {
                    insights
                        .record_post(&post, &account.access_token, adapter.as_ref())
                        .await
                }),
            ));
        }
        Ok(units)
    }
}
