// SPDX-FileCopyrightText: 2026 Syndica Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Job identity, run outcomes, and the no-overlap tracker.
//!
//! A job run moves `idle -> running -> {completed, completed-with-errors}`;
//! an invocation arriving while the same named job is `running` resolves
//! immediately to `skipped` without touching any work unit. The running
//! flag lives in a [`DashMap`] keyed by job name, claimed atomically via
//! the entry API and released by an RAII guard.

use std::sync::Arc;
use std::time::Instant;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use strum::{Display, EnumString};

/// The fixed set of named jobs the scheduler runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "kebab-case")]
pub enum JobName {
    TokenCheck,
    MessageFetch,
    PostInsights,
    AccountInsights,
}

impl JobName {
    pub const ALL: [JobName; 4] = [
        JobName::TokenCheck,
        JobName::MessageFetch,
        JobName::PostInsights,
        JobName::AccountInsights,
    ];
}

/// Terminal outcome of one job invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "kebab-case")]
pub enum JobOutcome {
    /// Every unit succeeded.
    Completed,
    /// At least one unit failed; the rest still ran.
    CompletedWithErrors,
    /// A prior invocation of the same job was still running.
    Skipped,
}

/// Result summary of one job invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobReport {
    pub job: JobName,
    pub outcome: JobOutcome,
    /// Units that completed without error.
    pub succeeded: u64,
    /// Units that returned an error (caught at the unit boundary).
    pub failed: u64,
    /// Units not started because cancellation arrived first.
    pub cancelled: u64,
}

impl JobReport {
    pub fn skipped(job: JobName) -> Self {
        Self {
            job,
            outcome: JobOutcome::Skipped,
            succeeded: 0,
            failed: 0,
            cancelled: 0,
        }
    }
}

/// Per-job-name running flags enforcing the no-overlap guarantee.
#[derive(Default, Clone)]
pub struct JobTracker {
    running: Arc<DashMap<JobName, Instant>>,
}

impl JobTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the running slot for `job`. Returns `None` when a prior
    /// invocation still holds it. The slot is released when the returned
    /// guard drops, including on panic.
    pub fn try_begin(&self, job: JobName) -> Option<RunGuard> {
        match self.running.entry(job) {
            Entry::Occupied(_) => None,
            Entry::Vacant(slot) => {
                slot.insert(Instant::now());
                Some(RunGuard {
                    running: Arc::clone(&self.running),
                    job,
                })
            }
        }
    }

    pub fn is_running(&self, job: JobName) -> bool {
        self.running.contains_key(&job)
    }
}

/// RAII guard marking a job as running.
pub struct RunGuard {
    running: Arc<DashMap<JobName, Instant>>,
    job: JobName,
}

impl RunGuard {
    pub fn started_at(&self) -> Option<Instant> {
        self.running.get(&self.job).map(|entry| *entry.value())
    }
}

impl Drop for RunGuard {
    fn drop(&mut self) {
        self.running.remove(&self.job);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn job_names_render_kebab_case() {
        assert_eq!(JobName::TokenCheck.to_string(), "token-check");
        assert_eq!(JobName::AccountInsights.to_string(), "account-insights");
        assert_eq!(
            JobName::from_str("message-fetch").unwrap(),
            JobName::MessageFetch
        );
    }

    #[test]
    fn second_claim_of_a_running_job_is_refused() {
        let tracker = JobTracker::new();
        let guard = tracker.try_begin(JobName::TokenCheck).unwrap();
        assert!(tracker.is_running(JobName::TokenCheck));
        assert!(tracker.try_begin(JobName::TokenCheck).is_none());

        // A different job is unaffected.
        assert!(tracker.try_begin(JobName::MessageFetch).is_some());

        drop(guard);
        assert!(!tracker.is_running(JobName::TokenCheck));
        assert!(tracker.try_begin(JobName::TokenCheck).is_some());
    }

    #[test]
    fn guard_releases_even_when_dropped_by_unwinding() {
        let tracker = JobTracker::new();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = tracker.try_begin(JobName::PostInsights).unwrap();
            panic!("unit exploded");
        }));
        assert!(result.is_err());
        assert!(!tracker.is_running(JobName::PostInsights));
    }
}
