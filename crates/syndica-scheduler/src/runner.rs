// SPDX-FileCopyrightText: 2026 Syndica Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bounded concurrent execution of a job's work units.
//!
//! Units run on a [`JoinSet`] gated by a semaphore, so at most
//! `max_concurrent` are in flight. Errors are caught at the unit
//! boundary: a failing unit is logged with its identity and never stops
//! the others. Cancellation is cooperative and takes effect between
//! units — a unit that already started always runs to completion (its
//! own adapter timeouts bound how long that takes).

use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::future::BoxFuture;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use syndica_core::SyndicaError;

use crate::job::{JobName, JobOutcome, JobReport};
use crate::recording;

/// One named work unit: an identity for logging plus its future.
pub struct WorkUnit {
    pub id: String,
    pub run: BoxFuture<'static, Result<(), SyndicaError>>,
}

impl WorkUnit {
    pub fn new(
        id: impl Into<String>,
        run: BoxFuture<'static, Result<(), SyndicaError>>,
    ) -> Self {
        Self { id: id.into(), run }
    }
}

enum UnitEnd {
    Succeeded(Duration),
    Failed(Duration),
    Cancelled,
}

/// Run `units` concurrently up to `max_concurrent`, returning the
/// aggregated report for the invocation.
pub async fn run_units(
    job: JobName,
    units: Vec<WorkUnit>,
    max_concurrent: usize,
    slow_unit_warn: Duration,
    cancel: CancellationToken,
) -> JobReport {
    let semaphore = Arc::new(Semaphore::new(max_concurrent.max(1)));
    let mut set: JoinSet<UnitEnd> = JoinSet::new();

    for unit in units {
        let semaphore = Arc::clone(&semaphore);
        let cancel = cancel.clone();
        set.spawn(async move {
            // Semaphore closed only on runtime teardown.
            let Ok(_permit) = semaphore.acquire_owned().await else {
                return UnitEnd::Cancelled;
            };
            // The cancellation checkpoint: before a unit starts, never
            // within one.
            if cancel.is_cancelled() {
                debug!(job = %job, unit = %unit.id, "unit skipped by cancellation");
                return UnitEnd::Cancelled;
            }

            let started = Instant::now();
            match unit.run.await {
                Ok(()) => UnitEnd::Succeeded(started.elapsed()),
                Err(e) => {
                    warn!(job = %job, unit = %unit.id, error = %e, "work unit failed");
                    UnitEnd::Failed(started.elapsed())
                }
            }
        });
    }

    let mut succeeded = 0u64;
    let mut failed = 0u64;
    let mut cancelled = 0u64;
    let mut total_unit_time = Duration::ZERO;

    while let Some(joined) = set.join_next().await {
        match joined {
            Ok(UnitEnd::Succeeded(elapsed)) => {
                succeeded += 1;
                total_unit_time += elapsed;
                recording::record_unit_result(job, true);
                recording::record_unit_duration(job, elapsed.as_secs_f64());
            }
            Ok(UnitEnd::Failed(elapsed)) => {
                failed += 1;
                total_unit_time += elapsed;
                recording::record_unit_result(job, false);
                recording::record_unit_duration(job, elapsed.as_secs_f64());
            }
            Ok(UnitEnd::Cancelled) => cancelled += 1,
            Err(e) => {
                // A panicking unit counts as failed; the rest keep going.
                warn!(job = %job, error = %e, "work unit task aborted");
                failed += 1;
                recording::record_unit_result(job, false);
            }
        }
    }

    let ran = succeeded + failed;
    if ran > 0 {
        let avg = total_unit_time / ran as u32;
        if avg > slow_unit_warn {
            warn!(
                job = %job,
                avg_unit_ms = avg.as_millis() as u64,
                threshold_ms = slow_unit_warn.as_millis() as u64,
                "slow job: average unit time over threshold"
            );
        }
    }

    let outcome = if failed > 0 {
        JobOutcome::CompletedWithErrors
    } else {
        JobOutcome::Completed
    };
    JobReport {
        job,
        outcome,
        succeeded,
        failed,
        cancelled,
    }
}
