// SPDX-FileCopyrightText: 2026 Syndica Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Metric recording helpers for job observability.
//!
//! Emits through the `metrics` facade; whether anything listens is up to
//! the embedding process.

use metrics::{describe_counter, describe_histogram};

use crate::job::{JobName, JobOutcome};

/// Register metric descriptions. Call once at startup.
pub fn describe_metrics() {
    describe_counter!("syndica_jobs_total", "Job invocations by terminal outcome");
    describe_counter!("syndica_job_units_total", "Work units processed by result");
    describe_histogram!(
        "syndica_job_unit_seconds",
        "Per-unit wall time within job invocations"
    );
}

pub fn record_job_outcome(job: JobName, outcome: JobOutcome) {
    metrics::counter!(
        "syndica_jobs_total",
        "job" => job.to_string(),
        "outcome" => outcome.to_string()
    )
    .increment(1);
}

pub fn record_unit_result(job: JobName, succeeded: bool) {
    let result = if succeeded { "ok" } else { "error" };
    metrics::counter!(
        "syndica_job_units_total",
        "job" => job.to_string(),
        "result" => result
    )
    .increment(1);
}

pub fn record_unit_duration(job: JobName, seconds: f64) {
    metrics::histogram!("syndica_job_unit_seconds", "job" => job.to_string()).record(seconds);
}
