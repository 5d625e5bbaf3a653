// SPDX-FileCopyrightText: 2026 Syndica Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Job orchestration for Syndica.
//!
//! Four named jobs run on independent cadences: `token-check`,
//! `message-fetch`, `post-insights`, and `account-insights`. Each
//! invocation enumerates per-account (or per-post) work units and runs
//! them through a bounded pool; a tick that overlaps a still-running
//! invocation of the same job is skipped.

pub mod job;
pub mod recording;
pub mod runner;
pub mod scheduler;

pub use job::{JobName, JobOutcome, JobReport, JobTracker};
pub use runner::WorkUnit;
pub use scheduler::Scheduler;
