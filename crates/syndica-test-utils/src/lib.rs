// SPDX-FileCopyrightText: 2026 Syndica Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Syndica integration tests.
//!
//! Provides a scriptable mock provider adapter and a test harness that
//! assembles a temp SQLite store with seed helpers, for fast,
//! deterministic, CI-runnable tests without external services.

pub mod harness;
pub mod mock_provider;

pub use harness::TestHarness;
pub use mock_provider::{MockFailure, MockProvider};
