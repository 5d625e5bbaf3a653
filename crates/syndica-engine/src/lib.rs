// SPDX-FileCopyrightText: 2026 Syndica Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Synchronization engine for Syndica.
//!
//! Hosts the four components the scheduler drives on each pass:
//! - [`token::TokenLifecycleManager`] keeps account credentials valid
//! - [`ingest::IngestionPipeline`] canonicalizes and stores inbound messages
//! - [`autoreply::AutoReplyMatcher`] answers messages that match tenant rules
//! - [`insights::InsightRecorder`] appends metric snapshots
//!
//! All components operate through the `Store` and `ProviderAdapter` traits;
//! nothing here knows which platform or database is behind them.

pub mod autoreply;
pub mod ingest;
pub mod insights;
pub mod registry;
pub mod token;

pub use autoreply::AutoReplyMatcher;
pub use ingest::{IngestReport, IngestionPipeline};
pub use insights::InsightRecorder;
pub use registry::ProviderRegistry;
pub use token::{TokenLifecycleManager, TokenOutcome};
