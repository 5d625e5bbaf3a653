// SPDX-FileCopyrightText: 2026 Syndica Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Syndica sync engine.
//!
//! This crate provides the foundational trait definitions, error types, and
//! canonical domain types used throughout the Syndica workspace. Provider
//! and storage adapters implement traits defined here.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::SyndicaError;
pub use types::{
    format_utc, AccountStatus, AdapterKind, HealthStatus, MessageKind, MessageStatus, Provider,
};

// Re-export adapter traits at crate root.
pub use traits::{MessageStream, PlatformAdapter, ProviderAdapter, Store};
