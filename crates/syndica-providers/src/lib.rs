// SPDX-FileCopyrightText: 2026 Syndica Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Provider adapters for the social platforms Syndica synchronizes.
//!
//! Each adapter implements [`syndica_core::ProviderAdapter`] against one
//! platform's HTTP API and normalizes everything into the canonical raw
//! shapes; nothing platform-specific crosses the trait boundary.

pub mod facebook;
pub mod http;
pub mod instagram;
pub mod tiktok;

pub use facebook::FacebookAdapter;
pub use instagram::InstagramAdapter;
pub use tiktok::TiktokAdapter;
