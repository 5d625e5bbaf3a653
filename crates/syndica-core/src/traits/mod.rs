// SPDX-FileCopyrightText: 2026 Syndica Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter trait definitions.

pub mod adapter;
pub mod provider;
pub mod store;

pub use adapter::PlatformAdapter;
pub use provider::{MessageStream, ProviderAdapter};
pub use store::Store;
