// SPDX-FileCopyrightText: 2026 Syndica Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed query modules, one per table family.

pub mod accounts;
pub mod messages;
pub mod posts;
pub mod rules;
pub mod snapshots;
