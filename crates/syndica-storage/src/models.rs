// SPDX-FileCopyrightText: 2026 Syndica Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain model types for storage entities.
//!
//! The canonical types are defined in `syndica-core::types` for use across
//! adapter trait boundaries. This module re-exports them for convenience
//! within the storage crate and provides row-mapping helpers for the
//! TEXT-encoded enum columns.

use std::str::FromStr;

pub use syndica_core::types::{
    AccountSnapshot, AccountStatus, AutoReplyRule, ConnectedAccount, InboxMessage, MessageKind,
    MessageStatus, PostSnapshot, Provider, TrackedPost,
};

/// Parse a TEXT enum column, surfacing bad data as a conversion failure
/// on the given column index.
pub(crate) fn parse_column<T>(idx: usize, value: String) -> rusqlite::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value.parse::<T>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}
