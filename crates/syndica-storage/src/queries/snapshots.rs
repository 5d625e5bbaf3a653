// SPDX-FileCopyrightText: 2026 Syndica Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Append-only metric snapshot writes.
//!
//! No UPDATE statements exist in this module on purpose: every fetch
//! produces a new row and history is never rewritten. NULL counters are
//! stored as NULL, never coerced to zero.

use rusqlite::{params, Row};
use syndica_core::SyndicaError;

use crate::database::Database;
use crate::models::{parse_column, AccountSnapshot, PostSnapshot, Provider};
use syndica_core::types::{RawAccountStats, RawPostStats};

fn account_snapshot_from_row(row: &Row<'_>) -> rusqlite::Result<AccountSnapshot> {
    Ok(AccountSnapshot {
        id: row.get(0)?,
        account_id: row.get(1)?,
        provider: parse_column(2, row.get(2)?)?,
        stats: RawAccountStats {
            followers: row.get(3)?,
            reach: row.get(4)?,
            engagement: row.get(5)?,
            profile_views: row.get(6)?,
            likes: row.get(7)?,
        },
        fetched_at: row.get(8)?,
    })
}

fn post_snapshot_from_row(row: &Row<'_>) -> rusqlite::Result<PostSnapshot> {
    Ok(PostSnapshot {
        id: row.get(0)?,
        post_id: row.get(1)?,
        provider: parse_column(2, row.get(2)?)?,
        stats: RawPostStats {
            impressions: row.get(3)?,
            reach: row.get(4)?,
            engagement: row.get(5)?,
            likes: row.get(6)?,
            comments: row.get(7)?,
            shares: row.get(8)?,
        },
        fetched_at: row.get(9)?,
    })
}

/// Append one account-level snapshot row.
pub async fn append_account_snapshot(
    db: &Database,
    account_id: &str,
    provider: Provider,
    stats: &RawAccountStats,
    fetched_at: &str,
) -> Result<(), SyndicaError> {
    let account_id = account_id.to_string();
    let stats = stats.clone();
    let fetched_at = fetched_at.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO account_metric_snapshots
                 (account_id, provider, followers, reach, engagement,
                  profile_views, likes, fetched_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    account_id,
                    provider.to_string(),
                    stats.followers,
                    stats.reach,
                    stats.engagement,
                    stats.profile_views,
                    stats.likes,
                    fetched_at,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Append one post-level snapshot row.
pub async fn append_post_snapshot(
    db: &Database,
    post_id: &str,
    provider: Provider,
    stats: &RawPostStats,
    fetched_at: &str,
) -> Result<(), SyndicaError> {
    let post_id = post_id.to_string();
    let stats = stats.clone();
    let fetched_at = fetched_at.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO post_metric_snapshots
                 (post_id, provider, impressions, reach, engagement,
                  likes, comments, shares, fetched_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    post_id,
                    provider.to_string(),
                    stats.impressions,
                    stats.reach,
                    stats.engagement,
                    stats.likes,
                    stats.comments,
                    stats.shares,
                    fetched_at,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Account snapshots ordered by fetch time, oldest first.
pub async fn account_snapshots(
    db: &Database,
    account_id: &str,
) -> Result<Vec<AccountSnapshot>, SyndicaError> {
    let account_id = account_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, account_id, provider, followers, reach, engagement,
                        profile_views, likes, fetched_at
                 FROM account_metric_snapshots
                 WHERE account_id = ?1 ORDER BY fetched_at ASC, id ASC",
            )?;
            let rows = stmt.query_map(params![account_id], account_snapshot_from_row)?;
            let mut snapshots = Vec::new();
            for row in rows {
                snapshots.push(row?);
            }
            Ok(snapshots)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Post snapshots ordered by fetch time, oldest first.
pub async fn post_snapshots(
    db: &Database,
    post_id: &str,
) -> Result<Vec<PostSnapshot>, SyndicaError> {
    let post_id = post_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, post_id, provider, impressions, reach, engagement,
                        likes, comments, shares, fetched_at
                 FROM post_metric_snapshots
                 WHERE post_id = ?1 ORDER BY fetched_at ASC, id ASC",
            )?;
            let rows = stmt.query_map(params![post_id], post_snapshot_from_row)?;
            let mut snapshots = Vec::new();
            for row in rows {
                snapshots.push(row?);
            }
            Ok(snapshots)
        })
        .await
        .map_err(crate::database::map_tr_err)
}
