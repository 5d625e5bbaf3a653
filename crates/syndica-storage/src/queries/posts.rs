// SPDX-FileCopyrightText: 2026 Syndica Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tracked post reads. The post-insight job enumerates these; the rows
//! themselves are managed externally.

use rusqlite::{params, Row};
use syndica_core::SyndicaError;

use crate::database::Database;
use crate::models::{parse_column, TrackedPost};

fn post_from_row(row: &Row<'_>) -> rusqlite::Result<TrackedPost> {
    Ok(TrackedPost {
        id: row.get(0)?,
        tenant_id: row.get(1)?,
        provider: parse_column(2, row.get(2)?)?,
        provider_post_id: row.get(3)?,
        account_id: row.get(4)?,
    })
}

/// All tracked posts, grouped by owning account so the insight job can
/// reuse one credential per account.
pub async fn list_tracked_posts(db: &Database) -> Result<Vec<TrackedPost>, SyndicaError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, tenant_id, provider, provider_post_id, account_id
                 FROM tracked_posts ORDER BY account_id, id",
            )?;
            let rows = stmt.query_map([], post_from_row)?;
            let mut posts = Vec::new();
            for row in rows {
                posts.push(row?);
            }
            Ok(posts)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Insert a tracked post (used by tests and the external CRUD seam).
pub async fn insert_tracked_post(db: &Database, post: &TrackedPost) -> Result<(), SyndicaError> {
    let post = post.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO tracked_posts
                 (id, tenant_id, provider, provider_post_id, account_id)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    post.id,
                    post.tenant_id,
                    post.provider.to_string(),
                    post.provider_post_id,
                    post.account_id,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}
