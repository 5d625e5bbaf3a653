// SPDX-FileCopyrightText: 2026 Syndica Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `syndica status` command implementation.
//!
//! Summarizes the local database: connected accounts by status, inbox
//! volume, and snapshot series sizes. If `--json` is passed, outputs
//! structured JSON for scripting.

use serde::Serialize;

use syndica_config::model::SyndicaConfig;
use syndica_core::SyndicaError;
use syndica_storage::database::{map_tr_err, Database};

/// Structured status output for `--json` mode.
#[derive(Debug, Serialize)]
pub struct StatusReport {
    pub database_path: String,
    pub accounts_active: i64,
    pub accounts_error: i64,
    pub accounts_disabled: i64,
    pub inbox_messages: i64,
    pub auto_replies_sent: i64,
    pub tracked_posts: i64,
    pub account_snapshots: i64,
    pub post_snapshots: i64,
}

async fn gather(db: &Database, path: &str) -> Result<StatusReport, SyndicaError> {
    let path = path.to_string();
    db.connection()
        .call(move |conn| {
            let count = |sql: &str| conn.query_row(sql, [], |row| row.get::<_, i64>(0));
            Ok(StatusReport {
                database_path: path,
                accounts_active: count(
                    "SELECT COUNT(*) FROM connected_accounts WHERE status = 'active'",
                )?,
                accounts_error: count(
                    "SELECT COUNT(*) FROM connected_accounts WHERE status = 'error'",
                )?,
                accounts_disabled: count(
                    "SELECT COUNT(*) FROM connected_accounts WHERE status = 'disabled'",
                )?,
                inbox_messages: count("SELECT COUNT(*) FROM inbox_messages")?,
                auto_replies_sent: count(
                    "SELECT COUNT(*) FROM inbox_messages WHERE is_automated = 1",
                )?,
                tracked_posts: count("SELECT COUNT(*) FROM tracked_posts")?,
                account_snapshots: count("SELECT COUNT(*) FROM account_metric_snapshots")?,
                post_snapshots: count("SELECT COUNT(*) FROM post_metric_snapshots")?,
            })
        })
        .await
        .map_err(map_tr_err)
}

/// Run the `syndica status` command.
pub async fn run_status(config: &SyndicaConfig, json: bool) -> Result<(), SyndicaError> {
    let path = &config.storage.database_path;
    if !std::path::Path::new(path).exists() {
        if json {
            println!("{{\"database_path\": {}, \"initialized\": false}}", serde_json::json!(path));
        } else {
            println!("database not found at {path} -- run `syndica serve` to initialize it");
        }
        return Ok(());
    }

    let db = Database::open_with_options(path, config.storage.wal_mode).await?;
    let report = gather(&db, path).await?;
    db.close().await?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report)
                .map_err(|e| SyndicaError::Internal(format!("status serialization: {e}")))?
        );
        return Ok(());
    }

    println!("database: {}", report.database_path);
    println!(
        "accounts: {} active, {} error, {} disabled",
        report.accounts_active, report.accounts_error, report.accounts_disabled
    );
    println!(
        "inbox: {} messages ({} auto-replied)",
        report.inbox_messages, report.auto_replies_sent
    );
    println!(
        "insights: {} tracked posts, {} account snapshots, {} post snapshots",
        report.tracked_posts, report.account_snapshots, report.post_snapshots
    );
    Ok(())
}
