// SPDX-FileCopyrightText: 2026 Syndica Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Connected account operations.
//!
//! Identity/credential fields are written by the external CRUD layer; this
//! engine only reads them and writes the token/status fields owned by the
//! token lifecycle manager.

use rusqlite::{params, Row};
use syndica_core::SyndicaError;

use crate::database::Database;
use crate::models::{parse_column, AccountStatus, ConnectedAccount};

fn account_from_row(row: &Row<'_>) -> rusqlite::Result<ConnectedAccount> {
    Ok(ConnectedAccount {
        id: row.get(0)?,
        tenant_id: row.get(1)?,
        provider: parse_column(2, row.get(2)?)?,
        provider_account_id: row.get(3)?,
        access_token: row.get(4)?,
        refresh_token: row.get(5)?,
        token_expires_at: row.get(6)?,
        status: parse_column(7, row.get(7)?)?,
    })
}

const ACCOUNT_COLUMNS: &str = "id, tenant_id, provider, provider_account_id, \
     access_token, refresh_token, token_expires_at, status";

/// Insert a connected account (used by tests and the external CRUD seam).
pub async fn insert_account(db: &Database, account: &ConnectedAccount) -> Result<(), SyndicaError> {
    let account = account.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO connected_accounts
                 (id, tenant_id, provider, provider_account_id,
                  access_token, refresh_token, token_expires_at, status)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    account.id,
                    account.tenant_id,
                    account.provider.to_string(),
                    account.provider_account_id,
                    account.access_token,
                    account.refresh_token,
                    account.token_expires_at,
                    account.status.to_string(),
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// All accounts in status `active` — the enumeration every sync job uses.
/// Accounts in `error` or `disabled` wait for operator remediation.
pub async fn list_active_accounts(db: &Database) -> Result<Vec<ConnectedAccount>, SyndicaError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {ACCOUNT_COLUMNS} FROM connected_accounts
                 WHERE status = 'active' ORDER BY tenant_id, id"
            ))?;
            let rows = stmt.query_map([], account_from_row)?;
            let mut accounts = Vec::new();
            for row in rows {
                accounts.push(row?);
            }
            Ok(accounts)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Fetch one account by id.
pub async fn get_account(
    db: &Database,
    id: &str,
) -> Result<Option<ConnectedAccount>, SyndicaError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {ACCOUNT_COLUMNS} FROM connected_accounts WHERE id = ?1"
            ))?;
            let mut rows = stmt.query_map(params![id], account_from_row)?;
            rows.next().transpose()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Replace an account's token and expiry after a successful refresh.
///
/// Also forces status back to `active`: a refreshed credential is a healthy
/// credential regardless of what the validate call saw.
pub async fn update_account_token(
    db: &Database,
    id: &str,
    access_token: &str,
    expires_at: &str,
) -> Result<(), SyndicaError> {
    let id = id.to_string();
    let access_token = access_token.to_string();
    let expires_at = expires_at.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE connected_accounts
                 SET access_token = ?1, token_expires_at = ?2, status = 'active'
                 WHERE id = ?3",
                params![access_token, expires_at, id],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Set an account's lifecycle status.
pub async fn set_account_status(
    db: &Database,
    id: &str,
    status: AccountStatus,
) -> Result<(), SyndicaError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE connected_accounts SET status = ?1 WHERE id = ?2",
                params![status.to_string(), id],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}
