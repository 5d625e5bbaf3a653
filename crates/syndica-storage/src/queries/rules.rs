// SPDX-FileCopyrightText: 2026 Syndica Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Auto-reply rule reads.
//!
//! Rules are authored by the external CRUD layer; this engine only reads
//! them, in stored `position` order, for first-match-wins evaluation.

use rusqlite::{params, Row};
use syndica_core::SyndicaError;

use crate::database::Database;
use crate::models::{parse_column, AutoReplyRule, Provider};

fn rule_from_row(row: &Row<'_>) -> rusqlite::Result<AutoReplyRule> {
    Ok(AutoReplyRule {
        id: row.get(0)?,
        tenant_id: row.get(1)?,
        provider: parse_column(2, row.get(2)?)?,
        trigger_keyword: row.get(3)?,
        response_text: row.get(4)?,
        position: row.get(5)?,
    })
}

/// Rules for one (tenant, provider), ordered by `position` ascending.
pub async fn rules_for(
    db: &Database,
    tenant_id: &str,
    provider: Provider,
) -> Result<Vec<AutoReplyRule>, SyndicaError> {
    let tenant_id = tenant_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, tenant_id, provider, trigger_keyword, response_text, position
                 FROM auto_reply_rules
                 WHERE tenant_id = ?1 AND provider = ?2
                 ORDER BY position ASC",
            )?;
            let rows = stmt.query_map(params![tenant_id, provider.to_string()], rule_from_row)?;
            let mut rules = Vec::new();
            for row in rows {
                rules.push(row?);
            }
            Ok(rules)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Insert a rule (used by tests and the external CRUD seam).
pub async fn insert_rule(db: &Database, rule: &AutoReplyRule) -> Result<(), SyndicaError> {
    let rule = rule.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO auto_reply_rules
                 (id, tenant_id, provider, trigger_keyword, response_text, position)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    rule.id,
                    rule.tenant_id,
                    rule.provider.to_string(),
                    rule.trigger_keyword,
                    rule.response_text,
                    rule.position,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    async fn setup_db() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        (db, dir)
    }

    fn make_rule(id: &str, keyword: &str, position: i64) -> AutoReplyRule {
        AutoReplyRule {
            id: id.to_string(),
            tenant_id: "tenant-1".to_string(),
            provider: Provider::Facebook,
            trigger_keyword: keyword.to_string(),
            response_text: format!("response for {keyword}"),
            position,
        }
    }

    #[tokio::test]
    async fn rules_come_back_in_position_order() {
        let (db, _dir) = setup_db().await;

        // Insert out of order.
        insert_rule(&db, &make_rule("r2", "shipping", 2)).await.unwrap();
        insert_rule(&db, &make_rule("r1", "price", 1)).await.unwrap();
        insert_rule(&db, &make_rule("r3", "hours", 3)).await.unwrap();

        let rules = rules_for(&db, "tenant-1", Provider::Facebook).await.unwrap();
        let keywords: Vec<_> = rules.iter().map(|r| r.trigger_keyword.as_str()).collect();
        assert_eq!(keywords, vec!["price", "shipping", "hours"]);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn rules_scoped_to_tenant_and_provider() {
        let (db, _dir) = setup_db().await;

        insert_rule(&db, &make_rule("r1", "price", 1)).await.unwrap();
        let mut other_provider = make_rule("r2", "hola", 1);
        other_provider.provider = Provider::Instagram;
        insert_rule(&db, &other_provider).await.unwrap();
        let mut other_tenant = make_rule("r3", "hi", 1);
        other_tenant.tenant_id = "tenant-2".to_string();
        insert_rule(&db, &other_tenant).await.unwrap();

        let rules = rules_for(&db, "tenant-1", Provider::Facebook).await.unwrap();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].id, "r1");

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn no_rules_is_an_empty_vec() {
        let (db, _dir) = setup_db().await;
        let rules = rules_for(&db, "tenant-1", Provider::Tiktok).await.unwrap();
        assert!(rules.is_empty());
        db.close().await.unwrap();
    }
}
