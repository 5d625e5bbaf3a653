// SPDX-FileCopyrightText: 2026 Syndica Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Canonical domain types shared across adapter traits and the engine.
//!
//! Adapters must map provider-specific payloads into the `Raw*` shapes
//! defined here; nothing provider-specific crosses the trait boundary.
//! Persisted rows carry RFC 3339 UTC timestamps as strings, matching the
//! storage layer's column format.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Format a timestamp in the RFC 3339 UTC form used by persisted rows.
pub fn format_utc(ts: DateTime<Utc>) -> String {
    ts.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

/// An external social-media platform.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Facebook,
    Instagram,
    Tiktok,
}

/// Identifies the type of adapter in the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
pub enum AdapterKind {
    Provider,
    Storage,
}

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Lifecycle status of a connected account.
///
/// Only the token lifecycle manager (and explicit operator reconnection,
/// outside this engine) writes this field.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AccountStatus {
    Active,
    Error,
    Disabled,
}

/// Whether an inbound item arrived as a direct message or a comment.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Message,
    Comment,
}

/// Inbox workflow status of a canonical message.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MessageStatus {
    New,
    Read,
    Replied,
    Archived,
}

/// A tenant's authorized link to one provider account.
///
/// Unique per (tenant_id, provider, provider_account_id).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectedAccount {
    pub id: String,
    pub tenant_id: String,
    pub provider: Provider,
    pub provider_account_id: String,
    pub access_token: String,
    pub refresh_token: Option<String>,
    /// RFC 3339 UTC. `None` when the provider never reported an expiry.
    pub token_expires_at: Option<String>,
    pub status: AccountStatus,
}

impl ConnectedAccount {
    /// The credential fields an adapter needs to act on this account.
    pub fn account_ref(&self) -> AccountRef {
        AccountRef {
            provider_account_id: self.provider_account_id.clone(),
            access_token: self.access_token.clone(),
        }
    }
}

/// A canonicalized inbound message or comment.
///
/// Unique per (provider, provider_message_id) — the ingestion pipeline
/// relies on that constraint for idempotence under re-fetch and overlap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InboxMessage {
    pub id: String,
    pub tenant_id: String,
    pub provider: Provider,
    pub provider_message_id: String,
    pub sender_name: String,
    pub body: String,
    pub kind: MessageKind,
    pub status: MessageStatus,
    pub is_automated: bool,
    /// RFC 3339 UTC.
    pub received_at: String,
}

/// A tenant-owned auto-reply trigger. Read-only to this engine; `position`
/// is the stored evaluation order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutoReplyRule {
    pub id: String,
    pub tenant_id: String,
    pub provider: Provider,
    pub trigger_keyword: String,
    pub response_text: String,
    pub position: i64,
}

/// An externally managed pointer to a published post whose metrics the
/// post-insight job tracks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackedPost {
    pub id: String,
    pub tenant_id: String,
    pub provider: Provider,
    pub provider_post_id: String,
    pub account_id: String,
}

// --- Adapter input references ---

/// Credential slice passed to adapter fetch operations.
#[derive(Debug, Clone)]
pub struct AccountRef {
    pub provider_account_id: String,
    pub access_token: String,
}

/// Reference to a remote post for stat fetches.
#[derive(Debug, Clone)]
pub struct PostRef {
    pub provider_post_id: String,
    pub access_token: String,
}

/// Target of a reply dispatch: the upstream message being answered.
#[derive(Debug, Clone)]
pub struct ReplyTarget {
    pub provider_message_id: String,
    pub kind: MessageKind,
}

// --- Canonical raw shapes produced by adapters ---

/// One inbound item as yielded by an adapter, before canonicalization.
#[derive(Debug, Clone, PartialEq)]
pub struct RawMessage {
    pub provider_message_id: String,
    pub sender_name: String,
    pub body: String,
    pub kind: MessageKind,
    pub received_at: DateTime<Utc>,
}

/// Account-level counters as reported upstream. `None` means the provider
/// did not report the counter — recorded as absent, never coerced to zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawAccountStats {
    pub followers: Option<i64>,
    pub reach: Option<i64>,
    pub engagement: Option<i64>,
    pub profile_views: Option<i64>,
    pub likes: Option<i64>,
}

/// Post-level counters as reported upstream. Same absent-vs-zero contract
/// as [`RawAccountStats`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawPostStats {
    pub impressions: Option<i64>,
    pub reach: Option<i64>,
    pub engagement: Option<i64>,
    pub likes: Option<i64>,
    pub comments: Option<i64>,
    pub shares: Option<i64>,
}

/// Result of a successful token refresh.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenRefresh {
    pub access_token: String,
    /// Provider-reported expiry. `None` when the provider does not say;
    /// the token lifecycle manager then applies its configured fallback TTL.
    pub expires_at: Option<DateTime<Utc>>,
}

// --- Snapshot rows (append-only) ---

/// One immutable account-level metric snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountSnapshot {
    pub id: i64,
    pub account_id: String,
    pub provider: Provider,
    pub stats: RawAccountStats,
    /// RFC 3339 UTC.
    pub fetched_at: String,
}

/// One immutable post-level metric snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostSnapshot {
    pub id: i64,
    pub post_id: String,
    pub provider: Provider,
    pub stats: RawPostStats,
    /// RFC 3339 UTC.
    pub fetched_at: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn provider_display_and_parse_round_trip() {
        for provider in [Provider::Facebook, Provider::Instagram, Provider::Tiktok] {
            let s = provider.to_string();
            assert_eq!(Provider::from_str(&s).unwrap(), provider);
        }
        assert_eq!(Provider::Facebook.to_string(), "facebook");
    }

    #[test]
    fn status_enums_serialize_lowercase() {
        assert_eq!(
            serde_json::to_string(&AccountStatus::Disabled).unwrap(),
            "\"disabled\""
        );
        assert_eq!(
            serde_json::to_string(&MessageStatus::Replied).unwrap(),
            "\"replied\""
        );
        assert_eq!(
            serde_json::to_string(&MessageKind::Comment).unwrap(),
            "\"comment\""
        );
    }

    #[test]
    fn account_ref_carries_credential_fields() {
        let account = ConnectedAccount {
            id: "acc-1".into(),
            tenant_id: "t-1".into(),
            provider: Provider::Instagram,
            provider_account_id: "ig-99".into(),
            access_token: "tok".into(),
            refresh_token: None,
            token_expires_at: None,
            status: AccountStatus::Active,
        };
        let account_ref = account.account_ref();
        assert_eq!(account_ref.provider_account_id, "ig-99");
        assert_eq!(account_ref.access_token, "tok");
    }

    #[test]
    fn raw_stats_default_to_all_absent() {
        let stats = RawAccountStats::default();
        assert!(stats.followers.is_none());
        assert!(stats.reach.is_none());
        assert!(stats.likes.is_none());
    }
}
