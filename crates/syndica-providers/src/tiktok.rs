// SPDX-FileCopyrightText: 2026 Syndica Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! TikTok open API adapter.
//!
//! TikTok wraps every response in an envelope with an `error` object and
//! reports failures with HTTP 200, so errors are mapped from the envelope
//! code rather than the status line. List endpoints use POST bodies with
//! `cursor`/`has_more` pagination.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::stream;
use serde::Deserialize;
use tracing::debug;

use syndica_config::model::ProviderConfig;
use syndica_core::types::{
    AccountRef, MessageKind, PostRef, Provider, RawAccountStats, RawMessage, RawPostStats,
    ReplyTarget, TokenRefresh,
};
use syndica_core::{
    AdapterKind, HealthStatus, MessageStream, PlatformAdapter, ProviderAdapter, SyndicaError,
};

use crate::http::ProviderClient;

const DEFAULT_API_BASE: &str = "https://open.tiktokapis.com/v2";

/// TikTok open API adapter.
pub struct TiktokAdapter {
    client: ProviderClient,
}

impl TiktokAdapter {
    pub fn new(config: &ProviderConfig) -> Result<Self, SyndicaError> {
        let client = ProviderClient::new(Provider::Tiktok, DEFAULT_API_BASE, config)?;
        Ok(Self { client })
    }

    /// POST an envelope endpoint and unwrap `data`, mapping envelope error
    /// codes onto the engine error taxonomy.
    async fn call<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        body: serde_json::Value,
    ) -> Result<T, SyndicaError> {
        let envelope: TtEnvelope<T> = self.client.post_json(path, &body).await?;
        if let Some(error) = envelope.error
            && error.code != "ok"
        {
            return Err(map_envelope_error(&error));
        }
        envelope.data.ok_or_else(|| SyndicaError::ProviderUnavailable {
            provider: Provider::Tiktok,
            message: format!("envelope from {path} carried no data"),
            source: None,
        })
    }
}

fn map_envelope_error(error: &TtError) -> SyndicaError {
    match error.code.as_str() {
        "access_token_invalid" | "access_token_expired" | "scope_not_authorized" => {
            SyndicaError::Auth {
                provider: Provider::Tiktok,
                message: error.message.clone(),
            }
        }
        "resource_not_found" => SyndicaError::NotFound {
            provider: Provider::Tiktok,
            what: error.message.clone(),
        },
        _ => SyndicaError::ProviderUnavailable {
            provider: Provider::Tiktok,
            message: format!("{}: {}", error.code, error.message),
            source: None,
        },
    }
}

#[async_trait]
impl PlatformAdapter for TiktokAdapter {
    fn name(&self) -> &str {
        "tiktok"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_kind(&self) -> AdapterKind {
        AdapterKind::Provider
    }

    async fn health_check(&self) -> Result<HealthStatus, SyndicaError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), SyndicaError> {
        Ok(())
    }
}

#[async_trait]
impl ProviderAdapter for TiktokAdapter {
    fn provider(&self) -> Provider {
        Provider::Tiktok
    }

    async fn validate_token(&self, access_token: &str) -> Result<bool, SyndicaError> {
        let result: Result<TtUserInfo, SyndicaError> = self
            .call(
                "/user/info/",
                serde_json::json!({"access_token": access_token}),
            )
            .await;
        match result {
            Ok(_) => Ok(true),
            Err(e) if e.is_auth() => Ok(false),
            Err(e) => Err(e),
        }
    }

    async fn refresh_token(&self, refresh_token: &str) -> Result<TokenRefresh, SyndicaError> {
        let response: TtTokenData = self
            .call(
                "/oauth/token/",
                serde_json::json!({
                    "grant_type": "refresh_token",
                    "refresh_token": refresh_token,
                }),
            )
            .await?;
        let expires_at = response
            .expires_in
            .map(|secs| Utc::now() + chrono::Duration::seconds(secs));
        debug!(has_expiry = expires_at.is_some(), "tiktok token refreshed");
        Ok(TokenRefresh {
            access_token: response.access_token,
            expires_at,
        })
    }

    async fn fetch_messages(
        &self,
        account: &AccountRef,
        since: Option<DateTime<Utc>>,
    ) -> Result<MessageStream, SyndicaError> {
        let mut items = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let mut body = serde_json::json!({
                "access_token": account.access_token,
                "open_id": account.provider_account_id,
                "max_count": 20,
            });
            if let Some(since) = since {
                body["since"] = serde_json::json!(since.timestamp());
            }
            if let Some(cursor) = &cursor {
                body["cursor"] = serde_json::json!(cursor);
            }

            let page: TtMessagePage = self.call("/message/list/", body).await?;
            for item in page.items {
                let kind = match item.item_type.as_str() {
                    "comment" => MessageKind::Comment,
                    _ => MessageKind::Message,
                };
                items.push(Ok(RawMessage {
                    provider_message_id: item.message_id,
                    sender_name: item.sender_nickname.unwrap_or_default(),
                    body: item.content.unwrap_or_default(),
                    kind,
                    received_at: DateTime::from_timestamp(item.create_time, 0)
                        .unwrap_or_else(Utc::now),
                }));
            }

            if !page.has_more {
                break;
            }
            cursor = page.cursor;
            if cursor.is_none() {
                break;
            }
        }

        Ok(Box::pin(stream::iter(items)))
    }

    async fn fetch_account_stats(
        &self,
        account: &AccountRef,
    ) -> Result<RawAccountStats, SyndicaError> {
        let stats: TtAccountStats = self
            .call(
                "/user/stats/",
                serde_json::json!({
                    "access_token": account.access_token,
                    "open_id": account.provider_account_id,
                }),
            )
            .await?;
        Ok(RawAccountStats {
            followers: stats.follower_count,
            reach: stats.video_view_count,
            engagement: stats.engagement_count,
            profile_views: stats.profile_view_count,
            likes: stats.likes_count,
        })
    }

    async fn fetch_post_stats(&self, post: &PostRef) -> Result<RawPostStats, SyndicaError> {
        let stats: TtVideoStats = self
            .call(
                "/video/stats/",
                serde_json::json!({
                    "access_token": post.access_token,
                    "video_id": post.provider_post_id,
                }),
            )
            .await?;
        Ok(RawPostStats {
            impressions: stats.view_count,
            reach: stats.reach_count,
            engagement: stats.engagement_count,
            likes: stats.like_count,
            comments: stats.comment_count,
            shares: stats.share_count,
        })
    }

    async fn send_reply(
        &self,
        account: &AccountRef,
        target: &ReplyTarget,
        text: &str,
    ) -> Result<(), SyndicaError> {
        let path = match target.kind {
            MessageKind::Message => "/message/reply/",
            MessageKind::Comment => "/comment/reply/",
        };
        let _response: TtReplyData = self
            .call(
                path,
                serde_json::json!({
                    "access_token": account.access_token,
                    "open_id": account.provider_account_id,
                    "target_id": target.provider_message_id,
                    "text": text,
                }),
            )
            .await?;
        Ok(())
    }
}

// --- TikTok wire shapes ---

#[derive(Debug, Deserialize)]
struct TtEnvelope<T> {
    data: Option<T>,
    error: Option<TtError>,
}

#[derive(Debug, Deserialize)]
struct TtError {
    code: String,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct TtUserInfo {
    open_id: String,
}

#[derive(Debug, Deserialize)]
struct TtTokenData {
    access_token: String,
    expires_in: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct TtMessagePage {
    #[serde(default)]
    items: Vec<TtInboxItem>,
    cursor: Option<String>,
    #[serde(default)]
    has_more: bool,
}

#[derive(Debug, Deserialize)]
struct TtInboxItem {
    message_id: String,
    #[serde(rename = "type", default)]
    item_type: String,
    sender_nickname: Option<String>,
    content: Option<String>,
    /// Unix seconds.
    create_time: i64,
}

#[derive(Debug, Deserialize)]
struct TtAccountStats {
    follower_count: Option<i64>,
    video_view_count: Option<i64>,
    engagement_count: Option<i64>,
    profile_view_count: Option<i64>,
    likes_count: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct TtVideoStats {
    view_count: Option<i64>,
    reach_count: Option<i64>,
    engagement_count: Option<i64>,
    like_count: Option<i64>,
    comment_count: Option<i64>,
    share_count: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct TtReplyData {
    reply_id: Option<String>,
}
