// SPDX-FileCopyrightText: 2026 Syndica Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Instagram Graph API adapter.
//!
//! Differs from the Facebook edge layout: inbound items carry `username`
//! and `text` fields and a unix `timestamp`, and token refresh goes
//! through the long-lived-token exchange endpoint.

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

const DEFAULT_API_BASE: &str = "https://graph.instagram.com";

/// Instagram Graph API adapter.
pub struct InstagramAdapter {
    client: ProviderClient,
}

impl InstagramAdapter {
    pub fn new(config: &ProviderConfig) -> Result<Self, SyndicaError> {
        let client = ProviderClient::new(Provider::Instagram, DEFAULT_API_BASE, config)?;
        Ok(Self { client })
    }

    async fn fetch_edge(
        &self,
        account: &AccountRef,
        edge: &str,
        kind: MessageKind,
        since: Option<DateTime<Utc>>,
        out: &mut Vec<Result<RawMessage, SyndicaError>>,
    ) -> Result<(), SyndicaError> {
        let path = format!("/{}/{edge}", account.provider_account_id);
        let since_param = since.map(|t| t.timestamp().to_string());
        let mut query: Vec<(&str, &str)> = vec![
            ("access_token", account.access_token.as_str()),
            ("fields", "id,username,text,timestamp"),
        ];
        if let Some(since) = since_param.as_deref() {
            query.push(("since", since));
        }

        let page: IgItemList = self.client.get_json(&path, &query).await?;
        for item in page.data {
            out.push(Ok(RawMessage {
                provider_message_id: item.id,
                sender_name: item.username.unwrap_or_default(),
                body: item.text.unwrap_or_default(),
                kind,
                received_at: DateTime::from_timestamp(item.timestamp, 0)
                    .unwrap_or_else(Utc::now),
            }));
        }
        Ok(())
    }
}

#[async_trait]
impl PlatformAdapter for InstagramAdapter {
    fn name(&self) -> &str {
        "instagram"
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
impl ProviderAdapter for InstagramAdapter {
    fn provider(&self) -> Provider {
        Provider::Instagram
    }

    async fn validate_token(&self, access_token: &str) -> Result<bool, SyndicaError> {
        let result: Result<IgIdentity, SyndicaError> = self
            .client
            .get_json("/me", &[("fields", "id"), ("access_token", access_token)])
            .await;
        match result {
            Ok(_) => Ok(true),
            Err(e) if e.is_auth() => Ok(false),
            Err(e) => Err(e),
        }
    }

    async fn refresh_token(&self, refresh_token: &str) -> Result<TokenRefresh, SyndicaError> {
        let response: IgTokenResponse = self
            .client
            .get_json(
                "/refresh_access_token",
                &[
                    ("grant_type", "ig_refresh_token"),
                    ("access_token", refresh_token),
                ],
            )
            .await?;
        let expires_at = response
            .expires_in
            .map(|secs| Utc::now() + chrono::Duration::seconds(secs));
        debug!(has_expiry = expires_at.is_some(), "instagram token refreshed");
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
        self.fetch_edge(account, "messages", MessageKind::Message, since, &mut items)
            .await?;
        self.fetch_edge(account, "media_comments", MessageKind::Comment, since, &mut items)
            .await?;
        Ok(Box::pin(stream::iter(items)))
    }

    async fn fetch_account_stats(
        &self,
        account: &AccountRef,
    ) -> Result<RawAccountStats, SyndicaError> {
        let path = format!("/{}/insights", account.provider_account_id);
        let response: IgInsightsResponse = self
            .client
            .get_json(
                &path,
                &[
                    ("access_token", account.access_token.as_str()),
                    ("metric", "follower_count,reach,accounts_engaged,profile_views,likes"),
                ],
            )
            .await?;
        let value = |name: &str| {
            response
                .data
                .iter()
                .find(|m| m.name == name)
                .and_then(|m| m.values.first())
                .map(|v| v.value)
        };
        Ok(RawAccountStats {
            followers: value("follower_count"),
            reach: value("reach"),
            engagement: value("accounts_engaged"),
            profile_views: value("profile_views"),
            likes: value("likes"),
        })
    }

    async fn fetch_post_stats(&self, post: &PostRef) -> Result<RawPostStats, SyndicaError> {
        let path = format!("/{}/insights", post.provider_post_id);
        let response: IgInsightsResponse = self
            .client
            .get_json(
                &path,
                &[
                    ("access_token", post.access_token.as_str()),
                    ("metric", "impressions,reach,total_interactions,likes,comments,shares"),
                ],
            )
            .await?;
        let value = |name: &str| {
            response
                .data
                .iter()
                .find(|m| m.name == name)
                .and_then(|m| m.values.first())
                .map(|v| v.value)
        };
        Ok(RawPostStats {
            impressions: value("impressions"),
            reach: value("reach"),
            engagement: value("total_interactions"),
            likes: value("likes"),
            comments: value("comments"),
            shares: value("shares"),
        })
    }

    async fn send_reply(
        &self,
        account: &AccountRef,
        target: &ReplyTarget,
        text: &str,
    ) -> Result<(), SyndicaError> {
        let path = match target.kind {
            MessageKind::Message => format!("/{}/messages", account.provider_account_id),
            MessageKind::Comment => format!("/{}/replies", target.provider_message_id),
        };
        let body = serde_json::json!({
            "recipient_message_id": target.provider_message_id,
            "message": text,
            "access_token": account.access_token,
        });
        let _response: IgReplyResponse = self.client.post_json(&path, &body).await?;
        Ok(())
    }
}

// --- Instagram wire shapes ---

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct IgIdentity {
    id: String,
}

#[derive(Debug, Deserialize)]
struct IgTokenResponse {
    access_token: String,
    expires_in: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct IgItemList {
    #[serde(default)]
    data: Vec<IgInboxItem>,
}

#[derive(Debug, Deserialize)]
struct IgInboxItem {
    id: String,
    username: Option<String>,
    text: Option<String>,
    /// Unix seconds.
    timestamp: i64,
}

#[derive(Debug, Deserialize)]
struct IgInsightsResponse {
    #[serde(default)]
    data: Vec<IgMetric>,
}

#[derive(Debug, Deserialize)]
struct IgMetric {
    name: String,
    #[serde(default)]
    values: Vec<IgMetricValue>,
}

#[derive(Debug, Deserialize)]
struct IgMetricValue {
    value: i64,
}

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct IgReplyResponse {
    id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn adapter_for(server: &MockServer) -> InstagramAdapter {
        InstagramAdapter::new(&ProviderConfig {
            enabled: true,
            api_base: Some(server.uri()),
            request_timeout_secs: 2,
            fallback_token_ttl_secs: 7200,
        })
        .unwrap()
    }

    fn account() -> AccountRef {
        AccountRef {
            provider_account_id: "ig-1".into(),
            access_token: "tok".into(),
        }
    }

    #[tokio::test]
    async fn validate_token_succeeds_on_identity_lookup() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/me"))
            .and(query_param("access_token", "tok"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": "ig-1"})))
            .mount(&server)
            .await;

        let adapter = adapter_for(&server);
        assert!(adapter.validate_token("tok").await.unwrap());
    }

    #[tokio::test]
    async fn validate_token_maps_rejection_to_false() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/me"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let adapter = adapter_for(&server);
        assert!(!adapter.validate_token("tok").await.unwrap());
    }

    #[tokio::test]
    async fn refresh_uses_long_lived_exchange() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/refresh_access_token"))
            .and(query_param("grant_type", "ig_refresh_token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "tok-long",
                "expires_in": 3600
            })))
            .mount(&server)
            .await;

        let adapter = adapter_for(&server);
        let refresh = adapter.refresh_token("refresh-1").await.unwrap();
        assert_eq!(refresh.access_token, "tok-long");
        assert!(refresh.expires_at.is_some());
    }

    #[tokio::test]
    async fn fetch_messages_converts_unix_timestamps() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ig-1/messages"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [{
                    "id": "ig-m1",
                    "username": "carol",
                    "text": "do you ship?",
                    "timestamp": 1772355000
                }]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/ig-1/media_comments"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"data": []})))
            .mount(&server)
            .await;

        let adapter = adapter_for(&server);
        let items: Vec<_> = adapter
            .fetch_messages(&account(), None)
            .await
            .unwrap()
            .collect()
            .await;
        assert_eq!(items.len(), 1);
        let msg = items[0].as_ref().unwrap();
        assert_eq!(msg.sender_name, "carol");
        assert_eq!(msg.received_at.timestamp(), 1772355000);
    }

    #[tokio::test]
    async fn account_stats_reads_nested_metric_values() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ig-1/insights"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [
                    {"name": "follower_count", "values": [{"value": 880}]},
                    {"name": "profile_views", "values": [{"value": 64}]}
                ]
            })))
            .mount(&server)
            .await;

        let adapter = adapter_for(&server);
        let stats = adapter.fetch_account_stats(&account()).await.unwrap();
        assert_eq!(stats.followers, Some(880));
        assert_eq!(stats.profile_views, Some(64));
        assert_eq!(stats.reach, None);
    }

    #[tokio::test]
    async fn comment_reply_goes_to_replies_edge() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/ig-c1/replies"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": "r1"})))
            .expect(1)
            .mount(&server)
            .await;

        let adapter = adapter_for(&server);
        adapter
            .send_reply(
                &account(),
                &ReplyTarget {
                    provider_message_id: "ig-c1".into(),
                    kind: MessageKind::Comment,
                },
                "yes we ship",
            )
            .await
            .unwrap();
    }
}
