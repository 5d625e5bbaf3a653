// SPDX-FileCopyrightText: 2026 Syndica Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Facebook Graph API adapter.
//!
//! Inbound items come from two Graph edges (conversations and comments)
//! and are normalized into one stream. Pagination follows Graph cursor
//! semantics: pages are fetched until `paging.next` is absent.

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

const DEFAULT_API_BASE: &str = "https://graph.facebook.com/v19.0";

/// Facebook Graph API adapter.
pub struct FacebookAdapter {
    client: ProviderClient,
}

impl FacebookAdapter {
    pub fn new(config: &ProviderConfig) -> Result<Self, SyndicaError> {
        let client = ProviderClient::new(Provider::Facebook, DEFAULT_API_BASE, config)?;
        Ok(Self { client })
    }

    /// Fetch one paginated Graph edge of inbound items, mapping each into
    /// a canonical [`RawMessage`] of the given kind.
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
        let mut cursor: Option<String> = None;

        loop {
            let mut query: Vec<(&str, &str)> =
                vec![("access_token", account.access_token.as_str())];
            if let Some(since) = since_param.as_deref() {
                query.push(("since", since));
            }
            if let Some(after) = cursor.as_deref() {
                query.push(("after", after));
            }

            let page: FbPage = self.client.get_json(&path, &query).await?;
            for item in page.data {
                out.push(map_item(item, kind));
            }

            let paging = page.paging.unwrap_or_default();
            if paging.next.is_none() {
                break;
            }
            cursor = paging.cursors.and_then(|c| c.after);
            if cursor.is_none() {
                break;
            }
        }
        Ok(())
    }
}

fn map_item(item: FbInboxItem, kind: MessageKind) -> Result<RawMessage, SyndicaError> {
    let received_at = DateTime::parse_from_rfc3339(&item.created_time)
        .map_err(|e| {
            SyndicaError::Internal(format!(
                "unparseable created_time on facebook item {}: {e}",
                item.id
            ))
        })?
        .with_timezone(&Utc);
    Ok(RawMessage {
        provider_message_id: item.id,
        sender_name: item.from.map(|f| f.name).unwrap_or_default(),
        body: item.message.unwrap_or_default(),
        kind,
        received_at,
    })
}

fn stats_value(metrics: &[FbMetric], name: &str) -> Option<i64> {
    metrics.iter().find(|m| m.name == name).map(|m| m.value)
}

#[async_trait]
impl PlatformAdapter for FacebookAdapter {
    fn name(&self) -> &str {
        "facebook"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_kind(&self) -> AdapterKind {
        AdapterKind::Provider
    }

    async fn health_check(&self) -> Result<HealthStatus, SyndicaError> {
        // No credential-free Graph endpoint exists; a constructed client is
        // the strongest signal available without burning rate limit.
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), SyndicaError> {
        Ok(())
    }
}

#[async_trait]
impl ProviderAdapter for FacebookAdapter {
    fn provider(&self) -> Provider {
        Provider::Facebook
    }

    async fn validate_token(&self, access_token: &str) -> Result<bool, SyndicaError> {
        let result: Result<FbDebugResponse, SyndicaError> = self
            .client
            .get_json(
                "/debug_token",
                &[
                    ("input_token", access_token),
                    ("access_token", access_token),
                ],
            )
            .await;
        match result {
            Ok(response) => Ok(response.data.is_valid),
            // A rejected credential is a definitive "invalid", not a failure.
            Err(e) if e.is_auth() => Ok(false),
            Err(e) => Err(e),
        }
    }

    async fn refresh_token(&self, refresh_token: &str) -> Result<TokenRefresh, SyndicaError> {
        let response: FbTokenResponse = self
            .client
            .get_json(
                "/oauth/access_token",
                &[
                    ("grant_type", "fb_exchange_token"),
                    ("fb_exchange_token", refresh_token),
                ],
            )
            .await?;
        let expires_at = response
            .expires_in
            .map(|secs| Utc::now() + chrono::Duration::seconds(secs));
        debug!(has_expiry = expires_at.is_some(), "facebook token refreshed");
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
        self.fetch_edge(account, "conversations", MessageKind::Message, since, &mut items)
            .await?;
        self.fetch_edge(account, "comments", MessageKind::Comment, since, &mut items)
            .await?;
        Ok(Box::pin(stream::iter(items)))
    }

    async fn fetch_account_stats(
        &self,
        account: &AccountRef,
    ) -> Result<RawAccountStats, SyndicaError> {
        let path = format!("/{}/insights", account.provider_account_id);
        let response: FbInsightsResponse = self
            .client
            .get_json(
                &path,
                &[
                    ("access_token", account.access_token.as_str()),
                    (
                        "metric",
                        "page_fans,page_impressions,page_engaged_users,page_views_total",
                    ),
                ],
            )
            .await?;
        Ok(RawAccountStats {
            followers: stats_value(&response.data, "page_fans"),
            reach: stats_value(&response.data, "page_impressions"),
            engagement: stats_value(&response.data, "page_engaged_users"),
            profile_views: stats_value(&response.data, "page_views_total"),
            likes: None,
        })
    }

    async fn fetch_post_stats(&self, post: &PostRef) -> Result<RawPostStats, SyndicaError> {
        let path = format!("/{}/insights", post.provider_post_id);
        let response: FbInsightsResponse = self
            .client
            .get_json(
                &path,
                &[
                    ("access_token", post.access_token.as_str()),
                    (
                        "metric",
                        "post_impressions,post_impressions_unique,post_engaged_users,\
                         post_reactions_like_total,post_comments,post_shares",
                    ),
                ],
            )
            .await?;
        Ok(RawPostStats {
            impressions: stats_value(&response.data, "post_impressions"),
            reach: stats_value(&response.data, "post_impressions_unique"),
            engagement: stats_value(&response.data, "post_engaged_users"),
            likes: stats_value(&response.data, "post_reactions_like_total"),
            comments: stats_value(&response.data, "post_comments"),
            shares: stats_value(&response.data, "post_shares"),
        })
    }

    async fn send_reply(
        &self,
        account: &AccountRef,
        target: &ReplyTarget,
        text: &str,
    ) -> Result<(), SyndicaError> {
        let edge = match target.kind {
            MessageKind::Message => "messages",
            MessageKind::Comment => "comments",
        };
        let path = format!("/{}/{edge}", target.provider_message_id);
        let body = serde_json::json!({
            "message": text,
            "access_token": account.access_token,
        });
        let _response: FbReplyResponse = self.client.post_json(&path, &body).await?;
        Ok(())
    }
}

// --- Graph API wire shapes ---

#[derive(Debug, Deserialize)]
struct FbDebugResponse {
    data: FbDebugData,
}

#[derive(Debug, Deserialize)]
struct FbDebugData {
    is_valid: bool,
}

#[derive(Debug, Deserialize)]
struct FbTokenResponse {
    access_token: String,
    expires_in: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct FbPage {
    #[serde(default)]
    data: Vec<FbInboxItem>,
    paging: Option<FbPaging>,
}

#[derive(Debug, Default, Deserialize)]
struct FbPaging {
    cursors: Option<FbCursors>,
    next: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FbCursors {
    after: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FbInboxItem {
    id: String,
    from: Option<FbSender>,
    message: Option<String>,
    created_time: String,
}

#[derive(Debug, Deserialize)]
struct FbSender {
    name: String,
}

#[derive(Debug, Deserialize)]
struct FbMetric {
    name: String,
    value: i64,
}

#[derive(Debug, Deserialize)]
struct FbInsightsResponse {
    #[serde(default)]
    data: Vec<FbMetric>,
}

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct FbReplyResponse {
    id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use wiremock::matchers::{body_json_string, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn adapter_for(server: &MockServer) -> FacebookAdapter {
        FacebookAdapter::new(&ProviderConfig {
            enabled: true,
            api_base: Some(server.uri()),
            request_timeout_secs: 2,
            fallback_token_ttl_secs: 7200,
        })
        .unwrap()
    }

    fn account() -> AccountRef {
        AccountRef {
            provider_account_id: "page-1".into(),
            access_token: "tok".into(),
        }
    }

    #[tokio::test]
    async fn validate_token_reads_is_valid_flag() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/debug_token"))
            .and(query_param("input_token", "tok"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": {"is_valid": false}
            })))
            .mount(&server)
            .await;

        let adapter = adapter_for(&server);
        assert!(!adapter.validate_token("tok").await.unwrap());
    }

    #[tokio::test]
    async fn validate_token_treats_rejection_as_invalid() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/debug_token"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let adapter = adapter_for(&server);
        assert!(!adapter.validate_token("tok").await.unwrap());
    }

    #[tokio::test]
    async fn validate_token_propagates_outages() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/debug_token"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let adapter = adapter_for(&server);
        let err = adapter.validate_token("tok").await.unwrap_err();
        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn refresh_token_uses_provider_expiry() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/oauth/access_token"))
            .and(query_param("grant_type", "fb_exchange_token"))
            .and(query_param("fb_exchange_token", "refresh-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "tok-new",
                "expires_in": 5184000
            })))
            .mount(&server)
            .await;

        let adapter = adapter_for(&server);
        let refresh = adapter.refresh_token("refresh-1").await.unwrap();
        assert_eq!(refresh.access_token, "tok-new");
        let remaining = refresh.expires_at.unwrap() - Utc::now();
        assert!(remaining > chrono::Duration::days(59));
    }

    #[tokio::test]
    async fn refresh_token_without_expiry_yields_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/oauth/access_token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "tok-new"
            })))
            .mount(&server)
            .await;

        let adapter = adapter_for(&server);
        let refresh = adapter.refresh_token("refresh-1").await.unwrap();
        assert!(refresh.expires_at.is_none());
    }

    #[tokio::test]
    async fn fetch_messages_merges_conversations_and_comments() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/page-1/conversations"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [{
                    "id": "fb-m1",
                    "from": {"name": "Alice"},
                    "message": "hello there",
                    "created_time": "2026-03-01T09:30:00+00:00"
                }]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/page-1/comments"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [{
                    "id": "fb-c1",
                    "from": {"name": "Bob"},
                    "message": "nice post",
                    "created_time": "2026-03-01T10:00:00+00:00"
                }]
            })))
            .mount(&server)
            .await;

        let adapter = adapter_for(&server);
        let stream = adapter.fetch_messages(&account(), None).await.unwrap();
        let items: Vec<_> = stream.collect().await;
        assert_eq!(items.len(), 2);

        let first = items[0].as_ref().unwrap();
        assert_eq!(first.provider_message_id, "fb-m1");
        assert_eq!(first.kind, MessageKind::Message);
        assert_eq!(first.sender_name, "Alice");

        let second = items[1].as_ref().unwrap();
        assert_eq!(second.kind, MessageKind::Comment);
    }

    #[tokio::test]
    async fn fetch_messages_follows_pagination_cursors() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/page-1/conversations"))
            .and(query_param("after", "cur-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [{
                    "id": "fb-m2",
                    "from": {"name": "Alice"},
                    "message": "second page",
                    "created_time": "2026-03-01T09:31:00+00:00"
                }]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/page-1/conversations"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [{
                    "id": "fb-m1",
                    "from": {"name": "Alice"},
                    "message": "first page",
                    "created_time": "2026-03-01T09:30:00+00:00"
                }],
                "paging": {"cursors": {"after": "cur-1"}, "next": "ignored"}
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/page-1/comments"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"data": []})))
            .mount(&server)
            .await;

        let adapter = adapter_for(&server);
        let stream = adapter.fetch_messages(&account(), None).await.unwrap();
        let items: Vec<_> = stream.collect().await;
        let ids: Vec<_> = items
            .iter()
            .map(|r| r.as_ref().unwrap().provider_message_id.clone())
            .collect();
        assert_eq!(ids, vec!["fb-m1", "fb-m2"]);
    }

    #[tokio::test]
    async fn fetch_account_stats_leaves_unreported_metrics_absent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/page-1/insights"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [
                    {"name": "page_fans", "value": 1200},
                    {"name": "page_impressions", "value": 54000}
                ]
            })))
            .mount(&server)
            .await;

        let adapter = adapter_for(&server);
        let stats = adapter.fetch_account_stats(&account()).await.unwrap();
        assert_eq!(stats.followers, Some(1200));
        assert_eq!(stats.reach, Some(54000));
        assert_eq!(stats.engagement, None);
        assert_eq!(stats.profile_views, None);
    }

    #[tokio::test]
    async fn fetch_post_stats_for_deleted_post_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/post-9/insights"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let adapter = adapter_for(&server);
        let err = adapter
            .fetch_post_stats(&PostRef {
                provider_post_id: "post-9".into(),
                access_token: "tok".into(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, SyndicaError::NotFound { .. }));
    }

    #[tokio::test]
    async fn send_reply_targets_the_right_edge() {
        let server = MockServer::start().await;
        let expected = serde_json::json!({
            "message": "thanks!",
            "access_token": "tok",
        });
        Mock::given(method("POST"))
            .and(path("/fb-c1/comments"))
            .and(body_json_string(expected.to_string()))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": "r1"})))
            .expect(1)
            .mount(&server)
            .await;

        let adapter = adapter_for(&server);
        adapter
            .send_reply(
                &account(),
                &ReplyTarget {
                    provider_message_id: "fb-c1".into(),
                    kind: MessageKind::Comment,
                },
                "thanks!",
            )
            .await
            .unwrap();
    }
}
