// SPDX-FileCopyrightText: 2026 Syndica Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Provider adapter trait for social platform integrations
//! (Facebook, Instagram, TikTok, etc.).

use std::pin::Pin;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures_core::Stream;

use crate::error::SyndicaError;
use crate::traits::adapter::PlatformAdapter;
use crate::types::{
    AccountRef, PostRef, Provider, RawAccountStats, RawMessage, RawPostStats, ReplyTarget,
    TokenRefresh,
};

/// A finite stream of inbound items for one account. Items are yielded in
/// the order the provider returns them.
pub type MessageStream =
    Pin<Box<dyn Stream<Item = Result<RawMessage, SyndicaError>> + Send>>;

/// Adapter for one external social platform.
///
/// All operations are subject to the adapter's per-call timeout, after which
/// they fail with [`SyndicaError::ProviderUnavailable`]. Implementations map
/// provider payloads to the canonical `Raw*` shapes; provider-specific types
/// never cross this boundary.
#[async_trait]
pub trait ProviderAdapter: PlatformAdapter {
    /// The platform this adapter talks to.
    fn provider(&self) -> Provider;

    /// Checks whether an access token is still accepted by the provider.
    ///
    /// Returns `Err` (not `Ok(false)`) when validity cannot be confirmed at
    /// all — the token lifecycle manager treats both the same way and falls
    /// through to a refresh attempt.
    async fn validate_token(&self, access_token: &str) -> Result<bool, SyndicaError>;

    /// Exchanges a refresh token for a new access token.
    async fn refresh_token(&self, refresh_token: &str) -> Result<TokenRefresh, SyndicaError>;

    /// Fetches inbound messages and comments for an account, newest window
    /// bounded by `since` when given.
    async fn fetch_messages(
        &self,
        account: &AccountRef,
        since: Option<DateTime<Utc>>,
    ) -> Result<MessageStream, SyndicaError>;

    /// Fetches current account-level counters.
    async fn fetch_account_stats(
        &self,
        account: &AccountRef,
    ) -> Result<RawAccountStats, SyndicaError>;

    /// Fetches current post-level counters.
    async fn fetch_post_stats(&self, post: &PostRef) -> Result<RawPostStats, SyndicaError>;

    /// Sends an automated reply to an inbound message or comment.
    async fn send_reply(
        &self,
        account: &AccountRef,
        target: &ReplyTarget,
        text: &str,
    ) -> Result<(), SyndicaError>;
}
