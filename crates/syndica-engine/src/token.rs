// SPDX-FileCopyrightText: 2026 Syndica Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Token lifecycle management for connected accounts.
//!
//! One pass per account per scheduled invocation: validate the current
//! token, and only if validity cannot be confirmed, attempt a single
//! refresh. A failed refresh parks the account in status `error` for
//! operator remediation; there is no retry loop here.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};

use syndica_config::model::ProvidersConfig;
use syndica_core::types::{AccountStatus, ConnectedAccount, Provider};
use syndica_core::{format_utc, ProviderAdapter, Store, SyndicaError};

/// Terminal outcome of one token check for one account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenOutcome {
    /// Current token confirmed valid; nothing written.
    Valid,
    /// Token replaced; account stays `active` with a new expiry.
    Refreshed,
    /// Refresh impossible or rejected; account moved to `error`.
    Failed,
}

pub struct TokenLifecycleManager {
    store: Arc<dyn Store>,
    providers: ProvidersConfig,
    admin_email: Option<String>,
}

impl TokenLifecycleManager {
    pub fn new(
        store: Arc<dyn Store>,
        providers: ProvidersConfig,
        admin_email: Option<String>,
    ) -> Self {
        Self {
            store,
            providers,
            admin_email,
        }
    }

    fn fallback_ttl(&self, provider: Provider) -> chrono::Duration {
        let secs = match provider {
            Provider::Facebook => self.providers.facebook.fallback_token_ttl_secs,
            Provider::Instagram => self.providers.instagram.fallback_token_ttl_secs,
            Provider::Tiktok => self.providers.tiktok.fallback_token_ttl_secs,
        };
        chrono::Duration::seconds(secs as i64)
    }

    /// Run one token check for `account` against its provider's adapter.
    ///
    /// Validation failures of any kind (a definitive "invalid", an auth
    /// rejection, or a transient outage) all fall through to a refresh
    /// attempt: an unconfirmed token is treated the same as an invalid one
    /// rather than guessed at.
    pub async fn check_account(
        &self,
        account: &ConnectedAccount,
        adapter: &dyn ProviderAdapter,
    ) -> Result<TokenOutcome, SyndicaError> {
        match adapter.validate_token(&account.access_token).await {
            Ok(true) => {
                debug!(account = %account.id, "token valid");
                return Ok(TokenOutcome::Valid);
            }
            Ok(false) => {
                debug!(account = %account.id, "token reported invalid, refreshing");
            }
            Err(e) => {
                warn!(
                    account = %account.id,
                    error = %e,
                    "cannot confirm token validity, falling through to refresh"
                );
            }
        }

        let Some(refresh_token) = account.refresh_token.as_deref() else {
            self.mark_error(account, "no refresh token on file").await?;
            return Ok(TokenOutcome::Failed);
        };

        match adapter.refresh_token(refresh_token).await {
            Ok(refresh) => {
                // Provider-reported expiry is authoritative; the configured
                // TTL only covers providers that stay silent about it.
                let expires_at = refresh
                    .expires_at
                    .unwrap_or_else(|| Utc::now() + self.fallback_ttl(account.provider));
                self.store
                    .update_account_token(
                        &account.id,
                        &refresh.access_token,
                        &format_utc(expires_at),
                    )
                    .await?;
                info!(
                    account = %account.id,
                    provider = %account.provider,
                    expires_at = %format_utc(expires_at),
                    "token refreshed"
                );
                Ok(TokenOutcome::Refreshed)
            }
            Err(e) => {
                self.mark_error(account, &format!("refresh rejected: {e}"))
                    .await?;
                Ok(TokenOutcome::Failed)
            }
        }
    }

    async fn mark_error(
        &self,
        account: &ConnectedAccount,
        reason: &str,
    ) -> Result<(), SyndicaError> {
        self.store
            .set_account_status(&account.id, AccountStatus::Error)
            .await?;
        warn!(
            account = %account.id,
            provider = %account.provider,
            reason,
            notify = self.admin_email.as_deref().unwrap_or("unset"),
            "account needs reconnection"
        );
        Ok(())
    }
}
