// SPDX-FileCopyrightText: 2026 Syndica Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared HTTP plumbing for provider adapters.
//!
//! Every adapter call goes through [`ProviderClient`], which owns the
//! per-call timeout and the HTTP-status-to-error mapping. Adapters deal
//! only in their own response shapes; nothing reqwest-specific escapes
//! this module.

use std::time::Duration;

use serde::de::DeserializeOwned;
use syndica_config::model::ProviderConfig;
use syndica_core::types::Provider;
use syndica_core::SyndicaError;
use tracing::debug;

/// HTTP client bound to one provider's API.
#[derive(Debug, Clone)]
pub struct ProviderClient {
    provider: Provider,
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl ProviderClient {
    /// Build a client for `provider`, using `config.api_base` when set and
    /// `default_base` otherwise.
    pub fn new(
        provider: Provider,
        default_base: &str,
        config: &ProviderConfig,
    ) -> Result<Self, SyndicaError> {
        let timeout = Duration::from_secs(config.request_timeout_secs);
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SyndicaError::ProviderUnavailable {
                provider,
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        let base_url = config
            .api_base
            .as_deref()
            .unwrap_or(default_base)
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            provider,
            client,
            base_url,
            timeout,
        })
    }

    pub fn provider(&self) -> Provider {
        self.provider
    }

    /// GET `path` with query parameters, decoding a JSON body.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, SyndicaError> {
        let url = format!("{}{path}", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;
        self.decode(path, response).await
    }

    /// POST a JSON body to `path`, decoding a JSON response.
    pub async fn post_json<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<T, SyndicaError> {
        let url = format!("{}{path}", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;
        self.decode(path, response).await
    }

    async fn decode<T: DeserializeOwned>(
        &self,
        path: &str,
        response: reqwest::Response,
    ) -> Result<T, SyndicaError> {
        let status = response.status();
        debug!(provider = %self.provider, path, status = %status, "provider response");

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(self.map_status(status, path, &body));
        }

        let body = response
            .text()
            .await
            .map_err(|e| self.map_send_error(e))?;
        serde_json::from_str(&body).map_err(|e| SyndicaError::ProviderUnavailable {
            provider: self.provider,
            message: format!("unexpected response shape from {path}: {e}"),
            source: Some(Box::new(e)),
        })
    }

    fn map_send_error(&self, err: reqwest::Error) -> SyndicaError {
        if err.is_timeout() {
            return SyndicaError::Timeout {
                duration: self.timeout,
            };
        }
        SyndicaError::ProviderUnavailable {
            provider: self.provider,
            message: format!("HTTP request failed: {err}"),
            source: Some(Box::new(err)),
        }
    }

    fn map_status(&self, status: reqwest::StatusCode, path: &str, body: &str) -> SyndicaError {
        match status.as_u16() {
            401 | 403 => SyndicaError::Auth {
                provider: self.provider,
                message: format!("credential rejected ({status}): {body}"),
            },
            404 => SyndicaError::NotFound {
                provider: self.provider,
                what: path.to_string(),
            },
            _ => SyndicaError::ProviderUnavailable {
                provider: self.provider,
                message: format!("API returned {status}: {body}"),
                source: None,
            },
        }
    }
}
