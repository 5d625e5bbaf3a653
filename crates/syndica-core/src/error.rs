// SPDX-FileCopyrightText: 2026 Syndica Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Syndica sync engine.

use thiserror::Error;

use crate::types::Provider;

/// The primary error type used across adapter traits and engine operations.
#[derive(Debug, Error)]
pub enum SyndicaError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (database connection, query failure, serialization).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Credential rejected or expired at the provider. Triggers a refresh
    /// attempt; the account transitions to `error` if that fails too.
    #[error("auth error on {provider}: {message}")]
    Auth { provider: Provider, message: String },

    /// Transient provider failure (network, rate limit, 5xx). The unit is
    /// skipped this pass and retried on the next scheduled invocation.
    #[error("provider {provider} unavailable: {message}")]
    ProviderUnavailable {
        provider: Provider,
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Referenced remote entity is gone (deleted post, removed account).
    #[error("{what} not found on {provider}")]
    NotFound { provider: Provider, what: String },

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Requested adapter was not found in the registry.
    #[error("no adapter registered for provider {0}")]
    AdapterNotFound(Provider),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl SyndicaError {
    /// True for credential failures that should trigger a token refresh.
    pub fn is_auth(&self) -> bool {
        matches!(self, SyndicaError::Auth { .. })
    }

    /// True for failures expected to clear on their own by the next pass.
    ///
    /// Timeouts count as transient: the per-call deadline is the cancellation
    /// mechanism for in-flight adapter calls, not a sign the unit is broken.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            SyndicaError::ProviderUnavailable { .. } | SyndicaError::Timeout { .. }
        )
    }
}
