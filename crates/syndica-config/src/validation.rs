// SPDX-FileCopyrightText: 2026 Syndica Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes, such as non-empty paths, non-zero intervals, and well-formed
//! API base URLs.

use crate::diagnostic::ConfigError;
use crate::model::{ProviderConfig, SyndicaConfig};

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &SyndicaConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty".to_string(),
        });
    }

    // Zero intervals would make the ticker spin.
    let intervals = [
        (
            "scheduler.token_check_interval_secs",
            config.scheduler.token_check_interval_secs,
        ),
        (
            "scheduler.message_fetch_interval_secs",
            config.scheduler.message_fetch_interval_secs,
        ),
        (
            "scheduler.post_insights_interval_secs",
            config.scheduler.post_insights_interval_secs,
        ),
        (
            "scheduler.account_insights_interval_secs",
            config.scheduler.account_insights_interval_secs,
        ),
    ];
    for (key, value) in intervals {
        if value == 0 {
            errors.push(ConfigError::Validation {
                message: format!("{key} must be at least 1, got 0"),
            });
        }
    }

    if config.scheduler.max_concurrent_units == 0 {
        errors.push(ConfigError::Validation {
            message: "scheduler.max_concurrent_units must be at least 1, got 0".to_string(),
        });
    }

    validate_provider("providers.facebook", &config.providers.facebook, &mut errors);
    validate_provider(
        "providers.instagram",
        &config.providers.instagram,
        &mut errors,
    );
    validate_provider("providers.tiktok", &config.providers.tiktok, &mut errors);

    if let Some(email) = &config.engine.admin_email
        && !email.contains('@')
    {
        errors.push(ConfigError::Validation {
            message: format!("engine.admin_email `{email}` is not a valid email address"),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_provider(section: &str, provider: &ProviderConfig, errors: &mut Vec<ConfigError>) {
    if provider.request_timeout_secs == 0 {
        errors.push(ConfigError::Validation {
            message: format!("{section}.request_timeout_secs must be at least 1, got 0"),
        });
    }

    if provider.fallback_token_ttl_secs == 0 {
        errors.push(ConfigError::Validation {
            message: format!("{section}.fallback_token_ttl_secs must be at least 1, got 0"),
        });
    }

    if let Some(base) = &provider.api_base
        && !(base.starts_with("http://") || base.starts_with("https://"))
    {
        errors.push(ConfigError::Validation {
            message: format!("{section}.api_base `{base}` must start with http:// or https://"),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        let config = SyndicaConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn empty_database_path_fails_validation() {
        let mut config = SyndicaConfig::default();
        config.storage.database_path = "".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains("database_path"))));
    }

    #[test]
    fn zero_interval_fails_validation() {
        let mut config = SyndicaConfig::default();
        config.scheduler.message_fetch_interval_secs = 0;
        let errors = validate_config(&config).unwrap_err();
        assert!(errors.iter().any(
            |e| matches!(e, ConfigError::Validation { message } if message.contains("message_fetch_interval_secs"))
        ));
    }

    #[test]
    fn zero_worker_pool_fails_validation() {
        let mut config = SyndicaConfig::default();
        config.scheduler.max_concurrent_units = 0;
        let errors = validate_config(&config).unwrap_err();
        assert!(errors.iter().any(
            |e| matches!(e, ConfigError::Validation { message } if message.contains("max_concurrent_units"))
        ));
    }

    #[test]
    fn api_base_without_scheme_fails_validation() {
        let mut config = SyndicaConfig::default();
        config.providers.tiktok.api_base = Some("open.tiktokapis.com".to_string());
        let errors = validate_config(&config).unwrap_err();
        assert!(errors.iter().any(
            |e| matches!(e, ConfigError::Validation { message } if message.contains("providers.tiktok.api_base"))
        ));
    }

    #[test]
    fn malformed_admin_email_fails_validation() {
        let mut config = SyndicaConfig::default();
        config.engine.admin_email = Some("ops-at-example.com".to_string());
        let errors = validate_config(&config).unwrap_err();
        assert!(errors.iter().any(
            |e| matches!(e, ConfigError::Validation { message } if message.contains("admin_email"))
        ));
    }

    #[test]
    fn valid_custom_config_passes() {
        let mut config = SyndicaConfig::default();
        config.storage.database_path = "/tmp/syndica.db".to_string();
        config.providers.facebook.enabled = true;
        config.providers.facebook.api_base = Some("https://graph.example.test".to_string());
        config.engine.admin_email = Some("ops@example.com".to_string());
        assert!(validate_config(&config).is_ok());
    }
}
