// SPDX-FileCopyrightText: 2026 LtcScope Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.

use crate::diagnostic::ConfigError;
use crate::model::LtcConfig;

/// Upper bound on concurrent repository workers.
pub const MAX_WORKERS: usize = 8;

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns all collected validation errors (does not fail fast).
pub fn validate_config(config: &LtcConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    let paths = [
        ("paths.repo_list", &config.paths.repo_list),
        ("paths.datasets_dir", &config.paths.datasets_dir),
        ("paths.contributors_dir", &config.paths.contributors_dir),
        ("paths.tables_dir", &config.paths.tables_dir),
        ("paths.archive_dir", &config.paths.archive_dir),
    ];
    for (key, value) in paths {
        if value.trim().is_empty() {
            errors.push(ConfigError::Validation {
                message: format!("{key} must not be empty"),
            });
        }
    }

    if let Err(e) = config.archive.cutoff() {
        errors.push(ConfigError::Validation {
            message: format!(
                "archive.cutoff `{}` is not an RFC 3339 instant: {e}",
                config.archive.cutoff
            ),
        });
    }

    if !(1..=MAX_WORKERS).contains(&config.pipeline.workers) {
        errors.push(ConfigError::Validation {
            message: format!(
                "pipeline.workers must be between 1 and {MAX_WORKERS}, got {}",
                config.pipeline.workers
            ),
        });
    }

    if !(1..=100).contains(&config.github.per_page) {
        errors.push(ConfigError::Validation {
            message: format!(
                "github.per_page must be between 1 and 100, got {}",
                config.github.per_page
            ),
        });
    }

    if config.github.api_base_url.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "github.api_base_url must not be empty".to_string(),
        });
    }

    if config.retry.retry_delay_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "retry.retry_delay_secs must be greater than 0".to_string(),
        });
    }

    if config.retry.quota_max_failures == 0 {
        errors.push(ConfigError::Validation {
            message: "retry.quota_max_failures must be at least 1".to_string(),
        });
    }

    if !(1..=1000).contains(&config.discover.max_repos) {
        errors.push(ConfigError::Validation {
            message: format!(
                "discover.max_repos must be between 1 and 1000, got {}",
                config.discover.max_repos
            ),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
