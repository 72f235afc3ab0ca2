// SPDX-FileCopyrightText: 2026 LtcScope Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./ltcscope.toml` > `~/.config/ltcscope/ltcscope.toml`
//! > `/etc/ltcscope/ltcscope.toml`, with environment variable overrides via the
//! `LTCSCOPE_` prefix.

// figment::Error is external and cannot be boxed without a wrapper.
#![allow(clippy::result_large_err)]

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::LtcConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/ltcscope/ltcscope.toml` (system-wide)
/// 3. `~/.config/ltcscope/ltcscope.toml` (user XDG config)
/// 4. `./ltcscope.toml` (local directory)
/// 5. `LTCSCOPE_*` environment variables
pub fn load_config() -> Result<LtcConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<LtcConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(LtcConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<LtcConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(LtcConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used internally for config loading.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(LtcConfig::default()))
        .merge(Toml::file("/etc/ltcscope/ltcscope.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("ltcscope/ltcscope.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("ltcscope.toml"))
        .merge(env_provider())
}

/// Environment provider with explicit section-to-dot mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` because key names contain
/// underscores: `LTCSCOPE_GITHUB_FILTER_TOKEN` must map to
/// `github.filter_token`, not `github.filter.token`.
pub(crate) fn env_provider() -> Env {
    Env::prefixed("LTCSCOPE_").map(|key| {
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("paths_", "paths.", 1)
            .replacen("archive_", "archive.", 1)
            .replacen("github_", "github.", 1)
            .replacen("retry_", "retry.", 1)
            .replacen("pipeline_", "pipeline.", 1)
            .replacen("discover_", "discover.", 1);
        mapped.into()
    })
}
