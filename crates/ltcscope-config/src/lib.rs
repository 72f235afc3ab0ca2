// SPDX-FileCopyrightText: 2026 LtcScope Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration system for LtcScope.
//!
//! Provides TOML configuration parsing with strict validation (`deny_unknown_fields`),
//! XDG file hierarchy lookup, `LTCSCOPE_*` environment variable overrides (including
//! one API credential per pipeline stage), and miette diagnostic rendering with
//! typo suggestions.

pub mod diagnostic;
pub mod loader;
pub mod model;
pub mod validation;

use std::path::Path;

pub use diagnostic::{ConfigError, render_errors};
pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::{DiscoverConfig, LtcConfig, Stage};

/// Load configuration from the XDG hierarchy (or an explicit file) and validate it.
pub fn load_and_validate(explicit: Option<&Path>) -> Result<LtcConfig, Vec<ConfigError>> {
    let loaded = match explicit {
        Some(path) => loader::load_config_from_path(path),
        None => loader::load_config(),
    };
    match loaded {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => {
            let toml_sources = collect_toml_sources(explicit);
            Err(diagnostic::figment_to_config_errors(err, &toml_sources))
        }
    }
}

/// Load configuration from a TOML string and validate it.
pub fn load_and_validate_str(toml_content: &str) -> Result<LtcConfig, Vec<ConfigError>> {
    match loader::load_config_from_str(toml_content) {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => {
            let sources = vec![("<inline>".to_string(), toml_content.to_string())];
            Err(diagnostic::figment_to_config_errors(err, &sources))
        }
    }
}

/// Collect TOML source file contents for error span resolution.
fn collect_toml_sources(explicit: Option<&Path>) -> Vec<(String, String)> {
    let mut candidates = Vec::new();
    match explicit {
        Some(path) => candidates.push(path.to_path_buf()),
        None => {
            if let Ok(dir) = std::env::current_dir() {
                candidates.push(dir.join("ltcscope.toml"));
            }
            if let Some(config_dir) = dirs::config_dir() {
                candidates.push(config_dir.join("ltcscope/ltcscope.toml"));
            }
            candidates.push("/etc/ltcscope/ltcscope.toml".into());
        }
    }

    candidates
        .into_iter()
        .filter_map(|path| {
            std::fs::read_to_string(&path)
                .ok()
                .map(|content| (path.display().to_string(), content))
        })
        .collect()
}
