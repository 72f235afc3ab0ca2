// SPDX-FileCopyrightText: 2026 LtcScope Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration diagnostics.
//!
//! Figment extraction errors become [`ConfigError`]s that point at the
//! offending line of `ltcscope.toml` and suggest the closest valid key.

#![allow(unused_assignments)] // miette's Diagnostic derive generates code triggering this lint

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Jaro-Winkler score a known key must beat to be offered as a correction.
const SUGGESTION_THRESHOLD: f64 = 0.75;

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("unknown configuration key `{key}`")]
    #[diagnostic(
        code(ltcscope::config::unknown_key),
        help("{}", unknown_key_help(suggestion.as_deref(), valid_keys))
    )]
    UnknownKey {
        key: String,
        suggestion: Option<String>,
        valid_keys: String,
        #[label("not a key of this section")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    #[error("`{key}` has the wrong type: {detail}")]
    #[diagnostic(code(ltcscope::config::invalid_type), help("use {expected} here"))]
    InvalidType {
        key: String,
        detail: String,
        expected: String,
    },

    #[error("`{key}` must be set")]
    #[diagnostic(
        code(ltcscope::config::missing_key),
        help("set `{key}` in ltcscope.toml or through its LTCSCOPE_ variable")
    )]
    MissingKey { key: String },

    /// A value that parsed but is out of range or unusable.
    #[error("invalid setting: {message}")]
    #[diagnostic(code(ltcscope::config::validation))]
    Validation { message: String },

    #[error("configuration error: {0}")]
    #[diagnostic(code(ltcscope::config::other))]
    Other(String),
}

fn unknown_key_help(suggestion: Option<&str>, valid_keys: &str) -> String {
    let known = format!("known keys: {valid_keys}");
    match suggestion {
        Some(s) => format!("did you mean `{s}`? {known}"),
        None => known,
    }
}

/// One diagnostic per error carried by `err`.
///
/// `toml_sources` pairs file names with their contents so unknown keys can be
/// underlined in place.
pub fn figment_to_config_errors(
    err: figment::Error,
    toml_sources: &[(String, String)],
) -> Vec<ConfigError> {
    err.into_iter()
        .map(|error| classify(&error, toml_sources))
        .collect()
}

fn classify(error: &figment::Error, toml_sources: &[(String, String)]) -> ConfigError {
    use figment::error::Kind;

    match &error.kind {
        Kind::UnknownField(field, expected) => {
            let (span, src) = match locate(error, field, toml_sources) {
                Some((span, src)) => (Some(span), Some(src)),
                None => (None, None),
            };
            ConfigError::UnknownKey {
                key: field.clone(),
                suggestion: suggest_key(field, expected),
                valid_keys: expected.join(", "),
                span,
                src,
            }
        }
        Kind::MissingField(field) => ConfigError::MissingKey {
            key: qualified(error, field),
        },
        Kind::InvalidType(actual, expected) => ConfigError::InvalidType {
            key: error.path.join("."),
            detail: format!("found {actual}"),
            expected: expected.clone(),
        },
        _ => ConfigError::Other(error.to_string()),
    }
}

/// `section.field` when the error sits inside a section.
fn qualified(error: &figment::Error, field: &str) -> String {
    if error.path.is_empty() {
        field.to_string()
    } else {
        format!("{}.{field}", error.path.join("."))
    }
}

fn locate(
    error: &figment::Error,
    field: &str,
    toml_sources: &[(String, String)],
) -> Option<(SourceSpan, NamedSource<String>)> {
    let path = match error.metadata.as_ref()?.source.as_ref()? {
        figment::Source::File(path) => path.display().to_string(),
        _ => return None,
    };
    let (name, content) = toml_sources.iter().find(|(p, _)| *p == path)?;
    let offset = find_key_offset(content, &error.path, field)?;
    Some((
        SourceSpan::new(offset.into(), field.len()),
        NamedSource::new(name, content.clone()),
    ))
}

/// Byte offset of `field` as a key inside the section named by `path[0]`.
///
/// Top-level keys are searched before the first section header. The search
/// stops at the next header, so a key of the same name elsewhere never matches.
pub fn find_key_offset(content: &str, path: &[String], field: &str) -> Option<usize> {
    let wanted = path.first().map(String::as_str);
    let mut current: Option<&str> = None;
    let mut offset = 0;

    for line in content.split_inclusive('\n') {
        let trimmed = line.trim_start();
        if let Some(header) = trimmed.strip_prefix('[') {
            current = header.split(']').next().map(str::trim);
        } else if current == wanted {
            let after = trimmed.strip_prefix(field);
            if after.is_some_and(|rest| rest.starts_with([' ', '\t', '='])) {
                return Some(offset + (line.len() - trimmed.len()));
            }
        }
        offset += line.len();
    }
    None
}

/// The known key closest to `unknown`, if any is close enough.
pub fn suggest_key<S: AsRef<str>>(unknown: &str, valid_keys: &[S]) -> Option<String> {
    valid_keys
        .iter()
        .map(|key| (strsim::jaro_winkler(unknown, key.as_ref()), key.as_ref()))
        .filter(|(score, _)| *score > SUGGESTION_THRESHOLD)
        .max_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, key)| key.to_string())
}

/// Print every error to stderr with miette's graphical report.
pub fn render_errors(errors: &[ConfigError]) {
    let handler = miette::GraphicalReportHandler::new();
    for error in errors {
        let mut report = String::new();
        match handler.render_report(&mut report, error as &dyn Diagnostic) {
            Ok(()) => eprint!("{report}"),
            Err(_) => eprintln!("error: {error}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suggests_closest_pipeline_key() {
        let valid = ["workers", "log_level", "min_observation_years", "current_year"];
        assert_eq!(suggest_key("wrokers", &valid), Some("workers".to_string()));
        assert_eq!(suggest_key("zzzzzz", &valid), None);
    }

    #[test]
    fn key_offset_is_scoped_to_its_section() {
        let content = "[retry]\nper_pgae = 1\n[github]\nper_pgae = 50\n";
        let path = vec!["github".to_string()];
        let o = find_key_offset(content, &path, "per_pgae").unwrap();
        assert_eq!(o, content.rfind("per_pgae").unwrap());

        assert_eq!(find_key_offset(content, &["paths".to_string()], "per_pgae"), None);
    }

    #[test]
    fn top_level_keys_precede_sections() {
        let content = "worker = 1\n[pipeline]\nworker = 2\n";
        assert_eq!(find_key_offset(content, &[], "worker"), Some(0));
    }
}
