// SPDX-FileCopyrightText: 2026 LtcScope Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the LtcScope pipeline.

use std::path::PathBuf;

use thiserror::Error;

/// The primary error type used across all LtcScope crates.
#[derive(Debug, Error)]
pub enum LtcError {
    /// Configuration errors (invalid TOML, missing credential, bad values).
    #[error("configuration error: {0}")]
    Config(String),

    /// Filesystem errors while reading dumps or writing tables.
    #[error("i/o error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A required per-repository input file does not exist.
    ///
    /// The worker pool maps this to a skipped repository rather than a failure.
    #[error("missing input file {}", path.display())]
    MissingInput { path: PathBuf },

    /// Malformed JSON, CSV or timestamp data.
    #[error("parse error in {context}: {message}")]
    Parse { context: String, message: String },

    /// HTTP client construction or transport errors that cannot be treated
    /// as end-of-stream.
    #[error("http error: {message}")]
    Http {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A listing ended early and what arrived cannot stand in for the whole.
    ///
    /// Raised for an empty truncated listing, which is indistinguishable from
    /// a failed request, and wherever a partial result must not be saved.
    /// Table tasks skip the contributor instead of writing a zero.
    #[error("listing {url} ended early")]
    Incomplete { url: String },

    /// The rate-limit query kept failing and quota state is unknown.
    #[error("rate limit error: {0}")]
    RateLimit(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl LtcError {
    /// Wrap an `std::io::Error` with the path it happened on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        LtcError::Io {
            path: path.into(),
            source,
        }
    }

    /// Build a parse error for the given context.
    pub fn parse(context: impl Into<String>, message: impl ToString) -> Self {
        LtcError::Parse {
            context: context.into(),
            message: message.to_string(),
        }
    }

    /// True when the error means "input not there", which callers treat as a skip.
    pub fn is_missing_input(&self) -> bool {
        matches!(self, LtcError::MissingInput { .. })
    }

    /// True for an unconfirmed empty listing; the work should be retried later.
    pub fn is_incomplete(&self) -> bool {
        matches!(self, LtcError::Incomplete { .. })
    }
}
