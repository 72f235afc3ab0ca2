// SPDX-FileCopyrightText: 2026 LtcScope Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for LtcScope.
//!
//! This crate provides the error type, the repository and contributor domain
//! types, the activity records read from API dumps, observation windows, the
//! archive-vs-live source resolution and the listing adapter trait used by
//! every pipeline stage.

pub mod error;
pub mod records;
pub mod source;
pub mod traits;
pub mod types;
pub mod window;

pub use error::LtcError;
pub use source::{ArchiveCutoff, RecordSource, SourceSplit};
pub use traits::{Listing, ListingSource, RetryPolicy};
pub use types::{Contributor, LtcFlags, RawContributor, Repository, TenureFlags, YesNo};
pub use window::Window;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ltc_error_has_all_variants() {
        let _config = LtcError::Config("test".into());
        let _io = LtcError::io("/tmp/x", std::io::Error::other("test"));
        let _missing = LtcError::MissingInput {
            path: "/tmp/x".into(),
        };
        let _parse = LtcError::parse("ctx", "bad");
        let _http = LtcError::Http {
            message: "test".into(),
            source: None,
        };
        let _rate = LtcError::RateLimit("test".into());
        let _internal = LtcError::Internal("test".into());
        let _incomplete = LtcError::Incomplete {
            url: "https://api.github.com/x".into(),
        };
    }

    #[test]
    fn missing_input_is_recognized() {
        let err = LtcError::MissingInput {
            path: "commits.json".into(),
        };
        assert!(err.is_missing_input());
        assert!(err.to_string().contains("commits.json"));
        assert!(!LtcError::Internal("x".into()).is_missing_input());
        assert!(!LtcError::Internal("x".into()).is_incomplete());
    }

    #[test]
    fn retry_policy_counts_attempts() {
        assert_eq!(RetryPolicy::NONE.attempts(), 1);
        let policy = RetryPolicy::fixed(6, std::time::Duration::from_secs(5));
        assert_eq!(policy.attempts(), 7);
    }

    #[test]
    fn listing_source_is_object_safe() {
        fn _assert_dyn(_: &dyn ListingSource) {}
    }
}
