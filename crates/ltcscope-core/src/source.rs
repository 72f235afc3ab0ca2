// SPDX-FileCopyrightText: 2026 LtcScope Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Archive-vs-live source resolution.
//!
//! The historical archive covers everything up to a fixed cutoff instant. A
//! parent entity (issue or pull request) created at or before the cutoff has
//! its events resolved from the archive by integer id; anything newer is
//! resolved by fetching its events listing. A parent is resolved through
//! exactly one of the two, never both.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};

use crate::error::LtcError;

/// Last instant covered by the default historical export.
pub const DEFAULT_ARCHIVE_CUTOFF: &str = "2021-03-06T23:57:37Z";

/// The archive coverage boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArchiveCutoff(DateTime<Utc>);

impl ArchiveCutoff {
    pub fn new(instant: DateTime<Utc>) -> Self {
        Self(instant)
    }

    /// Parse an RFC 3339 instant.
    pub fn parse(s: &str) -> Result<Self, LtcError> {
        DateTime::parse_from_rfc3339(s)
            .map(|t| Self(t.with_timezone(&Utc)))
            .map_err(|e| LtcError::parse("archive cutoff", e))
    }

    pub fn instant(&self) -> DateTime<Utc> {
        self.0
    }

    /// The archive is the source of truth at or before the cutoff.
    pub fn covers(&self, t: DateTime<Utc>) -> bool {
        t <= self.0
    }

    /// Pick the single source for a parent entity's events.
    ///
    /// Returns `None` when the parent lacks the identifier its source needs.
    pub fn resolve(
        &self,
        created_at: DateTime<Utc>,
        id: Option<i64>,
        events_url: Option<String>,
    ) -> Option<RecordSource> {
        if self.covers(created_at) {
            id.map(RecordSource::Archived)
        } else {
            events_url.map(RecordSource::Live)
        }
    }
}

impl Default for ArchiveCutoff {
    fn default() -> Self {
        // The constant is a valid RFC 3339 literal.
        Self::parse(DEFAULT_ARCHIVE_CUTOFF).unwrap_or(Self(DateTime::<Utc>::MIN_UTC))
    }
}

/// Where a parent entity's events come from.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum RecordSource {
    /// Archive rows keyed by the parent's integer id.
    Archived(i64),
    /// A live events listing URL.
    Live(String),
}

/// Deduplicated parents split by source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceSplit {
    pub archived: BTreeSet<i64>,
    pub live: BTreeSet<String>,
}

impl SourceSplit {
    pub fn insert(&mut self, source: RecordSource) {
        match source {
            RecordSource::Archived(id) => {
                self.archived.insert(id);
            }
            RecordSource::Live(url) => {
                self.live.insert(url);
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.archived.is_empty() && self.live.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn default_cutoff_matches_export_boundary() {
        let cutoff = ArchiveCutoff::default();
        assert_eq!(
            cutoff.instant(),
            Utc.with_ymd_and_hms(2021, 3, 6, 23, 57, 37).unwrap()
        );
    }

    #[test]
    fn cutoff_instant_itself_is_archived() {
        let cutoff = ArchiveCutoff::default();
        let source = cutoff.resolve(cutoff.instant(), Some(1), Some("u".into()));
        assert_eq!(source, Some(RecordSource::Archived(1)));
    }

    #[test]
    fn after_cutoff_is_live() {
        let cutoff = ArchiveCutoff::default();
        let later = cutoff.instant() + chrono::Duration::seconds(1);
        let source = cutoff.resolve(later, Some(1), Some("u".into()));
        assert_eq!(source, Some(RecordSource::Live("u".into())));
    }

    #[test]
    fn missing_identifier_resolves_nowhere() {
        let cutoff = ArchiveCutoff::default();
        assert_eq!(cutoff.resolve(cutoff.instant(), None, Some("u".into())), None);
    }

    #[test]
    fn split_deduplicates() {
        let mut split = SourceSplit::default();
        split.insert(RecordSource::Archived(1));
        split.insert(RecordSource::Archived(1));
        split.insert(RecordSource::Live("a".into()));
        assert_eq!(split.archived.len(), 1);
        assert_eq!(split.live.len(), 1);
    }
}
