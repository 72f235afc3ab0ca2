// SPDX-FileCopyrightText: 2026 LtcScope Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The named export tables a stage needs, loaded once and shared read-only.

use std::collections::HashMap;
use std::path::Path;

use ltcscope_config::model::ArchiveConfig;
use ltcscope_core::LtcError;
use strum::{Display, EnumIter};
use tracing::warn;

use crate::table::ArchiveTable;

/// The export tables the pipeline knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum ArchiveKind {
    IssueEvents,
    PullEvents,
    Watchers,
    Issues,
    Followers,
    Commits,
}

impl ArchiveKind {
    /// Columns indexed for keyed lookups.
    pub fn key_columns(self) -> &'static [&'static str] {
        match self {
            ArchiveKind::IssueEvents => &[columns::ISSUE_ID],
            ArchiveKind::PullEvents => &[columns::PULL_REQUEST_ID],
            ArchiveKind::Watchers => &[columns::REPO_ID, columns::USER_ID],
            ArchiveKind::Issues => &[columns::REPORTER_ID],
            ArchiveKind::Followers => &[columns::USER_ID],
            ArchiveKind::Commits => &[columns::AUTHOR_ID],
        }
    }

    pub fn file_name(self, config: &ArchiveConfig) -> &str {
        match self {
            ArchiveKind::IssueEvents => &config.issue_events,
            ArchiveKind::PullEvents => &config.pull_events,
            ArchiveKind::Watchers => &config.watchers,
            ArchiveKind::Issues => &config.issues,
            ArchiveKind::Followers => &config.followers,
            ArchiveKind::Commits => &config.commits,
        }
    }
}

/// Column names used by the export tables.
pub mod columns {
    pub const ISSUE_ID: &str = "issue_id";
    pub const PULL_REQUEST_ID: &str = "pull_request_id";
    pub const ACTION: &str = "action";
    pub const REPO_ID: &str = "repo_id";
    pub const USER_ID: &str = "user_id";
    pub const REPORTER_ID: &str = "reporter_id";
    /// 0 for issues, 1 for pull requests.
    pub const PULL_REQUEST: &str = "pull_request";
    pub const AUTHOR_ID: &str = "author_id";
    pub const PROJECT_ID: &str = "project_id";
}

/// Loaded export tables keyed by kind.
#[derive(Debug, Default)]
pub struct ArchiveSet {
    tables: HashMap<ArchiveKind, ArchiveTable>,
}

impl ArchiveSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the requested tables from `dir`.
    ///
    /// Missing files are logged and left out; callers decide whether a missing
    /// table skips their stage. Malformed files are errors.
    pub fn load(
        dir: &Path,
        config: &ArchiveConfig,
        kinds: &[ArchiveKind],
    ) -> Result<Self, LtcError> {
        let mut set = Self::new();
        for &kind in kinds {
            let path = dir.join(kind.file_name(config));
            match ArchiveTable::load(&path, kind.key_columns()) {
                Ok(table) => set.insert(kind, table),
                Err(e) if e.is_missing_input() => {
                    warn!(table = %kind, path = %path.display(), "archive table not found");
                }
                Err(e) => return Err(e),
            }
        }
        Ok(set)
    }

    pub fn insert(&mut self, kind: ArchiveKind, table: ArchiveTable) {
        self.tables.insert(kind, table);
    }

    pub fn get(&self, kind: ArchiveKind) -> Option<&ArchiveTable> {
        self.tables.get(&kind)
    }

    /// The table, or a `MissingInput` error naming it.
    pub fn require(&self, kind: ArchiveKind) -> Result<&ArchiveTable, LtcError> {
        self.get(kind).ok_or_else(|| LtcError::MissingInput {
            path: format!("{kind} archive table").into(),
        })
    }

    pub fn contains(&self, kind: ArchiveKind) -> bool {
        self.tables.contains_key(&kind)
    }

    /// Kinds from `kinds` that are not loaded.
    pub fn missing(&self, kinds: &[ArchiveKind]) -> Vec<ArchiveKind> {
        kinds.iter().copied().filter(|k| !self.contains(*k)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn every_kind_has_a_file_and_keys() {
        let config = ArchiveConfig::default();
        for kind in ArchiveKind::iter() {
            assert!(!kind.file_name(&config).is_empty());
            assert!(!kind.key_columns().is_empty());
        }
        assert_eq!(ArchiveKind::IssueEvents.to_string(), "issue_events");
    }

    #[test]
    fn require_reports_missing_tables() {
        let set = ArchiveSet::new();
        let err = set.require(ArchiveKind::Watchers).unwrap_err();
        assert!(err.is_missing_input());
        assert_eq!(
            set.missing(&[ArchiveKind::Watchers, ArchiveKind::Issues]),
            vec![ArchiveKind::Watchers, ArchiveKind::Issues]
        );
    }
}
