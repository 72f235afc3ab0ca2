// SPDX-FileCopyrightText: 2026 LtcScope Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! On-disk layout of inputs and outputs.

use std::path::{Path, PathBuf};

use ltcscope_config::model::PathsConfig;
use strum::{Display, EnumIter};

/// Per-repository API dump kinds: `<datasets_dir>/<repo>/<kind>_<repo>.json`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum DumpKind {
    Contributors,
    Commits,
    CommitComments,
    Issues,
    IssueComments,
    IssueEvents,
    PullRequests,
    PullRequestComments,
}

/// The four per-repository feature table families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum TableFamily {
    DeveloperProfiles,
    DeveloperMonthlyActivity,
    RepositoryProfiles,
    RepositoryMonthlyActivity,
}

impl TableFamily {
    /// File-name prefix for per-repository tables.
    pub fn prefix(self) -> &'static str {
        match self {
            TableFamily::DeveloperProfiles => "dp",
            TableFamily::DeveloperMonthlyActivity => "dma",
            TableFamily::RepositoryProfiles => "rp",
            TableFamily::RepositoryMonthlyActivity => "rma",
        }
    }

    /// Name of the corpus-wide merged file.
    pub fn merged_file_name(self) -> String {
        format!("{self}.csv")
    }
}

/// Resolved directories for one run.
#[derive(Debug, Clone)]
pub struct Layout {
    pub repo_list: PathBuf,
    pub datasets_dir: PathBuf,
    pub contributors_dir: PathBuf,
    pub tables_dir: PathBuf,
    pub archive_dir: PathBuf,
}

impl Layout {
    pub fn from_config(paths: &PathsConfig) -> Self {
        Self {
            repo_list: PathBuf::from(&paths.repo_list),
            datasets_dir: PathBuf::from(&paths.datasets_dir),
            contributors_dir: PathBuf::from(&paths.contributors_dir),
            tables_dir: PathBuf::from(&paths.tables_dir),
            archive_dir: PathBuf::from(&paths.archive_dir),
        }
    }

    /// Every directory rooted at `root`, with the default names.
    pub fn under(root: &Path) -> Self {
        let defaults = PathsConfig::default();
        Self {
            repo_list: root.join(&defaults.repo_list),
            datasets_dir: root.join(&defaults.datasets_dir),
            contributors_dir: root.join(&defaults.contributors_dir),
            tables_dir: root.join(&defaults.tables_dir),
            archive_dir: root.join(&defaults.archive_dir),
        }
    }

    /// Where an interrupted repository search is kept, next to the list it
    /// would have replaced.
    pub fn partial_repo_list(&self) -> PathBuf {
        let mut name = self.repo_list.clone().into_os_string();
        name.push(".partial");
        PathBuf::from(name)
    }

    pub fn repo_dir(&self, repo: &str) -> PathBuf {
        self.datasets_dir.join(repo)
    }

    pub fn dump_path(&self, repo: &str, kind: DumpKind) -> PathBuf {
        self.repo_dir(repo).join(format!("{kind}_{repo}.json"))
    }

    /// Where a dump whose listing ended early is kept. Nothing reads it back.
    pub fn partial_dump_path(&self, repo: &str, kind: DumpKind) -> PathBuf {
        self.repo_dir(repo).join(format!("{kind}_{repo}.json.partial"))
    }

    pub fn contributors_path(&self, repo: &str) -> PathBuf {
        self.contributors_dir.join(format!("contributors_{repo}.json"))
    }

    pub fn family_dir(&self, family: TableFamily) -> PathBuf {
        self.tables_dir.join(family.to_string())
    }

    pub fn table_path(&self, family: TableFamily, repo: &str) -> PathBuf {
        self.family_dir(family)
            .join(format!("{}_{repo}.csv", family.prefix()))
    }

    pub fn sentiment_dir(&self) -> PathBuf {
        self.tables_dir.join("Sentiment")
    }
}
