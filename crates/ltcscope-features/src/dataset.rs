// SPDX-FileCopyrightText: 2026 LtcScope Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Loading the repository listing, per-repository dumps and qualified contributors.

use std::path::Path;

use ltcscope_core::records::{
    Commit, CommitComment, Issue, IssueComment, PullRequest, PullRequestComment, from_values,
};
use ltcscope_core::{Contributor, LtcError, RawContributor, Repository};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::layout::{DumpKind, Layout};

/// Read a JSON file; a missing file is [`LtcError::MissingInput`].
pub fn read_json(path: &Path) -> Result<Value, LtcError> {
    if !path.exists() {
        return Err(LtcError::MissingInput {
            path: path.to_path_buf(),
        });
    }
    let body = std::fs::read_to_string(path).map_err(|e| LtcError::io(path, e))?;
    serde_json::from_str(&body).map_err(|e| LtcError::parse(path.display().to_string(), e))
}

/// Read a JSON array file into records, dropping elements that do not fit `T`.
pub fn read_records<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, LtcError> {
    match read_json(path)? {
        Value::Array(values) => Ok(from_values(values, &path.display().to_string())),
        _ => Err(LtcError::parse(
            path.display().to_string(),
            "expected a JSON array",
        )),
    }
}

/// Write `value` as pretty JSON, creating parent directories.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), LtcError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| LtcError::io(parent, e))?;
    }
    let body = serde_json::to_string_pretty(value)
        .map_err(|e| LtcError::Internal(format!("failed to serialize {}: {e}", path.display())))?;
    std::fs::write(path, body).map_err(|e| LtcError::io(path, e))
}

/// Remove `path`; a file that is already gone is fine.
pub fn remove_if_exists(path: &Path) -> Result<(), LtcError> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(LtcError::io(path, e)),
    }
}

/// The curated repository listing.
pub fn load_repositories(path: &Path) -> Result<Vec<Repository>, LtcError> {
    let repos: Vec<Repository> = read_records(path)?;
    debug!(count = repos.len(), path = %path.display(), "repository listing loaded");
    Ok(repos)
}

/// The qualified contributors of one repository.
pub fn load_contributors(layout: &Layout, repo: &str) -> Result<Vec<Contributor>, LtcError> {
    read_records(&layout.contributors_path(repo))
}

/// The raw contributor listing of one repository.
pub fn load_raw_contributors(layout: &Layout, repo: &str) -> Result<Vec<RawContributor>, LtcError> {
    read_records(&layout.dump_path(repo, DumpKind::Contributors))
}

/// Every activity dump the aggregators read for one repository.
#[derive(Debug, Clone, Default)]
pub struct RepoDataset {
    pub commits: Vec<Commit>,
    pub commit_comments: Vec<CommitComment>,
    pub issues: Vec<Issue>,
    pub issue_comments: Vec<IssueComment>,
    pub pull_requests: Vec<PullRequest>,
    pub pull_request_comments: Vec<PullRequestComment>,
}

impl RepoDataset {
    /// Load all six dumps; any missing file aborts with `MissingInput`.
    pub fn load(layout: &Layout, repo: &str) -> Result<Self, LtcError> {
        Ok(Self {
            commits: read_records(&layout.dump_path(repo, DumpKind::Commits))?,
            commit_comments: read_records(&layout.dump_path(repo, DumpKind::CommitComments))?,
            issues: read_records(&layout.dump_path(repo, DumpKind::Issues))?,
            issue_comments: read_records(&layout.dump_path(repo, DumpKind::IssueComments))?,
            pull_requests: read_records(&layout.dump_path(repo, DumpKind::PullRequests))?,
            pull_request_comments: read_records(
                &layout.dump_path(repo, DumpKind::PullRequestComments),
            )?,
        })
    }
}
