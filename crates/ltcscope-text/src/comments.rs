// SPDX-FileCopyrightText: 2026 LtcScope Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Comment attribution and the per-kind sentiment files.
//!
//! A comment is credited to the author of what it comments on: the commit
//! author for commit comments, the pull request opener (matched by head SHA)
//! for review comments and the issue opener for issue comments.

use std::collections::{HashMap, HashSet};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use ltcscope_core::LtcError;
use ltcscope_core::records::{
    Activity, Commit, CommitComment, Issue, IssueComment, PullRequest, PullRequestComment,
};
use ltcscope_features::dataset::read_records;
use ltcscope_features::{DumpKind, Layout};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};
use tracing::debug;

use crate::clean::clean_text;
use crate::polarity::{Polarity, score};

/// The three comment streams with their own sentiment file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum CommentKind {
    Commit,
    Pull,
    Issue,
}

impl CommentKind {
    /// `Sentiment/<kind>_comments.csv`.
    pub fn file_name(self) -> String {
        format!("{self}_comments.csv")
    }

    /// The parent dump and the comment dump this kind reads.
    fn dumps(self) -> (DumpKind, DumpKind) {
        match self {
            CommentKind::Commit => (DumpKind::Commits, DumpKind::CommitComments),
            CommentKind::Pull => (DumpKind::PullRequests, DumpKind::PullRequestComments),
            CommentKind::Issue => (DumpKind::Issues, DumpKind::IssueComments),
        }
    }
}

/// A comment credited to a contributor, before cleaning.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributedComment {
    pub contributor: i64,
    pub date: DateTime<Utc>,
    pub body: String,
}

/// A cleaned, scored comment as stored in the per-kind files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredComment {
    pub repo_id: i64,
    pub contributor: i64,
    pub date: DateTime<Utc>,
    pub polarity: Polarity,
    pub comment: String,
}

pub const COMMENT_COLUMNS: &[&str] = &["repo_id", "contributor", "date", "polarity", "comment"];

fn credit<'c, C, F>(
    owners: &HashMap<&str, i64>,
    comments: &'c [C],
    key: F,
) -> Vec<AttributedComment>
where
    C: Activity + HasBody,
    F: Fn(&'c C) -> Option<&'c str>,
{
    comments
        .iter()
        .filter_map(|comment| {
            let contributor = *owners.get(key(comment)?)?;
            Some(AttributedComment {
                contributor,
                date: comment.created_at()?,
                body: comment.body()?.to_string(),
            })
        })
        .collect()
}

/// Comment records that carry free text.
pub trait HasBody {
    fn body(&self) -> Option<&str>;
}

macro_rules! has_body {
    ($($ty:ty),*) => {
        $(impl HasBody for $ty {
            fn body(&self) -> Option<&str> {
                self.body.as_deref()
            }
        })*
    };
}

has_body!(CommitComment, PullRequestComment, IssueComment);

pub fn attribute_commit_comments(
    commits: &[Commit],
    comments: &[CommitComment],
) -> Vec<AttributedComment> {
    let owners: HashMap<&str, i64> = commits
        .iter()
        .filter_map(|c| Some((c.sha.as_deref()?, c.actor_id()?)))
        .collect();
    credit(&owners, comments, |c| c.commit_id.as_deref())
}

pub fn attribute_pull_comments(
    pulls: &[PullRequest],
    comments: &[PullRequestComment],
) -> Vec<AttributedComment> {
    let owners: HashMap<&str, i64> = pulls
        .iter()
        .filter_map(|p| Some((p.head_sha()?, p.actor_id()?)))
        .collect();
    credit(&owners, comments, |c| c.commit_id.as_deref())
}

pub fn attribute_issue_comments(
    issues: &[Issue],
    comments: &[IssueComment],
) -> Vec<AttributedComment> {
    let owners: HashMap<&str, i64> = issues
        .iter()
        .filter_map(|i| Some((i.url.as_deref()?, i.actor_id()?)))
        .collect();
    credit(&owners, comments, |c| c.issue_url.as_deref())
}

/// Read the dumps for `kind` and credit every comment.
///
/// Fails with `MissingInput` when either dump is absent.
pub fn load_attributed(
    layout: &Layout,
    repo: &str,
    kind: CommentKind,
) -> Result<Vec<AttributedComment>, LtcError> {
    let (parents, comments) = kind.dumps();
    let parents = layout.dump_path(repo, parents);
    let comments = layout.dump_path(repo, comments);
    Ok(match kind {
        CommentKind::Commit => {
            attribute_commit_comments(&read_records(&parents)?, &read_records(&comments)?)
        }
        CommentKind::Pull => {
            attribute_pull_comments(&read_records(&parents)?, &read_records(&comments)?)
        }
        CommentKind::Issue => {
            attribute_issue_comments(&read_records(&parents)?, &read_records(&comments)?)
        }
    })
}

/// Clean and score; comments that do not survive cleaning are dropped.
pub fn score_comments(repo_id: i64, comments: Vec<AttributedComment>) -> Vec<ScoredComment> {
    comments
        .into_iter()
        .filter_map(|c| {
            let comment = clean_text(&c.body)?;
            Some(ScoredComment {
                repo_id,
                contributor: c.contributor,
                date: c.date,
                polarity: score(&comment),
                comment,
            })
        })
        .collect()
}

/// An append-only sentiment file, resumable by repository.
#[derive(Debug)]
pub struct CommentFile {
    path: PathBuf,
    repos: HashSet<i64>,
    needs_header: bool,
}

impl CommentFile {
    pub fn open(path: &Path) -> Result<Self, LtcError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| LtcError::io(parent, e))?;
        }
        if !path.exists() {
            return Ok(Self {
                path: path.to_path_buf(),
                repos: HashSet::new(),
                needs_header: true,
            });
        }
        let repos = read_comments(path)?.into_iter().map(|c| c.repo_id).collect();
        Ok(Self {
            path: path.to_path_buf(),
            repos,
            needs_header: false,
        })
    }

    /// True when comments of `repo_id` were already written.
    pub fn contains(&self, repo_id: i64) -> bool {
        self.repos.contains(&repo_id)
    }

    pub fn append(&mut self, rows: &[ScoredComment]) -> Result<(), LtcError> {
        if rows.is_empty() {
            return Ok(());
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| LtcError::io(&self.path, e))?;
        let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(file);
        if self.needs_header {
            writer
                .write_record(COMMENT_COLUMNS)
                .map_err(|e| LtcError::parse(self.path.display().to_string(), e))?;
        }
        for row in rows {
            writer
                .serialize(row)
                .map_err(|e| LtcError::parse(self.path.display().to_string(), e))?;
            self.repos.insert(row.repo_id);
        }
        writer.flush().map_err(|e| LtcError::io(&self.path, e))?;
        self.needs_header = false;
        Ok(())
    }
}

/// Every readable row of a sentiment file; a missing file reads as empty.
pub fn read_comments(path: &Path) -> Result<Vec<ScoredComment>, LtcError> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let mut reader = csv::Reader::from_path(path)
        .map_err(|e| LtcError::parse(path.display().to_string(), e))?;
    let mut rows = Vec::new();
    let mut dropped = 0usize;
    for record in reader.deserialize::<ScoredComment>() {
        match record {
            Ok(row) => rows.push(row),
            Err(_) => dropped += 1,
        }
    }
    if dropped > 0 {
        debug!(path = %path.display(), dropped, "skipped unreadable sentiment rows");
    }
    Ok(rows)
}
