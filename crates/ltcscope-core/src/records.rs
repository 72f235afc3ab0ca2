// SPDX-FileCopyrightText: 2026 LtcScope Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Activity records from the per-repository API dumps.
//!
//! Every field the pipeline reads is optional. A record that lacks its actor or
//! its timestamp is never an error; it simply does not match any window.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

/// Common accessors for anything that has an actor and a timestamp.
pub trait Activity {
    fn actor_id(&self) -> Option<i64>;
    fn created_at(&self) -> Option<DateTime<Utc>>;
}

/// An account reference embedded in a record (`author`, `user`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRef {
    pub id: i64,
    #[serde(default)]
    pub login: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GitSignature {
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CommitDetail {
    #[serde(default)]
    pub author: Option<GitSignature>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Commit {
    #[serde(default)]
    pub sha: Option<String>,
    #[serde(default)]
    pub author: Option<UserRef>,
    #[serde(default)]
    pub commit: Option<CommitDetail>,
}

impl Activity for Commit {
    fn actor_id(&self) -> Option<i64> {
        self.author.as_ref().map(|a| a.id)
    }

    /// The git author date, not the push date.
    fn created_at(&self) -> Option<DateTime<Utc>> {
        self.commit.as_ref()?.author.as_ref()?.date
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CommitComment {
    #[serde(default)]
    pub commit_id: Option<String>,
    #[serde(default)]
    pub user: Option<UserRef>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub body: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Issue {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub events_url: Option<String>,
    #[serde(default)]
    pub user: Option<UserRef>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IssueComment {
    #[serde(default)]
    pub issue_url: Option<String>,
    #[serde(default)]
    pub user: Option<UserRef>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub body: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GitRef {
    #[serde(default)]
    pub sha: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PullRequest {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub issue_url: Option<String>,
    #[serde(default)]
    pub user: Option<UserRef>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub head: Option<GitRef>,
}

impl PullRequest {
    /// Listing URL for this pull request's timeline events.
    ///
    /// Pull request events live under the companion issue; the pull URL is the
    /// fallback when a dump lacks `issue_url`.
    pub fn events_url(&self) -> Option<String> {
        self.issue_url
            .as_deref()
            .or(self.url.as_deref())
            .map(|base| format!("{base}/events"))
    }

    pub fn head_sha(&self) -> Option<&str> {
        self.head.as_ref()?.sha.as_deref()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PullRequestComment {
    #[serde(default)]
    pub pull_request_url: Option<String>,
    #[serde(default)]
    pub commit_id: Option<String>,
    #[serde(default)]
    pub user: Option<UserRef>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub body: Option<String>,
}

/// An issue or pull request event fetched live from an events listing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LiveEvent {
    #[serde(default)]
    pub event: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// A repository owned by a user, from the `repos_url` listing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OwnedRepo {
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

macro_rules! user_activity {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Activity for $ty {
                fn actor_id(&self) -> Option<i64> {
                    self.user.as_ref().map(|u| u.id)
                }

                fn created_at(&self) -> Option<DateTime<Utc>> {
                    self.created_at
                }
            }
        )*
    };
}

user_activity!(CommitComment, Issue, IssueComment, PullRequest, PullRequestComment);

/// Deserialize each JSON value into `T`, dropping values that do not fit.
pub fn from_values<T: DeserializeOwned>(values: Vec<Value>, context: &str) -> Vec<T> {
    let total = values.len();
    let records: Vec<T> = values
        .into_iter()
        .filter_map(|value| serde_json::from_value(value).ok())
        .collect();
    if records.len() < total {
        debug!(
            context,
            dropped = total - records.len(),
            "skipped malformed records"
        );
    }
    records
}
