// SPDX-FileCopyrightText: 2026 LtcScope Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Feature rows, one struct per table family. Field order is column order.

use chrono::NaiveDate;
use serde::Serialize;

/// A row of a per-repository feature table.
pub trait TableRow: Serialize {
    /// Header, in field order.
    const COLUMNS: &'static [&'static str];

    /// The contributor the row describes; unique within a table.
    fn user_id(&self) -> i64;
}

macro_rules! table_row {
    ($(#[$meta:meta])* $name:ident { $($field:ident: $ty:ty),* $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Serialize)]
        pub struct $name {
            $(pub $field: $ty),*
        }

        impl TableRow for $name {
            const COLUMNS: &'static [&'static str] = &[$(stringify!($field)),*];

            fn user_id(&self) -> i64 {
                self.user_id
            }
        }
    };
}

table_row! {
    /// Contributor history before joining (`dp_<repo>.csv`).
    DeveloperProfileRow {
        repo_name: String,
        repo_id: i64,
        user_id: i64,
        user_age: i64,
        registration_date: NaiveDate,
        user_own_repos: u64,
        user_watch_repos: u64,
        user_contribute_repos: u64,
        user_history_commits: u64,
        user_history_pull_requests: u64,
        user_history_issues: u64,
        user_history_followers: u64,
        ltc_1: u8,
        ltc_2: u8,
        ltc_3: u8,
    }
}

table_row! {
    /// The contributor's own first-month activity (`dma_<repo>.csv`).
    DeveloperActivityRow {
        repo_name: String,
        repo_id: i64,
        user_id: i64,
        registration_date: NaiveDate,
        language: String,
        month_user_commits: u64,
        month_user_commit_comments: u64,
        month_user_issues: u64,
        month_user_issue_comments: u64,
        month_user_issue_events: u64,
        month_user_issue_events_closed: u64,
        month_user_issue_events_assigned: u64,
        month_user_pull_requests: u64,
        month_user_pull_request_comments: u64,
        month_user_pull_request_history: u64,
        month_user_pull_request_history_merged: u64,
        month_user_pull_request_history_closed: u64,
        ltc_1: u8,
        ltc_2: u8,
        ltc_3: u8,
    }
}

table_row! {
    /// Repository activity by others up to the join instant (`rp_<repo>.csv`).
    RepositoryProfileRow {
        repo_name: String,
        repo_id: i64,
        user_id: i64,
        registration_date: NaiveDate,
        language: String,
        before_repo_commits: u64,
        before_repo_commit_comments: u64,
        before_repo_contributors: u64,
        before_repo_contributor_max: i64,
        before_repo_contributor_min: i64,
        before_repo_contributor_mean: i64,
        before_repo_contributor_std: i64,
        before_repo_contributor_median: i64,
        before_repo_issues: u64,
        before_repo_issue_comments: u64,
        before_repo_issue_events: u64,
        before_repo_issue_events_closed: u64,
        before_repo_issue_events_assigned: u64,
        before_repo_pull_requests: u64,
        before_repo_pull_request_comments: u64,
        before_repo_pull_request_history: u64,
        before_repo_pull_request_history_merged: u64,
        before_repo_pull_request_history_closed: u64,
        before_repo_watchers: u64,
        ltc_1: u8,
        ltc_2: u8,
        ltc_3: u8,
    }
}

table_row! {
    /// Repository activity by others in the first month (`rma_<repo>.csv`).
    RepositoryActivityRow {
        repo_name: String,
        repo_id: i64,
        user_id: i64,
        registration_date: NaiveDate,
        language: String,
        month_repo_commits: u64,
        month_repo_commit_comments: u64,
        month_repo_contributors: u64,
        month_repo_contributor_max: i64,
        month_repo_contributor_min: i64,
        month_repo_contributor_mean: i64,
        month_repo_contributor_std: i64,
        month_repo_contributor_median: i64,
        month_repo_issues: u64,
        month_repo_issue_comments: u64,
        month_repo_issue_events: u64,
        month_repo_issue_events_closed: u64,
        month_repo_issue_events_assigned: u64,
        month_repo_pull_requests: u64,
        month_repo_pull_request_comments: u64,
        month_repo_pull_request_history: u64,
        month_repo_pull_request_history_merged: u64,
        month_repo_pull_request_history_closed: u64,
        ltc_1: u8,
        ltc_2: u8,
        ltc_3: u8,
    }
}
