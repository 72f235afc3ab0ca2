// SPDX-FileCopyrightText: 2026 LtcScope Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Contributor-activity mode: what the contributor did themselves.

use std::collections::HashSet;

use ltcscope_archive::{ArchiveKind, ArchiveSet, columns};
use ltcscope_core::records::{Activity, Commit, Issue, OwnedRepo, PullRequest, from_values};
use ltcscope_core::{
    ArchiveCutoff, Contributor, ListingSource, LtcError, Repository, RetryPolicy, Window,
};
use tracing::warn;

use crate::dataset::RepoDataset;
use crate::events::{EventCounter, EventFamily, split_sources};
use crate::rows::{DeveloperActivityRow, DeveloperProfileRow};

/// Archive tables the developer profile reads.
pub const PROFILE_ARCHIVES: &[ArchiveKind] = &[
    ArchiveKind::Watchers,
    ArchiveKind::Issues,
    ArchiveKind::Followers,
    ArchiveKind::Commits,
];

/// Archive tables the developer monthly activity reads.
pub const ACTIVITY_ARCHIVES: &[ArchiveKind] = &[ArchiveKind::IssueEvents, ArchiveKind::PullEvents];

/// The contributor's history across the whole platform up to joining.
///
/// Fails with [`LtcError::Incomplete`] when the owned-repository listing ended
/// early without a single record; the caller skips the row so a later run
/// retries it.
pub async fn developer_profile(
    contributor: &Contributor,
    repo: &Repository,
    archives: &ArchiveSet,
    source: &dyn ListingSource,
    policy: RetryPolicy,
) -> Result<DeveloperProfileRow, LtcError> {
    let id = contributor.id;
    let before = Window::before(contributor.registration_date);

    let user_own_repos = match contributor.repos_url.as_deref() {
        Some(url) => {
            let listing = source.fetch_listing(url, policy).await?;
            if listing.truncated && !listing.is_empty() {
                warn!(
                    url,
                    fetched = listing.items.len(),
                    "repository listing ended early, counting partial results"
                );
            }
            let repos: Vec<OwnedRepo> = from_values(listing.into_countable(url)?, url);
            count(repos.iter().filter(|r| before.contains_opt(r.created_at)))
        }
        None => 0,
    };

    let watches = archives
        .require(ArchiveKind::Watchers)?
        .select_key(columns::USER_ID, id, &before)?;
    let commits = archives
        .require(ArchiveKind::Commits)?
        .select_key(columns::AUTHOR_ID, id, &before)?;
    let reported = archives
        .require(ArchiveKind::Issues)?
        .select_key(columns::REPORTER_ID, id, &before)?;
    let followers = archives
        .require(ArchiveKind::Followers)?
        .select_key(columns::USER_ID, id, &before)?;

    let flags = contributor.ltc_flags();
    Ok(DeveloperProfileRow {
        repo_name: repo.name.clone(),
        repo_id: repo.id,
        user_id: id,
        user_age: contributor.user_age,
        registration_date: contributor.registration_date.date_naive(),
        user_own_repos,
        user_watch_repos: watches.count() as u64,
        user_contribute_repos: commits.distinct(columns::PROJECT_ID)? as u64,
        user_history_commits: commits.count() as u64,
        user_history_pull_requests: reported.count_where_int(columns::PULL_REQUEST, 1)? as u64,
        user_history_issues: reported.count_where_int(columns::PULL_REQUEST, 0)? as u64,
        user_history_followers: followers.count() as u64,
        ltc_1: flags.ltc_1,
        ltc_2: flags.ltc_2,
        ltc_3: flags.ltc_3,
    })
}

/// The contributor's own activity in their first month, and the response to it.
///
/// Comments are counted when they land on the contributor's commits (by SHA),
/// issues (by issue URL) or pull requests (by pull URL).
pub async fn developer_activity(
    contributor: &Contributor,
    repo: &Repository,
    data: &RepoDataset,
    cutoff: &ArchiveCutoff,
    events: &mut EventCounter<'_>,
) -> Result<DeveloperActivityRow, LtcError> {
    let id = contributor.id;
    let month = Window::first_month(contributor.registration_date);
    let in_month = |a: &dyn Activity| month.contains_opt(a.created_at());

    let own_commits: Vec<&Commit> = data
        .commits
        .iter()
        .filter(|c| c.actor_id() == Some(id))
        .collect();
    let own_shas: HashSet<&str> = own_commits.iter().filter_map(|c| c.sha.as_deref()).collect();

    let own_issues: Vec<&Issue> = data
        .issues
        .iter()
        .filter(|i| i.actor_id() == Some(id))
        .collect();
    let own_issue_urls: HashSet<&str> =
        own_issues.iter().filter_map(|i| i.url.as_deref()).collect();
    let month_issues: Vec<&Issue> =
        own_issues.iter().copied().filter(|i| in_month(*i)).collect();

    let own_pulls: Vec<&PullRequest> = data
        .pull_requests
        .iter()
        .filter(|p| p.actor_id() == Some(id))
        .collect();
    let own_pull_urls: HashSet<&str> =
        own_pulls.iter().filter_map(|p| p.url.as_deref()).collect();
    let month_pulls: Vec<&PullRequest> =
        own_pulls.iter().copied().filter(|p| in_month(*p)).collect();

    let issue_events = events
        .count(
            EventFamily::Issue,
            &split_sources(month_issues.iter().copied(), cutoff),
            &month,
        )
        .await?;
    let pull_events = events
        .count(
            EventFamily::Pull,
            &split_sources(month_pulls.iter().copied(), cutoff),
            &month,
        )
        .await?;

    let commit_comments = count(data.commit_comments.iter().filter(|cc| {
        in_month(*cc) && cc.commit_id.as_deref().is_some_and(|sha| own_shas.contains(sha))
    }));
    let issue_comments = count(data.issue_comments.iter().filter(|ic| {
        in_month(*ic) && ic.issue_url.as_deref().is_some_and(|u| own_issue_urls.contains(u))
    }));
    let pull_comments = count(data.pull_request_comments.iter().filter(|pc| {
        in_month(*pc)
            && pc
                .pull_request_url
                .as_deref()
                .is_some_and(|u| own_pull_urls.contains(u))
    }));

    let flags = contributor.ltc_flags();
    Ok(DeveloperActivityRow {
        repo_name: repo.name.clone(),
        repo_id: repo.id,
        user_id: id,
        registration_date: contributor.registration_date.date_naive(),
        language: repo.language_label().to_string(),
        month_user_commits: count(own_commits.iter().filter(|c| in_month(**c))),
        month_user_commit_comments: commit_comments,
        month_user_issues: month_issues.len() as u64,
        month_user_issue_comments: issue_comments,
        month_user_issue_events: issue_events.total,
        month_user_issue_events_closed: issue_events.closed,
        month_user_issue_events_assigned: issue_events.assigned,
        month_user_pull_requests: month_pulls.len() as u64,
        month_user_pull_request_comments: pull_comments,
        month_user_pull_request_history: pull_events.total,
        month_user_pull_request_history_merged: pull_events.merged,
        month_user_pull_request_history_closed: pull_events.closed,
        ltc_1: flags.ltc_1,
        ltc_2: flags.ltc_2,
        ltc_3: flags.ltc_3,
    })
}

pub(crate) fn count<I: Iterator>(iter: I) -> u64 {
    iter.count() as u64
}
