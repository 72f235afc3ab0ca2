// SPDX-FileCopyrightText: 2026 LtcScope Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Repository-activity mode: what everyone else did around a contributor's join.

use ltcscope_archive::{ArchiveKind, ArchiveSet, columns};
use ltcscope_core::records::{Activity, Issue, PullRequest};
use ltcscope_core::{ArchiveCutoff, Contributor, LtcError, Repository, Window};
use tracing::debug;

use crate::dataset::RepoDataset;
use crate::developer::count;
use crate::events::{EventCounter, EventFamily, EventTally, split_sources};
use crate::rows::{RepositoryActivityRow, RepositoryProfileRow};
use crate::stats::CountStats;

/// Archive tables the repository tables read.
pub const ARCHIVES: &[ArchiveKind] = &[
    ArchiveKind::IssueEvents,
    ArchiveKind::PullEvents,
    ArchiveKind::Watchers,
];

/// Activity by actors other than one contributor inside one window.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OtherActivity {
    pub commits: u64,
    pub commit_stats: CountStats,
    pub commit_comments: u64,
    pub contributors: u64,
    pub issues: u64,
    pub issue_comments: u64,
    pub issue_events: EventTally,
    pub pull_requests: u64,
    pub pull_request_comments: u64,
    pub pull_events: EventTally,
}

impl OtherActivity {
    /// Count everything in `window` not done by `contributor`.
    ///
    /// Records without an actor are ignored, as are events on parents opened
    /// by the contributor.
    pub async fn collect(
        contributor: &Contributor,
        cohort: &[Contributor],
        data: &RepoDataset,
        cutoff: &ArchiveCutoff,
        events: &mut EventCounter<'_>,
        window: &Window,
    ) -> Result<Self, LtcError> {
        let me = contributor.id;
        let by_other = |a: &dyn Activity| {
            a.actor_id().is_some_and(|id| id != me) && window.contains_opt(a.created_at())
        };

        let commit_authors: Vec<i64> = data
            .commits
            .iter()
            .filter(|c| by_other(*c))
            .filter_map(Activity::actor_id)
            .collect();

        let issues: Vec<&Issue> = data.issues.iter().filter(|i| by_other(*i)).collect();
        let pulls: Vec<&PullRequest> = data
            .pull_requests
            .iter()
            .filter(|p| by_other(*p))
            .collect();

        let issue_events = events
            .count(
                EventFamily::Issue,
                &split_sources(issues.iter().copied(), cutoff),
                window,
            )
            .await?;
        let pull_events = events
            .count(
                EventFamily::Pull,
                &split_sources(pulls.iter().copied(), cutoff),
                window,
            )
            .await?;

        let contributors = count(
            cohort
                .iter()
                .filter(|c| c.id != me && window.contains(c.registration_date)),
        );

        Ok(Self {
            commits: commit_authors.len() as u64,
            commit_stats: CountStats::per_actor(commit_authors),
            commit_comments: count(data.commit_comments.iter().filter(|c| by_other(*c))),
            contributors,
            issues: issues.len() as u64,
            issue_comments: count(data.issue_comments.iter().filter(|c| by_other(*c))),
            issue_events,
            pull_requests: pulls.len() as u64,
            pull_request_comments: count(
                data.pull_request_comments.iter().filter(|c| by_other(*c)),
            ),
            pull_events,
        })
    }
}

/// Watchers of the repository at or before `join`, from the export.
pub fn watchers_before(
    archives: &ArchiveSet,
    repo: &Repository,
    before: &Window,
) -> Result<u64, LtcError> {
    let watchers = archives
        .require(ArchiveKind::Watchers)?
        .select_key(columns::REPO_ID, repo.id, before)?;
    Ok(watchers.count() as u64)
}

pub async fn repository_profile(
    contributor: &Contributor,
    cohort: &[Contributor],
    repo: &Repository,
    data: &RepoDataset,
    archives: &ArchiveSet,
    cutoff: &ArchiveCutoff,
    events: &mut EventCounter<'_>,
) -> Result<RepositoryProfileRow, LtcError> {
    let before = Window::before(contributor.registration_date);
    let a = OtherActivity::collect(contributor, cohort, data, cutoff, events, &before).await?;
    let watchers = watchers_before(archives, repo, &before)?;
    debug!(
        repo = %repo.name,
        user_id = contributor.id,
        commits = a.commits,
        "before window counted"
    );

    let flags = contributor.ltc_flags();
    Ok(RepositoryProfileRow {
        repo_name: repo.name.clone(),
        repo_id: repo.id,
        user_id: contributor.id,
        registration_date: contributor.registration_date.date_naive(),
        language: repo.language_label().to_string(),
        before_repo_commits: a.commits,
        before_repo_commit_comments: a.commit_comments,
        before_repo_contributors: a.contributors,
        before_repo_contributor_max: a.commit_stats.max,
        before_repo_contributor_min: a.commit_stats.min,
        before_repo_contributor_mean: a.commit_stats.mean,
        before_repo_contributor_std: a.commit_stats.std,
        before_repo_contributor_median: a.commit_stats.median,
        before_repo_issues: a.issues,
        before_repo_issue_comments: a.issue_comments,
        before_repo_issue_events: a.issue_events.total,
        before_repo_issue_events_closed: a.issue_events.closed,
        before_repo_issue_events_assigned: a.issue_events.assigned,
        before_repo_pull_requests: a.pull_requests,
        before_repo_pull_request_comments: a.pull_request_comments,
        before_repo_pull_request_history: a.pull_events.total,
        before_repo_pull_request_history_merged: a.pull_events.merged,
        before_repo_pull_request_history_closed: a.pull_events.closed,
        before_repo_watchers: watchers,
        ltc_1: flags.ltc_1,
        ltc_2: flags.ltc_2,
        ltc_3: flags.ltc_3,
    })
}

/// Others' activity in the month after joining. A record stamped at the join
/// instant already counted toward the profile's before window and is left out.
pub async fn repository_activity(
    contributor: &Contributor,
    cohort: &[Contributor],
    repo: &Repository,
    data: &RepoDataset,
    cutoff: &ArchiveCutoff,
    events: &mut EventCounter<'_>,
) -> Result<RepositoryActivityRow, LtcError> {
    let month = Window::month_after(contributor.registration_date);
    let a = OtherActivity::collect(contributor, cohort, data, cutoff, events, &month).await?;

    let flags = contributor.ltc_flags();
    Ok(RepositoryActivityRow {
        repo_name: repo.name.clone(),
        repo_id: repo.id,
        user_id: contributor.id,
        registration_date: contributor.registration_date.date_naive(),
        language: repo.language_label().to_string(),
        month_repo_commits: a.commits,
        month_repo_commit_comments: a.commit_comments,
        month_repo_contributors: a.contributors,
        month_repo_contributor_max: a.commit_stats.max,
        month_repo_contributor_min: a.commit_stats.min,
        month_repo_contributor_mean: a.commit_stats.mean,
        month_repo_contributor_std: a.commit_stats.std,
        month_repo_contributor_median: a.commit_stats.median,
        month_repo_issues: a.issues,
        month_repo_issue_comments: a.issue_comments,
        month_repo_issue_events: a.issue_events.total,
        month_repo_issue_events_closed: a.issue_events.closed,
        month_repo_issue_events_assigned: a.issue_events.assigned,
        month_repo_pull_requests: a.pull_requests,
        month_repo_pull_request_comments: a.pull_request_comments,
        month_repo_pull_request_history: a.pull_events.total,
        month_repo_pull_request_history_merged: a.pull_events.merged,
        month_repo_pull_request_history_closed: a.pull_events.closed,
        ltc_1: flags.ltc_1,
        ltc_2: flags.ltc_2,
        ltc_3: flags.ltc_3,
    })
}
