// SPDX-FileCopyrightText: 2026 LtcScope Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bounded worker pool over repositories with per-repository status records.
//!
//! A repository task failing (or panicking) never stops the others; its error is
//! logged with the repository name and kept in the returned [`RepoStatus`].

use std::future::Future;
use std::sync::Arc;

use ltcscope_core::{LtcError, Repository};
use tokio::sync::Semaphore;
use tracing::{error, info, warn};

/// How one repository task ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepoOutcome {
    /// Rows (or files) written, and contributors (or items) skipped.
    Completed { written: usize, skipped: usize },
    /// Nothing to do, e.g. a required input is missing.
    Skipped { reason: String },
    Failed { error: String },
}

/// The status record for one repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoStatus {
    pub repo: String,
    pub outcome: RepoOutcome,
}

/// Counts per outcome kind for the end-of-stage summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatusSummary {
    pub completed: usize,
    pub skipped: usize,
    pub failed: usize,
    pub rows_written: usize,
}

impl StatusSummary {
    pub fn from_statuses(statuses: &[RepoStatus]) -> Self {
        let mut summary = Self::default();
        for status in statuses {
            match &status.outcome {
                RepoOutcome::Completed { written, .. } => {
                    summary.completed += 1;
                    summary.rows_written += written;
                }
                RepoOutcome::Skipped { .. } => summary.skipped += 1,
                RepoOutcome::Failed { .. } => summary.failed += 1,
            }
        }
        summary
    }
}

/// Run `task` for every repository with at most `workers` running at once.
///
/// Returns one status per repository, in input order. `MissingInput` errors
/// become `Skipped`; other errors and panics become `Failed`.
pub async fn run_repositories<F, Fut>(
    repos: Vec<Repository>,
    workers: usize,
    task: F,
) -> Vec<RepoStatus>
where
    F: Fn(Repository) -> Fut,
    Fut: Future<Output = Result<RepoOutcome, LtcError>> + Send + 'static,
{
    let semaphore = Arc::new(Semaphore::new(workers.max(1)));
    let total = repos.len();

    let handles: Vec<_> = repos
        .into_iter()
        .enumerate()
        .map(|(index, repo)| {
            let name = repo.name.clone();
            let log_name = name.clone();
            let semaphore = Arc::clone(&semaphore);
            let fut = task(repo);
            let handle = tokio::spawn(async move {
                let _permit = semaphore.acquire_owned().await.map_err(|e| {
                    LtcError::Internal(format!("worker pool closed: {e}"))
                })?;
                info!(repo = %log_name, position = index + 1, total, "processing repository");
                fut.await
            });
            (name, handle)
        })
        .collect();

    let mut statuses = Vec::with_capacity(handles.len());
    for (repo, handle) in handles {
        let outcome = match handle.await {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(e)) if e.is_missing_input() => {
                warn!(repo = %repo, reason = %e, "repository skipped");
                RepoOutcome::Skipped {
                    reason: e.to_string(),
                }
            }
            Ok(Err(e)) => {
                error!(repo = %repo, error = %e, "repository failed");
                RepoOutcome::Failed {
                    error: e.to_string(),
                }
            }
            Err(e) => {
                error!(repo = %repo, error = %e, "repository task panicked");
                RepoOutcome::Failed {
                    error: format!("task panic: {e}"),
                }
            }
        };
        statuses.push(RepoStatus { repo, outcome });
    }
    statuses
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn repos(n: usize) -> Vec<Repository> {
        (0..n)
            .map(|i| Repository::new(i as i64, format!("repo{i}"), Some("Rust")))
            .collect()
    }

    #[tokio::test]
    async fn statuses_follow_input_order() {
        let statuses = run_repositories(repos(4), 2, |repo| async move {
            // Later repositories finish first.
            tokio::time::sleep(Duration::from_millis(40 - repo.id as u64 * 10)).await;
            Ok(RepoOutcome::Completed {
                written: repo.id as usize,
                skipped: 0,
            })
        })
        .await;

        let names: Vec<_> = statuses.iter().map(|s| s.repo.as_str()).collect();
        assert_eq!(names, ["repo0", "repo1", "repo2", "repo3"]);
        assert_eq!(StatusSummary::from_statuses(&statuses).rows_written, 6);
    }

    #[tokio::test]
    async fn failures_and_panics_are_contained() {
        let statuses = run_repositories(repos(4), 3, |repo| async move {
            match repo.id {
                0 => Err(LtcError::MissingInput {
                    path: "commits_repo0.json".into(),
                }),
                1 => Err(LtcError::Internal("boom".into())),
                2 => panic!("worker blew up"),
                _ => Ok(RepoOutcome::Completed {
                    written: 1,
                    skipped: 0,
                }),
            }
        })
        .await;

        assert!(matches!(statuses[0].outcome, RepoOutcome::Skipped { .. }));
        assert!(matches!(
            &statuses[1].outcome,
            RepoOutcome::Failed { error } if error.contains("boom")
        ));
        assert!(matches!(
            &statuses[2].outcome,
            RepoOutcome::Failed { error } if error.contains("panic")
        ));
        assert_eq!(
            statuses[3].outcome,
            RepoOutcome::Completed {
                written: 1,
                skipped: 0
            }
        );

        let summary = StatusSummary::from_statuses(&statuses);
        assert_eq!(summary.completed, 1);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.failed, 2);
    }

    #[tokio::test]
    async fn concurrency_is_bounded() {
        let running = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let statuses = run_repositories(repos(8), 2, |_repo| {
            let running = Arc::clone(&running);
            let peak = Arc::clone(&peak);
            async move {
                let now = running.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(10)).await;
                running.fetch_sub(1, Ordering::SeqCst);
                Ok(RepoOutcome::Skipped {
                    reason: "noop".into(),
                })
            }
        })
        .await;

        assert_eq!(statuses.len(), 8);
        assert!(peak.load(Ordering::SeqCst) <= 2);
    }
}
