// SPDX-FileCopyrightText: 2026 LtcScope Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-repository table tasks for the four feature families.
//!
//! Each task opens its table(s), walks the qualified contributors in input
//! order and appends one row per contributor not yet present. Contributors who
//! joined at or after the archive cutoff are left out of every family.
//! A contributor whose live listing came back incomplete gets no row this run,
//! so the next run computes it again.

use std::sync::Arc;

use ltcscope_archive::ArchiveSet;
use ltcscope_core::{ArchiveCutoff, Contributor, ListingSource, LtcError, Repository, RetryPolicy};
use tracing::{debug, info, warn};

use crate::dataset::{RepoDataset, load_contributors};
use crate::developer::{developer_activity, developer_profile};
use crate::events::EventCounter;
use crate::layout::{Layout, TableFamily};
use crate::pool::RepoOutcome;
use crate::repository::{repository_activity, repository_profile};
use crate::writer::IncrementalTable;

/// Shared, read-only state for the table stages.
pub struct TableContext {
    pub layout: Layout,
    pub cutoff: ArchiveCutoff,
    pub archives: Arc<ArchiveSet>,
    pub source: Arc<dyn ListingSource>,
    pub listing_policy: RetryPolicy,
}

impl TableContext {
    /// Whether the contributor's pre-join history is fully archived.
    fn in_scope(&self, repo: &Repository, contributor: &Contributor) -> bool {
        let ok = contributor.registration_date < self.cutoff.instant();
        if !ok {
            debug!(
                repo = %repo.name,
                user_id = contributor.id,
                registration = %contributor.registration_date,
                "joined after archive coverage, skipping"
            );
        }
        ok
    }
}

/// `None` when the row rests on a listing that ended before any record arrived.
fn confirmed<T>(
    result: Result<T, LtcError>,
    repo: &Repository,
    contributor: &Contributor,
) -> Result<Option<T>, LtcError> {
    match result {
        Ok(row) => Ok(Some(row)),
        Err(e) if e.is_incomplete() => {
            warn!(
                repo = %repo.name,
                user_id = contributor.id,
                error = %e,
                "row left for the next run"
            );
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

fn trace_contributor(repo: &Repository, contributor: &Contributor, position: usize, total: usize) {
    debug!(repo = %repo.name, login = %contributor.login, position, total, "computing rows");
}

/// Progress counters for one repository task.
#[derive(Debug, Default)]
struct Tally {
    written: usize,
    skipped: usize,
}

impl Tally {
    fn into_outcome(self, repo: &Repository, family: &str) -> RepoOutcome {
        info!(
            repo = %repo.name,
            family,
            written = self.written,
            skipped = self.skipped,
            "table updated"
        );
        RepoOutcome::Completed {
            written: self.written,
            skipped: self.skipped,
        }
    }
}

/// Build `dp_<repo>.csv`.
pub async fn developer_profile_task(
    ctx: Arc<TableContext>,
    repo: Repository,
) -> Result<RepoOutcome, LtcError> {
    let contributors = load_contributors(&ctx.layout, &repo.name)?;
    let mut table = IncrementalTable::open(
        &ctx.layout
            .table_path(TableFamily::DeveloperProfiles, &repo.name),
    )?;
    let mut tally = Tally::default();

    for (i, contributor) in contributors.iter().enumerate() {
        if table.contains(contributor.id) || !ctx.in_scope(&repo, contributor) {
            tally.skipped += 1;
            continue;
        }
        trace_contributor(&repo, contributor, i + 1, contributors.len());
        let profile = developer_profile(
            contributor,
            &repo,
            &ctx.archives,
            ctx.source.as_ref(),
            ctx.listing_policy,
        )
        .await;
        let Some(row) = confirmed(profile, &repo, contributor)? else {
            tally.skipped += 1;
            continue;
        };
        if table.append(&row)? {
            tally.written += 1;
        }
    }
    Ok(tally.into_outcome(&repo, TableFamily::DeveloperProfiles.prefix()))
}

/// Build `dma_<repo>.csv`.
pub async fn developer_activity_task(
    ctx: Arc<TableContext>,
    repo: Repository,
) -> Result<RepoOutcome, LtcError> {
    let contributors = load_contributors(&ctx.layout, &repo.name)?;
    let data = RepoDataset::load(&ctx.layout, &repo.name)?;
    let mut table = IncrementalTable::open(
        &ctx.layout
            .table_path(TableFamily::DeveloperMonthlyActivity, &repo.name),
    )?;
    let mut events = EventCounter::new(&ctx.archives, ctx.source.as_ref(), ctx.listing_policy);
    let mut tally = Tally::default();

    for (i, contributor) in contributors.iter().enumerate() {
        if table.contains(contributor.id) || !ctx.in_scope(&repo, contributor) {
            tally.skipped += 1;
            continue;
        }
        trace_contributor(&repo, contributor, i + 1, contributors.len());
        let activity =
            developer_activity(contributor, &repo, &data, &ctx.cutoff, &mut events).await;
        let Some(row) = confirmed(activity, &repo, contributor)? else {
            tally.skipped += 1;
            continue;
        };
        if table.append(&row)? {
            tally.written += 1;
        }
    }
    Ok(tally.into_outcome(&repo, TableFamily::DeveloperMonthlyActivity.prefix()))
}

/// Build `rp_<repo>.csv` and `rma_<repo>.csv` together.
///
/// The two tables resume independently: a contributor is computed when either
/// lacks it and each row only goes to the table that is missing it. `written`
/// counts rows across both tables.
pub async fn repository_tables_task(
    ctx: Arc<TableContext>,
    repo: Repository,
) -> Result<RepoOutcome, LtcError> {
    let contributors = load_contributors(&ctx.layout, &repo.name)?;
    let data = RepoDataset::load(&ctx.layout, &repo.name)?;
    let mut profiles = IncrementalTable::open(
        &ctx.layout
            .table_path(TableFamily::RepositoryProfiles, &repo.name),
    )?;
    let mut monthly = IncrementalTable::open(
        &ctx.layout
            .table_path(TableFamily::RepositoryMonthlyActivity, &repo.name),
    )?;
    let mut events = EventCounter::new(&ctx.archives, ctx.source.as_ref(), ctx.listing_policy);
    let mut tally = Tally::default();

    for (i, contributor) in contributors.iter().enumerate() {
        let need_profile = !profiles.contains(contributor.id);
        let need_monthly = !monthly.contains(contributor.id);
        if !(need_profile || need_monthly) || !ctx.in_scope(&repo, contributor) {
            tally.skipped += 1;
            continue;
        }
        trace_contributor(&repo, contributor, i + 1, contributors.len());

        let mut deferred = false;
        if need_profile {
            let profile = repository_profile(
                contributor,
                &contributors,
                &repo,
                &data,
                &ctx.archives,
                &ctx.cutoff,
                &mut events,
            )
            .await;
            match confirmed(profile, &repo, contributor)? {
                Some(row) => {
                    if profiles.append(&row)? {
                        tally.written += 1;
                    }
                }
                None => deferred = true,
            }
        }
        if need_monthly {
            let activity = repository_activity(
                contributor,
                &contributors,
                &repo,
                &data,
                &ctx.cutoff,
                &mut events,
            )
            .await;
            match confirmed(activity, &repo, contributor)? {
                Some(row) => {
                    if monthly.append(&row)? {
                        tally.written += 1;
                    }
                }
                None => deferred = true,
            }
        }
        if deferred {
            tally.skipped += 1;
        }
    }
    Ok(tally.into_outcome(&repo, "rp+rma"))
}
