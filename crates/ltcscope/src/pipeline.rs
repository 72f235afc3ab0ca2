// SPDX-FileCopyrightText: 2026 LtcScope Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-stage wiring: load the repository list, build the stage context, run
//! the worker pool and log a status summary.

use std::sync::Arc;

use ltcscope_archive::{ArchiveKind, ArchiveSet};
use ltcscope_config::{LtcConfig, Stage};
use ltcscope_core::{ListingSource, LtcError, Repository};
use ltcscope_features::dataset::load_repositories;
use ltcscope_features::{
    DiscoverReport, DownloadContext, EligibilityFilter, FilterContext, Layout, MergeReport,
    RepoOutcome, RepoStatus, StatusSummary, TableContext, TableFamily, developer,
    developer_activity_task, developer_profile_task, discover_repositories, download_repository,
    filter_repository, merge_family, repository, repository_tables_task, run_repositories,
};
use ltcscope_github::GithubClient;
use ltcscope_text::{SentimentContext, score_repository, write_summary};
use strum::{Display, EnumIter, IntoEnumIterator};
use tracing::{info, warn};

/// Hands each stage the listing source holding that stage's credential.
pub trait SourceProvider: Send + Sync {
    fn source(&self, stage: Stage) -> Result<Arc<dyn ListingSource>, LtcError>;
}

/// One rate-limited API client per stage, built from configuration.
pub struct GithubSources {
    config: LtcConfig,
}

impl GithubSources {
    pub fn new(config: LtcConfig) -> Self {
        Self { config }
    }
}

impl SourceProvider for GithubSources {
    fn source(&self, stage: Stage) -> Result<Arc<dyn ListingSource>, LtcError> {
        Ok(Arc::new(GithubClient::from_config(&self.config, stage)?))
    }
}

/// Pipeline stages in run order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter)]
#[strum(serialize_all = "kebab-case")]
pub enum StageName {
    /// Replaces the repository list, so only runs when asked for by name.
    Discover,
    Download,
    Filter,
    DeveloperProfile,
    DeveloperActivity,
    RepositoryTables,
    Sentiment,
    Merge,
}

pub struct Pipeline {
    config: LtcConfig,
    layout: Layout,
    sources: Arc<dyn SourceProvider>,
}

impl Pipeline {
    pub fn new(config: LtcConfig, sources: Arc<dyn SourceProvider>) -> Self {
        let layout = Layout::from_config(&config.paths);
        Self {
            config,
            layout,
            sources,
        }
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    fn workers(&self) -> usize {
        self.config.pipeline.workers
    }

    fn repositories(&self) -> Result<Vec<Repository>, LtcError> {
        let repos = load_repositories(&self.layout.repo_list)?;
        info!(
            count = repos.len(),
            path = %self.layout.repo_list.display(),
            "repository list loaded"
        );
        Ok(repos)
    }

    /// Run every stage after discovery in order, starting from the existing
    /// repository list. Stops at the first stage-level error.
    pub async fn run_all(&self) -> Result<(), LtcError> {
        for stage in StageName::iter().filter(|s| *s != StageName::Discover) {
            self.run(stage).await?;
        }
        Ok(())
    }

    /// Run one stage. Per-repository failures are logged, not returned.
    pub async fn run(&self, stage: StageName) -> Result<Option<StatusSummary>, LtcError> {
        info!(%stage, "stage started");
        let statuses = match stage {
            StageName::Discover => {
                let report = self.discover().await?;
                info!(%stage, found = report.found, kept = report.kept, "stage finished");
                return Ok(None);
            }
            StageName::Download => self.download().await?,
            StageName::Filter => self.filter().await?,
            StageName::DeveloperProfile => {
                self.tables(Stage::Developer, developer::PROFILE_ARCHIVES, developer_profile_task)
                    .await?
            }
            StageName::DeveloperActivity => {
                self.tables(Stage::Developer, developer::ACTIVITY_ARCHIVES, developer_activity_task)
                    .await?
            }
            StageName::RepositoryTables => {
                self.tables(Stage::Repository, repository::ARCHIVES, repository_tables_task)
                    .await?
            }
            StageName::Sentiment => self.sentiment().await?,
            StageName::Merge => {
                let reports = self.merge();
                info!(%stage, families = reports.len(), "stage finished");
                return Ok(None);
            }
        };
        let Some(statuses) = statuses else {
            return Ok(None);
        };
        let summary = StatusSummary::from_statuses(&statuses);
        log_summary(stage, &statuses, &summary);
        Ok(Some(summary))
    }

    /// Search for popular repositories with the download credential.
    pub async fn discover(&self) -> Result<DiscoverReport, LtcError> {
        let source = self.sources.source(Stage::Download)?;
        discover_repositories(
            &self.layout,
            source.as_ref(),
            self.config.retry.download_policy(),
            &self.config.github.api_base_url,
            &self.config.discover,
        )
        .await
    }

    async fn download(&self) -> Result<Option<Vec<RepoStatus>>, LtcError> {
        let repos = self.repositories()?;
        let ctx = Arc::new(DownloadContext {
            layout: self.layout.clone(),
            source: self.sources.source(Stage::Download)?,
            policy: self.config.retry.download_policy(),
            api_base_url: self.config.github.api_base_url.clone(),
        });
        let statuses = run_repositories(repos, self.workers(), move |repo| {
            download_repository(Arc::clone(&ctx), repo)
        })
        .await;
        Ok(Some(statuses))
    }

    async fn filter(&self) -> Result<Option<Vec<RepoStatus>>, LtcError> {
        let repos = self.repositories()?;
        let ctx = Arc::new(FilterContext {
            layout: self.layout.clone(),
            source: self.sources.source(Stage::Filter)?,
            filter: EligibilityFilter::from_config(&self.config.pipeline),
            profile_policy: self.config.retry.profile_policy(),
        });
        let statuses = run_repositories(repos, self.workers(), move |repo| {
            filter_repository(Arc::clone(&ctx), repo)
        })
        .await;
        Ok(Some(statuses))
    }

    /// Shared driver for the three feature table stages.
    ///
    /// Archive tables are loaded once off the runtime threads. When one the
    /// stage needs is absent the whole stage is skipped.
    async fn tables<F, Fut>(
        &self,
        credential: Stage,
        kinds: &'static [ArchiveKind],
        task: F,
    ) -> Result<Option<Vec<RepoStatus>>, LtcError>
    where
        F: Fn(Arc<TableContext>, Repository) -> Fut,
        Fut: Future<Output = Result<RepoOutcome, LtcError>> + Send + 'static,
    {
        let repos = self.repositories()?;
        let cutoff = self.config.archive.cutoff()?;

        let dir = self.layout.archive_dir.clone();
        let archive_config = self.config.archive.clone();
        let archives = tokio::task::spawn_blocking(move || {
            ArchiveSet::load(&dir, &archive_config, kinds)
        })
        .await
        .map_err(|e| LtcError::Internal(format!("archive loader panicked: {e}")))??;

        let missing = archives.missing(kinds);
        if !missing.is_empty() {
            let missing: Vec<String> = missing.iter().map(ToString::to_string).collect();
            warn!(missing = %missing.join(", "), "archive tables missing, stage skipped");
            return Ok(None);
        }

        let ctx = Arc::new(TableContext {
            layout: self.layout.clone(),
            cutoff,
            archives: Arc::new(archives),
            source: self.sources.source(credential)?,
            listing_policy: self.config.retry.listing_policy(),
        });
        let statuses =
            run_repositories(repos, self.workers(), move |repo| task(Arc::clone(&ctx), repo)).await;
        Ok(Some(statuses))
    }

    async fn sentiment(&self) -> Result<Option<Vec<RepoStatus>>, LtcError> {
        let repos = self.repositories()?;
        let ctx = Arc::new(SentimentContext::open(self.layout.clone())?);
        let statuses = run_repositories(repos.clone(), self.workers(), move |repo| {
            score_repository(Arc::clone(&ctx), repo)
        })
        .await;
        write_summary(&self.layout, &repos)?;
        Ok(Some(statuses))
    }

    /// Merge every family; a family that fails to merge is logged and left.
    pub fn merge(&self) -> Vec<MergeReport> {
        TableFamily::iter()
            .filter_map(|family| match merge_family(&self.layout, family) {
                Ok(report) => Some(report),
                Err(e) => {
                    warn!(%family, error = %e, "family merge failed");
                    None
                }
            })
            .collect()
    }
}

fn log_summary(stage: StageName, statuses: &[RepoStatus], summary: &StatusSummary) {
    for status in statuses {
        match &status.outcome {
            RepoOutcome::Skipped { reason } => {
                info!(%stage, repo = %status.repo, %reason, "skipped")
            }
            RepoOutcome::Failed { error } => warn!(%stage, repo = %status.repo, %error, "failed"),
            RepoOutcome::Completed { .. } => {}
        }
    }
    info!(
        %stage,
        completed = summary.completed,
        skipped = summary.skipped,
        failed = summary.failed,
        rows = summary.rows_written,
        "stage finished"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_names_match_commands() {
        let names: Vec<String> = StageName::iter().map(|s| s.to_string()).collect();
        assert_eq!(
            names,
            vec![
                "discover",
                "download",
                "filter",
                "developer-profile",
                "developer-activity",
                "repository-tables",
                "sentiment",
                "merge",
            ]
        );
    }
}
