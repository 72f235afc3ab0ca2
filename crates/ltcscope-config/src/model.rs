// SPDX-FileCopyrightText: 2026 LtcScope Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for LtcScope.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use std::time::Duration;

use ltcscope_core::{ArchiveCutoff, LtcError, RetryPolicy};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

/// Top-level LtcScope configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LtcConfig {
    /// Input and output locations.
    #[serde(default)]
    pub paths: PathsConfig,

    /// Historical archive files and coverage cutoff.
    #[serde(default)]
    pub archive: ArchiveConfig,

    /// Hosting API endpoint and per-stage credentials.
    #[serde(default)]
    pub github: GithubConfig,

    /// Retry and rate-limit wait policies.
    #[serde(default)]
    pub retry: RetryConfig,

    /// Worker pool and eligibility settings.
    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// Popular-repository search that seeds the repository list.
    #[serde(default)]
    pub discover: DiscoverConfig,
}

/// Input and output locations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PathsConfig {
    /// JSON array of repositories to process.
    #[serde(default = "default_repo_list")]
    pub repo_list: String,

    /// Per-repository API dumps: `<datasets_dir>/<repo>/<kind>_<repo>.json`.
    #[serde(default = "default_datasets_dir")]
    pub datasets_dir: String,

    /// Qualified contributors: `<contributors_dir>/contributors_<repo>.json`.
    #[serde(default = "default_contributors_dir")]
    pub contributors_dir: String,

    /// Root of every output table family.
    #[serde(default = "default_tables_dir")]
    pub tables_dir: String,

    /// Directory holding the historical CSV exports.
    #[serde(default = "default_archive_dir")]
    pub archive_dir: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            repo_list: default_repo_list(),
            datasets_dir: default_datasets_dir(),
            contributors_dir: default_contributors_dir(),
            tables_dir: default_tables_dir(),
            archive_dir: default_archive_dir(),
        }
    }
}

fn default_repo_list() -> String {
    "filteredRepos.json".to_string()
}

fn default_datasets_dir() -> String {
    "Datasets".to_string()
}

fn default_contributors_dir() -> String {
    "FilteredContributors".to_string()
}

fn default_tables_dir() -> String {
    "Tables".to_string()
}

fn default_archive_dir() -> String {
    "GHTorrent Data".to_string()
}

/// Historical archive configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ArchiveConfig {
    /// Last instant covered by the export (RFC 3339).
    #[serde(default = "default_cutoff")]
    pub cutoff: String,

    /// Issue events export (`issue_id`, `action`, `created_at`).
    #[serde(default = "default_issue_events")]
    pub issue_events: String,

    /// Pull request events export (`pull_request_id`, `action`, `created_at`).
    #[serde(default = "default_pull_events")]
    pub pull_events: String,

    /// Watchers export (`repo_id`, `user_id`, `created_at`).
    #[serde(default = "default_watchers")]
    pub watchers: String,

    /// Issues export (`reporter_id`, `pull_request`, `created_at`).
    #[serde(default = "default_issues")]
    pub issues: String,

    /// Followers export (`user_id`, `created_at`).
    #[serde(default = "default_followers")]
    pub followers: String,

    /// Commits export (`author_id`, `project_id`, `created_at`).
    #[serde(default = "default_commits")]
    pub commits: String,
}

impl ArchiveConfig {
    /// Parsed coverage cutoff.
    pub fn cutoff(&self) -> Result<ArchiveCutoff, LtcError> {
        ArchiveCutoff::parse(&self.cutoff)
    }
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            cutoff: default_cutoff(),
            issue_events: default_issue_events(),
            pull_events: default_pull_events(),
            watchers: default_watchers(),
            issues: default_issues(),
            followers: default_followers(),
            commits: default_commits(),
        }
    }
}

fn default_cutoff() -> String {
    ltcscope_core::source::DEFAULT_ARCHIVE_CUTOFF.to_string()
}

fn default_issue_events() -> String {
    "issue_events_filtered.csv".to_string()
}

fn default_pull_events() -> String {
    "pull_events_filtered.csv".to_string()
}

fn default_watchers() -> String {
    "watchers_filtered.csv".to_string()
}

fn default_issues() -> String {
    "issues_filtered.csv".to_string()
}

fn default_followers() -> String {
    "follower_filtered.csv".to_string()
}

fn default_commits() -> String {
    "commits_filtered.csv".to_string()
}

/// Pipeline stage that owns an API credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Download,
    Filter,
    Developer,
    Repository,
}

/// Hosting API configuration.
///
/// Each stage has its own credential to spread quota; a stage without a
/// credential runs unauthenticated.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GithubConfig {
    /// API root used for the rate-limit query.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Page size requested on the first page of every listing.
    #[serde(default = "default_per_page")]
    pub per_page: u32,

    /// Per-request timeout.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    #[serde(default)]
    pub download_token: Option<String>,

    #[serde(default)]
    pub filter_token: Option<String>,

    #[serde(default)]
    pub developer_token: Option<String>,

    #[serde(default)]
    pub repository_token: Option<String>,
}

impl GithubConfig {
    /// The credential for a stage, wrapped so it never reaches logs.
    pub fn token_for(&self, stage: Stage) -> Option<SecretString> {
        let token = match stage {
            Stage::Download => &self.download_token,
            Stage::Filter => &self.filter_token,
            Stage::Developer => &self.developer_token,
            Stage::Repository => &self.repository_token,
        };
        token
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .map(|t| SecretString::from(t.to_string()))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            per_page: default_per_page(),
            request_timeout_secs: default_request_timeout_secs(),
            download_token: None,
            filter_token: None,
            developer_token: None,
            repository_token: None,
        }
    }
}

fn default_api_base_url() -> String {
    "https://api.github.com".to_string()
}

fn default_per_page() -> u32 {
    100
}

fn default_request_timeout_secs() -> u64 {
    60
}

/// Retry and rate-limit wait policies.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RetryConfig {
    /// Retries for feature-table event listings.
    #[serde(default)]
    pub listing_max_retries: u32,

    /// Retries for single profile lookups in the filter stage.
    #[serde(default = "default_profile_max_retries")]
    pub profile_max_retries: u32,

    /// Retries for full dump downloads.
    #[serde(default = "default_download_max_retries")]
    pub download_max_retries: u32,

    /// Fixed delay between retries.
    #[serde(default = "default_retry_delay_secs")]
    pub retry_delay_secs: u64,

    /// Safety margin added to the quota reset instant.
    #[serde(default = "default_reset_margin_secs")]
    pub reset_margin_secs: u64,

    /// Consecutive failed rate-limit queries before giving up.
    #[serde(default = "default_quota_max_failures")]
    pub quota_max_failures: u32,
}

impl RetryConfig {
    pub fn listing_policy(&self) -> RetryPolicy {
        RetryPolicy::fixed(self.listing_max_retries, self.retry_delay())
    }

    pub fn profile_policy(&self) -> RetryPolicy {
        RetryPolicy::fixed(self.profile_max_retries, self.retry_delay())
    }

    pub fn download_policy(&self) -> RetryPolicy {
        RetryPolicy::fixed(self.download_max_retries, self.retry_delay())
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.retry_delay_secs)
    }

    pub fn reset_margin(&self) -> Duration {
        Duration::from_secs(self.reset_margin_secs)
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            listing_max_retries: 0,
            profile_max_retries: default_profile_max_retries(),
            download_max_retries: default_download_max_retries(),
            retry_delay_secs: default_retry_delay_secs(),
            reset_margin_secs: default_reset_margin_secs(),
            quota_max_failures: default_quota_max_failures(),
        }
    }
}

fn default_profile_max_retries() -> u32 {
    2
}

fn default_download_max_retries() -> u32 {
    6
}

fn default_retry_delay_secs() -> u64 {
    5
}

fn default_reset_margin_secs() -> u64 {
    5
}

fn default_quota_max_failures() -> u32 {
    5
}

/// Worker pool and eligibility settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PipelineConfig {
    /// Repositories processed concurrently.
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Contributors who registered within this many calendar years of "now"
    /// are excluded (not enough observation time).
    #[serde(default = "default_min_observation_years")]
    pub min_observation_years: u32,

    /// Pin "now" to a calendar year for reproducible runs.
    #[serde(default)]
    pub current_year: Option<i32>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            log_level: default_log_level(),
            min_observation_years: default_min_observation_years(),
            current_year: None,
        }
    }
}

fn default_workers() -> usize {
    3
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_min_observation_years() -> u32 {
    3
}

/// Popular-repository search settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DiscoverConfig {
    /// Only repositories with more stars than this are returned.
    #[serde(default = "default_min_stars")]
    pub min_stars: u64,

    /// Search results kept, before the download rules are applied. The search
    /// API never serves more than 1000.
    #[serde(default = "default_max_repos")]
    pub max_repos: usize,
}

impl Default for DiscoverConfig {
    fn default() -> Self {
        Self {
            min_stars: default_min_stars(),
            max_repos: default_max_repos(),
        }
    }
}

fn default_min_stars() -> u64 {
    3000
}

fn default_max_repos() -> usize {
    1000
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn defaults_match_original_pipeline() {
        let config = LtcConfig::default();
        assert_eq!(config.pipeline.workers, 3);
        assert_eq!(config.retry.download_policy().max_retries, 6);
        assert_eq!(config.retry.profile_policy().max_retries, 2);
        assert_eq!(config.retry.listing_policy(), RetryPolicy::fixed(0, Duration::from_secs(5)));
        assert!(config.archive.cutoff().is_ok());
        assert_eq!(config.discover.min_stars, 3000);
        assert_eq!(config.discover.max_repos, 1000);
    }

    #[test]
    fn blank_token_is_treated_as_absent() {
        let github = GithubConfig {
            filter_token: Some("   ".into()),
            developer_token: Some("ghp_abc".into()),
            ..GithubConfig::default()
        };
        assert!(github.token_for(Stage::Filter).is_none());
        assert_eq!(
            github
                .token_for(Stage::Developer)
                .unwrap()
                .expose_secret(),
            "ghp_abc"
        );
        assert!(github.token_for(Stage::Repository).is_none());
    }
}
