// SPDX-FileCopyrightText: 2026 LtcScope Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Eligibility filter: which contributors qualify, and their retention flags.

use std::sync::Arc;

use chrono::{DateTime, Datelike, Utc};
use ltcscope_archive::parse_timestamp;
use ltcscope_config::model::PipelineConfig;
use ltcscope_core::records::{Activity, Commit};
use ltcscope_core::window::add_years;
use ltcscope_core::{
    Contributor, ListingSource, LtcError, RawContributor, Repository, RetryPolicy, TenureFlags,
    Window,
};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info};

use crate::dataset::{load_raw_contributors, read_records, write_json};
use crate::layout::{DumpKind, Layout};
use crate::pool::RepoOutcome;

/// Why a contributor was left out. Exclusion is the common case, not an error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("bot account")]
    Bot,
    #[error("account creation date unavailable")]
    MissingCreationDate,
    #[error("no commits in the repository")]
    NoCommits,
    #[error("registered in {year}, fewer than {min_years} years of observation")]
    TooRecent { year: i32, min_years: u32 },
    #[error("first commit precedes account creation")]
    NegativeTenure,
}

/// Decides eligibility against a fixed "now" year.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EligibilityFilter {
    current_year: i32,
    min_observation_years: u32,
}

impl EligibilityFilter {
    pub fn new(current_year: i32, min_observation_years: u32) -> Self {
        Self {
            current_year,
            min_observation_years,
        }
    }

    /// Uses `pipeline.current_year`, or the current UTC year when unset.
    pub fn from_config(pipeline: &PipelineConfig) -> Self {
        let year = pipeline.current_year.unwrap_or_else(|| Utc::now().year());
        Self::new(year, pipeline.min_observation_years)
    }

    /// Earliest commit by `user_id`.
    pub fn registration_date(user_id: i64, commits: &[Commit]) -> Option<DateTime<Utc>> {
        commits
            .iter()
            .filter(|c| c.actor_id() == Some(user_id))
            .filter_map(Activity::created_at)
            .min()
    }

    /// Whether `user_id` committed in each of years 1, 2 and 3 after `registration`.
    ///
    /// Year `n` is `[registration + n years, registration + (n + 1) years)`.
    pub fn tenure(user_id: i64, registration: DateTime<Utc>, commits: &[Commit]) -> TenureFlags {
        let committed_in_year = |n: u32| {
            let window = Window::span(add_years(registration, n), add_years(registration, n + 1));
            commits
                .iter()
                .filter(|c| c.actor_id() == Some(user_id))
                .any(|c| window.contains_opt(c.created_at()))
        };
        TenureFlags::new(committed_in_year(1), committed_in_year(2), committed_in_year(3))
    }

    /// Qualify `raw` given its account creation instant and the repository's commits.
    pub fn evaluate(
        &self,
        raw: RawContributor,
        created: Option<DateTime<Utc>>,
        commits: &[Commit],
    ) -> Result<Contributor, Rejection> {
        if raw.is_bot() {
            return Err(Rejection::Bot);
        }
        let created = created.ok_or(Rejection::MissingCreationDate)?;
        let registration =
            Self::registration_date(raw.id, commits).ok_or(Rejection::NoCommits)?;

        let year = registration.year();
        let min_years = self.min_observation_years;
        if i64::from(year) > i64::from(self.current_year) - i64::from(min_years) {
            return Err(Rejection::TooRecent { year, min_years });
        }
        if registration < created {
            return Err(Rejection::NegativeTenure);
        }

        let tenure = Self::tenure(raw.id, registration, commits);
        Ok(Contributor::qualify(raw, created, registration, tenure))
    }
}

/// Read `created_at` from an account profile object.
pub fn profile_created_at(profile: &Value) -> Option<DateTime<Utc>> {
    profile
        .get("created_at")
        .and_then(Value::as_str)
        .and_then(parse_timestamp)
}

/// Shared state for the filter stage.
pub struct FilterContext {
    pub layout: Layout,
    pub source: Arc<dyn ListingSource>,
    pub filter: EligibilityFilter,
    pub profile_policy: RetryPolicy,
}

/// Qualify every contributor of one repository and write the result.
///
/// A repository whose output already exists is skipped.
pub async fn filter_repository(
    ctx: Arc<FilterContext>,
    repo: Repository,
) -> Result<RepoOutcome, LtcError> {
    let output = ctx.layout.contributors_path(&repo.name);
    if output.exists() {
        return Ok(RepoOutcome::Skipped {
            reason: "contributors already filtered".into(),
        });
    }

    let raw_contributors = load_raw_contributors(&ctx.layout, &repo.name)?;
    let commits: Vec<Commit> = read_records(&ctx.layout.dump_path(&repo.name, DumpKind::Commits))?;

    let mut qualified = Vec::new();
    let mut rejected = 0usize;
    for raw in raw_contributors {
        let login = raw.login.clone();
        let created = if raw.is_bot() {
            None
        } else {
            match raw.url.as_deref() {
                Some(url) => ctx
                    .source
                    .fetch_object(url, ctx.profile_policy)
                    .await?
                    .as_ref()
                    .and_then(profile_created_at),
                None => None,
            }
        };

        match ctx.filter.evaluate(raw, created, &commits) {
            Ok(contributor) => {
                debug!(
                    repo = %repo.name,
                    login = %login,
                    ltc = %contributor.ltc,
                    "contributor qualified"
                );
                qualified.push(contributor);
            }
            Err(reason) => {
                debug!(repo = %repo.name, login = %login, %reason, "contributor rejected");
                rejected += 1;
            }
        }
    }

    write_json(&output, &qualified)?;
    info!(
        repo = %repo.name,
        qualified = qualified.len(),
        rejected,
        "contributors filtered"
    );
    Ok(RepoOutcome::Completed {
        written: qualified.len(),
        skipped: rejected,
    })
}
