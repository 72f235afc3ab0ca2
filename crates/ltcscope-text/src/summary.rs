// SPDX-FileCopyrightText: 2026 LtcScope Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The per-contributor comment summary (`Sentiment/comments.csv`).

use std::collections::HashMap;
use std::path::PathBuf;

use chrono::NaiveDate;
use ltcscope_core::window::add_years;
use ltcscope_core::{LtcError, Repository, Window};
use ltcscope_features::dataset::load_contributors;
use ltcscope_features::Layout;
use serde::Serialize;
use strum::IntoEnumIterator;
use tracing::{debug, info};

use crate::comments::{CommentKind, ScoredComment, read_comments};

pub const SUMMARY_FILE: &str = "comments.csv";

/// Header of the summary, in [`SummaryRow`] field order.
pub const SUMMARY_COLUMNS: &[&str] = &[
    "repo_name",
    "repo_id",
    "contributor_id",
    "date",
    "num_comments",
    "avg_sentiment",
    "ltc_1",
    "ltc_2",
    "ltc_3",
];

/// One qualified contributor with comments in their first year.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryRow {
    pub repo_name: String,
    pub repo_id: i64,
    pub contributor_id: i64,
    pub date: NaiveDate,
    pub num_comments: u64,
    pub avg_sentiment: f64,
    pub ltc_1: u8,
    pub ltc_2: u8,
    pub ltc_3: u8,
}

/// Mean polarity to one decimal, ties to even.
pub fn average_polarity(comments: &[&ScoredComment]) -> f64 {
    if comments.is_empty() {
        return 0.0;
    }
    let sum: f64 = comments.iter().map(|c| f64::from(c.polarity.value())).sum();
    let mean = sum / comments.len() as f64;
    (mean * 10.0).round_ties_even() / 10.0
}

/// Rebuild the summary from the per-kind sentiment files.
///
/// Comments received in `[registration, registration + 1 year)` count. A
/// repository without a contributors file is skipped.
pub fn build_summary(layout: &Layout, repos: &[Repository]) -> Result<Vec<SummaryRow>, LtcError> {
    let dir = layout.sentiment_dir();
    let mut by_contributor: HashMap<(i64, i64), Vec<ScoredComment>> = HashMap::new();
    for kind in CommentKind::iter() {
        for comment in read_comments(&dir.join(kind.file_name()))? {
            by_contributor
                .entry((comment.repo_id, comment.contributor))
                .or_default()
                .push(comment);
        }
    }

    let mut rows = Vec::new();
    for repo in repos {
        let contributors = match load_contributors(layout, &repo.name) {
            Ok(c) => c,
            Err(e) if e.is_missing_input() => {
                debug!(repo = %repo.name, "no contributors file, not summarised");
                continue;
            }
            Err(e) => return Err(e),
        };
        for contributor in contributors {
            let Some(comments) = by_contributor.get(&(repo.id, contributor.id)) else {
                continue;
            };
            let reg = contributor.registration_date;
            let first_year = Window::span(reg, add_years(reg, 1));
            let in_year: Vec<&ScoredComment> =
                comments.iter().filter(|c| first_year.contains(c.date)).collect();
            if in_year.is_empty() {
                continue;
            }
            let flags = contributor.ltc_flags();
            rows.push(SummaryRow {
                repo_name: repo.name.clone(),
                repo_id: repo.id,
                contributor_id: contributor.id,
                date: reg.date_naive(),
                num_comments: in_year.len() as u64,
                avg_sentiment: average_polarity(&in_year),
                ltc_1: flags.ltc_1,
                ltc_2: flags.ltc_2,
                ltc_3: flags.ltc_3,
            });
        }
    }
    Ok(rows)
}

/// Rewrite `Sentiment/comments.csv` and return its path with the row count.
///
/// The header is written even when no contributor has comments.
pub fn write_summary(
    layout: &Layout,
    repos: &[Repository],
) -> Result<(PathBuf, usize), LtcError> {
    let rows = build_summary(layout, repos)?;
    let dir = layout.sentiment_dir();
    std::fs::create_dir_all(&dir).map_err(|e| LtcError::io(&dir, e))?;
    let path = dir.join(SUMMARY_FILE);

    let csv_error = |e: csv::Error| LtcError::parse(path.display().to_string(), e);
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(&path)
        .map_err(csv_error)?;
    writer.write_record(SUMMARY_COLUMNS).map_err(csv_error)?;
    for row in &rows {
        writer.serialize(row).map_err(csv_error)?;
    }
    writer.flush().map_err(|e| LtcError::io(&path, e))?;
    info!(rows = rows.len(), path = %path.display(), "comment summary written");
    Ok((path, rows.len()))
}
