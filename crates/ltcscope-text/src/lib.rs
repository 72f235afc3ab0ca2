// SPDX-FileCopyrightText: 2026 LtcScope Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Comment text cleaning and sentiment tables for LtcScope.
//!
//! [`clean_text`] filters and normalises free text, [`polarity::score`] maps
//! the VADER compound score onto `-1/0/1`, and the stage functions write the
//! per-kind comment files and the per-contributor summary.

pub mod clean;
pub mod comments;
pub mod lemma;
pub mod polarity;
pub mod stage;
pub mod stopwords;
pub mod summary;

pub use clean::{clean_text, is_english, normalize};
pub use comments::{CommentKind, ScoredComment};
pub use polarity::Polarity;
pub use stage::{SentimentContext, score_repository};
pub use summary::{SUMMARY_COLUMNS, SummaryRow, build_summary, write_summary};
