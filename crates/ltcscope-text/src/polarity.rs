// SPDX-FileCopyrightText: 2026 LtcScope Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Three-way polarity from the VADER compound score.

use std::sync::LazyLock;

use serde::{Deserialize, Serialize};
use vader_sentiment::SentimentIntensityAnalyzer;

/// Compound scores at or beyond this magnitude are not neutral.
pub const NEUTRAL_BAND: f64 = 0.05;

static ANALYZER: LazyLock<SentimentIntensityAnalyzer> =
    LazyLock::new(SentimentIntensityAnalyzer::new);

/// Polarity of one comment, stored as `1`, `0` or `-1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "i8", try_from = "i8")]
pub enum Polarity {
    Negative,
    Neutral,
    Positive,
}

impl Polarity {
    pub fn from_compound(compound: f64) -> Self {
        if compound >= NEUTRAL_BAND {
            Polarity::Positive
        } else if compound <= -NEUTRAL_BAND {
            Polarity::Negative
        } else {
            Polarity::Neutral
        }
    }

    pub fn value(self) -> i8 {
        match self {
            Polarity::Negative => -1,
            Polarity::Neutral => 0,
            Polarity::Positive => 1,
        }
    }
}

impl From<Polarity> for i8 {
    fn from(p: Polarity) -> Self {
        p.value()
    }
}

impl TryFrom<i8> for Polarity {
    type Error = String;

    fn try_from(v: i8) -> Result<Self, Self::Error> {
        match v {
            -1 => Ok(Polarity::Negative),
            0 => Ok(Polarity::Neutral),
            1 => Ok(Polarity::Positive),
            other => Err(format!("polarity must be -1, 0 or 1, got {other}")),
        }
    }
}

/// The VADER compound score of `text`, in `[-1, 1]`.
pub fn compound(text: &str) -> f64 {
    ANALYZER
        .polarity_scores(text)
        .get("compound")
        .copied()
        .unwrap_or(0.0)
}

/// Score a cleaned comment.
pub fn score(text: &str) -> Polarity {
    Polarity::from_compound(compound(text))
}
