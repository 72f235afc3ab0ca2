// SPDX-FileCopyrightText: 2026 LtcScope Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Comment text cleaning.
//!
//! English-only. The text is NFKD-normalised, stripped of code, links,
//! mentions and punctuation, tokenised, filtered against the stopword list and
//! lemmatised. Fewer than two surviving tokens carry too little signal and
//! yield `None`.

use std::sync::LazyLock;

use regex::Regex;
use unicode_normalization::UnicodeNormalization;
use whatlang::Lang;

use crate::lemma::lemmatize;
use crate::stopwords::is_stopword;

/// Minimum number of tokens a cleaned comment keeps.
pub const MIN_TOKENS: usize = 2;

/// Removal passes, applied in order.
static STRIP_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        // Fenced code, possibly spanning lines
        r"(?s)```.*?```",
        // Inline code
        r"`[^`]*`",
        // Links, optionally wrapped in parentheses
        r"\(?https?://[^\s)]+\)?",
        r"www\.\S+",
        r"@\w+",
        // Punctuation and combining marks left over from NFKD
        r"[^\w\s]|\p{M}",
    ]
    .into_iter()
    .map(|p| Regex::new(p).expect("strip pattern is valid"))
    .collect()
});

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

/// Whether the text is detected as English.
pub fn is_english(text: &str) -> bool {
    whatlang::detect(text).is_some_and(|info| info.lang() == Lang::Eng)
}

/// Clean text already known to be English.
pub fn normalize(text: &str) -> Option<String> {
    let text: String = text.nfkd().collect();
    let mut text = WHITESPACE.replace_all(&text, " ").trim().to_string();
    for pattern in STRIP_PATTERNS.iter() {
        text = pattern.replace_all(&text, "").into_owned();
    }

    let tokens: Vec<String> = text
        .to_lowercase()
        .split_whitespace()
        .filter(|t| t.chars().all(char::is_alphabetic) && !is_stopword(t))
        .map(lemmatize)
        .collect();

    (tokens.len() >= MIN_TOKENS).then(|| tokens.join(" "))
}

/// Detect the language, then clean. Non-English text yields `None`.
pub fn clean_text(text: &str) -> Option<String> {
    if !is_english(text) {
        return None;
    }
    normalize(text)
}
