// SPDX-FileCopyrightText: 2026 LtcScope Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Rule-based noun lemmatisation.
//!
//! Follows the WordNet noun detachment rules (`-ies` to `-y`, `-ches` to
//! `-ch`, plain `-s`, ...) plus a short table of irregular plurals. Without a
//! dictionary to confirm candidates, words that look singular (`-ss`, `-us`,
//! `-is`, three letters or fewer) are left alone.

const IRREGULAR: &[(&str, &str)] = &[
    ("children", "child"),
    ("men", "man"),
    ("women", "woman"),
    ("mice", "mouse"),
    ("feet", "foot"),
    ("teeth", "tooth"),
    ("geese", "goose"),
    ("indices", "index"),
    ("matrices", "matrix"),
    ("vertices", "vertex"),
    ("analyses", "analysis"),
    ("criteria", "criterion"),
    ("phenomena", "phenomenon"),
];

const KEEP_ENDINGS: &[&str] = &["ss", "us", "is"];

/// Suffix rewrites, longest first.
const RULES: &[(&str, &str)] = &[
    ("sses", "ss"),
    ("ches", "ch"),
    ("shes", "sh"),
    ("ies", "y"),
    ("xes", "x"),
    ("zes", "z"),
    ("s", ""),
];

/// The singular form of a lowercase token.
pub fn lemmatize(word: &str) -> String {
    if let Some((_, lemma)) = IRREGULAR.iter().find(|(plural, _)| *plural == word) {
        return (*lemma).to_string();
    }
    if word.chars().count() <= 3 || KEEP_ENDINGS.iter().any(|end| word.ends_with(end)) {
        return word.to_string();
    }
    for (suffix, replacement) in RULES {
        if let Some(stem) = word.strip_suffix(suffix) {
            if stem.chars().count() >= 2 {
                return format!("{stem}{replacement}");
            }
        }
    }
    word.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn regular_plurals() {
        assert_eq!(lemmatize("tests"), "test");
        assert_eq!(lemmatize("libraries"), "library");
        assert_eq!(lemmatize("patches"), "patch");
        assert_eq!(lemmatize("boxes"), "box");
        assert_eq!(lemmatize("classes"), "class");
        assert_eq!(lemmatize("changes"), "change");
    }

    #[test]
    fn singular_looking_words_are_kept() {
        for word in ["class", "status", "analysis", "bus", "fix", "was"] {
            assert_eq!(lemmatize(word), word);
        }
    }

    #[test]
    fn irregular_plurals() {
        assert_eq!(lemmatize("children"), "child");
        assert_eq!(lemmatize("indices"), "index");
    }
}
