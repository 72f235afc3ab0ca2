// SPDX-FileCopyrightText: 2026 LtcScope Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! URL helpers: `Link` header pagination and URI-template placeholders.

use std::sync::LazyLock;

use regex::Regex;
use reqwest::Url;

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{.*?\}").expect("placeholder pattern is valid"));

/// Remove URI-template placeholders such as `{/sha}` from an API URL.
pub fn strip_placeholders(url: &str) -> String {
    PLACEHOLDER.replace_all(url, "").into_owned()
}

/// Extract the `rel="next"` target from a `Link` header value.
pub fn next_link(header: &str) -> Option<String> {
    header.split(',').find_map(|part| {
        let mut pieces = part.split(';');
        let target = pieces.next()?.trim();
        let is_next = pieces.any(|param| {
            let param = param.trim();
            param == r#"rel="next""# || param == "rel=next"
        });
        if !is_next {
            return None;
        }
        target
            .strip_prefix('<')
            .and_then(|t| t.strip_suffix('>'))
            .map(str::to_string)
    })
}

/// Add `per_page` to the first-page URL unless the caller already set it.
pub fn with_page_size(url: &str, per_page: u32) -> Option<String> {
    let mut parsed = Url::parse(url).ok()?;
    let has_page_size = parsed.query_pairs().any(|(k, _)| k == "per_page");
    if !has_page_size {
        parsed
            .query_pairs_mut()
            .append_pair("per_page", &per_page.to_string());
    }
    Some(parsed.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_template_placeholders() {
        assert_eq!(
            strip_placeholders("https://api.github.com/repos/o/r/commits{/sha}"),
            "https://api.github.com/repos/o/r/commits"
        );
        assert_eq!(
            strip_placeholders("https://api.github.com/repos/o/r/issues/comments{/number}"),
            "https://api.github.com/repos/o/r/issues/comments"
        );
    }

    #[test]
    fn finds_next_among_several_relations() {
        let header = r#"<https://api.github.com/x?page=1>; rel="prev", <https://api.github.com/x?page=3>; rel="next", <https://api.github.com/x?page=9>; rel="last""#;
        assert_eq!(
            next_link(header).as_deref(),
            Some("https://api.github.com/x?page=3")
        );
    }

    #[test]
    fn last_page_has_no_next() {
        let header = r#"<https://api.github.com/x?page=1>; rel="first", <https://api.github.com/x?page=8>; rel="prev""#;
        assert_eq!(next_link(header), None);
    }

    #[test]
    fn page_size_is_added_once() {
        let url = with_page_size("https://api.github.com/repos/o/r/issues?state=all", 100).unwrap();
        assert_eq!(url, "https://api.github.com/repos/o/r/issues?state=all&per_page=100");
        let again = with_page_size(&url, 50).unwrap();
        assert_eq!(again, url);
        assert!(with_page_size("not a url", 100).is_none());
    }
}
