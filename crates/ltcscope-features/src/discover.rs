// SPDX-FileCopyrightText: 2026 LtcScope Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Discover stage: seed the repository list from a popular-repository search.
//!
//! The search runs once per invocation, newest star counts first. Results are
//! capped, passed through the same rules the download stage applies and
//! written as the repository list every later stage reads.

use ltcscope_config::DiscoverConfig;
use ltcscope_core::{ListingSource, LtcError, Repository, RetryPolicy};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::dataset::{remove_if_exists, write_json};
use crate::download::qualifies;
use crate::layout::Layout;

/// Counts from one search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiscoverReport {
    /// Search results considered, after the cap.
    pub found: usize,
    /// Repositories written to the list.
    pub kept: usize,
}

/// Search URL for public repositories with more than `min_stars` stars,
/// most starred first. The client adds the page size.
pub fn search_url(api_base_url: &str, min_stars: u64) -> String {
    format!(
        "{}/search/repositories?q=stars%3A%3E{min_stars}+is%3Apublic&sort=stars&order=desc",
        api_base_url.trim_end_matches('/')
    )
}

/// Run the search and replace the repository list with its qualifying results.
///
/// A search that ended early leaves the existing list untouched; what did
/// arrive goes to [`Layout::partial_repo_list`] and the call fails with
/// [`LtcError::Incomplete`].
pub async fn discover_repositories(
    layout: &Layout,
    source: &dyn ListingSource,
    policy: RetryPolicy,
    api_base_url: &str,
    settings: &DiscoverConfig,
) -> Result<DiscoverReport, LtcError> {
    let url = search_url(api_base_url, settings.min_stars);
    let listing = source.fetch_listing(&url, policy).await?;
    let partial = layout.partial_repo_list();
    if listing.truncated {
        warn!(
            url,
            fetched = listing.items.len(),
            partial = %partial.display(),
            "repository search ended early, list left unchanged"
        );
        write_json(&partial, &listing.items)?;
        return Err(LtcError::Incomplete { url });
    }

    let mut results = listing.items;
    results.truncate(settings.max_repos);
    let found = results.len();
    let kept: Vec<Value> = results.into_iter().filter(downloadable).collect();

    write_json(&layout.repo_list, &kept)?;
    remove_if_exists(&partial)?;
    info!(
        found,
        kept = kept.len(),
        path = %layout.repo_list.display(),
        "repository list written"
    );
    Ok(DiscoverReport {
        found,
        kept: kept.len(),
    })
}

fn downloadable(record: &Value) -> bool {
    match serde_json::from_value::<Repository>(record.clone()) {
        Ok(repo) => qualifies(&repo),
        Err(e) => {
            debug!(error = %e, "search result is not a repository record");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ltcscope_test_utils::MockListingSource;
    use ltcscope_test_utils::fixtures;
    use serde_json::json;

    const BASE: &str = "https://api.github.com";

    fn settings(max_repos: usize) -> DiscoverConfig {
        DiscoverConfig {
            min_stars: 3000,
            max_repos,
        }
    }

    fn read_list(layout: &Layout) -> Vec<Value> {
        let body = std::fs::read_to_string(&layout.repo_list).unwrap();
        serde_json::from_str(&body).unwrap()
    }

    #[test]
    fn search_url_encodes_the_star_threshold() {
        assert_eq!(
            search_url("https://api.github.com/", 3000),
            "https://api.github.com/search/repositories\
             ?q=stars%3A%3E3000+is%3Apublic&sort=stars&order=desc"
        );
    }

    #[tokio::test]
    async fn keeps_qualifying_results_up_to_the_cap() {
        let dir = tempfile::tempdir().unwrap();
        let layout = Layout::under(dir.path());
        let mut fork = fixtures::repository(3, "forked", Some("Go"));
        fork["fork"] = json!(true);
        let source = MockListingSource::new().with_listing(
            search_url(BASE, 3000),
            vec![
                fixtures::repository(1, "widgets", Some("Rust")),
                fixtures::repository(2, "docs", None),
                fork,
                fixtures::repository(4, "gadgets", Some("C")),
                fixtures::repository(5, "beyond-cap", Some("Rust")),
            ],
        );

        let report = discover_repositories(&layout, &source, RetryPolicy::NONE, BASE, &settings(4))
            .await
            .unwrap();
        assert_eq!(report, DiscoverReport { found: 4, kept: 2 });

        let names: Vec<String> = read_list(&layout)
            .iter()
            .filter_map(|r| r["name"].as_str().map(str::to_string))
            .collect();
        assert_eq!(names, ["widgets", "gadgets"]);
        // The full record is kept for the download stage.
        assert!(read_list(&layout)[0]["contributors_url"].is_string());
    }

    #[tokio::test]
    async fn interrupted_search_keeps_the_existing_list() {
        let dir = tempfile::tempdir().unwrap();
        let layout = Layout::under(dir.path());
        fixtures::write_json(
            &layout.repo_list,
            &json!([fixtures::repository(9, "previous", Some("Rust"))]),
        );
        let source = MockListingSource::new().with_truncated_listing(
            search_url(BASE, 3000),
            vec![fixtures::repository(1, "widgets", Some("Rust"))],
        );

        let err = discover_repositories(&layout, &source, RetryPolicy::NONE, BASE, &settings(1000))
            .await
            .unwrap_err();
        assert!(err.is_incomplete());
        let list = read_list(&layout);
        assert_eq!(list.len(), 1);
        assert_eq!(list[0]["name"], "previous");
        assert!(layout.partial_repo_list().exists());
    }

    #[tokio::test]
    async fn empty_search_writes_an_empty_list() {
        let dir = tempfile::tempdir().unwrap();
        let layout = Layout::under(dir.path());
        let source = MockListingSource::new();

        let report =
            discover_repositories(&layout, &source, RetryPolicy::NONE, BASE, &settings(1000))
                .await
                .unwrap();
        assert_eq!(report, DiscoverReport { found: 0, kept: 0 });
        assert!(read_list(&layout).is_empty());
        assert_eq!(source.calls().await, vec![search_url(BASE, 3000)]);
    }
}
