// SPDX-FileCopyrightText: 2026 LtcScope Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Download stage: fetch every per-repository listing into a JSON dump.

use std::sync::Arc;

use ltcscope_core::{ListingSource, LtcError, Repository, RetryPolicy};
use strum::IntoEnumIterator;
use tracing::{debug, info, warn};

use crate::dataset::{remove_if_exists, write_json};
use crate::layout::{DumpKind, Layout};
use crate::pool::RepoOutcome;

/// Shared state for the download stage.
pub struct DownloadContext {
    pub layout: Layout,
    pub source: Arc<dyn ListingSource>,
    pub policy: RetryPolicy,
    /// API root used to build the pull request review comments URL.
    pub api_base_url: String,
}

/// Whether a repository is worth downloading: it has a language, issues are
/// not disabled, and it is neither a fork nor archived.
pub fn qualifies(repo: &Repository) -> bool {
    repo.language.as_deref().is_some_and(|l| !l.is_empty())
        && repo.api_bool("has_issues").unwrap_or(true)
        && !repo.api_bool("fork").unwrap_or(false)
        && !repo.api_bool("archived").unwrap_or(false)
}

/// The listing URL for one dump kind, derived from the repository record.
pub fn listing_url(repo: &Repository, kind: DumpKind, api_base_url: &str) -> Option<String> {
    let all_states = |field: &str| {
        repo.api_str(field)
            .map(|url| url.replace("{/number}", "?state=all"))
    };
    match kind {
        DumpKind::Contributors => repo.api_str("contributors_url").map(str::to_string),
        DumpKind::Commits => repo.api_str("commits_url").map(str::to_string),
        DumpKind::CommitComments => repo.api_str("comments_url").map(str::to_string),
        DumpKind::Issues => all_states("issues_url"),
        DumpKind::IssueComments => repo.api_str("issue_comment_url").map(str::to_string),
        DumpKind::IssueEvents => repo.api_str("issue_events_url").map(str::to_string),
        DumpKind::PullRequests => all_states("pulls_url"),
        DumpKind::PullRequestComments => match repo.owner_login() {
            Some(owner) => Some(format!(
                "{}/repos/{owner}/{}/pulls/comments",
                api_base_url.trim_end_matches('/'),
                repo.name
            )),
            None => repo
                .api_str("pulls_url")
                .map(|url| format!("{}/comments", url.replace("{/number}", ""))),
        },
    }
}

/// Download every missing dump of one repository.
///
/// Dumps that already exist are left alone, so an interrupted run resumes at
/// file granularity. A truncated listing goes to the `.partial` file instead
/// of the dump and counts as skipped, so the next run fetches it again.
pub async fn download_repository(
    ctx: Arc<DownloadContext>,
    repo: Repository,
) -> Result<RepoOutcome, LtcError> {
    if !qualifies(&repo) {
        return Ok(RepoOutcome::Skipped {
            reason: "repository does not qualify for download".into(),
        });
    }

    let mut written = 0usize;
    let mut skipped = 0usize;
    for kind in DumpKind::iter() {
        let path = ctx.layout.dump_path(&repo.name, kind);
        if path.exists() {
            debug!(repo = %repo.name, %kind, "dump exists, skipping");
            skipped += 1;
            continue;
        }
        let Some(url) = listing_url(&repo, kind, &ctx.api_base_url) else {
            warn!(repo = %repo.name, %kind, "repository record has no URL for this listing");
            skipped += 1;
            continue;
        };

        let listing = ctx.source.fetch_listing(&url, ctx.policy).await?;
        let partial = ctx.layout.partial_dump_path(&repo.name, kind);
        if listing.truncated {
            warn!(
                repo = %repo.name,
                %kind,
                records = listing.items.len(),
                "listing ended early, dump left for the next run"
            );
            write_json(&partial, &listing.items)?;
            skipped += 1;
            continue;
        }
        write_json(&path, &listing.items)?;
        remove_if_exists(&partial)?;
        info!(repo = %repo.name, %kind, records = listing.items.len(), "dump saved");
        written += 1;
    }

    Ok(RepoOutcome::Completed { written, skipped })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ltcscope_test_utils::MockListingSource;
    use ltcscope_test_utils::fixtures::{self, API};
    use serde_json::{Value, json};

    fn repo(value: Value) -> Repository {
        serde_json::from_value(value).unwrap()
    }

    fn widgets() -> Repository {
        repo(fixtures::repository(1, "widgets", Some("Rust")))
    }

    fn context(layout: &Layout, source: Arc<MockListingSource>) -> Arc<DownloadContext> {
        Arc::new(DownloadContext {
            layout: layout.clone(),
            source,
            policy: RetryPolicy::NONE,
            api_base_url: "https://api.github.com".into(),
        })
    }

    #[test]
    fn qualification_rules() {
        assert!(qualifies(&repo(fixtures::repository(1, "widgets", Some("Rust")))));
        assert!(!qualifies(&repo(fixtures::repository(1, "widgets", None))));

        let mut forked = fixtures::repository(1, "widgets", Some("Rust"));
        forked["fork"] = json!(true);
        assert!(!qualifies(&repo(forked)));

        let mut archived = fixtures::repository(1, "widgets", Some("Rust"));
        archived["archived"] = json!(true);
        assert!(!qualifies(&repo(archived)));

        let mut no_issues = fixtures::repository(1, "widgets", Some("Rust"));
        no_issues["has_issues"] = json!(false);
        assert!(!qualifies(&repo(no_issues)));
    }

    #[test]
    fn listing_urls_follow_the_repository_record() {
        let r = repo(fixtures::repository(1, "widgets", Some("Rust")));
        let base = "https://api.github.com";
        assert_eq!(
            listing_url(&r, DumpKind::Issues, base).unwrap(),
            format!("{API}/issues?state=all")
        );
        assert_eq!(
            listing_url(&r, DumpKind::PullRequests, base).unwrap(),
            format!("{API}/pulls?state=all")
        );
        assert_eq!(
            listing_url(&r, DumpKind::PullRequestComments, base).unwrap(),
            "https://api.github.com/repos/octo/widgets/pulls/comments"
        );
        assert_eq!(
            listing_url(&r, DumpKind::Commits, base).unwrap(),
            format!("{API}/commits{{/sha}}")
        );
    }

    #[tokio::test]
    async fn existing_dumps_are_not_refetched() {
        let dir = tempfile::tempdir().unwrap();
        let layout = Layout::under(dir.path());
        let commit = json!({"sha": "a"});
        fixtures::write_dump(&layout.datasets_dir, "widgets", "commits", &[commit]);

        let source = Arc::new(MockListingSource::new().with_listing(
            format!("{API}/contributors"),
            vec![fixtures::raw_contributor(1, "alice")],
        ));
        let ctx = context(&layout, source.clone());

        let outcome = download_repository(ctx, widgets()).await.unwrap();
        assert_eq!(outcome, RepoOutcome::Completed { written: 7, skipped: 1 });

        let calls = source.calls().await;
        assert_eq!(calls.len(), 7);
        assert!(!calls.iter().any(|u| u.contains("/commits")));

        let contributors: Value = serde_json::from_str(
            &std::fs::read_to_string(layout.dump_path("widgets", DumpKind::Contributors)).unwrap(),
        )
        .unwrap();
        assert_eq!(contributors.as_array().unwrap().len(), 1);
        assert!(layout.dump_path("widgets", DumpKind::PullRequestComments).exists());
    }

    #[tokio::test]
    async fn truncated_listing_is_not_saved_as_a_dump() {
        let dir = tempfile::tempdir().unwrap();
        let layout = Layout::under(dir.path());
        let issues_url = format!("{API}/issues?state=all");
        let first_page = vec![fixtures::issue(1, 5, "2019-01-01T00:00:00Z")];
        let source =
            Arc::new(MockListingSource::new().with_truncated_listing(&issues_url, first_page));

        let outcome = download_repository(context(&layout, source), widgets())
            .await
            .unwrap();
        assert_eq!(outcome, RepoOutcome::Completed { written: 7, skipped: 1 });
        let dump = layout.dump_path("widgets", DumpKind::Issues);
        let partial = layout.partial_dump_path("widgets", DumpKind::Issues);
        assert!(!dump.exists());
        assert!(partial.exists());

        let source = Arc::new(MockListingSource::new().with_listing(
            &issues_url,
            vec![
                fixtures::issue(1, 5, "2019-01-01T00:00:00Z"),
                fixtures::issue(2, 5, "2019-01-02T00:00:00Z"),
            ],
        ));
        let outcome = download_repository(context(&layout, source.clone()), widgets())
            .await
            .unwrap();
        assert_eq!(outcome, RepoOutcome::Completed { written: 1, skipped: 7 });
        assert_eq!(source.calls().await, vec![issues_url]);
        let saved: Value = serde_json::from_str(&std::fs::read_to_string(&dump).unwrap()).unwrap();
        assert_eq!(saved.as_array().unwrap().len(), 2);
        assert!(!partial.exists());
    }
}
