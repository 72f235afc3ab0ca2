// SPDX-FileCopyrightText: 2026 LtcScope Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Event counting across the archive/live split.
//!
//! Each parent issue or pull request is resolved through exactly one source
//! (see [`ArchiveCutoff::resolve`](ltcscope_core::ArchiveCutoff::resolve)).
//! Archived parents are counted from the export table by id; live parents are
//! fetched from their events URL. Both paths feed the same [`EventTally::record`]
//! so an action is classified identically wherever it came from.

use std::collections::HashMap;

use ltcscope_archive::{ArchiveKind, ArchiveSet, columns};
use ltcscope_core::records::{Activity, Issue, LiveEvent, PullRequest, from_values};
use ltcscope_core::{
    ArchiveCutoff, ListingSource, LtcError, RecordSource, RetryPolicy, SourceSplit, Window,
};
use tracing::{debug, warn};

/// Which parent entity the events belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventFamily {
    Issue,
    Pull,
}

impl EventFamily {
    fn archive_kind(self) -> ArchiveKind {
        match self {
            EventFamily::Issue => ArchiveKind::IssueEvents,
            EventFamily::Pull => ArchiveKind::PullEvents,
        }
    }

    fn key_column(self) -> &'static str {
        match self {
            EventFamily::Issue => columns::ISSUE_ID,
            EventFamily::Pull => columns::PULL_REQUEST_ID,
        }
    }
}

/// An issue or pull request whose events can be counted.
pub trait EventParent: Activity {
    fn parent_id(&self) -> Option<i64>;
    fn parent_events_url(&self) -> Option<String>;

    /// The single source this parent's events are read from.
    fn event_source(&self, cutoff: &ArchiveCutoff) -> Option<RecordSource> {
        cutoff.resolve(self.created_at()?, self.parent_id(), self.parent_events_url())
    }
}

impl EventParent for Issue {
    fn parent_id(&self) -> Option<i64> {
        self.id
    }

    fn parent_events_url(&self) -> Option<String> {
        self.events_url.clone()
    }
}

impl EventParent for PullRequest {
    fn parent_id(&self) -> Option<i64> {
        self.id
    }

    fn parent_events_url(&self) -> Option<String> {
        self.events_url()
    }
}

/// Deduplicate parents by source.
pub fn split_sources<'p, P>(
    parents: impl IntoIterator<Item = &'p P>,
    cutoff: &ArchiveCutoff,
) -> SourceSplit
where
    P: EventParent + 'p,
{
    let mut split = SourceSplit::default();
    for parent in parents {
        match parent.event_source(cutoff) {
            Some(source) => split.insert(source),
            None => debug!("parent without id or events url, events not counted"),
        }
    }
    split
}

/// Event counts by action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EventTally {
    pub total: u64,
    pub closed: u64,
    pub assigned: u64,
    pub merged: u64,
}

impl EventTally {
    /// Count one event with the given action name.
    pub fn record(&mut self, action: &str) {
        self.total += 1;
        match action {
            "closed" => self.closed += 1,
            "assigned" => self.assigned += 1,
            "merged" => self.merged += 1,
            _ => {}
        }
    }
}

/// Counts events for one repository task.
///
/// Live listings are cached by URL for the lifetime of the counter, so a parent
/// that falls into the windows of many contributors is fetched once.
pub struct EventCounter<'a> {
    archives: &'a ArchiveSet,
    source: &'a dyn ListingSource,
    policy: RetryPolicy,
    cache: HashMap<String, Vec<LiveEvent>>,
}

impl<'a> EventCounter<'a> {
    pub fn new(
        archives: &'a ArchiveSet,
        source: &'a dyn ListingSource,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            archives,
            source,
            policy,
            cache: HashMap::new(),
        }
    }

    /// Tally every event inside `window` on the parents in `split`.
    ///
    /// A live listing that ended early without a single event fails with
    /// [`LtcError::Incomplete`] and is not cached, so a later call retries it.
    pub async fn count(
        &mut self,
        family: EventFamily,
        split: &SourceSplit,
        window: &Window,
    ) -> Result<EventTally, LtcError> {
        let mut tally = EventTally::default();

        if !split.archived.is_empty() {
            let table = self.archives.require(family.archive_kind())?;
            let selection = table.select(
                family.key_column(),
                split.archived.iter().copied(),
                window,
            )?;
            for action in selection.values(columns::ACTION)? {
                tally.record(action);
            }
        }

        for url in &split.live {
            let events = self.live_events(url).await?;
            for event in events.iter().filter(|e| window.contains_opt(e.created_at)) {
                tally.record(event.event.as_deref().unwrap_or_default());
            }
        }

        Ok(tally)
    }

    async fn live_events(&mut self, url: &str) -> Result<&[LiveEvent], LtcError> {
        if !self.cache.contains_key(url) {
            let listing = self.source.fetch_listing(url, self.policy).await?;
            if listing.truncated && !listing.is_empty() {
                warn!(
                    url,
                    fetched = listing.items.len(),
                    "event listing ended early, counting partial results"
                );
            }
            let events: Vec<LiveEvent> = from_values(listing.into_countable(url)?, url);
            debug!(url, events = events.len(), "live events fetched");
            self.cache.insert(url.to_string(), events);
        }
        Ok(self.cache.get(url).map(Vec::as_slice).unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};
    use ltcscope_archive::ArchiveTable;
    use ltcscope_test_utils::MockListingSource;
    use ltcscope_test_utils::fixtures::{self, live_event, ts};

    const ISSUE_EVENTS: &str = "\
issue_id,action,created_at
1,closed,2019-01-05 00:00:00
1,assigned,2019-01-20 00:00:00
2,labeled,2019-01-06 00:00:00
";

    const PULL_EVENTS: &str = "\
pull_request_id,action,created_at
9,merged,2019-01-05 00:00:00
9,closed,2019-01-05 00:00:00
";

    fn archives() -> ArchiveSet {
        let mut set = ArchiveSet::new();
        set.insert(
            ArchiveKind::IssueEvents,
            ArchiveTable::from_reader("ie", ISSUE_EVENTS.as_bytes(), &[columns::ISSUE_ID]).unwrap(),
        );
        set.insert(
            ArchiveKind::PullEvents,
            ArchiveTable::from_reader("pe", PULL_EVENTS.as_bytes(), &[columns::PULL_REQUEST_ID])
                .unwrap(),
        );
        set
    }

    fn month_of(join: DateTime<Utc>) -> Window {
        Window::first_month(join)
    }

    #[test]
    fn tally_classifies_actions() {
        let mut tally = EventTally::default();
        for action in ["closed", "assigned", "merged", "labeled", ""] {
            tally.record(action);
        }
        assert_eq!(
            tally,
            EventTally {
                total: 5,
                closed: 1,
                assigned: 1,
                merged: 1
            }
        );
    }

    #[tokio::test]
    async fn archived_and_live_parents_are_counted_once_each() {
        let archives = archives();
        let url = "https://api.github.com/repos/o/r/issues/3/events";
        let source = MockListingSource::new().with_listing(
            url,
            vec![
                live_event("closed", "2019-01-10T00:00:00Z"),
                live_event("assigned", "2019-03-01T00:00:00Z"),
            ],
        );
        let mut counter = EventCounter::new(&archives, &source, RetryPolicy::NONE);

        let mut split = SourceSplit::default();
        split.insert(RecordSource::Archived(1));
        split.insert(RecordSource::Archived(2));
        split.insert(RecordSource::Live(url.to_string()));

        let window = month_of(ts("2019-01-01T00:00:00Z"));
        let tally = counter.count(EventFamily::Issue, &split, &window).await.unwrap();
        assert_eq!(tally.total, 4);
        assert_eq!(tally.closed, 2);
        assert_eq!(tally.assigned, 1);
        assert_eq!(source.call_count(url).await, 1);
    }

    #[tokio::test]
    async fn live_pull_events_use_merged_classification() {
        let archives = archives();
        let url = "https://api.github.com/repos/o/r/issues/10/events";
        let source = MockListingSource::new().with_listing(
            url,
            vec![
                live_event("merged", "2019-01-10T00:00:00Z"),
                live_event("closed", "2019-01-10T00:00:00Z"),
                live_event("assigned", "2019-01-11T00:00:00Z"),
            ],
        );
        let mut counter = EventCounter::new(&archives, &source, RetryPolicy::NONE);

        let mut split = SourceSplit::default();
        split.insert(RecordSource::Archived(9));
        split.insert(RecordSource::Live(url.to_string()));

        let window = month_of(ts("2019-01-01T00:00:00Z"));
        let tally = counter.count(EventFamily::Pull, &split, &window).await.unwrap();
        assert_eq!(tally.total, 5);
        assert_eq!(tally.merged, 2);
        assert_eq!(tally.closed, 2);
    }

    #[tokio::test]
    async fn live_listings_are_cached_across_windows() {
        let archives = ArchiveSet::new();
        let url = "https://api.github.com/repos/o/r/issues/3/events";
        let source = MockListingSource::new()
            .with_listing(url, vec![live_event("closed", "2019-01-10T00:00:00Z")]);
        let mut counter = EventCounter::new(&archives, &source, RetryPolicy::NONE);

        let mut split = SourceSplit::default();
        split.insert(RecordSource::Live(url.to_string()));

        let before = Window::before(ts("2019-02-01T00:00:00Z"));
        let month = month_of(ts("2019-02-01T00:00:00Z"));
        assert_eq!(counter.count(EventFamily::Issue, &split, &before).await.unwrap().total, 1);
        assert_eq!(counter.count(EventFamily::Issue, &split, &month).await.unwrap().total, 0);
        assert_eq!(source.call_count(url).await, 1);
    }

    fn live_split(url: &str) -> SourceSplit {
        let mut split = SourceSplit::default();
        split.insert(RecordSource::Live(url.to_string()));
        split
    }

    #[tokio::test]
    async fn truncated_listing_with_events_is_counted() {
        let archives = ArchiveSet::new();
        let url = "https://api.github.com/repos/o/r/issues/3/events";
        let source = MockListingSource::new()
            .with_truncated_listing(url, vec![live_event("closed", "2019-01-10T00:00:00Z")]);
        let mut counter = EventCounter::new(&archives, &source, RetryPolicy::NONE);

        let window = month_of(ts("2019-01-01T00:00:00Z"));
        let tally = counter
            .count(EventFamily::Issue, &live_split(url), &window)
            .await
            .unwrap();
        assert_eq!(tally.total, 1);
        assert_eq!(tally.closed, 1);
    }

    #[tokio::test]
    async fn truncated_empty_listing_is_not_counted_as_zero() {
        let archives = ArchiveSet::new();
        let url = "https://api.github.com/repos/o/r/issues/3/events";
        let source = MockListingSource::new().with_truncated_listing(url, Vec::new());
        let mut counter = EventCounter::new(&archives, &source, RetryPolicy::NONE);

        let window = month_of(ts("2019-01-01T00:00:00Z"));
        let split = live_split(url);
        let err = counter
            .count(EventFamily::Issue, &split, &window)
            .await
            .unwrap_err();
        assert!(err.is_incomplete());

        // Not cached: the next call asks again.
        assert!(counter.count(EventFamily::Issue, &split, &window).await.is_err());
        assert_eq!(source.call_count(url).await, 2);
    }

    #[tokio::test]
    async fn complete_empty_listing_counts_zero() {
        let archives = ArchiveSet::new();
        let url = "https://api.github.com/repos/o/r/issues/3/events";
        let source = MockListingSource::new().with_listing(url, Vec::new());
        let mut counter = EventCounter::new(&archives, &source, RetryPolicy::NONE);

        let window = month_of(ts("2019-01-01T00:00:00Z"));
        let tally = counter
            .count(EventFamily::Issue, &live_split(url), &window)
            .await
            .unwrap();
        assert_eq!(tally, EventTally::default());
    }

    #[test]
    fn parents_split_on_cutoff() {
        let cutoff = ArchiveCutoff::default();
        let issues: Vec<Issue> = [
            fixtures::issue(1, 5, "2020-01-01T00:00:00Z"),
            fixtures::issue(2, 5, "2021-03-06T23:57:37Z"),
            fixtures::issue(3, 5, "2021-03-06T23:57:38Z"),
        ]
        .into_iter()
        .map(|v| serde_json::from_value(v).unwrap())
        .collect();
        let split = split_sources(&issues, &cutoff);
        assert_eq!(split.archived.into_iter().collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(
            split.live.into_iter().collect::<Vec<_>>(),
            vec![format!("{}/events", fixtures::issue_url(3))]
        );

        let pull: PullRequest =
            serde_json::from_value(fixtures::pull_request(4, 5, "2022-01-01T00:00:00Z", "abc"))
                .unwrap();
        assert_eq!(
            pull.event_source(&cutoff),
            Some(RecordSource::Live(format!("{}/events", fixtures::issue_url(4))))
        );
    }

    #[tokio::test]
    async fn archived_parents_need_the_export_table() {
        let archives = ArchiveSet::new();
        let source = MockListingSource::new();
        let mut counter = EventCounter::new(&archives, &source, RetryPolicy::NONE);
        let mut split = SourceSplit::default();
        split.insert(RecordSource::Archived(1));
        let err = counter
            .count(EventFamily::Issue, &split, &Window::before(ts("2019-01-01T00:00:00Z")))
            .await
            .unwrap_err();
        assert!(err.is_missing_input());
    }
}
