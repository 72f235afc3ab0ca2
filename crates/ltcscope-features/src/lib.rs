// SPDX-FileCopyrightText: 2026 LtcScope Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Dataset stages for LtcScope.
//!
//! Repository discovery, download, contributor filtering, the four feature
//! table families and the corpus-wide merge. Every per-repository stage runs
//! on the bounded pool in [`pool`], so one repository failing never stops the
//! rest.

pub mod dataset;
pub mod developer;
pub mod discover;
pub mod download;
pub mod eligibility;
pub mod events;
pub mod layout;
pub mod merge;
pub mod pool;
pub mod repository;
pub mod rows;
pub mod stats;
pub mod tables;
pub mod writer;

pub use discover::{DiscoverReport, discover_repositories};
pub use download::{DownloadContext, download_repository};
pub use eligibility::{EligibilityFilter, FilterContext, Rejection, filter_repository};
pub use events::{EventCounter, EventFamily, EventTally};
pub use layout::{DumpKind, Layout, TableFamily};
pub use merge::{MergeReport, merge_family};
pub use pool::{RepoOutcome, RepoStatus, StatusSummary, run_repositories};
pub use stats::CountStats;
pub use tables::{
    TableContext, developer_activity_task, developer_profile_task, repository_tables_task,
};
pub use writer::IncrementalTable;
