// SPDX-FileCopyrightText: 2026 LtcScope Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Archive index for LtcScope.
//!
//! Loads the historical bulk export (issue events, pull events, watchers,
//! issues, followers, commits) into memory with UTC-normalized timestamps and
//! answers "rows with these keys inside this window" queries. The export is the
//! source of truth at and before the archive cutoff.

pub mod set;
pub mod table;
pub mod timestamp;

pub use set::{ArchiveKind, ArchiveSet, columns};
pub use table::{ArchiveRow, ArchiveTable, Selection};
pub use timestamp::parse_timestamp;
