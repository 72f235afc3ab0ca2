// SPDX-FileCopyrightText: 2026 LtcScope Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter traits implemented by the network layer and by test doubles.

pub mod listing;

pub use listing::{Listing, ListingSource, RetryPolicy};
