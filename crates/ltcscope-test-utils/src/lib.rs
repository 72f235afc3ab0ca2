// SPDX-FileCopyrightText: 2026 LtcScope Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for LtcScope.
//!
//! * [`MockListingSource`]: a deterministic [`ltcscope_core::ListingSource`]
//!   that serves canned pages and records every requested URL.
//! * [`fixtures`]: builders for API dump records and on-disk dataset layouts.

pub mod fixtures;
pub mod mock_source;

pub use mock_source::MockListingSource;
