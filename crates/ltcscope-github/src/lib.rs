// SPDX-FileCopyrightText: 2026 LtcScope Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Paginated, rate-limited client for the hosting API.
//!
//! [`GithubClient`] implements [`ltcscope_core::ListingSource`]: it follows
//! `Link: rel="next"` cues until exhausted, routes every request through a
//! shared [`RateLimiter`] and treats a page that keeps failing as the end of
//! the stream.

pub mod client;
pub mod link;
pub mod ratelimit;

pub use client::GithubClient;
pub use ratelimit::{QuotaSnapshot, RateLimiter};
