// SPDX-FileCopyrightText: 2026 LtcScope Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Paginated listing contract.
//!
//! Implementations follow "next page" links until exhausted and treat any
//! non-success response as end-of-stream, returning what was accumulated so far.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::LtcError;

/// Bounded retry with a fixed delay for transient (non-2xx) responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Extra attempts after the first one.
    pub max_retries: u32,
    /// Delay between attempts.
    pub delay: Duration,
}

impl RetryPolicy {
    /// Single attempt, no retry.
    pub const NONE: RetryPolicy = RetryPolicy {
        max_retries: 0,
        delay: Duration::ZERO,
    };

    pub fn fixed(max_retries: u32, delay: Duration) -> Self {
        Self { max_retries, delay }
    }

    /// Total number of attempts for one request.
    pub fn attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::NONE
    }
}

/// The concatenated result of a paginated listing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Listing {
    pub items: Vec<Value>,
    /// A page failed after retries; `items` holds only the earlier pages.
    pub truncated: bool,
}

impl Listing {
    pub fn complete(items: Vec<Value>) -> Self {
        Self {
            items,
            truncated: false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The items, if they may be counted.
    ///
    /// A truncated listing counts only when at least one record arrived; a
    /// truncated empty one is [`LtcError::Incomplete`].
    pub fn into_countable(self, url: &str) -> Result<Vec<Value>, LtcError> {
        if self.truncated && self.items.is_empty() {
            return Err(LtcError::Incomplete {
                url: url.to_string(),
            });
        }
        Ok(self.items)
    }
}

/// Source of paginated listings and single objects from the hosting API.
#[async_trait]
pub trait ListingSource: Send + Sync {
    /// Fetch every page of `url`.
    async fn fetch_listing(&self, url: &str, policy: RetryPolicy) -> Result<Listing, LtcError>;

    /// Fetch a single JSON object; `None` when the request never succeeded.
    async fn fetch_object(&self, url: &str, policy: RetryPolicy)
    -> Result<Option<Value>, LtcError>;
}
