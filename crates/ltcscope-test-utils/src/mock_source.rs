// SPDX-FileCopyrightText: 2026 LtcScope Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock listing source for deterministic testing without network access.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;

use ltcscope_core::{Listing, ListingSource, LtcError, RetryPolicy};

/// Serves pre-configured listings and objects keyed by exact URL.
///
/// Unknown listing URLs return an empty complete listing; unknown object URLs
/// return `None` (the same as a request that never succeeded).
#[derive(Default)]
pub struct MockListingSource {
    listings: HashMap<String, Listing>,
    objects: HashMap<String, Value>,
    calls: Mutex<Vec<String>>,
}

impl MockListingSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a complete listing.
    pub fn with_listing(mut self, url: impl Into<String>, items: Vec<Value>) -> Self {
        self.listings.insert(url.into(), Listing::complete(items));
        self
    }

    /// Register a listing that ended early.
    pub fn with_truncated_listing(mut self, url: impl Into<String>, items: Vec<Value>) -> Self {
        self.listings.insert(
            url.into(),
            Listing {
                items,
                truncated: true,
            },
        );
        self
    }

    /// Register a single object.
    pub fn with_object(mut self, url: impl Into<String>, value: Value) -> Self {
        self.objects.insert(url.into(), value);
        self
    }

    /// Every URL requested so far, in request order.
    pub async fn calls(&self) -> Vec<String> {
        self.calls.lock().await.clone()
    }

    /// How many times `url` was requested.
    pub async fn call_count(&self, url: &str) -> usize {
        self.calls.lock().await.iter().filter(|u| *u == url).count()
    }
}

#[async_trait]
impl ListingSource for MockListingSource {
    async fn fetch_listing(&self, url: &str, _policy: RetryPolicy) -> Result<Listing, LtcError> {
        self.calls.lock().await.push(url.to_string());
        Ok(self.listings.get(url).cloned().unwrap_or_default())
    }

    async fn fetch_object(
        &self,
        url: &str,
        _policy: RetryPolicy,
    ) -> Result<Option<Value>, LtcError> {
        self.calls.lock().await.push(url.to_string());
        Ok(self.objects.get(url).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn serves_registered_listings_and_records_calls() {
        let source = MockListingSource::new()
            .with_listing("https://api/x", vec![json!(1), json!(2)])
            .with_object("https://api/users/a", json!({"login": "a"}));

        let listing = source
            .fetch_listing("https://api/x", RetryPolicy::NONE)
            .await
            .unwrap();
        assert_eq!(listing.items.len(), 2);
        assert!(!listing.truncated);

        let unknown = source
            .fetch_listing("https://api/unknown", RetryPolicy::NONE)
            .await
            .unwrap();
        assert!(unknown.is_empty());

        let user = source
            .fetch_object("https://api/users/a", RetryPolicy::NONE)
            .await
            .unwrap();
        assert_eq!(user.unwrap()["login"], "a");

        assert_eq!(source.calls().await.len(), 3);
        assert_eq!(source.call_count("https://api/x").await, 1);
    }
}
