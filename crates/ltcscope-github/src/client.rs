// SPDX-FileCopyrightText: 2026 LtcScope Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the hosting API.
//!
//! Provides [`GithubClient`], which handles authentication, rate-limit
//! accounting, `Link`-header pagination and bounded fixed-delay retry.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use ltcscope_config::{LtcConfig, Stage};
use ltcscope_core::{Listing, ListingSource, LtcError, RetryPolicy};
use reqwest::StatusCode;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, LINK, USER_AGENT};
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::link::{next_link, strip_placeholders, with_page_size};
use crate::ratelimit::{RateLimiter, snapshot_from_headers};

/// Outcome of one page request after retries.
enum PageOutcome {
    Success {
        body: String,
        next: Option<String>,
    },
    /// Quota ran out mid-request; wait for the reset and request the same page.
    QuotaExhausted,
    Failed(StatusCode),
}

/// Rate-limited hosting API client for one credential.
///
/// Cloning is cheap and clones share the same quota cache.
#[derive(Debug, Clone)]
pub struct GithubClient {
    http: reqwest::Client,
    limiter: Arc<RateLimiter>,
    per_page: u32,
}

impl GithubClient {
    /// Build a client.
    ///
    /// Without a token requests are unauthenticated (and get the lower quota).
    pub fn new(
        token: Option<SecretString>,
        limiter: Arc<RateLimiter>,
        per_page: u32,
        timeout: Duration,
    ) -> Result<Self, LtcError> {
        let mut headers = HeaderMap::new();
        if let Some(token) = token {
            let mut value = HeaderValue::from_str(&format!("token {}", token.expose_secret()))
                .map_err(|e| LtcError::Config(format!("invalid API token header value: {e}")))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }
        headers.insert(USER_AGENT, HeaderValue::from_static("ltcscope"));
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| LtcError::Http {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            http,
            limiter,
            per_page,
        })
    }

    /// Build the client for one pipeline stage, using that stage's credential.
    pub fn from_config(config: &LtcConfig, stage: Stage) -> Result<Self, LtcError> {
        let token = config.github.token_for(stage);
        if token.is_none() {
            info!(?stage, "no API credential configured, requests are unauthenticated");
        }
        let limiter = Arc::new(RateLimiter::new(
            &config.github.api_base_url,
            config.retry.reset_margin(),
            config.retry.quota_max_failures,
        ));
        Self::new(
            token,
            limiter,
            config.github.per_page,
            config.github.request_timeout(),
        )
    }

    /// The shared quota cache.
    pub fn limiter(&self) -> &Arc<RateLimiter> {
        &self.limiter
    }

    /// Request one URL, retrying non-success responses per `policy`.
    async fn get_page(&self, url: &str, policy: RetryPolicy) -> Result<PageOutcome, LtcError> {
        let mut last_status = StatusCode::INTERNAL_SERVER_ERROR;

        for attempt in 0..policy.attempts() {
            if attempt > 0 {
                warn!(attempt, url, "retrying request after failed response");
                tokio::time::sleep(policy.delay).await;
            }

            self.limiter.acquire(&self.http).await?;

            let response = match self.http.get(url).send().await {
                Ok(response) => response,
                Err(e) => {
                    warn!(error = %e, url, attempt, "request failed");
                    last_status = e.status().unwrap_or(StatusCode::SERVICE_UNAVAILABLE);
                    continue;
                }
            };

            let status = response.status();
            debug!(status = %status, url, attempt, "response received");

            if status.is_success() {
                self.limiter.observe(response.headers()).await;
                let next = response
                    .headers()
                    .get(LINK)
                    .and_then(|v| v.to_str().ok())
                    .and_then(next_link);
                let body = response.text().await.map_err(|e| LtcError::Http {
                    message: format!("failed to read response body: {e}"),
                    source: Some(Box::new(e)),
                })?;
                return Ok(PageOutcome::Success { body, next });
            }

            if is_quota_exhausted(status, response.headers()) {
                self.limiter.observe(response.headers()).await;
                return Ok(PageOutcome::QuotaExhausted);
            }
            last_status = status;
        }

        Ok(PageOutcome::Failed(last_status))
    }
}

/// A 403/429 carrying `X-RateLimit-Remaining: 0` means "wait", not "fail".
fn is_quota_exhausted(status: StatusCode, headers: &HeaderMap) -> bool {
    matches!(
        status,
        StatusCode::FORBIDDEN | StatusCode::TOO_MANY_REQUESTS
    ) && snapshot_from_headers(headers).is_some_and(|s| s.remaining == 0)
}

/// The records of one page: a bare array, or the `items` of a search result.
fn page_items(body: Value) -> Option<Vec<Value>> {
    match body {
        Value::Array(page) => Some(page),
        Value::Object(mut envelope) => match envelope.remove("items") {
            Some(Value::Array(page)) => Some(page),
            _ => None,
        },
        _ => None,
    }
}

#[async_trait]
impl ListingSource for GithubClient {
    async fn fetch_listing(&self, url: &str, policy: RetryPolicy) -> Result<Listing, LtcError> {
        let first = strip_placeholders(url);
        let mut next_url = Some(with_page_size(&first, self.per_page).unwrap_or(first));
        let mut items = Vec::new();
        let mut pages = 0usize;

        while let Some(page_url) = next_url.take() {
            match self.get_page(&page_url, policy).await? {
                PageOutcome::Success { body, next } => {
                    pages += 1;
                    match serde_json::from_str::<Value>(&body).map(page_items) {
                        Ok(Some(page)) => {
                            items.extend(page);
                            next_url = next;
                        }
                        Ok(None) => {
                            debug!(url = %page_url, "page without records ends the listing");
                        }
                        Err(e) => {
                            warn!(url = %page_url, error = %e, "unparseable page ends the listing");
                            return Ok(Listing {
                                items,
                                truncated: true,
                            });
                        }
                    }
                }
                PageOutcome::QuotaExhausted => {
                    // acquire() sleeps until the reset before the retry goes out.
                    next_url = Some(page_url);
                }
                PageOutcome::Failed(status) => {
                    warn!(
                        url = %page_url,
                        status = %status,
                        fetched = items.len(),
                        "listing ended early after failed response"
                    );
                    return Ok(Listing {
                        items,
                        truncated: true,
                    });
                }
            }
        }

        debug!(url, pages, items = items.len(), "listing complete");
        Ok(Listing::complete(items))
    }

    async fn fetch_object(
        &self,
        url: &str,
        policy: RetryPolicy,
    ) -> Result<Option<Value>, LtcError> {
        let url = strip_placeholders(url);
        loop {
            match self.get_page(&url, policy).await? {
                PageOutcome::Success { body, .. } => {
                    return match serde_json::from_str::<Value>(&body) {
                        Ok(value) => Ok(Some(value)),
                        Err(e) => {
                            warn!(url = %url, error = %e, "unparseable object response");
                            Ok(None)
                        }
                    };
                }
                PageOutcome::QuotaExhausted => continue,
                PageOutcome::Failed(status) => {
                    warn!(url = %url, status = %status, "object request failed");
                    return Ok(None);
                }
            }
        }
    }
}
