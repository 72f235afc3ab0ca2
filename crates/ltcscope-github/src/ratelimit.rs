// SPDX-FileCopyrightText: 2026 LtcScope Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared quota tracking for one API credential.
//!
//! Every request made with a credential goes through [`RateLimiter::acquire`].
//! The limiter caches the remaining quota behind a `tokio::sync::Mutex`, so
//! workers sharing a credential serialize on the quota check instead of racing
//! on stale counts. When the cache is empty it queries the rate-limit endpoint
//! while holding the lock. When quota is exhausted it sleeps until the reset
//! instant plus a safety margin, still holding the lock, so every worker on the
//! credential waits for the same reset.

use std::time::Duration;

use chrono::Utc;
use ltcscope_core::LtcError;
use reqwest::header::HeaderMap;
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Minimum wait when the reset instant is already in the past.
const MIN_RESET_WAIT: Duration = Duration::from_secs(1);

/// Quota as reported by the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotaSnapshot {
    pub remaining: u64,
    /// Unix epoch seconds at which the quota refills.
    pub reset_epoch: i64,
}

#[derive(Debug, Default)]
struct QuotaState {
    remaining: Option<u64>,
    reset_epoch: Option<i64>,
}

#[derive(Deserialize)]
struct RateLimitBody {
    rate: RateBody,
}

#[derive(Deserialize)]
struct RateBody {
    remaining: u64,
    reset: i64,
}

/// Internally synchronized quota cache for one credential.
#[derive(Debug)]
pub struct RateLimiter {
    state: Mutex<QuotaState>,
    quota_url: String,
    reset_margin: Duration,
    quota_max_failures: u32,
}

impl RateLimiter {
    /// Create a limiter that queries `<api_base_url>/rate_limit`.
    pub fn new(api_base_url: &str, reset_margin: Duration, quota_max_failures: u32) -> Self {
        Self {
            state: Mutex::new(QuotaState::default()),
            quota_url: format!("{}/rate_limit", api_base_url.trim_end_matches('/')),
            reset_margin,
            quota_max_failures: quota_max_failures.max(1),
        }
    }

    /// Reserve one request, waiting for the quota reset if necessary.
    pub async fn acquire(&self, http: &reqwest::Client) -> Result<(), LtcError> {
        let mut state = self.state.lock().await;
        let mut failures = 0u32;

        loop {
            match state.remaining {
                Some(remaining) if remaining > 0 => {
                    state.remaining = Some(remaining - 1);
                    return Ok(());
                }
                Some(_) => {
                    let wait = self.wait_until_reset(state.reset_epoch);
                    warn!(
                        wait_secs = wait.as_secs_f64(),
                        "rate limit exhausted, waiting for reset"
                    );
                    tokio::time::sleep(wait).await;
                    // Force a fresh query after the reset.
                    state.remaining = None;
                }
                None => match self.fetch_quota(http).await {
                    Ok(snapshot) => {
                        debug!(
                            remaining = snapshot.remaining,
                            reset = snapshot.reset_epoch,
                            "rate limit queried"
                        );
                        state.remaining = Some(snapshot.remaining);
                        state.reset_epoch = Some(snapshot.reset_epoch);
                    }
                    Err(e) => {
                        failures += 1;
                        if failures >= self.quota_max_failures {
                            return Err(LtcError::RateLimit(format!(
                                "rate limit query failed {failures} times: {e}"
                            )));
                        }
                        warn!(error = %e, failures, "rate limit query failed, retrying");
                        tokio::time::sleep(self.reset_margin.max(MIN_RESET_WAIT)).await;
                    }
                },
            }
        }
    }

    /// Refresh the cache from `X-RateLimit-*` response headers.
    pub async fn observe(&self, headers: &HeaderMap) {
        let Some(snapshot) = snapshot_from_headers(headers) else {
            return;
        };
        let mut state = self.state.lock().await;
        state.remaining = Some(snapshot.remaining);
        state.reset_epoch = Some(snapshot.reset_epoch);
    }

    /// Current cached quota, if known.
    pub async fn cached(&self) -> Option<QuotaSnapshot> {
        let state = self.state.lock().await;
        match (state.remaining, state.reset_epoch) {
            (Some(remaining), Some(reset_epoch)) => Some(QuotaSnapshot {
                remaining,
                reset_epoch,
            }),
            _ => None,
        }
    }

    async fn fetch_quota(&self, http: &reqwest::Client) -> Result<QuotaSnapshot, LtcError> {
        let response = http
            .get(&self.quota_url)
            .send()
            .await
            .map_err(|e| LtcError::Http {
                message: format!("rate limit query failed: {e}"),
                source: Some(Box::new(e)),
            })?;
        let status = response.status();
        if !status.is_success() {
            return Err(LtcError::Http {
                message: format!("rate limit query returned {status}"),
                source: None,
            });
        }
        let body = response.text().await.map_err(|e| LtcError::Http {
            message: format!("failed to read rate limit body: {e}"),
            source: Some(Box::new(e)),
        })?;
        let parsed: RateLimitBody =
            serde_json::from_str(&body).map_err(|e| LtcError::parse("rate limit body", e))?;
        Ok(QuotaSnapshot {
            remaining: parsed.rate.remaining,
            reset_epoch: parsed.rate.reset,
        })
    }

    fn wait_until_reset(&self, reset_epoch: Option<i64>) -> Duration {
        reset_wait(reset_epoch, Utc::now().timestamp(), self.reset_margin)
    }
}

/// Time to sleep before the quota refills: at least one second, plus the margin.
pub fn reset_wait(reset_epoch: Option<i64>, now_epoch: i64, margin: Duration) -> Duration {
    let until_reset = reset_epoch
        .map(|reset| reset.saturating_sub(now_epoch))
        .filter(|secs| *secs > 0)
        .map(|secs| Duration::from_secs(secs.unsigned_abs()))
        .unwrap_or(MIN_RESET_WAIT);
    until_reset.max(MIN_RESET_WAIT) + margin
}

/// Parse `X-RateLimit-Remaining` and `X-RateLimit-Reset`.
pub fn snapshot_from_headers(headers: &HeaderMap) -> Option<QuotaSnapshot> {
    let read = |name: &str| headers.get(name)?.to_str().ok()?.trim().parse::<i64>().ok();
    let remaining = read("x-ratelimit-remaining")?;
    let reset_epoch = read("x-ratelimit-reset")?;
    Some(QuotaSnapshot {
        remaining: u64::try_from(remaining).unwrap_or(0),
        reset_epoch,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    #[test]
    fn reset_wait_adds_margin() {
        let wait = reset_wait(Some(1_000), 940, Duration::from_secs(5));
        assert_eq!(wait, Duration::from_secs(65));
    }

    #[test]
    fn past_reset_waits_minimum() {
        let wait = reset_wait(Some(900), 1_000, Duration::from_secs(5));
        assert_eq!(wait, Duration::from_secs(6));
        let unknown = reset_wait(None, 1_000, Duration::ZERO);
        assert_eq!(unknown, Duration::from_secs(1));
    }

    #[test]
    fn headers_parse_into_snapshot() {
        let mut headers = HeaderMap::new();
        headers.insert("x-ratelimit-remaining", HeaderValue::from_static("42"));
        headers.insert("x-ratelimit-reset", HeaderValue::from_static("1700000000"));
        assert_eq!(
            snapshot_from_headers(&headers),
            Some(QuotaSnapshot {
                remaining: 42,
                reset_epoch: 1_700_000_000
            })
        );
        headers.remove("x-ratelimit-reset");
        assert_eq!(snapshot_from_headers(&headers), None);
    }
}
