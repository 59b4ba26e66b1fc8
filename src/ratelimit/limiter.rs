//! Core rate limiter implementation.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, trace};

use super::key::ClientKey;
use super::policy::RateLimitPolicy;
use super::statistics::ClientStatistics;
use super::store::StatisticsStore;
use crate::error::Result;

/// Outcome of a rate limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// The request is within the policy and was counted
    Allow,
    /// The request exceeds the policy and must not be forwarded
    Deny,
}

/// The rate limiter that evaluates per-client request budgets.
///
/// The limiter holds no state of its own; all statistics live in the
/// injected store, which is the only shared mutable resource. The threshold
/// check and the statistics update each perform their own store read without
/// compare-and-swap, so concurrent requests from one client can both pass the
/// check before either write lands, admitting more than `max_requests` in a
/// window under concurrent load. Coordination, where needed, belongs to the
/// store implementation.
pub struct RateLimiter {
    store: Arc<dyn StatisticsStore>,
}

impl RateLimiter {
    /// Create a new rate limiter backed by the given store.
    pub fn new(store: Arc<dyn StatisticsStore>) -> Self {
        Self { store }
    }

    /// Check a request from `key` against `policy` at time `now`.
    ///
    /// On `Decision::Allow` the client's statistics have already been
    /// updated; the caller forwards the request. On `Decision::Deny` the
    /// statistics are untouched. Store failures propagate and must fail the
    /// request rather than default to either outcome.
    pub async fn check(
        &self,
        key: &ClientKey,
        policy: &RateLimitPolicy,
        now: DateTime<Utc>,
    ) -> Result<Decision> {
        let cache_key = key.to_string_key();

        trace!(
            key = %cache_key,
            max_requests = policy.max_requests,
            window_secs = policy.window_secs,
            "Checking rate limit"
        );

        let statistics = self.store.get(&cache_key).await?;

        if let Some(ref stats) = statistics {
            let window_open = now < stats.last_successful_response_time + policy.window();
            if window_open && stats.completed_count == policy.max_requests {
                debug!(key = %cache_key, "Rate limit exceeded");
                return Ok(Decision::Deny);
            }
        }

        self.record_completion(&cache_key, policy, now).await?;
        Ok(Decision::Allow)
    }

    /// Count an allowed request against the client's current window.
    ///
    /// Re-reads the stored value rather than reusing the read from the deny
    /// check, matching the store's plain read-modify-write contract.
    async fn record_completion(
        &self,
        cache_key: &str,
        policy: &RateLimitPolicy,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let next = match self.store.get(cache_key).await? {
            None => ClientStatistics::first(now),
            Some(mut stats) => {
                stats.last_successful_response_time = now;
                if stats.completed_count == policy.max_requests {
                    // count reached the cap but the window has passed: a new
                    // window starts with this request
                    stats.completed_count = 1;
                } else {
                    stats.completed_count += 1;
                }
                stats
            }
        };

        self.store.set(cache_key, next).await
    }
}
