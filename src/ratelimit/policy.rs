//! Rate limit policies and their resolution.
//!
//! Policies are declared per operation (method + route template) in the
//! service configuration and resolved into a registry once at startup. The
//! middleware looks policies up per request; the registry is never mutated
//! after construction.

use axum::http::Method;
use std::collections::HashMap;
use tracing::info;

use crate::config::RoutePolicyConfig;
use crate::error::{Result, TracklineError};

/// The rate limit policy attached to one operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitPolicy {
    /// Maximum requests allowed per window
    pub max_requests: u32,
    /// Window length in seconds
    pub window_secs: u64,
}

impl RateLimitPolicy {
    /// Create a new policy. Both values must be positive.
    pub fn new(max_requests: u32, window_secs: u64) -> Result<Self> {
        if max_requests == 0 {
            return Err(TracklineError::Config(
                "max_requests must be positive".to_string(),
            ));
        }
        if window_secs == 0 {
            return Err(TracklineError::Config(
                "window_secs must be positive".to_string(),
            ));
        }
        Ok(Self {
            max_requests,
            window_secs,
        })
    }

    /// The window length as a chrono duration.
    pub fn window(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.window_secs as i64)
    }
}

/// Registry mapping operation identity to its rate limit policy.
///
/// Built once at startup from configuration; lookups are O(1) per request.
/// Operations without an entry are never rate limited.
#[derive(Debug, Default)]
pub struct PolicyRegistry {
    policies: HashMap<(Method, String), RateLimitPolicy>,
}

impl PolicyRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from route policy configuration.
    pub fn from_config(routes: &[RoutePolicyConfig]) -> Result<Self> {
        let mut registry = Self::new();
        for route in routes {
            let method: Method = route
                .method
                .parse()
                .map_err(|_| TracklineError::Config(format!("invalid method: {}", route.method)))?;
            let policy = RateLimitPolicy::new(route.max_requests, route.window_secs)?;
            registry.insert(method, &route.path, policy);
        }
        info!(routes = registry.len(), "Policy registry built");
        Ok(registry)
    }

    /// Attach a policy to an operation.
    pub fn insert(&mut self, method: Method, route: &str, policy: RateLimitPolicy) {
        self.policies.insert((method, route.to_string()), policy);
    }

    /// Resolve the policy for an operation, or `None` when it has no policy.
    pub fn resolve(&self, method: &Method, route: &str) -> Option<RateLimitPolicy> {
        self.policies
            .get(&(method.clone(), route.to_string()))
            .copied()
    }

    /// Number of registered policies.
    pub fn len(&self) -> usize {
        self.policies.len()
    }

    /// Whether the registry has no policies.
    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }
}
