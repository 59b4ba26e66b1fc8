//! Configuration management for Trackline.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

/// Main configuration for the Trackline service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TracklineConfig {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Rate limiting configuration
    #[serde(default)]
    pub rate_limiting: RateLimitingConfig,
}

impl Default for TracklineConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            rate_limiting: RateLimitingConfig::default(),
        }
    }
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP server address
    #[serde(default = "default_http_addr")]
    pub http_addr: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_addr: default_http_addr(),
        }
    }
}

fn default_http_addr() -> SocketAddr {
    "127.0.0.1:8080".parse().unwrap()
}

/// Rate limiting configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitingConfig {
    /// How long an untouched client statistics entry stays readable in the
    /// bundled in-memory store, in seconds. `0` disables staleness eviction.
    #[serde(default = "default_stale_entry_ttl")]
    pub stale_entry_ttl_secs: u64,

    /// Per-route policies, resolved into the policy registry at startup
    #[serde(default = "default_route_policies")]
    pub routes: Vec<RoutePolicyConfig>,
}

impl Default for RateLimitingConfig {
    fn default() -> Self {
        Self {
            stale_entry_ttl_secs: default_stale_entry_ttl(),
            routes: default_route_policies(),
        }
    }
}

/// Rate limit policy for a single route.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutePolicyConfig {
    /// HTTP method the policy applies to
    pub method: String,
    /// Route template the policy applies to (e.g. `/api/issues/{id}`)
    pub path: String,
    /// Maximum requests allowed per window
    pub max_requests: u32,
    /// Window length in seconds
    pub window_secs: u64,
}

fn default_stale_entry_ttl() -> u64 {
    3600
}

/// Every issue operation capped at 2 requests per 5 seconds unless the
/// configuration file says otherwise.
fn default_route_policies() -> Vec<RoutePolicyConfig> {
    const DEFAULT_MAX_REQUESTS: u32 = 2;
    const DEFAULT_WINDOW_SECS: u64 = 5;

    [
        ("GET", "/api/issues"),
        ("POST", "/api/issues"),
        ("GET", "/api/issues/{id}"),
        ("PUT", "/api/issues/{id}"),
        ("DELETE", "/api/issues/{id}"),
    ]
    .into_iter()
    .map(|(method, path)| RoutePolicyConfig {
        method: method.to_string(),
        path: path.to_string(),
        max_requests: DEFAULT_MAX_REQUESTS,
        window_secs: DEFAULT_WINDOW_SECS,
    })
    .collect()
}

impl TracklineConfig {
    /// Load configuration from a file path.
    pub fn from_file(path: &str) -> crate::error::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: TracklineConfig = serde_yaml::from_str(&contents)
            .map_err(|e| crate::error::TracklineError::Config(e.to_string()))?;
        Ok(config)
    }
}
