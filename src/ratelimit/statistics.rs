//! Per-client request statistics.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Request statistics for one client on one route.
///
/// This is the value held in the statistics store. At most one value exists
/// per client key at any time; the limiter replaces it wholesale on every
/// allowed request. It is serde-serializable so networked store
/// implementations can round-trip it exactly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientStatistics {
    /// When the current window's most recent counted request occurred
    pub last_successful_response_time: DateTime<Utc>,
    /// Requests counted toward the current window
    pub completed_count: u32,
}

impl ClientStatistics {
    /// Statistics for a client's first counted request.
    pub fn first(now: DateTime<Utc>) -> Self {
        Self {
            last_successful_response_time: now,
            completed_count: 1,
        }
    }
}
