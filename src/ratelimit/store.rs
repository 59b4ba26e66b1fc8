//! Statistics store trait and the bundled in-memory implementation.

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use tracing::debug;

use super::statistics::ClientStatistics;
use crate::error::Result;

/// Trait for client statistics storage.
///
/// This is the boundary to the shared cache: a plain get/set interface with
/// no compare-and-swap and no atomic increment. The most recent `set` for a
/// key is what the next `get` returns; nothing is assumed about durability or
/// expiry, and nothing coordinates the get/decide/set sequence across
/// concurrent requests. Implementations may back this with any shared cache.
#[async_trait]
pub trait StatisticsStore: Send + Sync {
    /// Fetch the statistics stored under `key`, if any.
    async fn get(&self, key: &str) -> Result<Option<ClientStatistics>>;

    /// Store `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: ClientStatistics) -> Result<()>;
}

/// An in-memory statistics store.
///
/// Suitable for tests and single-instance deployments. Entries whose
/// timestamp has fallen behind the staleness horizon are dropped lazily on
/// read; with no horizon configured the store grows with the client
/// population and never evicts.
pub struct InMemoryStatisticsStore {
    entries: DashMap<String, ClientStatistics>,
    stale_after: Option<chrono::Duration>,
}

impl InMemoryStatisticsStore {
    /// Create a store that never evicts.
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
            stale_after: None,
        }
    }

    /// Create a store that treats entries older than `stale_after` as absent.
    pub fn with_stale_after(stale_after: chrono::Duration) -> Self {
        Self {
            entries: DashMap::new(),
            stale_after: Some(stale_after),
        }
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for InMemoryStatisticsStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StatisticsStore for InMemoryStatisticsStore {
    async fn get(&self, key: &str) -> Result<Option<ClientStatistics>> {
        if let Some(stale_after) = self.stale_after {
            let stale = self
                .entries
                .get(key)
                .map(|e| Utc::now() - e.last_successful_response_time > stale_after)
                .unwrap_or(false);
            if stale {
                debug!(key = %key, "Dropping stale statistics entry");
                self.entries.remove(key);
                return Ok(None);
            }
        }

        Ok(self.entries.get(key).map(|e| e.value().clone()))
    }

    async fn set(&self, key: &str, value: ClientStatistics) -> Result<()> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }
}
