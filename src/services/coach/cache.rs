//! Response Cache
//!
//! In-memory TTL cache of coaching results keyed by content hash, so a
//! repeated request over unchanged journal content skips the model call.

use std::time::Duration;

use mini_moka::sync::Cache;

use super::types::{DailyEvaluation, GoalBreakdown, Suggestion};

/// A cached coaching result.
#[derive(Debug, Clone, PartialEq)]
pub enum CachedResponse {
    Suggestion(Suggestion),
    GoalBreakdown(GoalBreakdown),
    DailyEvaluation(DailyEvaluation),
}

/// Thread-safe TTL cache shared by all requests of a service.
#[derive(Clone)]
pub struct ResponseCache {
    cache: Cache<String, CachedResponse>,
}

impl ResponseCache {
    pub fn new(ttl: Duration, max_entries: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_entries)
            .time_to_live(ttl)
            .build();
        Self { cache }
    }

    /// Look up a live entry. Expired entries are never returned.
    pub fn get(&self, key: &str) -> Option<CachedResponse> {
        self.cache.get(&key.to_string())
    }

    pub fn insert(&self, key: String, value: CachedResponse) {
        self.cache.insert(key, value);
    }
}
