//! Stored entry envelope and namespaces.

use serde::{Deserialize, Serialize};

/// A cached value with its creation time and time-to-live, both in
/// milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry<T> {
    pub data: T,
    pub timestamp: i64,
    pub ttl: i64,
}

impl<T> CacheEntry<T> {
    pub fn new(data: T, timestamp: i64, ttl: i64) -> Self {
        Self {
            data,
            timestamp,
            ttl,
        }
    }

    /// Valid iff `now - timestamp <= ttl`.
    pub fn is_valid(&self, now_ms: i64) -> bool {
        now_ms.saturating_sub(self.timestamp) <= self.ttl
    }
}

/// Cache partitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Namespace {
    Models,
    Results,
}

impl Namespace {
    pub const ALL: [Namespace; 2] = [Namespace::Models, Namespace::Results];

    pub fn as_str(&self) -> &'static str {
        match self {
            Namespace::Models => "models",
            Namespace::Results => "results",
        }
    }
}

impl std::fmt::Display for Namespace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
