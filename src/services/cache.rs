use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use thiserror::Error;

use crate::models::UserProfile;

/// Errors that can occur with cache operations
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Cache miss: {0}")]
    CacheMiss(String),
}

/// In-memory cache for scorer output
///
/// Scorer runs are expensive (a model load per process), so identical
/// profile/top_k pairs are served from here until the TTL expires. Values are
/// stored as JSON bytes so any serializable payload can be cached.
pub struct ScoreCache {
    entries: moka::future::Cache<String, Vec<u8>>,
    ttl_secs: u64,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl ScoreCache {
    /// Create a new cache holding at most `max_entries` values
    pub fn new(max_entries: u64, ttl_secs: u64) -> Self {
        let entries = moka::future::CacheBuilder::new(max_entries)
            .time_to_live(Duration::from_secs(ttl_secs))
            .build();

        Self {
            entries,
            ttl_secs,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn ttl_secs(&self) -> u64 {
        self.ttl_secs
    }

    /// Get a value from the cache
    pub async fn get<T>(&self, key: &str) -> Result<T, CacheError>
    where
        T: for<'de> Deserialize<'de>,
    {
        if let Some(bytes) = self.entries.get(key).await {
            self.hits.fetch_add(1, Ordering::Relaxed);
            tracing::trace!("Cache hit: {}", key);
            return Ok(serde_json::from_slice(&bytes)?);
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        tracing::trace!("Cache miss: {}", key);
        Err(CacheError::CacheMiss(key.to_string()))
    }

    /// Set a value in the cache
    pub async fn set<T>(&self, key: &str, value: &T) -> Result<(), CacheError>
    where
        T: Serialize,
    {
        let bytes = serde_json::to_vec(value)?;
        self.entries.insert(key.to_string(), bytes).await;

        tracing::trace!("Cache set: {}", key);
        Ok(())
    }

    /// Delete a single value
    pub async fn delete(&self, key: &str) {
        self.entries.invalidate(key).await;
    }

    /// Drop every cached value
    pub fn clear(&self) {
        self.entries.invalidate_all();
        tracing::debug!("Score cache cleared");
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        let hit_count = self.hits.load(Ordering::Relaxed);
        let miss_count = self.misses.load(Ordering::Relaxed);
        let total = hit_count + miss_count;

        CacheStats {
            size: self.entries.entry_count(),
            hit_count,
            miss_count,
            hit_rate: if total > 0 {
                hit_count as f64 / total as f64
            } else {
                0.0
            },
        }
    }
}

/// Cache statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheStats {
    pub size: u64,
    pub hit_count: u64,
    pub miss_count: u64,
    pub hit_rate: f64,
}

/// Cache key builder
pub struct CacheKey;

impl CacheKey {
    /// Build a cache key for scorer output
    ///
    /// Every profile field the scorer sees is part of the key.
    pub fn recommendations(profile: &UserProfile, top_k: usize) -> Result<String, CacheError> {
        Ok(format!("recs:{}:{}", top_k, serde_json::to_string(profile)?))
    }
}
