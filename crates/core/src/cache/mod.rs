//! Ephemeral TTL cache.
//!
//! Injected wherever external-provider results or computed lists are
//! memoized, so tests can swap in a plain in-memory map and deployments
//! can grow into a networked cache behind the same trait. A cache
//! failure is never an error for callers: the typed helpers degrade to a
//! miss.

mod memory;

pub use memory::MemoryCache;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

/// Cache keys used across the crate.
pub mod keys {
    /// Full provider app list (id + name pairs)
    pub const APP_LIST: &str = "steam:apps";
    /// Locally computed genre/tag filter options
    pub const FILTER_OPTIONS: &str = "catalog:filters";

    /// Per-app detail payload
    pub fn app_detail(app_id: i64) -> String {
        format!("steam:app:{}", app_id)
    }
}

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Cache lock poisoned")]
    Poisoned,

    #[error("Serialization error: {0}")]
    Serialization(String),
}

#[async_trait]
pub trait Cache: Send + Sync {
    /// Return the value stored under `key` if present and not expired
    async fn get(&self, key: &str) -> Result<Option<Value>, CacheError>;

    /// Store `value` under `key` for `ttl`, overwriting any previous entry
    async fn set(&self, key: &str, value: Value, ttl: Duration) -> Result<(), CacheError>;
}

impl dyn Cache + '_ {
    /// Typed get; errors and undecodable entries count as misses.
    pub async fn get_as<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        match self.get(key).await {
            Ok(Some(value)) => match serde_json::from_value(value) {
                Ok(typed) => Some(typed),
                Err(e) => {
                    tracing::debug!(key, error = %e, "discarding undecodable cache entry");
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(key, error = %e, "cache read failed, treating as miss");
                None
            }
        }
    }

    /// Typed set; failures are logged and swallowed.
    pub async fn put_as<T: Serialize>(&self, key: &str, value: &T, ttl: Duration) {
        let value = match serde_json::to_value(value) {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(key, error = %e, "failed to serialize cache value");
                return;
            }
        };
        if let Err(e) = self.set(key, value, ttl).await {
            tracing::warn!(key, error = %e, "cache write failed");
        }
    }
}
