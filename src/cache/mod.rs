//! TokenCache: tenant-prefixed key/value storage with TTL (spec §4.3).

pub mod memory;
pub mod redis;

use crate::error::AuthError;
use async_trait::async_trait;
use std::time::Duration;

pub const ACCESS_PREFIX: &str = "tokens";
pub const REFRESH_PREFIX: &str = "refresh_tokens";

pub fn cache_key(prefix: &str, tenant_id: &str, user_id: &str) -> String {
    format!("{prefix}:{tenant_id}:{user_id}")
}

#[async_trait]
pub trait TokenCache: Send + Sync {
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), AuthError>;
    async fn get(&self, key: &str) -> Result<Option<String>, AuthError>;
    /// Idempotent: deleting an absent key is not an error.
    async fn delete(&self, key: &str) -> Result<(), AuthError>;
    /// Cursor-based scan, never `KEYS`; batch hint of 100 per round trip.
    async fn scan_keys(&self, pattern: &str) -> Result<Vec<String>, AuthError>;
    /// Returns the number of keys deleted.
    async fn delete_by_pattern(&self, pattern: &str) -> Result<u64, AuthError>;
}
