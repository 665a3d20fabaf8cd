//! `Mutex<HashMap<...>>`-backed `TokenCache` with manual TTL expiry checked
//! on read, used by unit tests.

use super::TokenCache;
use crate::error::AuthError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

struct Entry {
    value: String,
    expires_at: Instant,
}

#[derive(Default)]
pub struct InMemoryTokenCache {
    entries: Mutex<HashMap<String, Entry>>,
}

impl InMemoryTokenCache {
    pub fn new() -> Self {
        Self::default()
    }
}

fn glob_match(pattern: &str, key: &str) -> bool {
    // Only the trailing `*` form is used by callers (tenant-prefix scans).
    if let Some(prefix) = pattern.strip_suffix('*') {
        key.starts_with(prefix)
    } else {
        key == pattern
    }
}

#[async_trait]
impl TokenCache for InMemoryTokenCache {
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), AuthError> {
        let mut entries = self.entries.lock().await;
        entries.insert(
            key.to_string(),
            Entry { value: value.to_string(), expires_at: Instant::now() + ttl },
        );
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, AuthError> {
        let mut entries = self.entries.lock().await;
        if let Some(entry) = entries.get(key) {
            if entry.expires_at <= Instant::now() {
                entries.remove(key);
                return Ok(None);
            }
            return Ok(Some(entry.value.clone()));
        }
        Ok(None)
    }

    async fn delete(&self, key: &str) -> Result<(), AuthError> {
        self.entries.lock().await.remove(key);
        Ok(())
    }

    async fn scan_keys(&self, pattern: &str) -> Result<Vec<String>, AuthError> {
        let entries = self.entries.lock().await;
        let now = Instant::now();
        Ok(entries
            .iter()
            .filter(|(k, e)| e.expires_at > now && glob_match(pattern, k))
            .map(|(k, _)| k.clone())
            .collect())
    }

    async fn delete_by_pattern(&self, pattern: &str) -> Result<u64, AuthError> {
        let keys = self.scan_keys(pattern).await?;
        let mut entries = self.entries.lock().await;
        for key in &keys {
            entries.remove(key);
        }
        Ok(keys.len() as u64)
    }
}
