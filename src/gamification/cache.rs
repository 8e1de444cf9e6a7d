//! Scoped query cache for aggregate reads
//!
//! Entries never expire on their own. Anything that can change points must
//! invalidate the affected keys explicitly.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tracing::debug;

use super::ranking::RankingType;

/// Cache scope: whose data, which ranking, which time bucket
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub user_id: Option<String>,
    pub ranking: Option<RankingType>,
    pub bucket: String,
}

impl CacheKey {
    pub fn user(user_id: &str, bucket: &str) -> Self {
        Self {
            user_id: Some(user_id.to_string()),
            ranking: None,
            bucket: bucket.to_string(),
        }
    }

    pub fn ranking(kind: RankingType, bucket: &str) -> Self {
        Self {
            user_id: None,
            ranking: Some(kind),
            bucket: bucket.to_string(),
        }
    }
}

pub struct QueryCache<V> {
    entries: Mutex<HashMap<CacheKey, Arc<V>>>,
}

impl<V> Default for QueryCache<V> {
    fn default() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }
}

impl<V> QueryCache<V> {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<CacheKey, Arc<V>>> {
        // A poisoned map only holds cached reads; keep serving it
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn get(&self, key: &CacheKey) -> Option<Arc<V>> {
        self.lock().get(key).cloned()
    }

    pub fn insert(&self, key: CacheKey, value: V) -> Arc<V> {
        let value = Arc::new(value);
        self.lock().insert(key, Arc::clone(&value));
        value
    }

    /// Return the cached value or load and cache it
    pub fn get_or_try_insert<E>(
        &self,
        key: CacheKey,
        load: impl FnOnce() -> Result<V, E>,
    ) -> Result<Arc<V>, E> {
        if let Some(hit) = self.get(&key) {
            return Ok(hit);
        }
        let value = load()?;
        Ok(self.insert(key, value))
    }

    /// Drop every entry scoped to a user
    pub fn invalidate_user(&self, user_id: &str) {
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|k, _| k.user_id.as_deref() != Some(user_id));
        debug!(user_id, dropped = before - entries.len(), "Invalidated user cache");
    }

    /// Drop every ranking entry, all types and buckets
    pub fn invalidate_rankings(&self) {
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|k, _| k.ranking.is_none());
        debug!(dropped = before - entries.len(), "Invalidated ranking cache");
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}
