/// Key-value cache
///
/// Like lists treat it as advisory and fall back to the database on any miss
/// or error. One-time codes get their own instance so like traffic never
/// evicts a pending code.
use crate::error::{Result, ServerError};
use async_trait::async_trait;
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::Mutex;

#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Insert or overwrite a value
    async fn set(&self, key: &str, value: String) -> Result<()>;

    /// Remove a key; removing an absent key is not an error
    async fn delete(&self, key: &str) -> Result<()>;

    /// Remove a key and return its value in one step
    async fn take(&self, key: &str) -> Result<Option<String>>;
}

/// In-process LRU cache
pub struct MemoryCache {
    entries: Mutex<LruCache<String, String>>,
}

impl MemoryCache {
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, LruCache<String, String>>> {
        self.entries
            .lock()
            .map_err(|_| ServerError::Internal("cache lock poisoned".to_string()))
    }
}

#[async_trait]
impl CacheStore for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    async fn set(&self, key: &str, value: String) -> Result<()> {
        self.lock()?.put(key.to_string(), value);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.lock()?.pop(key);
        Ok(())
    }

    async fn take(&self, key: &str) -> Result<Option<String>> {
        Ok(self.lock()?.pop(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cache(capacity: usize) -> MemoryCache {
        MemoryCache::new(NonZeroUsize::new(capacity).unwrap())
    }

    #[tokio::test]
    async fn set_get_delete() {
        let cache = cache(4);
        assert_eq!(cache.get("song:1").await.unwrap(), None);

        cache.set("song:1", "[]".to_string()).await.unwrap();
        assert_eq!(cache.get("song:1").await.unwrap().as_deref(), Some("[]"));

        cache.delete("song:1").await.unwrap();
        cache.delete("song:1").await.unwrap();
        assert_eq!(cache.get("song:1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn take_removes_the_value() {
        let cache = cache(4);
        cache.set("verify:user-1", "123456".to_string()).await.unwrap();

        let taken = cache.take("verify:user-1").await.unwrap();
        assert_eq!(taken.as_deref(), Some("123456"));
        assert_eq!(cache.take("verify:user-1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn least_recently_used_key_is_evicted() {
        let cache = cache(2);
        cache.set("a", "1".to_string()).await.unwrap();
        cache.set("b", "2".to_string()).await.unwrap();
        cache.get("a").await.unwrap();
        cache.set("c", "3".to_string()).await.unwrap();

        assert!(cache.get("a").await.unwrap().is_some());
        assert!(cache.get("b").await.unwrap().is_none());
    }
}
