/// Cache-aware like toggles
///
/// The liker list of every target is cached as a JSON array under the
/// target's cache key. Writes invalidate the key; reads repopulate it.
use crate::{error::Result, services::CacheStore};
use freetunes_core::types::{DataSource, LikeTarget, Likes, UserId};
use freetunes_storage::{likes, Database};
use std::sync::Arc;

pub struct LikeService {
    db: Database,
    cache: Arc<dyn CacheStore>,
}

impl LikeService {
    pub fn new(db: Database, cache: Arc<dyn CacheStore>) -> Self {
        Self { db, cache }
    }

    pub async fn add_like(&self, user_id: &UserId, target: &LikeTarget) -> Result<()> {
        likes::add(self.db.pool(), user_id, target).await?;
        self.invalidate(target).await;
        Ok(())
    }

    pub async fn remove_like(&self, user_id: &UserId, target: &LikeTarget) -> Result<()> {
        likes::remove(self.db.pool(), user_id, target).await?;
        self.invalidate(target).await;
        Ok(())
    }

    /// Liker ids, from the cache when possible
    pub async fn get_likes(&self, target: &LikeTarget) -> Result<Likes> {
        let key = target.cache_key();

        match self.cache.get(&key).await {
            Ok(Some(cached)) => match serde_json::from_str::<Vec<UserId>>(&cached) {
                Ok(user_ids) => {
                    return Ok(Likes {
                        user_ids,
                        source: DataSource::Cache,
                    })
                }
                Err(e) => tracing::warn!(%key, "Discarding unreadable cache entry: {}", e),
            },
            Ok(None) => {}
            Err(e) => tracing::warn!(%key, "Cache read failed: {}", e),
        }

        let user_ids = likes::get_likers(self.db.pool(), target).await?;

        match serde_json::to_string(&user_ids) {
            Ok(value) => {
                if let Err(e) = self.cache.set(&key, value).await {
                    tracing::warn!(%key, "Cache write failed: {}", e);
                }
            }
            Err(e) => tracing::warn!(%key, "Cannot encode likes for cache: {}", e),
        }

        Ok(Likes {
            user_ids,
            source: DataSource::Store,
        })
    }

    async fn invalidate(&self, target: &LikeTarget) {
        let key = target.cache_key();
        if let Err(e) = self.cache.delete(&key).await {
            tracing::warn!(%key, "Cache invalidation failed: {}", e);
        }
    }
}
