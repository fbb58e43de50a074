/// Shared application state
use crate::services::{AuthService, CacheStore, FileStorage, LikeService, MessageProducer};
use freetunes_storage::Database;
use sqlx::SqlitePool;
use std::sync::Arc;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub auth_service: Arc<AuthService>,
    pub file_storage: Arc<FileStorage>,
    pub cache: Arc<dyn CacheStore>,
    /// One-time codes, kept apart from the like cache
    pub codes: Arc<dyn CacheStore>,
    pub likes: Arc<LikeService>,
    pub producer: Arc<dyn MessageProducer>,
}

impl AppState {
    pub fn new(
        db: Database,
        auth_service: Arc<AuthService>,
        file_storage: Arc<FileStorage>,
        cache: Arc<dyn CacheStore>,
        codes: Arc<dyn CacheStore>,
        producer: Arc<dyn MessageProducer>,
    ) -> Self {
        let likes = Arc::new(LikeService::new(db.clone(), Arc::clone(&cache)));
        Self {
            db,
            auth_service,
            file_storage,
            cache,
            codes,
            likes,
            producer,
        }
    }

    pub fn pool(&self) -> &SqlitePool {
        self.db.pool()
    }
}
