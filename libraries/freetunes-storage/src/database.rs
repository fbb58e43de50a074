/// Database handle
use crate::error::Result;
use sqlx::sqlite::SqlitePool;

/// Owned connection pool, opened at startup and closed on shutdown
///
/// Cloning is cheap; every clone shares the same pool.
#[derive(Clone, Debug)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open the database and bring the schema up to date
    ///
    /// # Errors
    /// Returns an error if the connection fails or migrations fail
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = crate::create_pool(database_url).await?;
        crate::run_migrations(&pool).await?;
        Ok(Self { pool })
    }

    /// Get a reference to the underlying pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close every connection; pending acquires fail afterwards
    pub async fn close(&self) {
        self.pool.close().await;
        tracing::info!("Database pool closed");
    }
}
