//! FreeTunes Storage
//!
//! `SQLite` persistence layer for the FreeTunes server.
//!
//! # Architecture
//!
//! - **Vertical Slicing**: each resource owns its own queries and logic
//! - **Filters**: optional search criteria are compiled with `QueryBuilder`
//!   into one parameterized statement, so paging stays accurate
//! - **Constraints**: UNIQUE indexes are the only concurrency guard for likes,
//!   follows, collaborations and history
//!
//! # Example
//!
//! ```rust,no_run
//! use freetunes_core::{AlbumFilter, Page};
//! use freetunes_storage::{albums, Database};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let db = Database::connect("sqlite://freetunes.db").await?;
//!
//! let found = albums::search(db.pool(), &AlbumFilter::default(), Page::default()).await?;
//! println!("{} albums", found.len());
//!
//! db.close().await;
//! # Ok(())
//! # }
//! ```

mod database;
mod error;

// Vertical slices
pub mod albums;
pub mod genres;
pub mod playlists;
pub mod songs;
pub mod users;

// Relations between users and content
pub mod collaborations;
pub mod follows;
pub mod likes;

// Activity
pub mod activities;
pub mod history;
pub mod reports;

// Sessions
pub mod authentications;

pub use database::Database;
pub use error::{is_foreign_key_violation, is_unique_violation, StorageError};

use sqlx::migrate::Migrator;
use sqlx::sqlite::SqlitePool;

// Embed migrations into binary
static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Run database migrations
///
/// This should be called once when the application starts to ensure
/// the database schema is up to date.
///
/// # Errors
///
/// Returns an error if migrations fail to run
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::migrate::MigrateError> {
    MIGRATOR.run(pool).await
}

/// Create a new `SQLite` pool
///
/// # Arguments
///
/// * `database_url` - `SQLite` connection string (e.g., `<sqlite://freetunes.db>`)
///
/// # Errors
///
/// Returns an error if the connection fails
pub async fn create_pool(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
    use std::str::FromStr;

    tracing::debug!(url = %database_url, "Creating database pool");

    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(std::time::Duration::from_secs(30));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    tracing::info!("Database pool ready");

    Ok(pool)
}

/// Current Unix time in seconds
pub(crate) fn now() -> i64 {
    chrono::Utc::now().timestamp()
}
