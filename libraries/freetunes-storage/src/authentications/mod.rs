use freetunes_core::{error::Result, TunesError};
use sqlx::SqlitePool;

/// Persist an issued refresh token
pub async fn add_refresh_token(pool: &SqlitePool, token: &str) -> Result<()> {
    sqlx::query("INSERT INTO authentications (token) VALUES (?)")
        .bind(token)
        .execute(pool)
        .await?;
    Ok(())
}

/// Invariant violation unless the refresh token is stored
pub async fn verify_refresh_token(pool: &SqlitePool, token: &str) -> Result<()> {
    let row = sqlx::query("SELECT token FROM authentications WHERE token = ?")
        .bind(token)
        .fetch_optional(pool)
        .await?;

    if row.is_none() {
        return Err(TunesError::invariant("Refresh token is not valid"));
    }
    Ok(())
}

/// Forget a refresh token (logout)
pub async fn delete_refresh_token(pool: &SqlitePool, token: &str) -> Result<()> {
    sqlx::query("DELETE FROM authentications WHERE token = ?")
        .bind(token)
        .execute(pool)
        .await?;
    Ok(())
}
