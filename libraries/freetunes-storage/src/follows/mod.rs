use crate::{is_foreign_key_violation, is_unique_violation};
use freetunes_core::{error::Result, types::*, TunesError};
use sqlx::{Row, SqlitePool};

pub async fn is_following(pool: &SqlitePool, user_id: &UserId, artist_id: &UserId) -> Result<bool> {
    let row = sqlx::query("SELECT 1 FROM follower_artist WHERE user_id = ? AND artist_id = ?")
        .bind(user_id)
        .bind(artist_id)
        .fetch_optional(pool)
        .await?;

    Ok(row.is_some())
}

/// Follow an artist
pub async fn follow(pool: &SqlitePool, user_id: &UserId, artist_id: &UserId) -> Result<()> {
    if user_id == artist_id {
        return Err(TunesError::invariant("You cannot follow yourself"));
    }
    if crate::users::get_by_id(pool, artist_id).await?.is_none() {
        return Err(TunesError::not_found("Artist not found"));
    }
    if is_following(pool, user_id, artist_id).await? {
        return Err(TunesError::invariant("Artist already followed"));
    }

    sqlx::query("INSERT INTO follower_artist (id, user_id, artist_id) VALUES (?, ?, ?)")
        .bind(prefixed_id("follow"))
        .bind(user_id)
        .bind(artist_id)
        .execute(pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                TunesError::invariant("Artist already followed")
            } else if is_foreign_key_violation(&e) {
                TunesError::not_found("Artist not found")
            } else {
                e.into()
            }
        })?;

    Ok(())
}

/// Stop following an artist
pub async fn unfollow(pool: &SqlitePool, user_id: &UserId, artist_id: &UserId) -> Result<()> {
    let result = sqlx::query("DELETE FROM follower_artist WHERE user_id = ? AND artist_id = ?")
        .bind(user_id)
        .bind(artist_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(TunesError::invariant("Artist not followed"));
    }
    Ok(())
}

/// Ids of the artist's followers
pub async fn followers(pool: &SqlitePool, artist_id: &UserId) -> Result<Vec<UserId>> {
    let rows = sqlx::query("SELECT user_id FROM follower_artist WHERE artist_id = ? ORDER BY rowid")
        .bind(artist_id)
        .fetch_all(pool)
        .await?;

    Ok(rows.into_iter().map(|row| row.get("user_id")).collect())
}
