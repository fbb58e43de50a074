//! Likes on albums, songs and playlists
//!
//! Each target kind has its own `(user_id, <target>_id)` table with a UNIQUE
//! constraint; that constraint is what settles concurrent double likes.

use crate::{is_foreign_key_violation, is_unique_violation};
use freetunes_core::{error::Result, types::*, TunesError};
use sqlx::{Row, SqlitePool};

/// Table and target column for a like target
fn table_of(target: &LikeTarget) -> (&'static str, &'static str) {
    match target {
        LikeTarget::Album(_) => ("user_album_likes", "album_id"),
        LikeTarget::Song(_) => ("user_song_likes", "song_id"),
        LikeTarget::Playlist(_) => ("user_playlist_likes", "playlist_id"),
    }
}

/// Check whether the user already likes the target
pub async fn exists(pool: &SqlitePool, user_id: &UserId, target: &LikeTarget) -> Result<bool> {
    let (table, column) = table_of(target);
    let row = sqlx::query(&format!(
        "SELECT 1 FROM {table} WHERE user_id = ? AND {column} = ?"
    ))
    .bind(user_id)
    .bind(target.id())
    .fetch_optional(pool)
    .await?;

    Ok(row.is_some())
}

/// Record a like; a second like of the same target is an invariant violation
pub async fn add(pool: &SqlitePool, user_id: &UserId, target: &LikeTarget) -> Result<()> {
    if exists(pool, user_id, target).await? {
        return Err(TunesError::invariant(format!(
            "{} already liked",
            target.label()
        )));
    }

    let (table, column) = table_of(target);
    sqlx::query(&format!(
        "INSERT INTO {table} (id, user_id, {column}) VALUES (?, ?, ?)"
    ))
    .bind(prefixed_id("like"))
    .bind(user_id)
    .bind(target.id())
    .execute(pool)
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            TunesError::invariant(format!("{} already liked", target.label()))
        } else if is_foreign_key_violation(&e) {
            TunesError::not_found(format!("{} not found", target.label()))
        } else {
            e.into()
        }
    })?;

    Ok(())
}

/// Remove a like; removing a like that does not exist is an invariant violation
pub async fn remove(pool: &SqlitePool, user_id: &UserId, target: &LikeTarget) -> Result<()> {
    let (table, column) = table_of(target);
    let result = sqlx::query(&format!(
        "DELETE FROM {table} WHERE user_id = ? AND {column} = ?"
    ))
    .bind(user_id)
    .bind(target.id())
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(TunesError::invariant(format!("{} not liked", target.label())));
    }
    Ok(())
}

/// Users who like the target
pub async fn get_likers(pool: &SqlitePool, target: &LikeTarget) -> Result<Vec<UserId>> {
    let (table, column) = table_of(target);
    let rows = sqlx::query(&format!(
        "SELECT user_id FROM {table} WHERE {column} = ? ORDER BY rowid"
    ))
    .bind(target.id())
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(|row| row.get("user_id")).collect())
}
