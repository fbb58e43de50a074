use crate::{is_foreign_key_violation, is_unique_violation};
use freetunes_core::{error::Result, types::*, TunesError};
use sqlx::{Row, SqlitePool};

/// Grant a user collaborator access to a playlist
pub async fn add(pool: &SqlitePool, playlist_id: &PlaylistId, user_id: &UserId) -> Result<String> {
    let id = prefixed_id("collab");

    sqlx::query("INSERT INTO collaborations (id, playlist_id, user_id) VALUES (?, ?, ?)")
        .bind(&id)
        .bind(playlist_id)
        .bind(user_id)
        .execute(pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                TunesError::invariant("User is already a collaborator")
            } else if is_foreign_key_violation(&e) {
                TunesError::not_found("User not found")
            } else {
                e.into()
            }
        })?;

    Ok(id)
}

/// Revoke collaborator access
pub async fn remove(pool: &SqlitePool, playlist_id: &PlaylistId, user_id: &UserId) -> Result<()> {
    let result = sqlx::query("DELETE FROM collaborations WHERE playlist_id = ? AND user_id = ?")
        .bind(playlist_id)
        .bind(user_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(TunesError::invariant("User is not a collaborator"));
    }
    Ok(())
}

/// Forbidden unless the user collaborates on the playlist
pub async fn verify_collaborator(
    pool: &SqlitePool,
    playlist_id: &PlaylistId,
    user_id: &UserId,
) -> Result<()> {
    let row = sqlx::query("SELECT 1 FROM collaborations WHERE playlist_id = ? AND user_id = ?")
        .bind(playlist_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

    if row.is_none() {
        return Err(TunesError::forbidden("You are not a collaborator of this playlist"));
    }
    Ok(())
}

/// Collaborators of a playlist
pub async fn get_collaborators(
    pool: &SqlitePool,
    playlist_id: &PlaylistId,
) -> Result<Vec<UserSummary>> {
    let rows = sqlx::query(
        r#"
        SELECT u.id, u.username, u.fullname, u.description, u.picture
        FROM collaborations c
        JOIN users u ON u.id = c.user_id
        WHERE c.playlist_id = ?
        ORDER BY u.username
        "#,
    )
    .bind(playlist_id)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| UserSummary {
            id: row.get("id"),
            username: row.get("username"),
            fullname: row.get("fullname"),
            description: row.get("description"),
            picture: row.get("picture"),
        })
        .collect())
}
