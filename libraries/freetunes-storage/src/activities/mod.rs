use freetunes_core::{error::Result, types::*, TunesError};
use sqlx::{Executor, Row, Sqlite, SqlitePool};

/// Append an entry to the playlist's song activity log
///
/// Takes any executor so playlist edits can log inside their own transaction.
pub async fn record<'e, E>(
    executor: E,
    playlist_id: &PlaylistId,
    song_id: &SongId,
    user_id: &UserId,
    action: ActivityAction,
) -> Result<()>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        r#"
        INSERT INTO playlist_song_activities (id, playlist_id, song_id, user_id, action, time)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(prefixed_id("activity"))
    .bind(playlist_id)
    .bind(song_id)
    .bind(user_id)
    .bind(action.as_str())
    .bind(crate::now())
    .execute(executor)
    .await?;

    Ok(())
}

/// Activity log of a playlist, oldest first
pub async fn get_by_playlist(
    pool: &SqlitePool,
    playlist_id: &PlaylistId,
) -> Result<Vec<PlaylistActivity>> {
    let rows = sqlx::query(
        r#"
        SELECT a.song_id, s.title, a.user_id, u.username, a.action, a.time
        FROM playlist_song_activities a
        JOIN songs s ON s.id = a.song_id
        JOIN users u ON u.id = a.user_id
        WHERE a.playlist_id = ?
        ORDER BY a.time, a.rowid
        "#,
    )
    .bind(playlist_id)
    .fetch_all(pool)
    .await?;

    rows.into_iter()
        .map(|row| {
            let action: String = row.get("action");
            Ok(PlaylistActivity {
                song_id: row.get("song_id"),
                title: row.get("title"),
                user_id: row.get("user_id"),
                username: row.get("username"),
                action: action.parse().map_err(TunesError::Other)?,
                time: row.get("time"),
            })
        })
        .collect()
}
