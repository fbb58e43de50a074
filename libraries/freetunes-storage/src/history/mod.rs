use freetunes_core::{error::Result, types::*};
use sqlx::{Row, SqlitePool};

/// Entries returned by [`recent`]
pub const HISTORY_LIMIT: i64 = 50;

/// Record a play; replaying a song only moves its timestamp
pub async fn record(pool: &SqlitePool, user_id: &UserId, song_id: &SongId) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO history (id, user_id, song_id, time)
        VALUES (?, ?, ?, ?)
        ON CONFLICT (user_id, song_id) DO UPDATE SET time = excluded.time
        "#,
    )
    .bind(prefixed_id("history"))
    .bind(user_id)
    .bind(song_id)
    .bind(crate::now())
    .execute(pool)
    .await?;

    Ok(())
}

/// Most recently played songs, newest first
pub async fn recent(pool: &SqlitePool, user_id: &UserId) -> Result<Vec<HistoryEntry>> {
    let rows = sqlx::query(
        r#"
        SELECT s.id, s.title, s.artist_id, u.fullname AS artist, s.duration, s.audio, s.cover,
               h.time
        FROM history h
        JOIN songs s ON s.id = h.song_id
        JOIN users u ON u.id = s.artist_id
        WHERE h.user_id = ? AND s.is_removed = 0
        ORDER BY h.time DESC, h.rowid DESC
        LIMIT ?
        "#,
    )
    .bind(user_id)
    .bind(HISTORY_LIMIT)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| HistoryEntry {
            song_id: row.get("id"),
            title: row.get("title"),
            artist_id: row.get("artist_id"),
            artist: row.get("artist"),
            duration: row.get("duration"),
            audio: row.get("audio"),
            cover: row.get("cover"),
            played_at: row.get("time"),
        })
        .collect())
}
