use crate::{is_foreign_key_violation, is_unique_violation};
use freetunes_core::{error::Result, types::*, TunesError};
use sqlx::{sqlite::SqliteRow, QueryBuilder, Row, Sqlite, SqlitePool};

const SONG_SELECT: &str = r#"
    SELECT s.id, s.title, s.year, s.genre_id, s.artist_id, u.fullname AS artist,
           s.duration, s.album_id, s.audio, s.cover, s.listened,
           s.created_at, s.updated_at
    FROM songs s
    JOIN users u ON u.id = s.artist_id
"#;

fn map_song(row: &SqliteRow) -> Song {
    Song {
        id: row.get("id"),
        title: row.get("title"),
        year: row.get("year"),
        genre_id: row.get("genre_id"),
        artist_id: row.get("artist_id"),
        artist: row.get("artist"),
        duration: row.get("duration"),
        album_id: row.get("album_id"),
        audio: row.get("audio"),
        cover: row.get("cover"),
        listened: row.get("listened"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

fn map_summary(row: &SqliteRow) -> SongSummary {
    SongSummary {
        id: row.get("id"),
        title: row.get("title"),
        artist_id: row.get("artist_id"),
        artist: row.get("artist"),
        duration: row.get("duration"),
        audio: row.get("audio"),
        cover: row.get("cover"),
    }
}

fn map_write_error(err: sqlx::Error) -> TunesError {
    if is_foreign_key_violation(&err) {
        TunesError::invariant("Referenced genre or album does not exist")
    } else {
        err.into()
    }
}

/// Create a new song
pub async fn create(pool: &SqlitePool, song: &CreateSong) -> Result<SongId> {
    let id = SongId::generate();
    let now = crate::now();

    sqlx::query(
        r#"
        INSERT INTO songs (id, title, year, genre_id, artist_id, duration, album_id,
                           listened, is_removed, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, 0, 0, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(&song.title)
    .bind(song.year)
    .bind(&song.genre_id)
    .bind(&song.artist_id)
    .bind(song.duration)
    .bind(&song.album_id)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await
    .map_err(map_write_error)?;

    Ok(id)
}

/// Get song by ID
///
/// Removed songs are invisible; the artist's ban state is not checked.
pub async fn get_by_id(pool: &SqlitePool, id: &SongId) -> Result<Option<Song>> {
    let row = sqlx::query(&format!("{SONG_SELECT} WHERE s.id = ? AND s.is_removed = 0"))
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(row.as_ref().map(map_song))
}

/// Fetch the song and make sure `user_id` is its artist
pub async fn verify_owner(pool: &SqlitePool, id: &SongId, user_id: &UserId) -> Result<Song> {
    let song = get_by_id(pool, id)
        .await?
        .ok_or_else(|| TunesError::not_found("Song not found"))?;

    if &song.artist_id != user_id {
        return Err(TunesError::forbidden("You are not allowed to access this song"));
    }

    Ok(song)
}

/// Update song fields; the artist stays unchanged
pub async fn update(pool: &SqlitePool, id: &SongId, update: &UpdateSong) -> Result<()> {
    let result = sqlx::query(
        r#"
        UPDATE songs
        SET title = ?, year = ?, genre_id = ?, duration = ?, album_id = ?, updated_at = ?
        WHERE id = ? AND is_removed = 0
        "#,
    )
    .bind(&update.title)
    .bind(update.year)
    .bind(&update.genre_id)
    .bind(update.duration)
    .bind(&update.album_id)
    .bind(crate::now())
    .bind(id)
    .execute(pool)
    .await
    .map_err(map_write_error)?;

    if result.rows_affected() == 0 {
        return Err(TunesError::not_found("Song not found"));
    }
    Ok(())
}

/// Soft delete: the row stays for history and reports but disappears everywhere else
pub async fn remove(pool: &SqlitePool, id: &SongId) -> Result<()> {
    let result = sqlx::query(
        "UPDATE songs SET is_removed = 1, updated_at = ? WHERE id = ? AND is_removed = 0",
    )
    .bind(crate::now())
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(TunesError::not_found("Song not found"));
    }
    Ok(())
}

async fn set_asset(pool: &SqlitePool, id: &SongId, column: &str, location: &str) -> Result<()> {
    let result = sqlx::query(&format!(
        "UPDATE songs SET {column} = ?, updated_at = ? WHERE id = ? AND is_removed = 0"
    ))
    .bind(location)
    .bind(crate::now())
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(TunesError::not_found("Song not found"));
    }
    Ok(())
}

pub async fn set_audio(pool: &SqlitePool, id: &SongId, location: &str) -> Result<()> {
    set_asset(pool, id, "audio", location).await
}

pub async fn set_cover(pool: &SqlitePool, id: &SongId, location: &str) -> Result<()> {
    set_asset(pool, id, "cover", location).await
}

/// Bump the play counter
pub async fn increment_listened(pool: &SqlitePool, id: &SongId) -> Result<()> {
    let result =
        sqlx::query("UPDATE songs SET listened = listened + 1 WHERE id = ? AND is_removed = 0")
            .bind(id)
            .execute(pool)
            .await?;

    if result.rows_affected() == 0 {
        return Err(TunesError::not_found("Song not found"));
    }
    Ok(())
}

/// Search songs of non-banned artists; all given criteria must match
pub async fn search(pool: &SqlitePool, filter: &SongFilter, page: Page) -> Result<Vec<Song>> {
    let page = page.normalized();
    let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(SONG_SELECT);
    qb.push(" JOIN genres g ON g.id = s.genre_id WHERE s.is_removed = 0 AND u.is_banned = 0");

    if let Some(title) = criterion(filter.title.as_ref()) {
        qb.push(" AND s.title LIKE '%' || ")
            .push_bind(title.to_owned())
            .push(" || '%'");
    }
    if let Some(artist) = criterion(filter.artist.as_ref()) {
        qb.push(" AND u.fullname LIKE '%' || ")
            .push_bind(artist.to_owned())
            .push(" || '%'");
    }
    if let Some(genre) = criterion(filter.genre.as_ref()) {
        qb.push(" AND (g.id = ")
            .push_bind(genre.to_owned())
            .push(" OR g.name LIKE '%' || ")
            .push_bind(genre.to_owned())
            .push(" || '%')");
    }

    qb.push(" ORDER BY s.created_at DESC, s.title LIMIT ")
        .push_bind(page.limit)
        .push(" OFFSET ")
        .push_bind(page.offset);

    let rows = qb.build().fetch_all(pool).await?;
    Ok(rows.iter().map(map_song).collect())
}

/// Most played songs of non-banned artists
pub async fn popular(pool: &SqlitePool, page: Page) -> Result<Vec<Song>> {
    let page = page.normalized();
    let rows = sqlx::query(&format!(
        "{SONG_SELECT} WHERE s.is_removed = 0 AND u.is_banned = 0 \
         ORDER BY s.listened DESC, s.created_at DESC LIMIT ? OFFSET ?"
    ))
    .bind(page.limit)
    .bind(page.offset)
    .fetch_all(pool)
    .await?;

    Ok(rows.iter().map(map_song).collect())
}

/// Newest songs of non-banned artists
pub async fn recent(pool: &SqlitePool, page: Page) -> Result<Vec<Song>> {
    let page = page.normalized();
    let rows = sqlx::query(&format!(
        "{SONG_SELECT} WHERE s.is_removed = 0 AND u.is_banned = 0 \
         ORDER BY s.created_at DESC, s.rowid DESC LIMIT ? OFFSET ?"
    ))
    .bind(page.limit)
    .bind(page.offset)
    .fetch_all(pool)
    .await?;

    Ok(rows.iter().map(map_song).collect())
}

/// Songs the user liked
pub async fn liked_by(pool: &SqlitePool, user_id: &UserId) -> Result<Vec<Song>> {
    let rows = sqlx::query(&format!(
        "{SONG_SELECT} JOIN user_song_likes l ON l.song_id = s.id \
         WHERE l.user_id = ? AND s.is_removed = 0 AND u.is_banned = 0 ORDER BY s.title"
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.iter().map(map_song).collect())
}

/// Every live song of the artist
pub async fn by_artist(pool: &SqlitePool, artist_id: &UserId) -> Result<Vec<Song>> {
    let rows = sqlx::query(&format!(
        "{SONG_SELECT} WHERE s.artist_id = ? AND s.is_removed = 0 ORDER BY s.created_at DESC"
    ))
    .bind(artist_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.iter().map(map_song).collect())
}

/// Songs of the artist that belong to no album
pub async fn singles_by_artist(pool: &SqlitePool, artist_id: &UserId) -> Result<Vec<Song>> {
    let rows = sqlx::query(&format!(
        "{SONG_SELECT} WHERE s.artist_id = ? AND s.album_id IS NULL AND s.is_removed = 0 \
         ORDER BY s.created_at DESC"
    ))
    .bind(artist_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.iter().map(map_song).collect())
}

/// Singles of the artist as shown to other users (empty when banned)
pub async fn public_singles_by_artist(pool: &SqlitePool, artist_id: &UserId) -> Result<Vec<Song>> {
    let rows = sqlx::query(&format!(
        "{SONG_SELECT} WHERE s.artist_id = ? AND s.album_id IS NULL AND s.is_removed = 0 \
         AND u.is_banned = 0 ORDER BY s.created_at DESC"
    ))
    .bind(artist_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.iter().map(map_song).collect())
}

/// Live songs of an album
pub async fn by_album(pool: &SqlitePool, album_id: &AlbumId) -> Result<Vec<SongSummary>> {
    let rows = sqlx::query(&format!(
        "{SONG_SELECT} WHERE s.album_id = ? AND s.is_removed = 0 ORDER BY s.created_at"
    ))
    .bind(album_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.iter().map(map_summary).collect())
}

/// Live songs contained in a playlist
pub async fn by_playlist(pool: &SqlitePool, playlist_id: &PlaylistId) -> Result<Vec<SongSummary>> {
    let rows = sqlx::query(&format!(
        "{SONG_SELECT} JOIN playlist_songs ps ON ps.song_id = s.id \
         WHERE ps.playlist_id = ? AND s.is_removed = 0 ORDER BY s.title"
    ))
    .bind(playlist_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.iter().map(map_summary).collect())
}

/// Add a song to a playlist and log the addition, atomically
pub async fn add_to_playlist(
    pool: &SqlitePool,
    playlist_id: &PlaylistId,
    song_id: &SongId,
    user_id: &UserId,
) -> Result<()> {
    let mut tx = pool.begin().await?;

    sqlx::query("INSERT INTO playlist_songs (id, playlist_id, song_id) VALUES (?, ?, ?)")
        .bind(prefixed_id("playlist_song"))
        .bind(playlist_id)
        .bind(song_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                TunesError::invariant("Song is already in the playlist")
            } else {
                map_write_error(e)
            }
        })?;

    crate::activities::record(&mut *tx, playlist_id, song_id, user_id, ActivityAction::Add)
        .await?;

    tx.commit().await?;
    Ok(())
}

/// Remove a song from a playlist and log the removal, atomically
pub async fn remove_from_playlist(
    pool: &SqlitePool,
    playlist_id: &PlaylistId,
    song_id: &SongId,
    user_id: &UserId,
) -> Result<()> {
    let mut tx = pool.begin().await?;

    let result = sqlx::query("DELETE FROM playlist_songs WHERE playlist_id = ? AND song_id = ?")
        .bind(playlist_id)
        .bind(song_id)
        .execute(&mut *tx)
        .await?;

    if result.rows_affected() == 0 {
        return Err(TunesError::invariant("Song is not in the playlist"));
    }

    crate::activities::record(&mut *tx, playlist_id, song_id, user_id, ActivityAction::Delete)
        .await?;

    tx.commit().await?;
    Ok(())
}
