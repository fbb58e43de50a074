use freetunes_core::{error::Result, types::*, TunesError};
use sqlx::{sqlite::SqliteRow, QueryBuilder, Row, Sqlite, SqlitePool};

const ALBUM_SELECT: &str = r#"
    SELECT a.id, a.name, a.year, a.artist_id, u.fullname AS artist, a.cover,
           a.created_at, a.updated_at
    FROM albums a
    JOIN users u ON u.id = a.artist_id
"#;

fn map_album(row: &SqliteRow) -> Album {
    Album {
        id: row.get("id"),
        name: row.get("name"),
        year: row.get("year"),
        artist_id: row.get("artist_id"),
        artist: row.get("artist"),
        cover: row.get("cover"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

/// Create a new album
pub async fn create(pool: &SqlitePool, album: &CreateAlbum) -> Result<AlbumId> {
    let id = AlbumId::generate();
    let now = crate::now();

    sqlx::query(
        r#"
        INSERT INTO albums (id, name, year, artist_id, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(&album.name)
    .bind(album.year)
    .bind(&album.artist_id)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;

    Ok(id)
}

/// Get album by ID
///
/// Direct lookups are not filtered by the artist's ban state.
pub async fn get_by_id(pool: &SqlitePool, id: &AlbumId) -> Result<Option<Album>> {
    let row = sqlx::query(&format!("{ALBUM_SELECT} WHERE a.id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(row.as_ref().map(map_album))
}

/// Fetch the album and make sure `user_id` owns it
pub async fn verify_owner(pool: &SqlitePool, id: &AlbumId, user_id: &UserId) -> Result<Album> {
    let album = get_by_id(pool, id)
        .await?
        .ok_or_else(|| TunesError::not_found("Album not found"))?;

    if &album.artist_id != user_id {
        return Err(TunesError::forbidden(
            "You are not allowed to access this album",
        ));
    }

    Ok(album)
}

/// Update album fields
pub async fn update(pool: &SqlitePool, id: &AlbumId, update: &UpdateAlbum) -> Result<()> {
    let result = sqlx::query("UPDATE albums SET name = ?, year = ?, updated_at = ? WHERE id = ?")
        .bind(&update.name)
        .bind(update.year)
        .bind(crate::now())
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(TunesError::not_found("Album not found"));
    }
    Ok(())
}

/// Delete an album together with its songs
pub async fn delete(pool: &SqlitePool, id: &AlbumId) -> Result<()> {
    let result = sqlx::query("DELETE FROM albums WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(TunesError::not_found("Album not found"));
    }
    Ok(())
}

pub async fn set_cover(pool: &SqlitePool, id: &AlbumId, location: &str) -> Result<()> {
    let result = sqlx::query("UPDATE albums SET cover = ?, updated_at = ? WHERE id = ?")
        .bind(location)
        .bind(crate::now())
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(TunesError::not_found("Album not found"));
    }
    Ok(())
}

/// Search albums of non-banned artists
pub async fn search(pool: &SqlitePool, filter: &AlbumFilter, page: Page) -> Result<Vec<Album>> {
    let page = page.normalized();
    let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(ALBUM_SELECT);
    qb.push(" WHERE u.is_banned = 0");

    if let Some(name) = criterion(filter.name.as_ref()) {
        qb.push(" AND a.name LIKE '%' || ")
            .push_bind(name.to_owned())
            .push(" || '%'");
    }
    if let Some(artist) = criterion(filter.artist.as_ref()) {
        qb.push(" AND u.fullname LIKE '%' || ")
            .push_bind(artist.to_owned())
            .push(" || '%'");
    }

    qb.push(" ORDER BY a.created_at DESC, a.name LIMIT ")
        .push_bind(page.limit)
        .push(" OFFSET ")
        .push_bind(page.offset);

    let rows = qb.build().fetch_all(pool).await?;
    Ok(rows.iter().map(map_album).collect())
}

/// Albums of non-banned artists ordered by like count
pub async fn popular(pool: &SqlitePool, page: Page) -> Result<Vec<Album>> {
    let page = page.normalized();
    let rows = sqlx::query(
        r#"
        SELECT a.id, a.name, a.year, a.artist_id, u.fullname AS artist, a.cover,
               a.created_at, a.updated_at, COUNT(l.id) AS likes
        FROM albums a
        JOIN users u ON u.id = a.artist_id
        LEFT JOIN user_album_likes l ON l.album_id = a.id
        WHERE u.is_banned = 0
        GROUP BY a.id
        ORDER BY likes DESC, a.created_at DESC
        LIMIT ? OFFSET ?
        "#,
    )
    .bind(page.limit)
    .bind(page.offset)
    .fetch_all(pool)
    .await?;

    Ok(rows.iter().map(map_album).collect())
}

/// Albums the user liked
pub async fn liked_by(pool: &SqlitePool, user_id: &UserId) -> Result<Vec<Album>> {
    let rows = sqlx::query(&format!(
        "{ALBUM_SELECT} JOIN user_album_likes l ON l.album_id = a.id \
         WHERE l.user_id = ? AND u.is_banned = 0 ORDER BY a.name"
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.iter().map(map_album).collect())
}

/// Every album owned by the artist, regardless of ban state
pub async fn by_artist(pool: &SqlitePool, artist_id: &UserId) -> Result<Vec<Album>> {
    let rows = sqlx::query(&format!(
        "{ALBUM_SELECT} WHERE a.artist_id = ? ORDER BY a.year DESC, a.name"
    ))
    .bind(artist_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.iter().map(map_album).collect())
}

/// Albums of the artist as shown to other users (empty when banned)
pub async fn public_by_artist(pool: &SqlitePool, artist_id: &UserId) -> Result<Vec<Album>> {
    let rows = sqlx::query(&format!(
        "{ALBUM_SELECT} WHERE a.artist_id = ? AND u.is_banned = 0 ORDER BY a.year DESC, a.name"
    ))
    .bind(artist_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.iter().map(map_album).collect())
}
