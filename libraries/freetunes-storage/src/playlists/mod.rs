//! Playlists and the access rules around them
//!
//! Access is resolved in layers:
//! - [`resolve_ownership`]: the caller must own the playlist
//! - [`resolve_access`]: owner, or failing that a collaborator
//! - [`resolve_visibility`]: the playlist must have the required visibility
//! - [`resolve_read`]: public playlists are open, private ones need access

use crate::collaborations;
use freetunes_core::{error::Result, types::*, ErrorKind, TunesError};
use sqlx::{sqlite::SqliteRow, QueryBuilder, Row, Sqlite, SqlitePool};

const PLAYLIST_SELECT: &str = r#"
    SELECT p.id, p.name, p.owner_id, u.username, p.is_public, p.cover,
           p.created_at, p.updated_at
    FROM playlists p
    JOIN users u ON u.id = p.owner_id
"#;

fn map_playlist(row: &SqliteRow) -> Playlist {
    Playlist {
        id: row.get("id"),
        name: row.get("name"),
        owner_id: row.get("owner_id"),
        username: row.get("username"),
        is_public: row.get::<i64, _>("is_public") != 0,
        cover: row.get("cover"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

/// Create a new playlist
pub async fn create(pool: &SqlitePool, playlist: &CreatePlaylist) -> Result<PlaylistId> {
    let id = PlaylistId::generate();
    let now = crate::now();

    sqlx::query(
        r#"
        INSERT INTO playlists (id, name, owner_id, is_public, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(&playlist.name)
    .bind(&playlist.owner_id)
    .bind(i64::from(playlist.is_public))
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;

    Ok(id)
}

/// Get playlist by ID, without any permission check
pub async fn get_by_id(pool: &SqlitePool, id: &PlaylistId) -> Result<Option<Playlist>> {
    let row = sqlx::query(&format!("{PLAYLIST_SELECT} WHERE p.id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(row.as_ref().map(map_playlist))
}

async fn require(pool: &SqlitePool, id: &PlaylistId) -> Result<Playlist> {
    get_by_id(pool, id)
        .await?
        .ok_or_else(|| TunesError::not_found("Playlist not found"))
}

/// The caller must own the playlist
pub async fn resolve_ownership(
    pool: &SqlitePool,
    id: &PlaylistId,
    user_id: &UserId,
) -> Result<Playlist> {
    let playlist = require(pool, id).await?;

    if !playlist.is_owned_by(user_id) {
        return Err(TunesError::forbidden(
            "You are not allowed to access this playlist",
        ));
    }

    Ok(playlist)
}

async fn collaborator_view(
    pool: &SqlitePool,
    id: &PlaylistId,
    user_id: &UserId,
) -> Result<Option<Playlist>> {
    collaborations::verify_collaborator(pool, id, user_id).await?;
    get_by_id(pool, id).await
}

/// The caller must own or collaborate on the playlist
///
/// Only a Forbidden ownership result falls through to the collaborator check.
/// When that check fails as well, the ownership error is returned.
pub async fn resolve_access(
    pool: &SqlitePool,
    id: &PlaylistId,
    user_id: &UserId,
) -> Result<Playlist> {
    match resolve_ownership(pool, id, user_id).await {
        Ok(playlist) => Ok(playlist),
        Err(ownership) if ownership.kind() == ErrorKind::Forbidden => {
            match collaborator_view(pool, id, user_id).await {
                Ok(Some(playlist)) => Ok(playlist),
                _ => Err(ownership),
            }
        }
        Err(err) => Err(err),
    }
}

/// The playlist must have the required visibility
pub async fn resolve_visibility(
    pool: &SqlitePool,
    id: &PlaylistId,
    required: Visibility,
) -> Result<Playlist> {
    let playlist = require(pool, id).await?;

    if playlist.visibility() != required {
        return Err(match required {
            Visibility::Public => TunesError::forbidden("Playlist is private"),
            Visibility::Private => TunesError::forbidden("Playlist is public"),
        });
    }

    Ok(playlist)
}

/// Public playlists are readable by anyone; private ones need owner or
/// collaborator access, so an anonymous viewer is always rejected
pub async fn resolve_read(
    pool: &SqlitePool,
    id: &PlaylistId,
    viewer: Option<&UserId>,
) -> Result<Playlist> {
    let playlist = require(pool, id).await?;

    if playlist.is_public {
        return Ok(playlist);
    }

    match viewer {
        Some(user_id) => resolve_access(pool, id, user_id).await,
        None => Err(TunesError::forbidden(
            "You are not allowed to access this playlist",
        )),
    }
}

/// Rename or change visibility
pub async fn update(pool: &SqlitePool, id: &PlaylistId, update: &UpdatePlaylist) -> Result<()> {
    let result =
        sqlx::query("UPDATE playlists SET name = ?, is_public = ?, updated_at = ? WHERE id = ?")
            .bind(&update.name)
            .bind(i64::from(update.is_public))
            .bind(crate::now())
            .bind(id)
            .execute(pool)
            .await?;

    if result.rows_affected() == 0 {
        return Err(TunesError::not_found("Playlist not found"));
    }
    Ok(())
}

/// Delete a playlist with its songs, collaborators, likes and activity log
pub async fn delete(pool: &SqlitePool, id: &PlaylistId) -> Result<()> {
    let result = sqlx::query("DELETE FROM playlists WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(TunesError::not_found("Playlist not found"));
    }
    Ok(())
}

pub async fn set_cover(pool: &SqlitePool, id: &PlaylistId, location: &str) -> Result<()> {
    let result = sqlx::query("UPDATE playlists SET cover = ?, updated_at = ? WHERE id = ?")
        .bind(location)
        .bind(crate::now())
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(TunesError::not_found("Playlist not found"));
    }
    Ok(())
}

/// Get user's playlists (owned + collaborating)
pub async fn get_user_playlists(pool: &SqlitePool, user_id: &UserId) -> Result<Vec<Playlist>> {
    let rows = sqlx::query(&format!(
        "{PLAYLIST_SELECT} LEFT JOIN collaborations c ON c.playlist_id = p.id \
         WHERE p.owner_id = ? OR c.user_id = ? \
         GROUP BY p.id ORDER BY p.updated_at DESC"
    ))
    .bind(user_id)
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.iter().map(map_playlist).collect())
}

/// Search public playlists of non-banned owners; either criterion may match
pub async fn search(
    pool: &SqlitePool,
    filter: &PlaylistFilter,
    page: Page,
) -> Result<Vec<Playlist>> {
    let page = page.normalized();
    let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(PLAYLIST_SELECT);
    qb.push(" WHERE p.is_public = 1 AND u.is_banned = 0");

    let name = criterion(filter.name.as_ref());
    let username = criterion(filter.username.as_ref());

    match (name, username) {
        (Some(name), Some(username)) => {
            qb.push(" AND (p.name LIKE '%' || ")
                .push_bind(name.to_owned())
                .push(" || '%' OR u.username LIKE '%' || ")
                .push_bind(username.to_owned())
                .push(" || '%')");
        }
        (Some(name), None) => {
            qb.push(" AND p.name LIKE '%' || ")
                .push_bind(name.to_owned())
                .push(" || '%'");
        }
        (None, Some(username)) => {
            qb.push(" AND u.username LIKE '%' || ")
                .push_bind(username.to_owned())
                .push(" || '%'");
        }
        (None, None) => {}
    }

    qb.push(" ORDER BY p.updated_at DESC, p.name LIMIT ")
        .push_bind(page.limit)
        .push(" OFFSET ")
        .push_bind(page.offset);

    let rows = qb.build().fetch_all(pool).await?;
    Ok(rows.iter().map(map_playlist).collect())
}

/// Public playlists of non-banned owners ordered by like count
pub async fn popular(pool: &SqlitePool, page: Page) -> Result<Vec<Playlist>> {
    let page = page.normalized();
    let rows = sqlx::query(
        r#"
        SELECT p.id, p.name, p.owner_id, u.username, p.is_public, p.cover,
               p.created_at, p.updated_at, COUNT(l.id) AS likes
        FROM playlists p
        JOIN users u ON u.id = p.owner_id
        LEFT JOIN user_playlist_likes l ON l.playlist_id = p.id
        WHERE p.is_public = 1 AND u.is_banned = 0
        GROUP BY p.id
        ORDER BY likes DESC, p.updated_at DESC
        LIMIT ? OFFSET ?
        "#,
    )
    .bind(page.limit)
    .bind(page.offset)
    .fetch_all(pool)
    .await?;

    Ok(rows.iter().map(map_playlist).collect())
}

/// Playlists the user liked that are still public
pub async fn liked_by(pool: &SqlitePool, user_id: &UserId) -> Result<Vec<Playlist>> {
    let rows = sqlx::query(&format!(
        "{PLAYLIST_SELECT} JOIN user_playlist_likes l ON l.playlist_id = p.id \
         WHERE l.user_id = ? AND p.is_public = 1 AND u.is_banned = 0 ORDER BY p.name"
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.iter().map(map_playlist).collect())
}
