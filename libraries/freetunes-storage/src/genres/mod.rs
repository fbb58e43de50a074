use freetunes_core::{error::Result, types::*};
use sqlx::{Row, SqlitePool};

/// Get all genres, alphabetically
pub async fn get_all(pool: &SqlitePool) -> Result<Vec<Genre>> {
    let rows = sqlx::query("SELECT id, name FROM genres ORDER BY name")
        .fetch_all(pool)
        .await?;

    Ok(rows
        .into_iter()
        .map(|row| Genre {
            id: row.get("id"),
            name: row.get("name"),
        })
        .collect())
}

/// Get genre by ID
pub async fn get_by_id(pool: &SqlitePool, id: &GenreId) -> Result<Option<Genre>> {
    let row = sqlx::query("SELECT id, name FROM genres WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(row.map(|row| Genre {
        id: row.get("id"),
        name: row.get("name"),
    }))
}
