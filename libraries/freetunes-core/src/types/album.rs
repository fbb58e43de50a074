/// Album domain types
use crate::types::{AlbumId, UserId};
use serde::{Deserialize, Serialize};

/// Album owned by a single artist
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Album {
    pub id: AlbumId,
    pub name: String,
    pub year: i32,
    pub artist_id: UserId,
    /// Owner's full name
    pub artist: Option<String>,
    pub cover: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Data for creating a new album
#[derive(Debug, Clone)]
pub struct CreateAlbum {
    pub name: String,
    pub year: i32,
    pub artist_id: UserId,
}

/// Editable album fields
#[derive(Debug, Clone)]
pub struct UpdateAlbum {
    pub name: String,
    pub year: i32,
}
