/// Song domain types
use crate::types::{AlbumId, GenreId, SongId, UserId};
use serde::{Deserialize, Serialize};

/// Song with all stored metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Song {
    pub id: SongId,
    pub title: String,
    pub year: i32,
    pub genre_id: GenreId,
    pub artist_id: UserId,
    /// Owner's full name
    pub artist: Option<String>,
    /// Duration in seconds
    pub duration: i32,
    /// `None` marks a single
    pub album_id: Option<AlbumId>,
    pub audio: Option<String>,
    pub cover: Option<String>,
    /// Play counter
    pub listened: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Song {
    pub fn is_single(&self) -> bool {
        self.album_id.is_none()
    }
}

/// Listing projection of a song
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SongSummary {
    pub id: SongId,
    pub title: String,
    pub artist_id: UserId,
    pub artist: Option<String>,
    pub duration: i32,
    pub audio: Option<String>,
    pub cover: Option<String>,
}

/// Data for creating a new song
#[derive(Debug, Clone)]
pub struct CreateSong {
    pub title: String,
    pub year: i32,
    pub genre_id: GenreId,
    pub duration: i32,
    pub album_id: Option<AlbumId>,
    pub artist_id: UserId,
}

/// Editable song fields (the artist never changes)
#[derive(Debug, Clone)]
pub struct UpdateSong {
    pub title: String,
    pub year: i32,
    pub genre_id: GenreId,
    pub duration: i32,
    pub album_id: Option<AlbumId>,
}
