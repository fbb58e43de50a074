/// Listening history types
use crate::types::{SongId, UserId};
use serde::{Deserialize, Serialize};

/// A song the user played, newest first in listings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub song_id: SongId,
    pub title: String,
    pub artist_id: UserId,
    pub artist: Option<String>,
    pub duration: i32,
    pub audio: Option<String>,
    pub cover: Option<String>,
    pub played_at: i64,
}
