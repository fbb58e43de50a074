/// Like targets and like-count provenance
use crate::types::{AlbumId, PlaylistId, SongId, UserId};
use serde::Serialize;

/// Something a user can like
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LikeTarget {
    Album(AlbumId),
    Song(SongId),
    Playlist(PlaylistId),
}

impl LikeTarget {
    /// Identifier of the liked entity
    pub fn id(&self) -> &str {
        match self {
            Self::Album(id) => id.as_str(),
            Self::Song(id) => id.as_str(),
            Self::Playlist(id) => id.as_str(),
        }
    }

    /// Human-readable entity name used in error messages
    pub fn label(&self) -> &'static str {
        match self {
            Self::Album(_) => "Album",
            Self::Song(_) => "Song",
            Self::Playlist(_) => "Playlist",
        }
    }

    /// Key under which the liker list is cached
    pub fn cache_key(&self) -> String {
        match self {
            Self::Album(id) => format!("albums:{id}"),
            Self::Song(id) => format!("song:{id}"),
            Self::Playlist(id) => format!("playlist:{id}"),
        }
    }
}

/// Where a read was served from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    Cache,
    Store,
}

/// Users who liked a target, with the provenance of the answer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Likes {
    pub user_ids: Vec<UserId>,
    pub source: DataSource,
}

impl Likes {
    pub fn count(&self) -> usize {
        self.user_ids.len()
    }

    pub fn from_cache(&self) -> bool {
        self.source == DataSource::Cache
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_keys_follow_target_kind() {
        assert_eq!(
            LikeTarget::Album(AlbumId::new("album-1")).cache_key(),
            "albums:album-1"
        );
        assert_eq!(LikeTarget::Song(SongId::new("song-1")).cache_key(), "song:song-1");
        assert_eq!(
            LikeTarget::Playlist(PlaylistId::new("playlist-1")).cache_key(),
            "playlist:playlist-1"
        );
    }
}
