/// Playlist domain types
use crate::types::{PlaylistId, SongId, UserId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Playlist visibility
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Public,
    Private,
}

impl Visibility {
    pub fn from_public(is_public: bool) -> Self {
        if is_public {
            Self::Public
        } else {
            Self::Private
        }
    }

    pub fn is_public(self) -> bool {
        self == Self::Public
    }
}

/// Playlist owned by a user, optionally shared with collaborators
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Playlist {
    pub id: PlaylistId,
    pub name: String,
    pub owner_id: UserId,
    /// Owner's username
    pub username: Option<String>,
    pub is_public: bool,
    pub cover: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Playlist {
    pub fn visibility(&self) -> Visibility {
        Visibility::from_public(self.is_public)
    }

    pub fn is_owned_by(&self, user_id: &UserId) -> bool {
        &self.owner_id == user_id
    }
}

/// Data for creating a new playlist
#[derive(Debug, Clone)]
pub struct CreatePlaylist {
    pub name: String,
    pub owner_id: UserId,
    pub is_public: bool,
}

/// Editable playlist fields
#[derive(Debug, Clone)]
pub struct UpdatePlaylist {
    pub name: String,
    pub is_public: bool,
}

/// Kind of playlist edit recorded in the activity log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityAction {
    Add,
    Delete,
}

impl ActivityAction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Delete => "delete",
        }
    }
}

impl fmt::Display for ActivityAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActivityAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "add" => Ok(Self::Add),
            "delete" => Ok(Self::Delete),
            other => Err(format!("unknown activity action: {other}")),
        }
    }
}

/// One entry of a playlist's song activity log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistActivity {
    pub song_id: SongId,
    pub title: String,
    pub user_id: UserId,
    pub username: String,
    pub action: ActivityAction,
    pub time: i64,
}
