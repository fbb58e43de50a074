//! FreeTunes Core
//!
//! Storage-agnostic domain types and error handling shared by the storage
//! library and the server.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Identifiers**: prefixed random string ids (`UserId`, `SongId`, ...)
//! - **Domain Types**: `Album`, `Song`, `Playlist`, `User`, `Report`, ...
//! - **Filters**: optional search criteria compiled by the storage layer
//! - **Error Handling**: tagged `TunesError` with an `ErrorKind` discriminator
//!
//! # Example
//!
//! ```rust
//! use freetunes_core::types::{LikeTarget, SongId, UserId};
//!
//! let artist = UserId::generate();
//! assert!(artist.as_str().starts_with("user-"));
//!
//! let target = LikeTarget::Song(SongId::new("song-1"));
//! assert_eq!(target.cache_key(), "song:song-1");
//! ```

#![forbid(unsafe_code)]

pub mod error;
pub mod types;

pub use error::{ErrorKind, Result, TunesError};

pub use types::{
    Album, AlbumFilter, AlbumId, DataSource, Genre, GenreId, LikeTarget, Likes, Page, Playlist,
    PlaylistFilter, PlaylistId, Report, ReportId, ReportStatus, Song, SongFilter, SongId, User,
    UserFilter, UserId, Visibility,
};
