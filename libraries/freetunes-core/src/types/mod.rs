mod album;
mod filter;
mod genre;
mod history;
mod ids;
mod like;
mod playlist;
mod report;
mod song;
mod user;

pub use album::{Album, CreateAlbum, UpdateAlbum};
pub use filter::{
    criterion, AlbumFilter, Page, PlaylistFilter, SongFilter, UserFilter, DEFAULT_PAGE_SIZE,
    MAX_PAGE_SIZE,
};
pub use genre::Genre;
pub use history::HistoryEntry;
pub use ids::{prefixed_id, AlbumId, GenreId, PlaylistId, ReportId, SongId, UserId};
pub use like::{DataSource, LikeTarget, Likes};
pub use playlist::{
    ActivityAction, CreatePlaylist, Playlist, PlaylistActivity, UpdatePlaylist, Visibility,
};
pub use report::{CreateReport, Report, ReportStatus};
pub use song::{CreateSong, Song, SongSummary, UpdateSong};
pub use user::{CreateUser, PopularUser, UpdateUser, User, UserCredentials, UserSummary};
