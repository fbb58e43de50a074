/// Songs API routes
use crate::{
    api::{likes, uploads},
    error::Result,
    extract::{Json, Payload, Query},
    middleware::AuthenticatedUser,
    response::{with_fields, ApiResponse},
    services::file_storage::{BUCKET_AUDIOS, BUCKET_COVERS},
    state::AppState,
    validation::{self, Validate},
};
use axum::extract::{Multipart, Path, State};
use freetunes_core::{
    types::{CreateSong, UpdateSong},
    AlbumId, GenreId, LikeTarget, Page, SongFilter, SongId, TunesError, UserId,
};
use freetunes_storage::{albums, genres, songs};
use serde::Deserialize;
use serde_json::json;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SongRequest {
    pub title: String,
    pub year: i32,
    pub genre: String,
    /// Length in seconds
    pub duration: i32,
    pub album_id: Option<String>,
}

impl Validate for SongRequest {
    fn validate(&self) -> Result<()> {
        validation::required("title", &self.title)?;
        validation::max_len("title", &self.title, 255)?;
        validation::year("year", self.year)?;
        validation::required("genre", &self.genre)?;
        validation::positive("duration", self.duration)
    }
}

/// Resolved references of a song payload
struct SongReferences {
    genre_id: GenreId,
    album_id: Option<AlbumId>,
}

/// The genre must exist and an album, when given, must belong to the caller
async fn resolve_references(
    app_state: &AppState,
    req: &SongRequest,
    artist_id: &UserId,
) -> Result<SongReferences> {
    let genre_id = GenreId::new(req.genre.trim());
    if genres::get_by_id(app_state.pool(), &genre_id).await?.is_none() {
        return Err(TunesError::not_found("Genre not found").into());
    }

    let album_id = match req.album_id.as_deref().map(str::trim) {
        Some(id) if !id.is_empty() => {
            let album_id = AlbumId::new(id);
            albums::verify_owner(app_state.pool(), &album_id, artist_id).await?;
            Some(album_id)
        }
        _ => None,
    };

    Ok(SongReferences { genre_id, album_id })
}

async fn existing_song(app_state: &AppState, song_id: &SongId) -> Result<()> {
    if songs::get_by_id(app_state.pool(), song_id).await?.is_none() {
        return Err(TunesError::not_found("Song not found").into());
    }
    Ok(())
}

/// POST /songs
/// Publish a song; the caller becomes its artist
pub async fn create_song(
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
    Json(req): Json<SongRequest>,
) -> Result<ApiResponse> {
    req.validate()?;
    let references = resolve_references(&app_state, &req, auth.user_id()).await?;

    let song_id = songs::create(
        app_state.pool(),
        &CreateSong {
            title: req.title.trim().to_string(),
            year: req.year,
            genre_id: references.genre_id,
            duration: req.duration,
            album_id: references.album_id,
            artist_id: auth.user_id().clone(),
        },
    )
    .await?;

    Ok(ApiResponse::data(json!({ "songId": song_id })).created())
}

/// GET /songs
/// Search songs by title, artist and genre
pub async fn search(
    State(app_state): State<AppState>,
    Query(filter): Query<SongFilter>,
    Query(page): Query<Page>,
) -> Result<ApiResponse> {
    let songs = songs::search(app_state.pool(), &filter, page).await?;
    Ok(ApiResponse::data(json!({ "songs": songs })))
}

/// GET /songs/popular
/// Most listened songs
pub async fn popular(
    State(app_state): State<AppState>,
    Query(page): Query<Page>,
) -> Result<ApiResponse> {
    let songs = songs::popular(app_state.pool(), page).await?;
    Ok(ApiResponse::data(json!({ "songs": songs })))
}

/// GET /songs/recent
pub async fn recent(
    State(app_state): State<AppState>,
    Query(page): Query<Page>,
) -> Result<ApiResponse> {
    let songs = songs::recent(app_state.pool(), page).await?;
    Ok(ApiResponse::data(json!({ "songs": songs })))
}

/// GET /songs/liked
pub async fn liked(State(app_state): State<AppState>, auth: AuthenticatedUser) -> Result<ApiResponse> {
    let songs = songs::liked_by(app_state.pool(), auth.user_id()).await?;
    Ok(ApiResponse::data(json!({ "songs": songs })))
}

/// GET /songs/me
pub async fn mine(State(app_state): State<AppState>, auth: AuthenticatedUser) -> Result<ApiResponse> {
    let songs = songs::by_artist(app_state.pool(), auth.user_id()).await?;
    Ok(ApiResponse::data(json!({ "songs": songs })))
}

/// GET /songs/me/singles
/// Caller's songs that belong to no album
pub async fn my_singles(
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
) -> Result<ApiResponse> {
    let songs = songs::singles_by_artist(app_state.pool(), auth.user_id()).await?;
    Ok(ApiResponse::data(json!({ "songs": songs })))
}

/// GET /songs/:id
pub async fn get_song(
    Path(id): Path<String>,
    State(app_state): State<AppState>,
) -> Result<ApiResponse> {
    let song_id = SongId::new(id);
    let song = songs::get_by_id(app_state.pool(), &song_id)
        .await?
        .ok_or_else(|| TunesError::not_found("Song not found"))?;

    let likes = app_state.likes.get_likes(&LikeTarget::Song(song_id)).await?;

    let song = with_fields(song, json!({ "likes": likes.user_ids }))?;
    Ok(ApiResponse::data(json!({ "song": song })))
}

/// PUT /songs/:id
pub async fn update_song(
    Path(id): Path<String>,
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
    payload: Payload,
) -> Result<ApiResponse> {
    let song_id = SongId::new(id);
    songs::verify_owner(app_state.pool(), &song_id, auth.user_id()).await?;
    let req: SongRequest = payload.parse()?;
    req.validate()?;
    let references = resolve_references(&app_state, &req, auth.user_id()).await?;

    songs::update(
        app_state.pool(),
        &song_id,
        &UpdateSong {
            title: req.title.trim().to_string(),
            year: req.year,
            genre_id: references.genre_id,
            duration: req.duration,
            album_id: references.album_id,
        },
    )
    .await?;

    Ok(ApiResponse::message("Song updated"))
}

/// DELETE /songs/:id
/// Hide a song from every listing; the row is kept
pub async fn delete_song(
    Path(id): Path<String>,
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
) -> Result<ApiResponse> {
    let song_id = SongId::new(id);
    songs::verify_owner(app_state.pool(), &song_id, auth.user_id()).await?;
    songs::remove(app_state.pool(), &song_id).await?;

    tracing::info!(song = %song_id, "Song removed");

    Ok(ApiResponse::message("Song deleted"))
}

/// POST /songs/:id/likes
pub async fn like(
    Path(id): Path<String>,
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
) -> Result<ApiResponse> {
    let song_id = SongId::new(id);
    existing_song(&app_state, &song_id).await?;
    likes::like(&app_state, auth.user_id(), LikeTarget::Song(song_id)).await
}

/// DELETE /songs/:id/likes
pub async fn unlike(
    Path(id): Path<String>,
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
) -> Result<ApiResponse> {
    likes::unlike(&app_state, auth.user_id(), LikeTarget::Song(SongId::new(id))).await
}

/// GET /songs/:id/likes
pub async fn likes(
    Path(id): Path<String>,
    State(app_state): State<AppState>,
) -> Result<ApiResponse> {
    let song_id = SongId::new(id);
    existing_song(&app_state, &song_id).await?;
    likes::count(&app_state, LikeTarget::Song(song_id)).await
}

/// POST /songs/:id/audios
pub async fn upload_audio(
    Path(id): Path<String>,
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
    mut multipart: Multipart,
) -> Result<ApiResponse> {
    let song_id = SongId::new(id);
    songs::verify_owner(app_state.pool(), &song_id, auth.user_id()).await?;

    let upload = uploads::read_audio(&mut multipart, "audio").await?;
    let location = app_state
        .file_storage
        .write_file(BUCKET_AUDIOS, &upload.filename, &upload.data)
        .await?;
    songs::set_audio(app_state.pool(), &song_id, &location).await?;

    Ok(ApiResponse::data(json!({ "fileLocation": location }))
        .with_message("Audio uploaded")
        .created())
}

/// POST /songs/:id/covers
pub async fn upload_cover(
    Path(id): Path<String>,
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
    mut multipart: Multipart,
) -> Result<ApiResponse> {
    let song_id = SongId::new(id);
    songs::verify_owner(app_state.pool(), &song_id, auth.user_id()).await?;

    let upload = uploads::read_image(&mut multipart, "cover").await?;
    let location = app_state
        .file_storage
        .write_file(BUCKET_COVERS, &upload.filename, &upload.data)
        .await?;
    songs::set_cover(app_state.pool(), &song_id, &location).await?;

    Ok(ApiResponse::data(json!({ "fileLocation": location }))
        .with_message("Cover uploaded")
        .created())
}
