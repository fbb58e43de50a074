/// Playlists API routes
use crate::{
    api::{likes, uploads},
    error::Result,
    extract::{Json, Payload, Query},
    middleware::{AuthenticatedUser, MaybeUser},
    response::{with_fields, ApiResponse},
    services::file_storage::BUCKET_COVERS,
    state::AppState,
    validation::{self, Validate},
};
use axum::extract::{Multipart, Path, State};
use freetunes_core::{
    types::{CreatePlaylist, UpdatePlaylist},
    LikeTarget, Page, PlaylistFilter, PlaylistId, SongId, TunesError, Visibility,
};
use freetunes_storage::{activities, collaborations, playlists, songs};
use serde::Deserialize;
use serde_json::json;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistRequest {
    pub name: String,
    #[serde(default)]
    pub is_public: bool,
}

impl Validate for PlaylistRequest {
    fn validate(&self) -> Result<()> {
        validation::required("name", &self.name)?;
        validation::max_len("name", &self.name, 255)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistSongRequest {
    pub song_id: String,
}

impl Validate for PlaylistSongRequest {
    fn validate(&self) -> Result<()> {
        validation::required("songId", &self.song_id)
    }
}

/// POST /playlists
pub async fn create_playlist(
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
    Json(req): Json<PlaylistRequest>,
) -> Result<ApiResponse> {
    req.validate()?;

    let playlist_id = playlists::create(
        app_state.pool(),
        &CreatePlaylist {
            name: req.name.trim().to_string(),
            owner_id: auth.user_id().clone(),
            is_public: req.is_public,
        },
    )
    .await?;

    Ok(ApiResponse::data(json!({ "playlistId": playlist_id })).created())
}

/// GET /playlists
/// Playlists the caller owns or collaborates on
pub async fn list_playlists(
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
) -> Result<ApiResponse> {
    let playlists = playlists::get_user_playlists(app_state.pool(), auth.user_id()).await?;
    Ok(ApiResponse::data(json!({ "playlists": playlists })))
}

/// GET /playlists/search
/// Search public playlists by name or owner username
pub async fn search(
    State(app_state): State<AppState>,
    Query(filter): Query<PlaylistFilter>,
    Query(page): Query<Page>,
) -> Result<ApiResponse> {
    let playlists = playlists::search(app_state.pool(), &filter, page).await?;
    Ok(ApiResponse::data(json!({ "playlists": playlists })))
}

/// GET /playlists/popular
pub async fn popular(
    State(app_state): State<AppState>,
    Query(page): Query<Page>,
) -> Result<ApiResponse> {
    let playlists = playlists::popular(app_state.pool(), page).await?;
    Ok(ApiResponse::data(json!({ "playlists": playlists })))
}

/// GET /playlists/liked
pub async fn liked(State(app_state): State<AppState>, auth: AuthenticatedUser) -> Result<ApiResponse> {
    let playlists = playlists::liked_by(app_state.pool(), auth.user_id()).await?;
    Ok(ApiResponse::data(json!({ "playlists": playlists })))
}

/// GET /playlists/:id
/// Playlist with collaborators and songs
///
/// Public playlists need no token; private ones need the owner or a
/// collaborator.
pub async fn get_playlist(
    Path(id): Path<String>,
    State(app_state): State<AppState>,
    MaybeUser(viewer): MaybeUser,
) -> Result<ApiResponse> {
    let playlist_id = PlaylistId::new(id);
    let pool = app_state.pool();
    let playlist = playlists::resolve_read(pool, &playlist_id, viewer.as_ref()).await?;

    let collaborators = collaborations::get_collaborators(pool, &playlist_id).await?;
    let songs = songs::by_playlist(pool, &playlist_id).await?;

    let playlist = with_fields(
        playlist,
        json!({ "collaborators": collaborators, "songs": songs }),
    )?;
    Ok(ApiResponse::data(json!({ "playlist": playlist })))
}

/// PUT /playlists/:id
/// Rename or change visibility; owner only
pub async fn update_playlist(
    Path(id): Path<String>,
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
    payload: Payload,
) -> Result<ApiResponse> {
    let playlist_id = PlaylistId::new(id);
    playlists::resolve_ownership(app_state.pool(), &playlist_id, auth.user_id()).await?;
    let req: PlaylistRequest = payload.parse()?;
    req.validate()?;

    playlists::update(
        app_state.pool(),
        &playlist_id,
        &UpdatePlaylist {
            name: req.name.trim().to_string(),
            is_public: req.is_public,
        },
    )
    .await?;

    Ok(ApiResponse::message("Playlist updated"))
}

/// DELETE /playlists/:id
pub async fn delete_playlist(
    Path(id): Path<String>,
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
) -> Result<ApiResponse> {
    let playlist_id = PlaylistId::new(id);
    playlists::resolve_ownership(app_state.pool(), &playlist_id, auth.user_id()).await?;
    playlists::delete(app_state.pool(), &playlist_id).await?;

    tracing::info!(playlist = %playlist_id, "Playlist deleted");

    Ok(ApiResponse::message("Playlist deleted"))
}

/// POST /playlists/:id/likes
/// Only public playlists can be liked
pub async fn like(
    Path(id): Path<String>,
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
) -> Result<ApiResponse> {
    let playlist_id = PlaylistId::new(id);
    playlists::resolve_visibility(app_state.pool(), &playlist_id, Visibility::Public).await?;
    likes::like(&app_state, auth.user_id(), LikeTarget::Playlist(playlist_id)).await
}

/// DELETE /playlists/:id/likes
pub async fn unlike(
    Path(id): Path<String>,
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
) -> Result<ApiResponse> {
    likes::unlike(
        &app_state,
        auth.user_id(),
        LikeTarget::Playlist(PlaylistId::new(id)),
    )
    .await
}

/// GET /playlists/:id/likes
pub async fn likes(
    Path(id): Path<String>,
    State(app_state): State<AppState>,
) -> Result<ApiResponse> {
    let playlist_id = PlaylistId::new(id);
    if playlists::get_by_id(app_state.pool(), &playlist_id).await?.is_none() {
        return Err(TunesError::not_found("Playlist not found").into());
    }
    likes::count(&app_state, LikeTarget::Playlist(playlist_id)).await
}

/// POST /playlists/:id/covers
pub async fn upload_cover(
    Path(id): Path<String>,
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
    mut multipart: Multipart,
) -> Result<ApiResponse> {
    let playlist_id = PlaylistId::new(id);
    playlists::resolve_ownership(app_state.pool(), &playlist_id, auth.user_id()).await?;

    let upload = uploads::read_image(&mut multipart, "cover").await?;
    let location = app_state
        .file_storage
        .write_file(BUCKET_COVERS, &upload.filename, &upload.data)
        .await?;
    playlists::set_cover(app_state.pool(), &playlist_id, &location).await?;

    Ok(ApiResponse::data(json!({ "fileLocation": location }))
        .with_message("Cover uploaded")
        .created())
}

/// POST /playlists/:id/songs
/// Add a song; owner or collaborator
pub async fn add_song(
    Path(id): Path<String>,
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
    payload: Payload,
) -> Result<ApiResponse> {
    let playlist_id = PlaylistId::new(id);
    let pool = app_state.pool();
    playlists::resolve_access(pool, &playlist_id, auth.user_id()).await?;
    let req: PlaylistSongRequest = payload.parse()?;
    req.validate()?;

    let song_id = SongId::new(req.song_id);
    if songs::get_by_id(pool, &song_id).await?.is_none() {
        return Err(TunesError::not_found("Song not found").into());
    }

    songs::add_to_playlist(pool, &playlist_id, &song_id, auth.user_id()).await?;

    Ok(ApiResponse::message("Song added to playlist").created())
}

/// DELETE /playlists/:id/songs
/// Remove a song; owner or collaborator
pub async fn remove_song(
    Path(id): Path<String>,
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
    payload: Payload,
) -> Result<ApiResponse> {
    let playlist_id = PlaylistId::new(id);
    let pool = app_state.pool();
    playlists::resolve_access(pool, &playlist_id, auth.user_id()).await?;
    let req: PlaylistSongRequest = payload.parse()?;
    req.validate()?;

    let song_id = SongId::new(req.song_id);
    songs::remove_from_playlist(pool, &playlist_id, &song_id, auth.user_id()).await?;

    Ok(ApiResponse::message("Song removed from playlist"))
}

/// GET /playlists/:id/activities
pub async fn activities(
    Path(id): Path<String>,
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
) -> Result<ApiResponse> {
    let playlist_id = PlaylistId::new(id);
    let pool = app_state.pool();
    playlists::resolve_access(pool, &playlist_id, auth.user_id()).await?;

    let activities = activities::get_by_playlist(pool, &playlist_id).await?;

    Ok(ApiResponse::data(json!({
        "playlistId": playlist_id,
        "activities": activities,
    })))
}
