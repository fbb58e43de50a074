/// Albums API routes
use crate::{
    api::{likes, uploads},
    error::Result,
    extract::{Json, Payload, Query},
    middleware::AuthenticatedUser,
    response::{with_fields, ApiResponse},
    services::file_storage::BUCKET_COVERS,
    state::AppState,
    validation::{self, Validate},
};
use axum::extract::{Multipart, Path, State};
use freetunes_core::{
    types::{CreateAlbum, UpdateAlbum},
    AlbumFilter, AlbumId, LikeTarget, Page, TunesError, UserId,
};
use freetunes_storage::{albums, songs};
use serde::Deserialize;
use serde_json::json;

#[derive(Debug, Deserialize)]
pub struct AlbumRequest {
    pub name: String,
    pub year: i32,
}

impl Validate for AlbumRequest {
    fn validate(&self) -> Result<()> {
        validation::required("name", &self.name)?;
        validation::max_len("name", &self.name, 255)?;
        validation::year("year", self.year)
    }
}

async fn existing_album(app_state: &AppState, album_id: &AlbumId) -> Result<()> {
    if albums::get_by_id(app_state.pool(), album_id).await?.is_none() {
        return Err(TunesError::not_found("Album not found").into());
    }
    Ok(())
}

/// POST /albums
pub async fn create_album(
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
    Json(req): Json<AlbumRequest>,
) -> Result<ApiResponse> {
    req.validate()?;

    let album_id = albums::create(
        app_state.pool(),
        &CreateAlbum {
            name: req.name.trim().to_string(),
            year: req.year,
            artist_id: auth.user_id().clone(),
        },
    )
    .await?;

    Ok(ApiResponse::data(json!({ "albumId": album_id })).created())
}

/// GET /albums
/// Search albums by name and artist
pub async fn search(
    State(app_state): State<AppState>,
    Query(filter): Query<AlbumFilter>,
    Query(page): Query<Page>,
) -> Result<ApiResponse> {
    let albums = albums::search(app_state.pool(), &filter, page).await?;
    Ok(ApiResponse::data(json!({ "albums": albums })))
}

/// GET /albums/popular
pub async fn popular(
    State(app_state): State<AppState>,
    Query(page): Query<Page>,
) -> Result<ApiResponse> {
    let albums = albums::popular(app_state.pool(), page).await?;
    Ok(ApiResponse::data(json!({ "albums": albums })))
}

/// GET /albums/liked
pub async fn liked(State(app_state): State<AppState>, auth: AuthenticatedUser) -> Result<ApiResponse> {
    let albums = albums::liked_by(app_state.pool(), auth.user_id()).await?;
    Ok(ApiResponse::data(json!({ "albums": albums })))
}

/// GET /albums/me
pub async fn mine(State(app_state): State<AppState>, auth: AuthenticatedUser) -> Result<ApiResponse> {
    let albums = albums::by_artist(app_state.pool(), auth.user_id()).await?;
    Ok(ApiResponse::data(json!({ "albums": albums })))
}

/// GET /albums/artist/:id
pub async fn by_artist(
    Path(id): Path<String>,
    State(app_state): State<AppState>,
) -> Result<ApiResponse> {
    let albums = albums::public_by_artist(app_state.pool(), &UserId::new(id)).await?;
    Ok(ApiResponse::data(json!({ "albums": albums })))
}

/// GET /albums/:id
/// Album with its liker ids and songs
pub async fn get_album(
    Path(id): Path<String>,
    State(app_state): State<AppState>,
) -> Result<ApiResponse> {
    let album_id = AlbumId::new(id);
    let album = albums::get_by_id(app_state.pool(), &album_id)
        .await?
        .ok_or_else(|| TunesError::not_found("Album not found"))?;

    let likes = app_state
        .likes
        .get_likes(&LikeTarget::Album(album_id.clone()))
        .await?;
    let songs = songs::by_album(app_state.pool(), &album_id).await?;

    let album = with_fields(album, json!({ "likes": likes.user_ids, "songs": songs }))?;
    Ok(ApiResponse::data(json!({ "album": album })))
}

/// PUT /albums/:id
pub async fn update_album(
    Path(id): Path<String>,
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
    payload: Payload,
) -> Result<ApiResponse> {
    let album_id = AlbumId::new(id);
    albums::verify_owner(app_state.pool(), &album_id, auth.user_id()).await?;
    let req: AlbumRequest = payload.parse()?;
    req.validate()?;

    albums::update(
        app_state.pool(),
        &album_id,
        &UpdateAlbum {
            name: req.name.trim().to_string(),
            year: req.year,
        },
    )
    .await?;

    Ok(ApiResponse::message("Album updated"))
}

/// DELETE /albums/:id
/// Delete an album together with its songs
pub async fn delete_album(
    Path(id): Path<String>,
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
) -> Result<ApiResponse> {
    let album_id = AlbumId::new(id);
    albums::verify_owner(app_state.pool(), &album_id, auth.user_id()).await?;
    albums::delete(app_state.pool(), &album_id).await?;

    tracing::info!(album = %album_id, "Album deleted");

    Ok(ApiResponse::message("Album deleted"))
}

/// POST /albums/:id/likes
pub async fn like(
    Path(id): Path<String>,
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
) -> Result<ApiResponse> {
    let album_id = AlbumId::new(id);
    existing_album(&app_state, &album_id).await?;
    likes::like(&app_state, auth.user_id(), LikeTarget::Album(album_id)).await
}

/// DELETE /albums/:id/likes
pub async fn unlike(
    Path(id): Path<String>,
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
) -> Result<ApiResponse> {
    likes::unlike(&app_state, auth.user_id(), LikeTarget::Album(AlbumId::new(id))).await
}

/// GET /albums/:id/likes
pub async fn likes(
    Path(id): Path<String>,
    State(app_state): State<AppState>,
) -> Result<ApiResponse> {
    let album_id = AlbumId::new(id);
    existing_album(&app_state, &album_id).await?;
    likes::count(&app_state, LikeTarget::Album(album_id)).await
}

/// POST /albums/:id/covers
pub async fn upload_cover(
    Path(id): Path<String>,
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
    mut multipart: Multipart,
) -> Result<ApiResponse> {
    let album_id = AlbumId::new(id);
    albums::verify_owner(app_state.pool(), &album_id, auth.user_id()).await?;

    let upload = uploads::read_image(&mut multipart, "cover").await?;
    let location = app_state
        .file_storage
        .write_file(BUCKET_COVERS, &upload.filename, &upload.data)
        .await?;
    albums::set_cover(app_state.pool(), &album_id, &location).await?;

    Ok(ApiResponse::data(json!({ "fileLocation": location }))
        .with_message("Cover uploaded")
        .created())
}
