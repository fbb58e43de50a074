/// Collaborations API routes
use crate::{
    error::Result,
    extract::Json,
    middleware::AuthenticatedUser,
    response::ApiResponse,
    state::AppState,
    validation::{self, Validate},
};
use axum::extract::State;
use freetunes_core::{PlaylistId, TunesError, UserId};
use freetunes_storage::{collaborations, playlists, users};
use serde::Deserialize;
use serde_json::json;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollaborationRequest {
    pub playlist_id: String,
    pub user_id: String,
}

impl Validate for CollaborationRequest {
    fn validate(&self) -> Result<()> {
        validation::required("playlistId", &self.playlist_id)?;
        validation::required("userId", &self.user_id)
    }
}

/// POST /collaborations
/// Share a playlist with another user; owner only
pub async fn add_collaborator(
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
    Json(req): Json<CollaborationRequest>,
) -> Result<ApiResponse> {
    req.validate()?;
    let pool = app_state.pool();
    let playlist_id = PlaylistId::new(req.playlist_id);
    let user_id = UserId::new(req.user_id);

    playlists::resolve_ownership(pool, &playlist_id, auth.user_id()).await?;
    if users::get_by_id(pool, &user_id).await?.is_none() {
        return Err(TunesError::not_found("User not found").into());
    }

    let collaboration_id = collaborations::add(pool, &playlist_id, &user_id).await?;

    tracing::info!(playlist = %playlist_id, user = %user_id, "Collaborator added");

    Ok(ApiResponse::data(json!({ "collaborationId": collaboration_id })).created())
}

/// DELETE /collaborations
pub async fn remove_collaborator(
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
    Json(req): Json<CollaborationRequest>,
) -> Result<ApiResponse> {
    req.validate()?;
    let pool = app_state.pool();
    let playlist_id = PlaylistId::new(req.playlist_id);

    playlists::resolve_ownership(pool, &playlist_id, auth.user_id()).await?;
    collaborations::remove(pool, &playlist_id, &UserId::new(req.user_id)).await?;

    Ok(ApiResponse::message("Collaborator removed"))
}
