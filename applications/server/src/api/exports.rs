/// Export API routes
use crate::{
    error::Result,
    extract::Payload,
    middleware::AuthenticatedUser,
    response::ApiResponse,
    services::producer,
    state::AppState,
    validation::{self, Validate},
};
use axum::extract::{Path, State};
use freetunes_core::PlaylistId;
use freetunes_storage::playlists;
use serde::Deserialize;
use serde_json::json;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportRequest {
    pub target_email: String,
}

impl Validate for ExportRequest {
    fn validate(&self) -> Result<()> {
        validation::email("targetEmail", &self.target_email)
    }
}

/// POST /exports/playlists/:id
/// Queue a playlist export to be mailed to `targetEmail`
pub async fn export_playlist(
    Path(id): Path<String>,
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
    payload: Payload,
) -> Result<ApiResponse> {
    let playlist_id = PlaylistId::new(id);
    playlists::resolve_access(app_state.pool(), &playlist_id, auth.user_id()).await?;
    let req: ExportRequest = payload.parse()?;
    req.validate()?;

    producer::publish(
        &app_state.producer,
        producer::ROUTE_EXPORT_PLAYLIST,
        json!({ "playlistId": playlist_id, "targetEmail": req.target_email.trim() }),
    );

    Ok(ApiResponse::message("Your request is in queue").created())
}
