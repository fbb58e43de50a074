/// Listening history API routes
use crate::{
    error::Result,
    extract::Json,
    middleware::AuthenticatedUser,
    response::ApiResponse,
    state::AppState,
    validation::{self, Validate},
};
use axum::extract::State;
use freetunes_core::{SongId, TunesError};
use freetunes_storage::{history, songs};
use serde::Deserialize;
use serde_json::json;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayRequest {
    pub song_id: String,
}

impl Validate for PlayRequest {
    fn validate(&self) -> Result<()> {
        validation::required("songId", &self.song_id)
    }
}

/// POST /history
/// Record that the caller played a song and bump its listen counter
pub async fn record_play(
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
    Json(req): Json<PlayRequest>,
) -> Result<ApiResponse> {
    req.validate()?;
    let pool = app_state.pool();
    let song_id = SongId::new(req.song_id);

    if songs::get_by_id(pool, &song_id).await?.is_none() {
        return Err(TunesError::not_found("Song not found").into());
    }

    history::record(pool, auth.user_id(), &song_id).await?;
    songs::increment_listened(pool, &song_id).await?;

    Ok(ApiResponse::message("History recorded").created())
}

/// GET /history
/// Most recently played songs of the caller
pub async fn list_history(
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
) -> Result<ApiResponse> {
    let history = history::recent(app_state.pool(), auth.user_id()).await?;
    Ok(ApiResponse::data(json!({ "history": history })))
}
