/// Song reports API routes
use crate::{
    error::Result,
    extract::Json,
    middleware::AuthenticatedUser,
    response::ApiResponse,
    state::AppState,
    validation::{self, Validate},
};
use axum::extract::State;
use freetunes_core::{types::CreateReport, SongId, TunesError};
use freetunes_storage::{reports, songs};
use serde::Deserialize;
use serde_json::json;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRequest {
    pub song_id: String,
    pub reason: String,
    #[serde(default)]
    pub detail: String,
}

impl Validate for ReportRequest {
    fn validate(&self) -> Result<()> {
        validation::required("songId", &self.song_id)?;
        validation::required("reason", &self.reason)?;
        validation::max_len("reason", &self.reason, 255)?;
        validation::max_len("detail", &self.detail, 2000)
    }
}

/// POST /reports
/// Flag a song for moderation
pub async fn create_report(
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
    Json(req): Json<ReportRequest>,
) -> Result<ApiResponse> {
    req.validate()?;
    let song_id = SongId::new(req.song_id);

    if songs::get_by_id(app_state.pool(), &song_id).await?.is_none() {
        return Err(TunesError::not_found("Song not found").into());
    }

    let report_id = reports::create(
        app_state.pool(),
        &CreateReport {
            user_id: auth.user_id().clone(),
            song_id,
            reason: req.reason.trim().to_string(),
            detail: req.detail,
        },
    )
    .await?;

    tracing::info!(report = %report_id, "Song reported");

    Ok(ApiResponse::data(json!({ "reportId": report_id })).created())
}
