/// Genres API routes
use crate::{error::Result, response::ApiResponse, state::AppState};
use axum::extract::State;
use freetunes_storage::genres;
use serde_json::json;

/// GET /genres
pub async fn list_genres(State(app_state): State<AppState>) -> Result<ApiResponse> {
    let genres = genres::get_all(app_state.pool()).await?;
    Ok(ApiResponse::data(json!({ "genres": genres })))
}
