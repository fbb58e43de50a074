/// Like toggles shared by albums, songs and playlists
use crate::{error::Result, response::ApiResponse, state::AppState};
use freetunes_core::{LikeTarget, UserId};
use serde_json::json;

pub(crate) async fn like(state: &AppState, user_id: &UserId, target: LikeTarget) -> Result<ApiResponse> {
    state.likes.add_like(user_id, &target).await?;
    tracing::info!(user = %user_id, target = %target.id(), "{} liked", target.label());

    Ok(ApiResponse::message(format!("{} liked", target.label())).created())
}

pub(crate) async fn unlike(state: &AppState, user_id: &UserId, target: LikeTarget) -> Result<ApiResponse> {
    state.likes.remove_like(user_id, &target).await?;

    Ok(ApiResponse::message(format!("{} unliked", target.label())))
}

/// `{likes: n}` with cache provenance
pub(crate) async fn count(state: &AppState, target: LikeTarget) -> Result<ApiResponse> {
    let likes = state.likes.get_likes(&target).await?;

    Ok(ApiResponse::data(json!({ "likes": likes.count() })).from_cache(likes.from_cache()))
}
