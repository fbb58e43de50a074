/// API route modules
pub mod albums;
pub mod authentications;
pub mod collaborations;
pub mod exports;
pub mod genres;
pub mod health;
pub mod history;
pub mod likes;
pub mod playlists;
pub mod reports;
pub mod songs;
pub mod uploads;
pub mod users;

use crate::{config::ServerSettings, middleware, state::AppState};
use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    sensitive_headers::SetSensitiveHeadersLayer,
    services::ServeDir,
    trace::{DefaultMakeSpan, TraceLayer},
};

/// Album covers
pub const ALBUM_COVER_LIMIT: usize = 512 * 1024;
/// Song audio files
pub const AUDIO_LIMIT: usize = 50 * 1024 * 1024;
/// Pictures and the remaining covers
pub const IMAGE_LIMIT: usize = 100 * 1024 * 1024;

/// Build the complete application router
pub fn router(app_state: AppState, settings: &ServerSettings) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health::health))
        // Authentications
        .route(
            "/authentications",
            post(authentications::login)
                .put(authentications::refresh)
                .delete(authentications::logout),
        )
        .route(
            "/authentications/verifications",
            post(authentications::request_verification),
        )
        .route(
            "/authentications/forgotpassword",
            post(authentications::forgot_password),
        )
        // Users
        .route("/users", post(users::register).get(users::search))
        .route("/users/popular", get(users::popular))
        .route("/users/me", get(users::me))
        .route("/users/followed", get(users::followed))
        .route("/users/:id", get(users::get_user).put(users::update_user))
        .route("/users/:id/verify", post(users::verify))
        .route("/users/:id/resetpassword", put(users::reset_password))
        .route("/users/:id/editemail", put(users::edit_email))
        .route(
            "/users/:id/follow",
            post(users::follow)
                .delete(users::unfollow)
                .get(users::follower_count),
        )
        .route(
            "/users/:id/pictures",
            post(users::upload_picture).layer(DefaultBodyLimit::max(IMAGE_LIMIT)),
        )
        // Albums
        .route("/albums", post(albums::create_album).get(albums::search))
        .route("/albums/popular", get(albums::popular))
        .route("/albums/liked", get(albums::liked))
        .route("/albums/me", get(albums::mine))
        .route("/albums/artist/:id", get(albums::by_artist))
        .route(
            "/albums/:id",
            get(albums::get_album)
                .put(albums::update_album)
                .delete(albums::delete_album),
        )
        .route(
            "/albums/:id/likes",
            post(albums::like).delete(albums::unlike).get(albums::likes),
        )
        .route(
            "/albums/:id/covers",
            post(albums::upload_cover).layer(DefaultBodyLimit::max(ALBUM_COVER_LIMIT)),
        )
        // Songs
        .route("/songs", post(songs::create_song).get(songs::search))
        .route("/songs/popular", get(songs::popular))
        .route("/songs/recent", get(songs::recent))
        .route("/songs/liked", get(songs::liked))
        .route("/songs/me", get(songs::mine))
        .route("/songs/me/singles", get(songs::my_singles))
        .route(
            "/songs/:id",
            get(songs::get_song)
                .put(songs::update_song)
                .delete(songs::delete_song),
        )
        .route(
            "/songs/:id/likes",
            post(songs::like).delete(songs::unlike).get(songs::likes),
        )
        .route(
            "/songs/:id/audios",
            post(songs::upload_audio).layer(DefaultBodyLimit::max(AUDIO_LIMIT)),
        )
        .route(
            "/songs/:id/covers",
            post(songs::upload_cover).layer(DefaultBodyLimit::max(IMAGE_LIMIT)),
        )
        // Playlists
        .route(
            "/playlists",
            post(playlists::create_playlist).get(playlists::list_playlists),
        )
        .route("/playlists/search", get(playlists::search))
        .route("/playlists/popular", get(playlists::popular))
        .route("/playlists/liked", get(playlists::liked))
        .route(
            "/playlists/:id",
            get(playlists::get_playlist)
                .put(playlists::update_playlist)
                .delete(playlists::delete_playlist),
        )
        .route(
            "/playlists/:id/likes",
            post(playlists::like)
                .delete(playlists::unlike)
                .get(playlists::likes),
        )
        .route(
            "/playlists/:id/covers",
            post(playlists::upload_cover).layer(DefaultBodyLimit::max(IMAGE_LIMIT)),
        )
        .route(
            "/playlists/:id/songs",
            post(playlists::add_song).delete(playlists::remove_song),
        )
        .route("/playlists/:id/activities", get(playlists::activities))
        // Collaborations, exports and the rest
        .route(
            "/collaborations",
            post(collaborations::add_collaborator).delete(collaborations::remove_collaborator),
        )
        .route("/exports/playlists/:id", post(exports::export_playlist))
        .route("/genres", get(genres::list_genres))
        .route(
            "/history",
            post(history::record_play).get(history::list_history),
        )
        .route("/reports", post(reports::create_report))
        .layer(axum::middleware::from_fn_with_state(
            Arc::clone(&app_state.auth_service),
            middleware::auth_middleware,
        ));

    let uploads = ServeDir::new(app_state.file_storage.base_path());

    Router::new()
        .merge(api_routes)
        .nest_service("/uploads", uploads)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::default().include_headers(true)),
        )
        .layer(SetSensitiveHeadersLayer::new([
            header::AUTHORIZATION,
            header::COOKIE,
            header::SET_COOKIE,
        ]))
        .layer(cors_layer(&settings.cors_origins))
        .with_state(app_state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}
