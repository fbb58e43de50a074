//! FreeTunes Server Library
//!
//! Music sharing REST API: accounts, albums, songs, playlists with
//! collaborators, likes, follows and listening history.
//!
//! This library exposes the router and its building blocks for testing.

pub mod api;
pub mod config;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod response;
pub mod services;
pub mod state;
pub mod validation;

// Re-export commonly used types for convenience
pub use api::router;
pub use config::ServerConfig;
pub use error::{Result, ServerError};
pub use response::ApiResponse;
pub use services::{auth::AuthService, file_storage::FileStorage};
pub use state::AppState;
