/// Server error types
use axum::{
    extract::{
        multipart::MultipartError,
        rejection::{BytesRejection, JsonRejection, QueryRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use freetunes_core::{ErrorKind, TunesError};
use serde_json::json;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ServerError>;

#[derive(Debug, Error)]
pub enum ServerError {
    /// Missing or rejected credentials
    #[error("{0}")]
    Auth(String),

    /// Payload failed validation
    #[error("{0}")]
    BadRequest(String),

    /// Domain failure raised by the storage layer or a service
    #[error(transparent)]
    Domain(#[from] TunesError),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    #[error("Bcrypt error: {0}")]
    Bcrypt(#[from] bcrypt::BcryptError),

    #[error("Multipart error: {0}")]
    Multipart(#[from] MultipartError),

    /// Body could not be read (too large, aborted upload)
    #[error("{0}")]
    Body(#[from] BytesRejection),
}

impl From<JsonRejection> for ServerError {
    fn from(rejection: JsonRejection) -> Self {
        ServerError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ServerError {
    fn from(rejection: QueryRejection) -> Self {
        ServerError::BadRequest(rejection.body_text())
    }
}

impl From<freetunes_storage::StorageError> for ServerError {
    fn from(err: freetunes_storage::StorageError) -> Self {
        ServerError::Domain(err.into())
    }
}

impl ServerError {
    /// HTTP status for this error
    pub fn status(&self) -> StatusCode {
        match self {
            ServerError::Auth(_) | ServerError::Jwt(_) => StatusCode::UNAUTHORIZED,
            ServerError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::Domain(err) => match err.kind() {
                ErrorKind::Invariant => StatusCode::BAD_REQUEST,
                ErrorKind::Authentication => StatusCode::UNAUTHORIZED,
                ErrorKind::Forbidden => StatusCode::FORBIDDEN,
                ErrorKind::NotFound => StatusCode::NOT_FOUND,
                ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ServerError::Multipart(err) => err.status(),
            ServerError::Body(err) => err.status(),
            ServerError::Internal(_)
            | ServerError::Config(_)
            | ServerError::Io(_)
            | ServerError::Bcrypt(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message sent to the client for expected failures
    fn client_message(&self) -> String {
        match self {
            ServerError::Jwt(_) => "Invalid token".to_string(),
            ServerError::Multipart(err) => err.body_text(),
            ServerError::Body(err) => err.body_text(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();

        let body = if status.is_server_error() {
            tracing::error!(error = ?self, "Request failed");
            json!({
                "status": "error",
                "message": "internal failure",
            })
        } else {
            tracing::warn!(status = status.as_u16(), "{}", self);
            json!({
                "status": "fail",
                "message": self.client_message(),
            })
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_of(err: ServerError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn domain_kinds_map_to_statuses() {
        let cases = [
            (TunesError::invariant("dup"), StatusCode::BAD_REQUEST),
            (TunesError::not_found("gone"), StatusCode::NOT_FOUND),
            (TunesError::forbidden("no"), StatusCode::FORBIDDEN),
            (TunesError::authentication("who"), StatusCode::UNAUTHORIZED),
        ];

        for (err, expected) in cases {
            let message = err.to_string();
            let (status, body) = body_of(ServerError::from(err)).await;
            assert_eq!(status, expected);
            assert_eq!(body["status"], "fail");
            assert_eq!(body["message"], message);
        }
    }

    #[tokio::test]
    async fn internal_failures_hide_details() {
        let err = ServerError::Domain(TunesError::Database("disk I/O error".into()));
        let (status, body) = body_of(err).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["status"], "error");
        assert_eq!(body["message"], "internal failure");
    }

    #[tokio::test]
    async fn validation_errors_are_bad_requests() {
        let (status, body) = body_of(ServerError::BadRequest("\"name\" is required".into())).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "\"name\" is required");
    }
}
