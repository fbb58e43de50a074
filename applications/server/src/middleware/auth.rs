/// Authentication middleware
use crate::{error::ServerError, services::AuthService, state::AppState};
use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use freetunes_core::UserId;
use std::sync::Arc;

/// Verified token subject, stored in request extensions
#[derive(Debug, Clone)]
pub struct Credentials(pub UserId);

/// Middleware that validates a Bearer token when one is sent
///
/// Requests without an `Authorization` header pass through untouched so
/// public routes keep working; an invalid token is always rejected.
pub async fn auth_middleware(
    State(auth_service): State<Arc<AuthService>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ServerError> {
    let Some(auth_header) = request.headers().get(axum::http::header::AUTHORIZATION) else {
        return Ok(next.run(request).await);
    };

    let token = auth_header
        .to_str()
        .ok()
        .and_then(|h| h.strip_prefix("Bearer "))
        .ok_or_else(|| ServerError::Auth("Missing bearer token".to_string()))?;

    let user_id = auth_service.verify_access_token(token).map_err(|e| {
        tracing::warn!("Token verification failed: {}", e);
        ServerError::Auth("Invalid token".to_string())
    })?;

    request.extensions_mut().insert(Credentials(user_id));

    Ok(next.run(request).await)
}

/// Extractor for routes that require a signed-in, verified user
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub UserId);

impl AuthenticatedUser {
    pub fn user_id(&self) -> &UserId {
        &self.0
    }
}

#[axum::async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = ServerError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Credentials(user_id) = parts
            .extensions
            .get::<Credentials>()
            .cloned()
            .ok_or_else(|| ServerError::Auth("Missing authentication".to_string()))?;

        let user = freetunes_storage::users::get_by_id(state.pool(), &user_id)
            .await?
            .ok_or_else(|| ServerError::Auth("User no longer exists".to_string()))?;

        if !user.is_active {
            return Err(ServerError::Auth("Please verify your account first".to_string()));
        }

        Ok(Self(user_id))
    }
}

/// Extractor for routes where signing in is optional
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<UserId>);

#[axum::async_trait]
impl<S> FromRequestParts<S> for MaybeUser
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(
            parts
                .extensions
                .get::<Credentials>()
                .map(|Credentials(id)| id.clone()),
        ))
    }
}
