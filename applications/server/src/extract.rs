/// Request extractors that reject with the JSON error envelope
///
/// axum's own `Json` and `Query` answer malformed input with a plain-text
/// body. These wrappers route every rejection through `ServerError`.
use crate::error::{Result, ServerError};
use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, FromRequestParts, Request},
    http::request::Parts,
};
use serde::de::DeserializeOwned;

/// JSON body, deserialized before the handler runs
#[derive(Debug, Clone, Copy, Default)]
pub struct Json<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for Json<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ServerError;

    async fn from_request(req: Request, state: &S) -> Result<Self> {
        let axum::Json(value) = axum::Json::<T>::from_request(req, state).await?;
        Ok(Self(value))
    }
}

/// Query string, deserialized before the handler runs
#[derive(Debug, Clone, Copy, Default)]
pub struct Query<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for Query<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ServerError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self> {
        let axum::extract::Query(value) =
            axum::extract::Query::<T>::from_request_parts(parts, state).await?;
        Ok(Self(value))
    }
}

/// Raw JSON body, deserialized by the handler once the caller is authorized
///
/// Ownership routes take this so that a stranger gets 403 whatever they send.
#[derive(Debug, Clone)]
pub struct Payload(Bytes);

impl Payload {
    pub fn parse<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_slice(&self.0)
            .map_err(|err| ServerError::BadRequest(format!("Invalid request payload: {err}")))
    }
}

#[async_trait]
impl<S> FromRequest<S> for Payload
where
    S: Send + Sync,
{
    type Rejection = ServerError;

    async fn from_request(req: Request, state: &S) -> Result<Self> {
        Ok(Self(Bytes::from_request(req, state).await?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Album {
        name: String,
        year: i32,
    }

    #[test]
    fn payload_parses_valid_json() {
        let payload = Payload(Bytes::from_static(br#"{"name":"Blue","year":2001}"#));
        let album: Album = payload.parse().unwrap();

        assert_eq!(album.name, "Blue");
        assert_eq!(album.year, 2001);
    }

    #[test]
    fn payload_type_mismatch_is_bad_request() {
        let payload = Payload(Bytes::from_static(br#"{"name":"Blue","year":"abc"}"#));
        let err = payload.parse::<Album>().unwrap_err();

        assert!(matches!(err, ServerError::BadRequest(_)));
    }
}
