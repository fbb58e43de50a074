/// Success envelope shared by all handlers
use axum::{
    http::{HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use freetunes_core::TunesError;
use serde::Serialize;
use serde_json::{Map, Value};

/// `X-Data-Source` response header marking cache-served reads
pub const DATA_SOURCE_HEADER: HeaderName = HeaderName::from_static("x-data-source");

/// `{status: "success", message?, data?}`
#[derive(Debug, Serialize)]
pub struct Envelope {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
}

/// Successful response with its HTTP status and optional extra header
#[derive(Debug)]
pub struct ApiResponse {
    status: StatusCode,
    envelope: Envelope,
    data_source: Option<&'static str>,
}

impl ApiResponse {
    /// 200 with a data payload
    pub fn data(data: Value) -> Self {
        Self {
            status: StatusCode::OK,
            envelope: Envelope {
                status: "success",
                message: None,
                data: Some(data),
            },
            data_source: None,
        }
    }

    /// 200 with only a message
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::OK,
            envelope: Envelope {
                status: "success",
                message: Some(message.into()),
                data: None,
            },
            data_source: None,
        }
    }

    /// 201 Created
    pub fn created(self) -> Self {
        self.with_status(StatusCode::CREATED)
    }

    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.envelope.message = Some(message.into());
        self
    }

    /// Mark the payload as served from the cache
    pub fn from_cache(mut self, cached: bool) -> Self {
        self.data_source = cached.then_some("cache");
        self
    }
}

impl IntoResponse for ApiResponse {
    fn into_response(self) -> Response {
        let mut response = (self.status, Json(self.envelope)).into_response();
        if let Some(source) = self.data_source {
            response
                .headers_mut()
                .insert(DATA_SOURCE_HEADER, HeaderValue::from_static(source));
        }
        response
    }
}

/// Serialize `base` and add the fields of the `extra` object to it
pub fn with_fields(base: impl Serialize, extra: Value) -> Result<Value, TunesError> {
    let mut object = match serde_json::to_value(base)? {
        Value::Object(map) => map,
        other => {
            let mut map = Map::new();
            map.insert("value".to_string(), other);
            map
        }
    };
    if let Value::Object(fields) = extra {
        object.extend(fields);
    }
    Ok(Value::Object(object))
}
