//! Response building and serialization.
//!
//! # Responsibilities
//! - `ApiResponse`: what handlers and fault resolvers produce (status + JSON message)
//! - `ResponseEnvelope`: the wire shape (status, serialized body, headers)
//! - Merge default cross-origin headers with route and response headers
//!
//! # Design Decisions
//! - Bodies are always JSON-serialized, including plain string messages
//! - Header precedence: defaults < route headers < response headers

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Headers every response carries unless overridden.
pub fn default_headers() -> BTreeMap<String, String> {
    BTreeMap::from([
        ("Access-Control-Allow-Origin".to_string(), "*".to_string()),
        ("Access-Control-Allow-Credentials".to_string(), "true".to_string()),
    ])
}

/// A response before serialization.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub message: Value,
    pub headers: BTreeMap<String, String>,
}

impl ApiResponse {
    pub fn new(message: impl Into<Value>, status: u16) -> Self {
        Self {
            status,
            message: message.into(),
            headers: BTreeMap::new(),
        }
    }

    /// 200 with the given message.
    pub fn ok(message: impl Into<Value>) -> Self {
        Self::new(message, 200)
    }

    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Serialize, layering `defaults`, then `route_headers`, then this response's headers.
    pub fn into_envelope(
        self,
        defaults: &BTreeMap<String, String>,
        route_headers: &BTreeMap<String, String>,
    ) -> ResponseEnvelope {
        let mut headers = defaults.clone();
        headers.extend(route_headers.iter().map(|(k, v)| (k.clone(), v.clone())));
        headers.extend(self.headers);

        ResponseEnvelope {
            status_code: self.status,
            body: self.message.to_string(),
            headers,
        }
    }
}

/// Outbound response in wire shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseEnvelope {
    pub status_code: u16,
    pub body: String,
    pub headers: BTreeMap<String, String>,
}

impl ResponseEnvelope {
    /// Body parsed back into JSON.
    pub fn json(&self) -> Result<Value, serde_json::Error> {
        serde_json::from_str(&self.body)
    }
}

/// Copy `headers` onto an outgoing header map, dropping names or values
/// that are not valid HTTP.
pub fn insert_headers(target: &mut axum::http::HeaderMap, headers: &BTreeMap<String, String>) {
    use axum::http::{HeaderName, HeaderValue};

    for (key, value) in headers {
        match (HeaderName::try_from(key.as_str()), HeaderValue::from_str(value)) {
            (Ok(name), Ok(value)) => {
                target.insert(name, value);
            }
            _ => tracing::warn!(header = %key, "Dropping invalid response header"),
        }
    }
}

impl axum::response::IntoResponse for ResponseEnvelope {
    fn into_response(self) -> axum::response::Response {
        use axum::http::{HeaderValue, StatusCode};

        let status =
            StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        // 204 and 304 must not carry a body.
        let mut response = if status == StatusCode::NO_CONTENT || status == StatusCode::NOT_MODIFIED {
            status.into_response()
        } else {
            let mut response = (status, self.body).into_response();
            response.headers_mut().insert(
                axum::http::header::CONTENT_TYPE,
                HeaderValue::from_static("application/json"),
            );
            response
        };
        insert_headers(response.headers_mut(), &self.headers);
        response
    }
}
