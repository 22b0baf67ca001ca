//! Handler abstraction bound to each route.

use std::future::Future;

use futures_util::future::BoxFuture;
use serde::Serialize;
use serde_json::Value;

use crate::dispatch::fault::Fault;
use crate::http::request::RequestEnvelope;
use crate::http::response::ApiResponse;

/// What a handler returns on success.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// Wrapped as a 200 JSON response.
    Value(Value),
    /// A response the handler built itself, status included.
    Response(ApiResponse),
}

impl Reply {
    /// Serialize any value into a reply.
    pub fn json<T: Serialize>(value: &T) -> Result<Reply, Fault> {
        serde_json::to_value(value)
            .map(Reply::Value)
            .map_err(|e| Fault::unclassified(format!("response serialization failed: {}", e)))
    }

    pub fn into_response(self) -> ApiResponse {
        match self {
            Reply::Value(value) => ApiResponse::ok(value),
            Reply::Response(response) => response,
        }
    }
}

impl From<Value> for Reply {
    fn from(value: Value) -> Self {
        Reply::Value(value)
    }
}

impl From<ApiResponse> for Reply {
    fn from(response: ApiResponse) -> Self {
        Reply::Response(response)
    }
}

pub type HandlerResult = Result<Reply, Fault>;

/// An async endpoint implementation.
///
/// Implemented for every `Fn(RequestEnvelope, Option<Value>) -> impl Future`
/// whose output is `Result<impl Into<Reply>, Fault>`.
pub trait Handler: Send + Sync {
    fn call(&self, request: RequestEnvelope, body: Option<Value>) -> BoxFuture<'static, HandlerResult>;
}

impl<F, Fut, R> Handler for F
where
    F: Fn(RequestEnvelope, Option<Value>) -> Fut + Send + Sync,
    Fut: Future<Output = Result<R, Fault>> + Send + 'static,
    R: Into<Reply>,
{
    fn call(&self, request: RequestEnvelope, body: Option<Value>) -> BoxFuture<'static, HandlerResult> {
        let fut = self(request, body);
        Box::pin(async move { fut.await.map(Into::into) })
    }
}
