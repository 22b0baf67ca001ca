//! HTTP host for the dispatcher.
//!
//! # Responsibilities
//! - Mount every registered resource template as an Axum route
//! - Turn each matched request into a `RequestEnvelope`
//! - Serve the synthesized document and the interactive page
//! - Wire up middleware (tracing, timeout, request ID)
//! - Answer unmapped faults with a generic 500
//! - Answer unmounted paths with the dispatcher's 404 echo

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{MatchedPath, Path, Query, State},
    http::{HeaderMap, Method, StatusCode, Uri},
    response::{Html, IntoResponse, Response},
    routing::{any, get},
    Router,
};
use serde_json::json;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::ServiceConfig;
use crate::dispatch::Dispatcher;
use crate::http::request::RequestEnvelope;
use crate::http::response::{insert_headers, ApiResponse};
use crate::openapi::{swagger_ui, Info, Server, Synthesizer};
use crate::routing::RegistryHandle;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("resource template '{0}' must start with '/'")]
    InvalidTemplate(String),

    #[error("resource templates '{first}' and '{second}' match the same paths")]
    ConflictingTemplates { first: String, second: String },
}

/// Application state injected into handlers.
#[derive(Clone)]
struct AppState {
    dispatcher: Arc<Dispatcher>,
    docs: Arc<DocsState>,
}

struct DocsState {
    synthesizer: Synthesizer,
    info: Info,
    servers: Option<Vec<Server>>,
}

/// HTTP server exposing a frozen registry.
pub struct HttpServer {
    router: Router,
    config: ServiceConfig,
}

impl HttpServer {
    /// Build the server for `registry`. Fails if a template cannot be
    /// mounted.
    pub fn new(config: ServiceConfig, registry: RegistryHandle) -> Result<Self, ServerError> {
        let dispatcher = Dispatcher::new(registry.clone())
            .with_default_headers(config.response.default_headers.clone());
        let state = AppState {
            dispatcher: Arc::new(dispatcher),
            docs: Arc::new(DocsState {
                synthesizer: Synthesizer::new(registry.clone()),
                info: config.api.info(),
                servers: config.api.servers(),
            }),
        };

        let router = Self::build_router(&config, &registry, state)?;
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(
        config: &ServiceConfig,
        registry: &RegistryHandle,
        state: AppState,
    ) -> Result<Router<()>, ServerError> {
        let mut router = Router::new();

        let mut templates: Vec<&str> = Vec::new();
        for route in registry.routes() {
            if !templates.contains(&route.resource.as_str()) {
                templates.push(&route.resource);
            }
        }
        let mut reserved = templates.clone();
        if config.docs.enabled {
            reserved.push(&config.docs.spec_path);
            reserved.push(&config.docs.ui_path);
        }
        check_templates(&reserved)?;

        for template in &templates {
            router = router.route(template, any(dispatch_handler));
        }
        tracing::debug!(templates = templates.len(), "Routes mounted");

        if config.docs.enabled {
            router = router
                .route(&config.docs.spec_path, get(document_handler))
                .route(&config.docs.ui_path, get(ui_handler));
        }

        Ok(router
            .fallback(fallback_handler)
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.timeouts.request_secs,
            )))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid)))
    }

    /// The fully layered router, for in-process serving.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), ServerError> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }
}

/// Reject templates Axum would refuse to mount. Each entry must be distinct.
fn check_templates(templates: &[&str]) -> Result<(), ServerError> {
    let mut seen: HashMap<String, &str> = HashMap::new();
    for template in templates {
        if !template.starts_with('/') {
            return Err(ServerError::InvalidTemplate(template.to_string()));
        }
        if let Some(first) = seen.insert(shape(template), *template) {
            return Err(ServerError::ConflictingTemplates {
                first: first.to_string(),
                second: template.to_string(),
            });
        }
    }
    Ok(())
}

/// Template with parameter names erased: `/pets/{id}` → `/pets/{}`.
fn shape(template: &str) -> String {
    template
        .split('/')
        .map(|segment| {
            if segment.starts_with('{') && segment.ends_with('}') {
                "{}"
            } else {
                segment
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Adapter from Axum to the dispatcher.
async fn dispatch_handler(
    State(state): State<AppState>,
    matched: MatchedPath,
    method: Method,
    path: Option<Path<BTreeMap<String, String>>>,
    Query(query): Query<BTreeMap<String, String>>,
    headers: HeaderMap,
    body: String,
) -> Response {
    let mut request = RequestEnvelope::new(method.as_str(), matched.as_str());
    request.query = query;
    request.path_parameters = path.map(|Path(params)| params).unwrap_or_default();
    request.headers = headers
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (name.as_str().to_string(), v.to_string()))
        })
        .collect();
    if !body.is_empty() {
        request.body = Some(body);
    }

    let request_id = request.request_id().unwrap_or("unknown").to_string();
    match state.dispatcher.dispatch(request).await {
        Ok(envelope) => envelope.into_response(),
        Err(e) => {
            tracing::error!(request_id = %request_id, error = %e, "Unhandled dispatch failure");
            ApiResponse::new(json!({ "error": "Internal server error" }), 500)
                .into_envelope(state.dispatcher.default_headers(), &BTreeMap::new())
                .into_response()
        }
    }
}

/// Requests no mounted template matched.
async fn fallback_handler(State(state): State<AppState>, method: Method, uri: Uri) -> Response {
    tracing::warn!(method = %method, path = %uri.path(), "No route mounted for path");
    state
        .dispatcher
        .not_found(&RequestEnvelope::new(method.as_str(), uri.path()))
        .into_response()
}

async fn document_handler(State(state): State<AppState>) -> Response {
    let docs = &state.docs;
    let defaults = state.dispatcher.default_headers();
    match docs
        .synthesizer
        .describe_json(docs.info.clone(), docs.servers.clone())
    {
        Ok(document) => ApiResponse::ok(document)
            .into_envelope(defaults, &BTreeMap::new())
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to serialize API document");
            ApiResponse::new(json!({ "error": "Internal server error" }), 500)
                .into_envelope(defaults, &BTreeMap::new())
                .into_response()
        }
    }
}

async fn ui_handler(State(state): State<AppState>) -> Response {
    let docs = &state.docs;
    let document = docs.synthesizer.describe(docs.info.clone(), docs.servers.clone());
    let mut response = match swagger_ui(&document) {
        Ok(page) => Html(page).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to render documentation page");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    };
    insert_headers(response.headers_mut(), state.dispatcher.default_headers());
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_erases_parameter_names() {
        assert_eq!(shape("/pets/{id}"), "/pets/{}");
        assert_eq!(shape("/owners/{owner}/pets"), "/owners/{}/pets");
        assert_eq!(shape("/pets"), "/pets");
    }

    #[test]
    fn test_check_templates() {
        assert!(check_templates(&["/pets", "/pets/{id}", "/openapi.json"]).is_ok());
        assert!(matches!(
            check_templates(&["pets"]),
            Err(ServerError::InvalidTemplate(_))
        ));
        assert!(matches!(
            check_templates(&["/pets/{id}", "/pets/{name}"]),
            Err(ServerError::ConflictingTemplates { .. })
        ));
        assert!(matches!(
            check_templates(&["/openapi.json", "/openapi.json"]),
            Err(ServerError::ConflictingTemplates { .. })
        ));
    }
}
