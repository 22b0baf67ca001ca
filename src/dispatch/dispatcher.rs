//! Request dispatch pipeline.
//!
//! ```text
//! ROUTE_LOOKUP → VALIDATE → INVOKE → { SUCCESS | FAULT_MAPPED | FAULT_UNMAPPED } → RESPOND
//! ```
//!
//! Lookup misses answer 404, the first rejected section answers 403, handler
//! faults are translated by the route's fault mappings in declaration order.
//! A fault no mapping accepts is handed back to the host as
//! [`DispatchError::UnmappedFault`].

use std::collections::BTreeMap;
use std::time::Instant;

use futures_util::future::try_join_all;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::Instrument;
use uuid::Uuid;

use crate::dispatch::fault::{first_match, Fault};
use crate::http::request::{map_to_value, RequestEnvelope};
use crate::http::response::{default_headers, ApiResponse, ResponseEnvelope};
use crate::observability::metrics;
use crate::routing::{HttpMethod, RegistryHandle, RouteSpec};
use crate::rules::{RouteRules, RuleViolation, Section};

/// Failures the dispatcher does not turn into a response itself.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The handler failed with a fault none of the route's mappings accept.
    #[error("unmapped fault from {method} {resource}: {fault}")]
    UnmappedFault {
        method: HttpMethod,
        resource: String,
        fault: Fault,
    },
}

/// Serves inbound events against a frozen registry.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    registry: RegistryHandle,
    default_headers: BTreeMap<String, String>,
}

impl Dispatcher {
    pub fn new(registry: RegistryHandle) -> Self {
        Self {
            registry,
            default_headers: default_headers(),
        }
    }

    /// Replace the headers every response starts from.
    pub fn with_default_headers(mut self, headers: BTreeMap<String, String>) -> Self {
        self.default_headers = headers;
        self
    }

    pub fn registry(&self) -> &RegistryHandle {
        &self.registry
    }

    pub fn default_headers(&self) -> &BTreeMap<String, String> {
        &self.default_headers
    }

    /// Produce the response for one inbound event.
    pub async fn dispatch(&self, request: RequestEnvelope) -> Result<ResponseEnvelope, DispatchError> {
        let start = Instant::now();
        let method = request.method.clone();
        let resource = request.resource.clone();
        // Hosts that assign no id get a fresh one.
        let request_id = request
            .request_id()
            .map(str::to_string)
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        let span = tracing::info_span!(
            "dispatch",
            method = %method,
            resource = %resource,
            request_id = %request_id,
        );

        let outcome = self.run(request).instrument(span).await;
        let status = match &outcome {
            Ok(response) => response.status_code,
            Err(DispatchError::UnmappedFault { .. }) => 500,
        };
        metrics::record_dispatch(&method, &resource, status, start);
        outcome
    }

    async fn run(&self, request: RequestEnvelope) -> Result<ResponseEnvelope, DispatchError> {
        // ROUTE_LOOKUP
        let route = match self.resolve(&request.method, &request.resource) {
            Some(route) => route,
            None => {
                tracing::warn!("Api endpoint not found");
                return Ok(self.not_found(&request));
            }
        };

        // VALIDATE
        if !route.rules.is_empty() {
            if let Err((section, violation)) = validate(&route.rules, &request).await {
                tracing::warn!(section = %section, error = %violation, "Validation error");
                metrics::record_validation_rejection(section.as_str());
                let response = ApiResponse::new(
                    json!({ "error": format!("Validation error: {}", violation.message) }),
                    403,
                );
                return Ok(response.into_envelope(&self.default_headers, &route.headers));
            }
        }

        // INVOKE
        tracing::info!(operation_id = %route.operation_id, "Running handler");
        let body = request.parse_body();
        match route.handler.call(request, body).await {
            Ok(reply) => Ok(reply
                .into_response()
                .into_envelope(&self.default_headers, &route.headers)),
            Err(fault) => self.map_fault(route, fault),
        }
    }

    /// Exact lookup; a method without its own route falls back to the route
    /// declared for `ANY` on the same resource.
    fn resolve(&self, method: &str, resource: &str) -> Option<&RouteSpec> {
        let method: HttpMethod = method.parse().ok()?;
        self.registry
            .lookup(method, resource)
            .or_else(|| self.registry.lookup(HttpMethod::Any, resource))
    }

    fn map_fault(&self, route: &RouteSpec, fault: Fault) -> Result<ResponseEnvelope, DispatchError> {
        match first_match(&route.faults, &fault) {
            Some((index, mapping)) => {
                tracing::info!(
                    fault = %fault.kind,
                    mapping = index,
                    code = mapping.code,
                    "Fault mapped to response"
                );
                Ok(mapping
                    .respond(&fault)
                    .into_envelope(&self.default_headers, &route.headers))
            }
            None => {
                tracing::error!(fault = %fault.kind, error = %fault.message, "Error thrown");
                metrics::record_unmapped_fault(fault.kind.name());
                Err(DispatchError::UnmappedFault {
                    method: route.method,
                    resource: route.resource.clone(),
                    fault,
                })
            }
        }
    }

    /// 404 echoing the requested method and resource.
    pub fn not_found(&self, request: &RequestEnvelope) -> ResponseEnvelope {
        ApiResponse::new(
            json!({
                "error": "Requested api endpoint not found",
                "params": {
                    "method": request.method,
                    "resource": request.resource,
                }
            }),
            404,
        )
        .into_envelope(&self.default_headers, &BTreeMap::new())
    }
}

/// Run every declared section check concurrently; the first rejection wins.
///
/// The body is only checked when one was sent. A body that does not parse is
/// checked as `{}`.
pub async fn validate(
    rules: &RouteRules,
    request: &RequestEnvelope,
) -> Result<(), (Section, RuleViolation)> {
    let checks = rules.sections().filter_map(|(section, rule_set)| {
        let input = section_input(section, request)?;
        Some(async move { rule_set.check(&input).map_err(|violation| (section, violation)) })
    });

    try_join_all(checks).await.map(|_| ())
}

fn section_input(section: Section, request: &RequestEnvelope) -> Option<Value> {
    match section {
        Section::Query => Some(map_to_value(&request.query)),
        Section::Headers => Some(map_to_value(&request.headers)),
        Section::Path => Some(map_to_value(&request.path_parameters)),
        Section::Body if request.has_body() => Some(request.parse_body().unwrap_or_else(|| json!({}))),
        Section::Body => None,
    }
}
