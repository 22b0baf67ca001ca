//! Route registration and lookup.
//!
//! # Responsibilities
//! - Collect route declarations during setup
//! - Reject duplicate (method, resource) keys before serving starts
//! - Freeze into an immutable, shareable registry
//! - Look up the route for an exact (method, resource) key
//!
//! # Design Decisions
//! - Builder is consumed by `freeze`, so nothing registers after serving begins
//! - Immutable after construction (thread-safe without locks)
//! - O(1) lookup via HashMap index; declaration order kept for synthesis
//! - Explicit `None` on miss rather than a silent default

use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;

use crate::routing::method::HttpMethod;
use crate::routing::route::RouteSpec;

/// Errors raised while building the registry.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// Two routes declared the same method and resource.
    #[error("Resource {method} {resource} has already been registered")]
    DuplicateRoute { method: HttpMethod, resource: String },
}

/// Shared read-only registry injected into the dispatcher and the synthesizer.
pub type RegistryHandle = Arc<Registry>;

/// Setup-phase collector of route declarations.
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    routes: Vec<RouteSpec>,
    index: HashMap<(HttpMethod, String), usize>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a route. Fails if its (method, resource) key is already taken.
    pub fn register(&mut self, route: RouteSpec) -> Result<&mut Self, RegistryError> {
        let key = (route.method, route.resource.clone());
        if self.index.contains_key(&key) {
            return Err(RegistryError::DuplicateRoute {
                method: route.method,
                resource: route.resource,
            });
        }

        tracing::debug!(
            method = %route.method,
            resource = %route.resource,
            operation_id = %route.operation_id,
            "Route registered"
        );
        self.index.insert(key, self.routes.len());
        self.routes.push(route);
        Ok(self)
    }

    /// Register a batch in order; the first duplicate aborts.
    pub fn register_all<I>(&mut self, routes: I) -> Result<&mut Self, RegistryError>
    where
        I: IntoIterator<Item = RouteSpec>,
    {
        for route in routes {
            self.register(route)?;
        }
        Ok(self)
    }

    /// Consuming form of [`register`](Self::register) for chained setup.
    pub fn route(mut self, route: RouteSpec) -> Result<Self, RegistryError> {
        self.register(route)?;
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// End the setup phase.
    pub fn freeze(self) -> RegistryHandle {
        tracing::info!(routes = self.routes.len(), "Route registry frozen");
        Arc::new(Registry {
            routes: self.routes,
            index: self.index,
        })
    }
}

/// Frozen route registry.
#[derive(Debug, Default)]
pub struct Registry {
    routes: Vec<RouteSpec>,
    index: HashMap<(HttpMethod, String), usize>,
}

impl Registry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// Build and freeze in one step.
    pub fn from_routes<I>(routes: I) -> Result<RegistryHandle, RegistryError>
    where
        I: IntoIterator<Item = RouteSpec>,
    {
        let mut builder = RegistryBuilder::new();
        builder.register_all(routes)?;
        Ok(builder.freeze())
    }

    /// The route declared for exactly this method and resource template.
    pub fn lookup(&self, method: HttpMethod, resource: &str) -> Option<&RouteSpec> {
        self.index
            .get(&(method, resource.to_string()))
            .map(|&i| &self.routes[i])
    }

    /// Routes in declaration order.
    pub fn routes(&self) -> impl Iterator<Item = &RouteSpec> {
        self.routes.iter()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::fault::Fault;
    use crate::http::request::RequestEnvelope;
    use serde_json::{json, Value};

    async fn first(_req: RequestEnvelope, _body: Option<Value>) -> Result<Value, Fault> {
        Ok(json!("first"))
    }

    async fn second(_req: RequestEnvelope, _body: Option<Value>) -> Result<Value, Fault> {
        Ok(json!("second"))
    }

    #[test]
    fn test_duplicate_route_rejected() {
        let mut builder = Registry::builder();
        builder.register(RouteSpec::get("/pets", first)).unwrap();

        let err = builder
            .register(
                RouteSpec::get("/pets", second)
                    .operation_id("other")
                    .summary("different attributes"),
            )
            .unwrap_err();

        assert_eq!(
            err,
            RegistryError::DuplicateRoute {
                method: HttpMethod::Get,
                resource: "/pets".to_string()
            }
        );
        assert_eq!(err.to_string(), "Resource GET /pets has already been registered");
        assert_eq!(builder.len(), 1);
    }

    #[test]
    fn test_same_resource_different_method_allowed() {
        let registry = Registry::from_routes([
            RouteSpec::get("/pets", first),
            RouteSpec::post("/pets", second),
            RouteSpec::any("/pets", second),
        ])
        .unwrap();
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn test_lookup_is_exact() {
        let registry = Registry::from_routes([RouteSpec::get("/pets/{id}", first)]).unwrap();

        assert!(registry.lookup(HttpMethod::Get, "/pets/{id}").is_some());
        assert!(registry.lookup(HttpMethod::Get, "/pets/7").is_none());
        assert!(registry.lookup(HttpMethod::Get, "/pets").is_none());
        assert!(registry.lookup(HttpMethod::Get, "/pets/{id}/").is_none());
        assert!(registry.lookup(HttpMethod::Post, "/pets/{id}").is_none());
        assert!(registry.lookup(HttpMethod::Any, "/pets/{id}").is_none());
    }

    #[test]
    fn test_batch_stops_at_first_duplicate() {
        let err = Registry::from_routes([
            RouteSpec::get("/a", first),
            RouteSpec::get("/a", second),
            RouteSpec::get("/b", first),
        ])
        .unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateRoute { .. }));
    }

    #[test]
    fn test_routes_keep_declaration_order() {
        let registry = Registry::builder()
            .route(RouteSpec::get("/b", first))
            .and_then(|b| b.route(RouteSpec::get("/a", first)))
            .unwrap()
            .freeze();

        let order: Vec<&str> = registry.routes().map(|r| r.resource.as_str()).collect();
        assert_eq!(order, vec!["/b", "/a"]);
    }

    #[test]
    fn test_empty_registry() {
        let registry = Registry::builder().freeze();
        assert!(registry.is_empty());
        assert!(registry.lookup(HttpMethod::Get, "/").is_none());
    }
}
