//! Route declarations.
//!
//! A [`RouteSpec`] is one data record describing an endpoint: its routing key,
//! documentation, rules, documented responses, fault mappings, static headers
//! and handler. Routes are built with chained setters and then handed to
//! [`crate::routing::RegistryBuilder::register`].

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::dispatch::fault::FaultMapping;
use crate::dispatch::handler::Handler;
use crate::routing::method::HttpMethod;
use crate::rules::RouteRules;
use crate::schema::ReferenceObject;

/// A documented response for one status code.
#[derive(Debug, Clone)]
pub struct ResponseDescriptor {
    pub status: u16,
    pub description: Option<String>,
    pub schema: Option<Value>,
    pub references: Vec<ReferenceObject>,
    pub example: Option<Value>,
}

impl ResponseDescriptor {
    pub fn new(status: u16) -> Self {
        Self {
            status,
            description: None,
            schema: None,
            references: Vec::new(),
            example: None,
        }
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn schema(mut self, schema: Value) -> Self {
        self.schema = Some(schema);
        self
    }

    pub fn reference(mut self, reference: ReferenceObject) -> Self {
        self.references.push(reference);
        self
    }

    pub fn example(mut self, example: Value) -> Self {
        self.example = Some(example);
        self
    }
}

/// One endpoint declaration.
#[derive(Clone)]
pub struct RouteSpec {
    pub method: HttpMethod,
    pub resource: String,
    pub operation_id: String,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub rules: RouteRules,
    pub responses: Vec<ResponseDescriptor>,
    pub faults: Vec<FaultMapping>,
    pub headers: BTreeMap<String, String>,
    pub handler: Arc<dyn Handler>,
}

impl RouteSpec {
    pub fn new(method: HttpMethod, resource: impl Into<String>, handler: impl Handler + 'static) -> Self {
        let resource = resource.into();
        Self {
            operation_id: default_operation_id(method, &resource),
            method,
            resource,
            summary: None,
            description: None,
            tags: Vec::new(),
            rules: RouteRules::default(),
            responses: Vec::new(),
            faults: Vec::new(),
            headers: BTreeMap::new(),
            handler: Arc::new(handler),
        }
    }

    pub fn get(resource: impl Into<String>, handler: impl Handler + 'static) -> Self {
        Self::new(HttpMethod::Get, resource, handler)
    }

    pub fn post(resource: impl Into<String>, handler: impl Handler + 'static) -> Self {
        Self::new(HttpMethod::Post, resource, handler)
    }

    pub fn put(resource: impl Into<String>, handler: impl Handler + 'static) -> Self {
        Self::new(HttpMethod::Put, resource, handler)
    }

    pub fn patch(resource: impl Into<String>, handler: impl Handler + 'static) -> Self {
        Self::new(HttpMethod::Patch, resource, handler)
    }

    pub fn delete(resource: impl Into<String>, handler: impl Handler + 'static) -> Self {
        Self::new(HttpMethod::Delete, resource, handler)
    }

    pub fn any(resource: impl Into<String>, handler: impl Handler + 'static) -> Self {
        Self::new(HttpMethod::Any, resource, handler)
    }

    pub fn operation_id(mut self, id: impl Into<String>) -> Self {
        self.operation_id = id.into();
        self
    }

    pub fn summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn rules(mut self, rules: RouteRules) -> Self {
        self.rules = rules;
        self
    }

    pub fn response(mut self, response: ResponseDescriptor) -> Self {
        self.responses.push(response);
        self
    }

    pub fn fault(mut self, mapping: FaultMapping) -> Self {
        self.faults.push(mapping);
        self
    }

    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Names of the `{param}` segments in the resource template, in order.
    pub fn template_parameters(&self) -> Vec<&str> {
        template_parameters(&self.resource)
    }
}

impl fmt::Debug for RouteSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteSpec")
            .field("method", &self.method)
            .field("resource", &self.resource)
            .field("operation_id", &self.operation_id)
            .field("rules", &self.rules)
            .field("responses", &self.responses)
            .field("faults", &self.faults)
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}

/// `{param}` segment names of a resource template.
pub fn template_parameters(resource: &str) -> Vec<&str> {
    resource
        .split('/')
        .filter(|segment| segment.len() > 2 && segment.starts_with('{') && segment.ends_with('}'))
        .map(|segment| &segment[1..segment.len() - 1])
        .collect()
}

/// `get /pets/{id}` becomes `get_pets_id`.
fn default_operation_id(method: HttpMethod, resource: &str) -> String {
    let mut id = method.operation_key();
    for segment in resource.split('/').filter(|s| !s.is_empty()) {
        id.push('_');
        id.extend(
            segment
                .chars()
                .filter(|c| *c != '{' && *c != '}')
                .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' }),
        );
    }
    id
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::fault::{Fault, FaultKind};
    use crate::http::request::RequestEnvelope;
    use serde_json::json;

    async fn noop(_req: RequestEnvelope, _body: Option<Value>) -> Result<Value, Fault> {
        Ok(json!(null))
    }

    #[test]
    fn test_template_parameters() {
        assert_eq!(template_parameters("/widgets/{id}"), vec!["id"]);
        assert_eq!(
            template_parameters("/owners/{owner}/pets/{pet}"),
            vec!["owner", "pet"]
        );
        assert!(template_parameters("/pets").is_empty());
        assert!(template_parameters("/weird/{}").is_empty());
    }

    #[test]
    fn test_default_operation_id() {
        let route = RouteSpec::get("/pets/{id}", noop);
        assert_eq!(route.operation_id, "get_pets_id");
        assert_eq!(RouteSpec::any("/", noop).operation_id, "any");
        assert_eq!(RouteSpec::post("/pet-food", noop).operation_id, "post_pet_food");
    }

    #[test]
    fn test_builder_collects_declarations() {
        let route = RouteSpec::post("/pets", noop)
            .operation_id("createPet")
            .summary("Create a pet")
            .tag("pets")
            .header("x-custom", "1")
            .fault(FaultMapping::new(FaultKind::new("Conflict"), 409))
            .response(ResponseDescriptor::new(201).describe("Created"));

        assert_eq!(route.method, HttpMethod::Post);
        assert_eq!(route.operation_id, "createPet");
        assert_eq!(route.tags, vec!["pets"]);
        assert_eq!(route.faults.len(), 1);
        assert_eq!(route.responses[0].status, 201);
        assert_eq!(route.headers["x-custom"], "1");
        assert!(route.rules.is_empty());
    }
}
