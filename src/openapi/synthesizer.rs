//! API-description synthesis.
//!
//! Walks the registry on every call and builds one operation per route:
//!
//! 1. `200` plus one documented code per fault mapping
//! 2. parameters and request body from the route's section rules
//! 3. `{param}` template segments no path rule covers, as required strings
//! 4. declared response descriptors, registering every referenced record
//!    schema under `components.schemas`
//!
//! Nothing is cached; the component namespace starts empty on each call.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::openapi::model::{
    json_content, ApiDocument, Components, Info, MediaType, Operation, Parameter, ParameterIn,
    RequestBody, ResponseObject, Server, OPENAPI_VERSION,
};
use crate::routing::{RegistryHandle, RouteSpec};

const SUCCESS_DESCRIPTION: &str = "Successful response";
const UNDOCUMENTED_ERROR: &str = "Undocumented error";

/// Builds API documents from a frozen registry.
#[derive(Debug, Clone)]
pub struct Synthesizer {
    registry: RegistryHandle,
}

impl Synthesizer {
    pub fn new(registry: RegistryHandle) -> Self {
        Self { registry }
    }

    /// Assemble the full document.
    pub fn describe(&self, info: Info, servers: Option<Vec<Server>>) -> ApiDocument {
        let mut components = Components::default();
        let mut paths: BTreeMap<String, BTreeMap<String, Operation>> = BTreeMap::new();

        for route in self.registry.routes() {
            let operation = describe_route(route, &mut components);
            paths
                .entry(route.resource.clone())
                .or_default()
                .insert(route.method.operation_key(), operation);
        }

        tracing::debug!(
            paths = paths.len(),
            schemas = components.schemas.len(),
            "API document synthesized"
        );

        ApiDocument {
            openapi: OPENAPI_VERSION.to_string(),
            info,
            paths,
            servers,
            components,
        }
    }

    /// [`describe`](Self::describe) rendered as JSON.
    pub fn describe_json(
        &self,
        info: Info,
        servers: Option<Vec<Server>>,
    ) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self.describe(info, servers))
    }
}

fn describe_route(route: &RouteSpec, components: &mut Components) -> Operation {
    let mut responses = BTreeMap::from([(
        "200".to_string(),
        ResponseObject::described(SUCCESS_DESCRIPTION),
    )]);

    for mapping in &route.faults {
        responses.insert(
            mapping.code.to_string(),
            ResponseObject::described(
                mapping
                    .description
                    .clone()
                    .unwrap_or_else(|| UNDOCUMENTED_ERROR.to_string()),
            ),
        );
    }

    let mut parameters = Vec::new();
    let mut request_body = None;
    let rules = &route.rules;

    if let Some(query) = &rules.query {
        parameters.extend(rule_parameters(&query.to_schema(), ParameterIn::Query));
    }
    if let Some(body) = &rules.body {
        request_body = Some(RequestBody {
            required: true,
            content: json_content(MediaType {
                schema: body_schema(body.to_schema()),
                example: None,
            }),
        });
    }
    if let Some(headers) = &rules.headers {
        parameters.extend(rule_parameters(&headers.to_schema(), ParameterIn::Header));
    }

    let mut path_parameters = match &rules.path {
        Some(path) => rule_parameters(&path.to_schema(), ParameterIn::Path),
        None => Vec::new(),
    };
    for name in route.template_parameters() {
        if !path_parameters.iter().any(|p| p.name == name) {
            path_parameters.push(inferred_path_parameter(name));
        }
    }
    parameters.extend(path_parameters);

    for descriptor in &route.responses {
        let code = descriptor.status.to_string();
        match &descriptor.schema {
            Some(schema) => {
                responses.insert(
                    code,
                    ResponseObject {
                        description: descriptor.description.clone().unwrap_or_default(),
                        content: Some(json_content(MediaType {
                            schema: schema.clone(),
                            example: descriptor.example.clone(),
                        })),
                    },
                );
            }
            None => {
                if let Some(description) = &descriptor.description {
                    responses
                        .entry(code)
                        .and_modify(|r| r.description = description.clone())
                        .or_insert_with(|| ResponseObject::described(description.clone()));
                }
            }
        }

        for reference in &descriptor.references {
            let schema = reference.source.to_json_schema();
            if let Some(previous) = components.schemas.insert(reference.name.clone(), schema) {
                // Last write wins.
                if previous != components.schemas[&reference.name] {
                    tracing::warn!(
                        schema = %reference.name,
                        operation_id = %route.operation_id,
                        "Component schema overwritten by a different definition"
                    );
                }
            }
        }
    }

    Operation {
        operation_id: route.operation_id.clone(),
        summary: route.summary.clone(),
        description: route.description.clone(),
        tags: route.tags.clone(),
        parameters,
        request_body,
        responses,
    }
}

/// One parameter per property of an object schema.
fn rule_parameters(schema: &Value, location: ParameterIn) -> Vec<Parameter> {
    let required: Vec<&str> = schema
        .get("required")
        .and_then(Value::as_array)
        .map(|names| names.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();

    let Some(properties) = schema.get("properties").and_then(Value::as_object) else {
        return Vec::new();
    };

    properties
        .iter()
        .map(|(name, property)| Parameter {
            name: name.clone(),
            location,
            required: required.contains(&name.as_str()),
            description: property
                .get("description")
                .and_then(Value::as_str)
                .map(str::to_string),
            schema: property.clone(),
        })
        .collect()
}

fn inferred_path_parameter(name: &str) -> Parameter {
    Parameter {
        name: name.to_string(),
        location: ParameterIn::Path,
        required: true,
        description: None,
        schema: serde_json::json!({"type": "string"}),
    }
}

/// Request-body schema with an empty `patterns` list stripped.
fn body_schema(mut schema: Value) -> Value {
    if let Some(object) = schema.as_object_mut() {
        let empty_patterns = object
            .get("patterns")
            .and_then(Value::as_array)
            .is_some_and(|p| p.is_empty());
        if empty_patterns {
            object.remove("patterns");
        }
    }
    schema
}
