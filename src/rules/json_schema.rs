//! JSON-Schema backed rule engine.

use std::fmt;

use jsonschema::Validator;
use serde_json::Value;
use thiserror::Error;

use super::{RuleSet, RuleViolation};

/// A rule set could not be compiled.
#[derive(Error, Debug)]
pub enum RuleError {
    /// The schema itself is not a valid Draft 7 schema.
    #[error("invalid rule schema: {0}")]
    InvalidSchema(String),

    /// Section rules must describe an object.
    #[error("rule schema must describe an object, got {0}")]
    NotAnObject(String),
}

/// Section rules expressed as a Draft 7 JSON Schema object.
///
/// The schema is compiled once at declaration time; [`RuleSet::to_schema`]
/// hands the same schema to the API description.
pub struct JsonSchemaRules {
    schema: Value,
    validator: Validator,
}

impl JsonSchemaRules {
    /// Compile `schema`. The top level must be `{"type": "object", ...}` or
    /// leave `type` out entirely.
    pub fn new(schema: Value) -> Result<Self, RuleError> {
        match schema.get("type") {
            None => {}
            Some(Value::String(t)) if t == "object" => {}
            Some(other) => return Err(RuleError::NotAnObject(other.to_string())),
        }

        let validator = jsonschema::options()
            .with_draft(jsonschema::Draft::Draft7)
            .build(&schema)
            .map_err(|e| RuleError::InvalidSchema(e.to_string()))?;

        Ok(Self { schema, validator })
    }

    /// Shorthand for an object schema with the given properties and required keys.
    pub fn object(properties: Value, required: &[&str]) -> Result<Self, RuleError> {
        Self::new(serde_json::json!({
            "type": "object",
            "properties": properties,
            "required": required,
        }))
    }

    pub fn schema(&self) -> &Value {
        &self.schema
    }
}

impl fmt::Debug for JsonSchemaRules {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonSchemaRules")
            .field("schema", &self.schema)
            .finish_non_exhaustive()
    }
}

impl RuleSet for JsonSchemaRules {
    fn check(&self, input: &Value) -> Result<(), RuleViolation> {
        // Only the first violation is reported.
        match self.validator.iter_errors(input).next() {
            None => Ok(()),
            Some(error) => {
                let path = error.instance_path.to_string();
                if path.is_empty() {
                    Err(RuleViolation::new(error.to_string()))
                } else {
                    Err(RuleViolation::new(format!("{}: {}", path, error)))
                }
            }
        }
    }

    fn to_schema(&self) -> Value {
        self.schema.clone()
    }
}
