//! Schema conversion for documented response payloads.
//!
//! # Data Flow
//! ```text
//! ResponseDescriptor.references[]
//!     → ReferenceObject { name, source: Arc<dyn SchemaSource> }
//!     → SchemaSource::to_json_schema (recursive)
//!     → components.schemas[name]
//! ```
//!
//! # Design Decisions
//! - Conversion is pure and total: every layout yields a schema
//! - Sources are trait objects so other persistence dialects can plug in

pub mod record;

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

pub use record::{AttributeType, Record, RecordLayout};

/// Anything that can describe itself as a JSON-Schema node.
pub trait SchemaSource: Send + Sync + fmt::Debug {
    fn to_json_schema(&self) -> Value;
}

impl SchemaSource for RecordLayout {
    fn to_json_schema(&self) -> Value {
        RecordLayout::to_json_schema(self)
    }
}

/// A named schema that is compiled into the shared component namespace.
#[derive(Debug, Clone)]
pub struct ReferenceObject {
    pub name: String,
    pub source: Arc<dyn SchemaSource>,
}

impl ReferenceObject {
    pub fn new(name: impl Into<String>, source: impl SchemaSource + 'static) -> Self {
        Self {
            name: name.into(),
            source: Arc::new(source),
        }
    }

    /// Reference to a [`Record`] type's layout.
    pub fn record<R: Record>(name: impl Into<String>) -> Self {
        Self::new(name, R::layout())
    }

    /// `$ref` pointer to this object inside the API document.
    pub fn pointer(&self) -> String {
        format!("#/components/schemas/{}", self.name)
    }
}
