//! Route ledger: declarative API routing with validation, fault mapping and
//! OpenAPI synthesis.

pub mod config;
pub mod dispatch;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod openapi;
pub mod routing;
pub mod rules;
pub mod sample;
pub mod schema;

pub use config::schema::ServiceConfig;
pub use dispatch::{Dispatcher, Fault, FaultKind, FaultMapping};
pub use http::{HttpServer, RequestEnvelope, ResponseEnvelope};
pub use lifecycle::Shutdown;
pub use openapi::{ApiDocument, Synthesizer};
pub use routing::{HttpMethod, Registry, RegistryHandle, RouteSpec};
pub use rules::{JsonSchemaRules, RouteRules};
