//! API description subsystem.
//!
//! # Data Flow
//! ```text
//! RegistryHandle + Info + servers
//!     → synthesizer.rs (one Operation per RouteSpec)
//!         → rules: parameters + requestBody
//!         → fault mappings: documented codes
//!         → references: components.schemas
//!     → model.rs (ApiDocument, OpenAPI 3.0.0)
//!     → swagger.rs (optional HTML page)
//! ```
//!
//! # Design Decisions
//! - Synthesized on demand; deterministic for a given registry
//! - BTreeMap everywhere so output ordering is stable
//! - Schema-name collisions resolve last write wins

pub mod model;
pub mod swagger;
pub mod synthesizer;

pub use model::{ApiDocument, Info, Operation, Parameter, ParameterIn, Server};
pub use swagger::swagger_ui;
pub use synthesizer::Synthesizer;
