//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Route Declaration (at startup):
//!     RouteSpec { method, resource, rules, faults, responses, handler }
//!     → RegistryBuilder::register (duplicate check)
//!     → freeze → RegistryHandle (Arc<Registry>)
//!
//! Incoming Request (method, resource template)
//!     → registry.rs (exact lookup)
//!     → Return: matched RouteSpec or None
//! ```
//!
//! # Design Decisions
//! - Routes registered at startup, immutable at runtime
//! - No pattern matching: the resource template itself is the key
//! - Deterministic: same input always matches same route
//! - Duplicate keys are a setup error, never an overwrite

pub mod method;
pub mod registry;
pub mod route;

pub use method::HttpMethod;
pub use registry::{Registry, RegistryBuilder, RegistryError, RegistryHandle};
pub use route::{ResponseDescriptor, RouteSpec};
