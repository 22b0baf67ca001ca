//! Request dispatch subsystem.
//!
//! # Data Flow
//! ```text
//! RequestEnvelope (method, resource template, query, headers, path, body)
//!     → dispatcher.rs (exact lookup in RegistryHandle)
//!     → section rules checked concurrently (fail-fast)
//!     → handler.rs (invoke bound Handler)
//!     → fault.rs (ordered fault mappings on failure)
//!     → ResponseEnvelope
//! ```
//!
//! # Design Decisions
//! - One event in, one response out; no shared mutable state
//! - Handlers return tagged faults instead of unwinding
//! - First declared matching mapping wins, not the most specific
//! - Unmapped faults go back to the host, never swallowed here

pub mod dispatcher;
pub mod fault;
pub mod handler;

pub use dispatcher::{DispatchError, Dispatcher};
pub use fault::{Fault, FaultCatalog, FaultKind, FaultMapping};
pub use handler::{Handler, HandlerResult, Reply};
