//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, timeout)
//!     → request.rs (RequestEnvelope: template, query, headers, path, body)
//!     → [dispatcher: lookup, validate, invoke]
//!     → response.rs (header merge, JSON body)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{RequestEnvelope, X_REQUEST_ID};
pub use response::{ApiResponse, ResponseEnvelope};
pub use server::{HttpServer, ServerError};
