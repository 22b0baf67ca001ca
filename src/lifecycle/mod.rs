//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Shutdown (shutdown.rs):
//!     trigger() → every subscriber (HTTP server, background tasks) drains and exits
//!
//! Signals (signals.rs):
//!     SIGINT/SIGTERM → Shutdown::trigger
//! ```
//!
//! # Design Decisions
//! - One broadcast channel; subscribers never talk to each other
//! - The server stops accepting first, then finishes in-flight requests

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
pub use signals::trigger_on_signal;
