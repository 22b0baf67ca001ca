//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Dispatcher / registry / host produce:
//!     → logging.rs (structured log events, spans per dispatch)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → stdout (pretty or JSON)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Structured logging (JSON) for machine parsing
//! - Request ID recorded on every dispatch span
//! - Metrics are cheap (atomic increments)

pub mod logging;
pub mod metrics;
