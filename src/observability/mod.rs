//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Request engine produces:
//!     → logging.rs (structured log events, one span per request)
//!     → metrics.rs (counters, gauges, histograms)
//!     → registry.rs (live diagnostic objects, one per in-flight request)
//!
//! Consumers:
//!     → Log output (stdout via tracing-subscriber)
//!     → Metrics endpoint (Prometheus scrape)
//!     → Tests and debugging (registry snapshots)
//! ```
//!
//! # Design Decisions
//! - Structured logging via `tracing`; the library never installs a subscriber
//! - Metrics are cheap (atomic increments), no-ops until a recorder is installed
//! - The registry is observational only and has no effect on request flow

pub mod logging;
pub mod metrics;
pub mod registry;

pub use registry::{ObjectGuard, ObjectId, ObjectRegistry};
