//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Handlers and the LibCal client produce:
//!     → logging.rs (structured tracing events, pretty or JSON)
//!     → metrics.rs (counters and histograms)
//!
//! Consumers:
//!     → stdout log collection
//!     → Prometheus scrape endpoint (opt-in)
//! ```
//!
//! The `x-request-id` assigned at the edge is recorded on the request span
//! and echoed in availability diagnostics.

pub mod logging;
pub mod metrics;
