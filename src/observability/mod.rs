//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Dispatcher, registry watchers, gateway produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (counters, gauges, histograms)
//!
//! Consumers:
//!     → stdout (fmt layer)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Queued requests run inside a `dispatch` span carrying their request ID
//! - Metrics calls are no-ops until a recorder is installed

pub mod logging;
pub mod metrics;
