//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Transport attempt fails:
//!     → retries.rs (RetryState: budget left?)
//!     → backoff.rs (how long to wait)
//!     → sleep, then the dispatcher re-resolves and tries again
//!     → or the failure becomes terminal
//! ```
//!
//! # Design Decisions
//! - Only transport I/O failures are retried
//! - Backoff is capped doubling; jitter is opt-in
//! - Retry state lives for exactly one call

pub mod backoff;
pub mod retries;

pub use retries::{RetryPolicy, RetryState};
