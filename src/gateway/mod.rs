//! Gateway ingestion subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum, request ID, timeout, body buffering)
//!     → request.rs (context id, header cleanup → DispatchRequest)
//!     → queue.rs (bounded hand-off, worker pool)
//!     → Dispatcher::execute
//!     → oneshot reply → request.rs (DispatchResponse → HTTP response)
//! ```

pub mod queue;
pub mod request;
pub mod server;

pub use queue::{DispatchQueue, QueueError};
pub use request::{X_CONTEXT_ID, X_REQUEST_ID};
pub use server::GatewayServer;
