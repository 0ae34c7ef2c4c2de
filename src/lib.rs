//! Topology-aware HTTP dispatch library.
//!
//! Sends requests addressed to a logical cluster (a context id) to one of its
//! live upstreams, retrying transient transport failures.

pub mod config;
pub mod discovery;
pub mod dispatch;
pub mod error;
pub mod gateway;
pub mod lifecycle;
pub mod load_balancer;
pub mod observability;
pub mod resilience;
pub mod transport;

pub use config::DispatchConfig;
pub use dispatch::{DispatchRequest, DispatchResponse, Dispatcher};
pub use error::DispatchError;
pub use gateway::GatewayServer;
pub use lifecycle::Shutdown;
