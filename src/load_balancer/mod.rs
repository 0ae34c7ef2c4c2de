//! Load balancing subsystem.
//!
//! # Data Flow
//! ```text
//! Directory resolved Vec<Upstream> for a context id
//!     → factory.rs (look up strategy by name)
//!     → round_robin.rs (rotate through the set)
//!     → Return one Upstream or NoAvailableEndpoint
//! ```
//!
//! # Design Decisions
//! - Strategies are selected by name; unknown names fall back to round robin
//! - Strategies never mutate upstreams
//! - Unhealthy upstreams excluded from selection

pub mod factory;
pub mod round_robin;
pub mod upstream;

pub use factory::LoadBalancerFactory;
pub use upstream::{append_scheme, HealthState, Upstream};

/// Name of the built-in round robin strategy.
pub const ROUND_ROBIN: &str = "roundRobin";

/// A strategy that picks one upstream out of a set.
pub trait LoadBalancer: Send + Sync + std::fmt::Debug {
    /// Pick an upstream, or `None` when nothing in the set is selectable.
    fn next_server(&self, upstreams: &[Upstream], hint: &str) -> Option<Upstream>;
}
