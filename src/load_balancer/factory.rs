//! Strategy registry.
//!
//! # Responsibilities
//! - Map strategy names to [`LoadBalancer`] implementations
//! - Fall back to round robin for unknown names
//! - Turn "nothing selectable" into a typed error

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::DispatchError;
use crate::load_balancer::{round_robin::RoundRobin, upstream::Upstream, LoadBalancer, ROUND_ROBIN};

/// Named load balancing strategies.
#[derive(Debug)]
pub struct LoadBalancerFactory {
    strategies: HashMap<String, Arc<dyn LoadBalancer>>,
    default: Arc<dyn LoadBalancer>,
}

impl LoadBalancerFactory {
    /// Create a factory with the built-in round robin strategy.
    pub fn new() -> Self {
        let round_robin: Arc<dyn LoadBalancer> = Arc::new(RoundRobin::new());
        let mut strategies = HashMap::new();
        strategies.insert(ROUND_ROBIN.to_string(), round_robin.clone());
        Self {
            strategies,
            default: round_robin,
        }
    }

    /// Register (or replace) a strategy under `name`.
    pub fn register(&mut self, name: impl Into<String>, strategy: Arc<dyn LoadBalancer>) {
        self.strategies.insert(name.into(), strategy);
    }

    /// Look up a strategy, falling back to round robin.
    pub fn strategy(&self, name: &str) -> &Arc<dyn LoadBalancer> {
        match self.strategies.get(name) {
            Some(strategy) => strategy,
            None => {
                tracing::debug!(strategy = %name, "Unknown load balancer, using roundRobin");
                &self.default
            }
        }
    }

    /// Select one upstream with the named strategy.
    ///
    /// `hint` is the context id of the call. Strategies may key state by it,
    /// and it names the cluster in the error.
    pub fn select(&self, upstreams: &[Upstream], strategy: &str, hint: &str) -> Result<Upstream, DispatchError> {
        self.strategy(strategy)
            .next_server(upstreams, hint)
            .ok_or_else(|| {
                tracing::debug!(context_id = %hint, upstream_count = upstreams.len(), "No available upstream");
                DispatchError::NoAvailableEndpoint {
                    context_id: hint.to_string(),
                }
            })
    }
}

impl Default for LoadBalancerFactory {
    fn default() -> Self {
        Self::new()
    }
}
