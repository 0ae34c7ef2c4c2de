//! Dispatch orchestration.
//!
//! # Responsibilities
//! - Resolve → select → rewrite → send, once per attempt
//! - Feed transport failures to the per-call retry state
//! - Return configuration and topology errors on first occurrence
//!
//! # Design Decisions
//! - Every retry re-resolves, so a registry push between attempts is honored
//!   and a retry may land on a different upstream
//! - No lock is held while the transport runs or while backing off

use std::sync::Arc;
use std::time::Instant;

use crate::config::schema::{DispatchConfig, REGISTER_TYPE_MEMORY};
use crate::discovery::{InstanceDirectory, InstanceRegistry, MemoryRegistry};
use crate::dispatch::request::{DispatchRequest, DispatchResponse};
use crate::dispatch::rewrite::rewrite;
use crate::error::{DispatchError, RetryableError};
use crate::load_balancer::{LoadBalancer, LoadBalancerFactory};
use crate::observability::metrics;
use crate::resilience::RetryPolicy;
use crate::transport::{HyperTransport, Transport};

/// Entry point for sending requests to a logical cluster.
///
/// Cheap to share behind an `Arc`; concurrent `execute` calls do not
/// serialize on each other.
pub struct Dispatcher {
    directory: InstanceDirectory,
    balancers: LoadBalancerFactory,
    strategy: String,
    retry: RetryPolicy,
    transport: Arc<dyn Transport>,
}

impl Dispatcher {
    pub fn builder(config: &DispatchConfig) -> DispatcherBuilder {
        DispatcherBuilder::new(config)
    }

    /// Send `request` to one upstream of its context id, retrying transient
    /// transport failures.
    pub async fn execute(&self, request: &DispatchRequest) -> Result<DispatchResponse, DispatchError> {
        let start = Instant::now();
        let mut retry = self.retry.new_state();

        let result = loop {
            let attempt = match self.rewrite_request(request).await {
                Ok(attempt) => attempt,
                Err(e) => break Err(e),
            };
            let target = attempt.url().to_string();

            match self.transport.do_request(attempt).await {
                Ok(response) => {
                    tracing::debug!(
                        context_id = %request.context_id(),
                        upstream = %target,
                        status = %response.status,
                        attempt = retry.attempt_count(),
                        "Request completed"
                    );
                    break Ok(response);
                }
                Err(e) => {
                    tracing::warn!(
                        url = %request.url(),
                        upstream = %target,
                        attempt = retry.attempt_count(),
                        elapsed_ms = start.elapsed().as_millis() as u64,
                        error = %e,
                        "Request failed"
                    );
                    let failure = RetryableError::new(request.method().clone(), request.url(), e);
                    if let Err(terminal) = retry.continue_or_propagate(failure).await {
                        break Err(terminal);
                    }
                }
            }
        };

        metrics::record_request(request.method(), outcome(&result), start);
        result
    }

    /// Resolve, select and rewrite for one attempt.
    async fn rewrite_request(&self, request: &DispatchRequest) -> Result<DispatchRequest, DispatchError> {
        let context_id = request.context_id();
        let upstreams = self.directory.resolve(context_id, request.url()).await?;
        let upstream = self.balancers.select(&upstreams, &self.strategy, context_id)?;
        let url = rewrite(upstream.url(), request.url())?;
        Ok(request.with_url(url))
    }

    /// The directory this dispatcher resolves through.
    pub fn directory(&self) -> &InstanceDirectory {
        &self.directory
    }
}

fn outcome(result: &Result<DispatchResponse, DispatchError>) -> &'static str {
    match result {
        Ok(_) => "success",
        Err(e) if e.is_topology() => "topology",
        Err(DispatchError::Io { .. }) => "io_error",
        Err(DispatchError::InvalidUrl { .. }) => "invalid_url",
        Err(_) => "configuration",
    }
}

/// Builder for [`Dispatcher`].
pub struct DispatcherBuilder {
    config: DispatchConfig,
    registry: Option<Arc<dyn InstanceRegistry>>,
    transport: Option<Arc<dyn Transport>>,
    balancers: LoadBalancerFactory,
}

impl DispatcherBuilder {
    pub fn new(config: &DispatchConfig) -> Self {
        Self {
            config: config.clone(),
            registry: None,
            transport: None,
            balancers: LoadBalancerFactory::new(),
        }
    }

    /// Registry used when `registerType` is not `"local"`.
    pub fn registry(mut self, registry: Arc<dyn InstanceRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Replace the default hyper transport.
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Make an extra strategy available under `name`.
    pub fn load_balancer(mut self, name: impl Into<String>, strategy: Arc<dyn LoadBalancer>) -> Self {
        self.balancers.register(name, strategy);
        self
    }

    pub fn build(self) -> Dispatcher {
        let register = &self.config.register;

        let registry = self.registry.or_else(|| {
            (register.register_type == REGISTER_TYPE_MEMORY).then(|| {
                let seeded: Arc<dyn InstanceRegistry> =
                    Arc::new(MemoryRegistry::from_records(register.instances.clone()));
                seeded
            })
        });

        let transport = self
            .transport
            .unwrap_or_else(|| Arc::new(HyperTransport::new(&self.config.transport)));

        let retry = RetryPolicy::from_config(&register.props);
        tracing::info!(
            register_type = %register.register_type,
            strategy = %self.config.load_balance.strategy,
            max_attempts = retry.max_attempts(),
            "Dispatcher configured"
        );

        Dispatcher {
            directory: InstanceDirectory::new(register, registry),
            balancers: self.balancers,
            strategy: self.config.load_balance.strategy.clone(),
            retry,
            transport,
        }
    }
}
