//! Dispatch subsystem.
//!
//! # Data Flow
//! ```text
//! Dispatcher::execute(request)
//!     → resilience::RetryPolicy::new_state()
//!     → loop:
//!         discovery::InstanceDirectory::resolve(context_id)
//!         → load_balancer::LoadBalancerFactory::select(strategy)
//!         → rewrite.rs (upstream base + original path/query)
//!         → transport::Transport::do_request
//!         → Ok: return response
//!         → io::Error: RetryState::continue_or_propagate
//! ```

pub mod dispatcher;
pub mod request;
pub mod rewrite;

pub use dispatcher::{Dispatcher, DispatcherBuilder};
pub use request::{DispatchRequest, DispatchResponse};
pub use rewrite::rewrite;
