//! Error definitions for the dispatch pipeline.

use std::io;
use std::time::Duration;

use hyper::Method;
use thiserror::Error;

/// Errors surfaced to callers of [`Dispatcher::execute`](crate::dispatch::Dispatcher::execute).
///
/// Only [`DispatchError::Io`] is ever the product of the retry loop. Every
/// other variant describes a configuration or topology problem and is
/// returned on first occurrence.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Missing or invalid register configuration.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The registry knows no instances for this context id.
    #[error("gateway address not found from registry for context id `{context_id}`")]
    TopologyNotFound { context_id: String },

    /// Selection was attempted on an empty (or fully unhealthy) endpoint set.
    #[error("no available upstream for context id `{context_id}`")]
    NoAvailableEndpoint { context_id: String },

    /// The request URL or a selected upstream URL could not be parsed.
    #[error("invalid url `{url}`: {reason}")]
    InvalidUrl { url: String, reason: String },

    /// Terminal transport failure after the retry budget ran out.
    #[error(
        "{source} executing {method} {url} (attempts: {attempts}, elapsed: {}ms)",
        elapsed.as_millis()
    )]
    Io {
        method: Method,
        url: String,
        attempts: u32,
        elapsed: Duration,
        #[source]
        source: io::Error,
    },
}

impl DispatchError {
    /// True for failures caused by topology or configuration rather than the network.
    pub fn is_topology(&self) -> bool {
        matches!(
            self,
            DispatchError::TopologyNotFound { .. } | DispatchError::NoAvailableEndpoint { .. }
        )
    }
}

/// A transport failure that may be retried.
///
/// Carries the method and logical URL of the request that failed so the
/// terminal error can name them.
#[derive(Debug, Error)]
#[error("{source} executing {method} {url}")]
pub struct RetryableError {
    pub method: Method,
    pub url: String,
    #[source]
    pub source: io::Error,
}

impl RetryableError {
    pub fn new(method: Method, url: impl Into<String>, source: io::Error) -> Self {
        Self {
            method,
            url: url.into(),
            source,
        }
    }
}
