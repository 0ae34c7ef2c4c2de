//! Outbound transport.
//!
//! The dispatcher only needs "send this request, give me a response or an
//! I/O error". Any `io::Error` returned here is treated as transient.

pub mod http;

use std::io;

use async_trait::async_trait;

use crate::dispatch::{DispatchRequest, DispatchResponse};

pub use self::http::HyperTransport;

/// Executes one already-rewritten request against a concrete upstream.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn do_request(&self, request: DispatchRequest) -> io::Result<DispatchResponse>;
}
