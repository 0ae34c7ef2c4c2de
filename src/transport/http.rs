//! HTTP/1.1 and HTTP/2 transport over the hyper-util client.

use std::io;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use hyper::Request;
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};

use crate::config::TransportConfig;
use crate::dispatch::{DispatchRequest, DispatchResponse};
use crate::transport::Transport;

/// Plain-HTTP transport. Every failure, timeouts included, becomes an `io::Error`.
#[derive(Clone)]
pub struct HyperTransport {
    client: Client<HttpConnector, Body>,
    request_timeout: Duration,
    max_body_bytes: usize,
}

impl HyperTransport {
    pub fn new(config: &TransportConfig) -> Self {
        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());

        Self {
            client,
            request_timeout: Duration::from_millis(config.request_timeout_ms),
            max_body_bytes: config.max_body_bytes,
        }
    }

    async fn send(&self, request: DispatchRequest) -> io::Result<DispatchResponse> {
        let mut builder = Request::builder()
            .method(request.method().clone())
            .uri(request.url());
        if let Some(headers) = builder.headers_mut() {
            for (name, value) in request.headers() {
                headers.append(name.clone(), value.clone());
            }
        }
        let outbound = builder
            .body(Body::from(request.body().clone()))
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;

        let response = self.client.request(outbound).await.map_err(io::Error::other)?;

        let (parts, body) = response.into_parts();
        let body = axum::body::to_bytes(Body::new(body), self.max_body_bytes)
            .await
            .map_err(io::Error::other)?;

        Ok(DispatchResponse {
            status: parts.status,
            headers: parts.headers,
            body,
        })
    }
}

impl Default for HyperTransport {
    fn default() -> Self {
        Self::new(&TransportConfig::default())
    }
}

#[async_trait]
impl Transport for HyperTransport {
    async fn do_request(&self, request: DispatchRequest) -> io::Result<DispatchResponse> {
        let url = request.url().to_string();
        match tokio::time::timeout(self.request_timeout, self.send(request)).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(url = %url, timeout = ?self.request_timeout, "Upstream request timed out");
                Err(io::Error::new(
                    io::ErrorKind::TimedOut,
                    format!("request timed out after {}ms", self.request_timeout.as_millis()),
                ))
            }
        }
    }
}
