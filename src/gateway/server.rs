//! HTTP gateway server.
//!
//! # Responsibilities
//! - Create Axum Router with the catch-all handler
//! - Wire up middleware (request ID, tracing, timeout)
//! - Buffer inbound requests and hand them to the dispatch queue
//! - Map dispatch errors to HTTP status codes

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    routing::any,
    Json, Router,
};
use serde_json::json;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::GatewayConfig;
use crate::dispatch::Dispatcher;
use crate::error::DispatchError;
use crate::gateway::queue::{DispatchQueue, QueueError};
use crate::gateway::request::{self, MakeRequestUuid};
use crate::lifecycle::Shutdown;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct GatewayState {
    pub queue: DispatchQueue,
    pub default_context_id: Option<Arc<str>>,
    pub max_body_bytes: usize,
}

/// Inbound HTTP front for a [`Dispatcher`].
pub struct GatewayServer {
    router: Router,
}

impl GatewayServer {
    /// Start the dispatch workers and build the router.
    pub fn new(config: GatewayConfig, dispatcher: Arc<Dispatcher>, shutdown: &Shutdown) -> Self {
        let queue = DispatchQueue::start(dispatcher, config.queue_capacity, config.workers, shutdown);
        let state = GatewayState {
            queue,
            default_context_id: config.default_context_id.as_deref().map(Arc::from),
            max_body_bytes: config.max_body_bytes,
        };

        let router = Self::build_router(&config, state);
        Self { router }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &GatewayConfig, state: GatewayState) -> Router {
        let middleware = ServiceBuilder::new()
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
            .layer(TraceLayer::new_for_http())
            .layer(TimeoutLayer::new(Duration::from_secs(config.request_timeout_secs)))
            .layer(PropagateRequestIdLayer::x_request_id());

        Router::new()
            .route("/{*path}", any(gateway_handler))
            .route("/", any(gateway_handler))
            .with_state(state)
            .layer(middleware)
    }

    /// Serve until the shutdown signal fires.
    pub async fn run(self, listener: TcpListener, mut shutdown: broadcast::Receiver<()>) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "Gateway server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("Gateway server stopped");
        Ok(())
    }
}

/// Status code a dispatch failure is answered with.
pub fn status_for(error: &DispatchError) -> StatusCode {
    if error.is_topology() {
        return StatusCode::SERVICE_UNAVAILABLE;
    }
    match error {
        DispatchError::InvalidUrl { .. } => StatusCode::BAD_REQUEST,
        DispatchError::Io { .. } => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(json!({ "error": message.into() }))).into_response()
}

/// Catch-all handler: buffer, enqueue, await the worker's answer.
async fn gateway_handler(State(state): State<GatewayState>, inbound: Request<Body>) -> Response {
    let request_id = request::request_id(inbound.headers());

    let Some(context_id) = request::context_id(inbound.headers(), state.default_context_id.as_deref()) else {
        tracing::warn!(request_id = %request_id, "Request without context id");
        return error_response(StatusCode::BAD_REQUEST, "missing x-context-id header");
    };

    let (parts, body) = inbound.into_parts();
    let body = match axum::body::to_bytes(body, state.max_body_bytes).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!(request_id = %request_id, error = %e, "Failed to read request body");
            return error_response(StatusCode::PAYLOAD_TOO_LARGE, "request body too large");
        }
    };

    tracing::debug!(
        request_id = %request_id,
        context_id = %context_id,
        method = %parts.method,
        uri = %parts.uri,
        "Queueing request"
    );
    let dispatch_request = request::to_dispatch_request(parts, body, context_id);

    let answer = match state.queue.submit(request_id.clone(), dispatch_request) {
        Ok(answer) => answer,
        Err(e) => {
            if e == QueueError::Full {
                crate::observability::metrics::record_queue_rejection();
            }
            tracing::warn!(request_id = %request_id, error = %e, "Request rejected");
            return error_response(StatusCode::SERVICE_UNAVAILABLE, e.to_string());
        }
    };

    match answer.await {
        Ok(Ok(response)) => request::into_response(response),
        Ok(Err(e)) => {
            tracing::warn!(request_id = %request_id, error = %e, "Dispatch failed");
            error_response(status_for(&e), e.to_string())
        }
        Err(_) => {
            tracing::error!(request_id = %request_id, "Dispatch worker dropped the request");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "dispatch worker stopped")
        }
    }
}
