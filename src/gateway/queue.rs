//! Inbound request queue.
//!
//! # Responsibilities
//! - Decouple the HTTP listener from dispatch work
//! - Run a fixed pool of workers that call [`Dispatcher::execute`]
//! - Refuse new work immediately when the queue is full
//!
//! # Design Decisions
//! - Bounded mpsc channel; `try_send` so the listener never blocks
//! - Each exchange carries a oneshot sender for its answer
//! - On the shutdown broadcast the queue closes; workers answer what is
//!   already queued, then stop

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::{broadcast, mpsc, oneshot, Mutex};
use tracing::Instrument;

use crate::dispatch::{DispatchRequest, DispatchResponse, Dispatcher};
use crate::error::DispatchError;
use crate::lifecycle::Shutdown;

pub type DispatchResult = Result<DispatchResponse, DispatchError>;

/// One queued request and the channel its result goes back on.
struct Exchange {
    request_id: String,
    request: DispatchRequest,
    reply: oneshot::Sender<DispatchResult>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum QueueError {
    #[error("dispatch queue is full")]
    Full,

    #[error("dispatch queue is closed")]
    Closed,
}

/// Producer handle of the dispatch queue.
#[derive(Clone)]
pub struct DispatchQueue {
    tx: mpsc::Sender<Exchange>,
}

impl DispatchQueue {
    /// Create the queue and spawn `workers` consumers.
    pub fn start(dispatcher: Arc<Dispatcher>, capacity: usize, workers: usize, shutdown: &Shutdown) -> Self {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let rx = Arc::new(Mutex::new(rx));

        for id in 0..workers.max(1) {
            tokio::spawn(worker(id, dispatcher.clone(), rx.clone(), shutdown.subscribe()));
        }
        tracing::info!(capacity, workers, "Dispatch queue started");

        Self { tx }
    }

    /// Enqueue a request; the returned receiver yields its result.
    pub fn submit(
        &self,
        request_id: impl Into<String>,
        request: DispatchRequest,
    ) -> Result<oneshot::Receiver<DispatchResult>, QueueError> {
        let (reply, answer) = oneshot::channel();
        let exchange = Exchange {
            request_id: request_id.into(),
            request,
            reply,
        };

        match self.tx.try_send(exchange) {
            Ok(()) => Ok(answer),
            Err(mpsc::error::TrySendError::Full(_)) => Err(QueueError::Full),
            Err(mpsc::error::TrySendError::Closed(_)) => Err(QueueError::Closed),
        }
    }
}

async fn worker(
    id: usize,
    dispatcher: Arc<Dispatcher>,
    rx: Arc<Mutex<mpsc::Receiver<Exchange>>>,
    mut shutdown: broadcast::Receiver<()>,
) {
    loop {
        let next = tokio::select! {
            next = async { rx.lock().await.recv().await } => next,
            _ = shutdown.recv() => {
                tracing::debug!(worker = id, "Dispatch worker received shutdown signal, draining queue");
                rx.lock().await.close();
                break;
            }
        };

        match next {
            Some(exchange) => handle(id, &dispatcher, exchange).await,
            None => return,
        }
    }

    // Closed: accepted requests are still answered, new ones are refused.
    loop {
        let next = rx.lock().await.recv().await;
        let Some(exchange) = next else {
            break;
        };
        handle(id, &dispatcher, exchange).await;
    }
    tracing::debug!(worker = id, "Dispatch worker stopped");
}

async fn handle(id: usize, dispatcher: &Dispatcher, exchange: Exchange) {
    let span = tracing::info_span!(
        "dispatch",
        worker = id,
        request_id = %exchange.request_id,
        context_id = %exchange.request.context_id(),
    );

    let result = dispatcher.execute(&exchange.request).instrument(span.clone()).await;
    if exchange.reply.send(result).is_err() {
        // the inbound connection went away
        span.in_scope(|| tracing::debug!("Dropping result for abandoned request"));
    }
}
