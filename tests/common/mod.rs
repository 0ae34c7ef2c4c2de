//! Shared utilities for integration tests.

use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use hyper::StatusCode;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use context_dispatch::config::DispatchConfig;
use context_dispatch::transport::Transport;
use context_dispatch::{DispatchRequest, DispatchResponse};

/// Static-mode config over `servers` with the given retry budget (`None` = disabled).
#[allow(dead_code)]
pub fn local_config(servers: &str, max_attempts: Option<u32>) -> DispatchConfig {
    let mut config = DispatchConfig::default();
    config.register.register_type = "local".into();
    config.register.server_lists = servers.into();
    if let Some(max_attempts) = max_attempts {
        config.register.props.enabled = true;
        config.register.props.max_attempts = max_attempts;
        config.register.props.period_ms = 1;
        config.register.props.max_period_ms = 5;
    }
    config
}

/// Transport that fails a fixed number of times, then answers 200 with the URL as body.
#[allow(dead_code)]
pub struct ScriptedTransport {
    failures: usize,
    calls: AtomicUsize,
    urls: Mutex<Vec<String>>,
}

#[allow(dead_code)]
impl ScriptedTransport {
    pub fn failing(failures: usize) -> Arc<Self> {
        Arc::new(Self {
            failures,
            calls: AtomicUsize::new(0),
            urls: Mutex::new(Vec::new()),
        })
    }

    pub fn healthy() -> Arc<Self> {
        Self::failing(0)
    }

    pub fn always_failing() -> Arc<Self> {
        Self::failing(usize::MAX)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn urls(&self) -> Vec<String> {
        self.urls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn do_request(&self, request: DispatchRequest) -> io::Result<DispatchResponse> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        self.urls.lock().unwrap().push(request.url().to_string());

        if call < self.failures {
            return Err(io::Error::new(
                io::ErrorKind::ConnectionRefused,
                format!("refused #{}", call + 1),
            ));
        }
        Ok(DispatchResponse::new(StatusCode::OK).with_body(request.url().to_string()))
    }
}

/// An address nothing listens on.
#[allow(dead_code)]
pub async fn closed_port() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

/// Start a simple mock backend that returns a fixed response.
#[allow(dead_code)]
pub async fn start_mock_backend(response: &'static str) -> SocketAddr {
    start_programmable_backend(move |_| async move { (200, response.to_string()) }).await
}

/// Start a mock backend that answers with `f(request_line)`.
#[allow(dead_code)]
pub async fn start_programmable_backend<F, Fut>(f: F) -> SocketAddr
where
    F: Fn(String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let f = Arc::new(f);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let f = f.clone();
                    tokio::spawn(async move {
                        let mut buf = vec![0u8; 8192];
                        let n = socket.read(&mut buf).await.unwrap_or(0);
                        let head = String::from_utf8_lossy(&buf[..n]).to_string();
                        let request_line = head.lines().next().unwrap_or_default().to_string();

                        let (status, body) = f(request_line).await;
                        let status_text = match status {
                            200 => "200 OK",
                            404 => "404 Not Found",
                            500 => "500 Internal Server Error",
                            503 => "503 Service Unavailable",
                            _ => "200 OK",
                        };

                        let response_str = format!(
                            "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status_text,
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response_str.as_bytes()).await;
                        let _ = socket.shutdown().await;
                        tokio::time::sleep(Duration::from_millis(10)).await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}
