//! End-to-end gateway tests: real sockets, hyper transport, mock upstreams.

mod common;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use context_dispatch::config::DispatchConfig;
use context_dispatch::discovery::InstanceRecord;
use context_dispatch::{Dispatcher, GatewayServer, Shutdown};

use common::{closed_port, local_config, start_mock_backend, start_programmable_backend};

struct RunningGateway {
    addr: SocketAddr,
    shutdown: Shutdown,
    handle: JoinHandle<Result<(), std::io::Error>>,
}

impl RunningGateway {
    fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

async fn start_gateway(config: DispatchConfig) -> RunningGateway {
    let dispatcher = Arc::new(Dispatcher::builder(&config).build());
    let shutdown = Shutdown::new();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = GatewayServer::new(config.gateway.clone(), dispatcher, &shutdown);
    let handle = tokio::spawn(server.run(listener, shutdown.subscribe()));

    RunningGateway { addr, shutdown, handle }
}

#[tokio::test]
async fn test_forwards_path_and_query_to_upstream() {
    let backend = start_programmable_backend(|request_line| async move { (200, request_line) }).await;
    let gateway = start_gateway(local_config(&backend.to_string(), None)).await;

    let response = reqwest::Client::new()
        .get(gateway.url("/orders/42?expand=items"))
        .header("x-context-id", "svcA")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    assert!(response.headers().contains_key("x-request-id"));
    assert_eq!(response.text().await.unwrap(), "GET /orders/42?expand=items HTTP/1.1");
}

#[tokio::test]
async fn test_spreads_requests_over_static_upstreams() {
    let first = start_mock_backend("first").await;
    let second = start_mock_backend("second").await;
    let gateway = start_gateway(local_config(&format!("{first},{second}"), None)).await;

    let client = reqwest::Client::new();
    let mut bodies = Vec::new();
    for _ in 0..4 {
        let response = client
            .get(gateway.url("/"))
            .header("x-context-id", "svcA")
            .send()
            .await
            .unwrap();
        bodies.push(response.text().await.unwrap());
    }

    assert_eq!(bodies, vec!["first", "second", "first", "second"]);
}

#[tokio::test]
async fn test_missing_context_id_is_rejected() {
    let backend = start_mock_backend("ok").await;
    let gateway = start_gateway(local_config(&backend.to_string(), None)).await;

    let response = reqwest::get(gateway.url("/")).await.unwrap();
    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn test_default_context_id_applies() {
    let backend = start_mock_backend("ok").await;
    let mut config = local_config(&backend.to_string(), None);
    config.gateway.default_context_id = Some("svcA".into());
    let gateway = start_gateway(config).await;

    let response = reqwest::get(gateway.url("/")).await.unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(response.text().await.unwrap(), "ok");
}

#[tokio::test]
async fn test_memory_registry_routes_by_context_id() {
    let backend = start_mock_backend("from-svcA").await;
    let mut config = local_config("", None);
    config.register.register_type = "memory".into();
    config.register.instances = vec![InstanceRecord::new(
        backend.ip().to_string(),
        backend.port(),
        "svcA",
    )];
    let gateway = start_gateway(config).await;

    let client = reqwest::Client::new();
    let known = client
        .get(gateway.url("/"))
        .header("x-context-id", "svcA")
        .send()
        .await
        .unwrap();
    assert_eq!(known.status(), 200);
    assert_eq!(known.text().await.unwrap(), "from-svcA");

    let unknown = client
        .get(gateway.url("/"))
        .header("x-context-id", "svcB")
        .send()
        .await
        .unwrap();
    assert_eq!(unknown.status(), 503);
    let body: serde_json::Value = unknown.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("svcB"));
}

#[tokio::test]
async fn test_unreachable_upstream_is_bad_gateway_after_retries() {
    let dead = closed_port().await;
    let gateway = start_gateway(local_config(&dead.to_string(), Some(2))).await;

    let response = reqwest::Client::new()
        .post(gateway.url("/submit"))
        .header("x-context-id", "svcA")
        .body("payload")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 502);
    let body: serde_json::Value = response.json().await.unwrap();
    let message = body["error"].as_str().unwrap();
    assert!(message.contains("executing POST /submit"), "{message}");
    assert!(message.contains("attempts: 2"), "{message}");
}

#[tokio::test]
async fn test_shutdown_stops_the_server() {
    let backend = start_mock_backend("ok").await;
    let gateway = start_gateway(local_config(&backend.to_string(), None)).await;

    gateway.shutdown.trigger();
    let result = tokio::time::timeout(Duration::from_secs(5), gateway.handle)
        .await
        .expect("server did not stop")
        .unwrap();
    assert!(result.is_ok());
}
