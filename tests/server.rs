//! Integration tests for the HTTP server, health endpoint, and graceful shutdown.

use std::net::SocketAddr;
use std::sync::Arc;

use storefront_gateway::config::model::RouteConfig;
use storefront_gateway::config::{GatewayConfig, RouteDigest, UpstreamSettings};
use storefront_gateway::health::HealthResponse;
use storefront_gateway::server::{self, AppState};

fn test_config() -> GatewayConfig {
    GatewayConfig {
        upstream: UpstreamSettings::new("http://localhost:19999", 2_000).unwrap(),
        routes: RouteConfig::builtin(),
        source: "test".into(),
        digest: RouteDigest("0123456789abcdef".into()),
    }
}

async fn start_test_server() -> (SocketAddr, tokio::sync::oneshot::Sender<()>) {
    let state = Arc::new(AppState::new(test_config(), server::build_http_client()).unwrap());
    let router = server::build_router(state, 1_048_576);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

    tokio::spawn(async move {
        axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(async {
            let _ = shutdown_rx.await;
        })
        .await
        .unwrap();
    });

    (addr, shutdown_tx)
}

#[tokio::test]
async fn health_endpoint_returns_healthy() {
    let (addr, shutdown) = start_test_server().await;

    let resp = reqwest::get(format!("http://{addr}/health")).await.unwrap();
    assert_eq!(resp.status(), 200);

    let health: HealthResponse = resp.json().await.unwrap();
    assert_eq!(health.status, "healthy");
    assert_eq!(health.version, env!("CARGO_PKG_VERSION"));
    assert_eq!(health.upstream.base_url, "http://localhost:19999/");
    assert_eq!(health.upstream.timeout_ms, 2_000);
    assert_eq!(health.routes.source, "test");
    assert_eq!(health.routes.digest, "01234567");
    assert_eq!(health.routes.count, 6);
    assert_eq!(health.stats.relayed, 0);
    assert_eq!(health.stats.gateway_errors, 0);

    let _ = shutdown.send(());
}

#[tokio::test]
async fn unmatched_route_returns_json_404() {
    let (addr, shutdown) = start_test_server().await;

    let resp = reqwest::get(format!("http://{addr}/api/nonexistent"))
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
    assert!(resp.headers().get("x-correlation-id").is_some());

    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "not_found");

    let _ = shutdown.send(());
}

#[tokio::test]
async fn wrong_method_returns_405_with_allow() {
    let (addr, shutdown) = start_test_server().await;

    let resp = reqwest::get(format!("http://{addr}/api/vitals")).await.unwrap();
    assert_eq!(resp.status(), 405);
    assert_eq!(resp.headers().get("allow").unwrap(), "POST");

    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "method_not_allowed");

    let _ = shutdown.send(());
}

#[tokio::test]
async fn graceful_shutdown_works() {
    let (addr, shutdown) = start_test_server().await;

    let url = format!("http://{addr}/health");
    assert!(reqwest::get(&url).await.is_ok());

    let _ = shutdown.send(());
    tokio::time::sleep(std::time::Duration::from_millis(100)).await;

    let result = reqwest::get(&url).await;
    assert!(result.is_err());
}
