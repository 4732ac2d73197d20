//! `storefront-gateway health`: query `/health` on a running instance.

use std::time::Duration;

use bytes::Bytes;
use http_body_util::{BodyExt, Full};

use crate::cli::HealthArgs;
use crate::error::GatewayError;
use crate::health::HealthResponse;
use crate::server::{build_http_client, HttpClient};

const HEALTH_TIMEOUT: Duration = Duration::from_secs(10);

pub async fn execute(args: HealthArgs) -> Result<(), GatewayError> {
    let body = fetch(&build_http_client(), &args.url).await?;

    if args.json {
        println!("{}", String::from_utf8_lossy(&body));
        return Ok(());
    }

    let health: HealthResponse =
        serde_json::from_slice(&body).map_err(|e| GatewayError::HttpRequest {
            source: Box::new(e),
        })?;
    println!("{}", summarize(&args.url, &health));
    Ok(())
}

/// GET `<base>/health` and return the body of a 2xx answer.
async fn fetch(client: &HttpClient, base: &str) -> Result<Bytes, GatewayError> {
    let uri: hyper::Uri = format!("{}/health", base.trim_end_matches('/'))
        .parse()
        .map_err(|e: hyper::http::uri::InvalidUri| GatewayError::UriParse {
            source: Box::new(e),
        })?;
    let request = hyper::Request::get(uri)
        .body(Full::new(Bytes::new()))
        .map_err(|e| GatewayError::HttpRequest {
            source: Box::new(e),
        })?;

    let exchange = async {
        let response = client.request(request).await.map_err(|e| GatewayError::HttpRequest {
            source: Box::new(e),
        })?;
        let status = response.status();
        let body = response
            .into_body()
            .collect()
            .await
            .map_err(|e| GatewayError::HttpRequest {
                source: Box::new(e),
            })?
            .to_bytes();
        Ok::<_, GatewayError>((status, body))
    };

    let (status, body) = tokio::time::timeout(HEALTH_TIMEOUT, exchange)
        .await
        .map_err(|_| GatewayError::HttpRequest {
            source: format!("no answer within {}s", HEALTH_TIMEOUT.as_secs()).into(),
        })??;

    if !status.is_success() {
        return Err(GatewayError::HealthCheckFailed(status));
    }
    Ok(body)
}

fn summarize(url: &str, health: &HealthResponse) -> String {
    let stats = &health.stats;
    [
        format!("\u{2713} storefront-gateway is {} ({url})", health.status),
        format!("  version:   {} ({})", health.version, health.commit),
        format!("  uptime:    {}", format_uptime(health.uptime_seconds)),
        format!(
            "  upstream:  {} (timeout {}ms)",
            health.upstream.base_url, health.upstream.timeout_ms
        ),
        format!(
            "  routes:    {} from {} ({})",
            health.routes.count, health.routes.source, health.routes.digest
        ),
        format!(
            "  requests:  {} relayed, {} gateway errors",
            stats.relayed, stats.gateway_errors
        ),
        format!(
            "  telemetry: {} accepted, {} dropped",
            stats.telemetry_accepted, stats.telemetry_dropped
        ),
    ]
    .join("\n")
}

fn format_uptime(seconds: u64) -> String {
    match (seconds / 3600, (seconds % 3600) / 60, seconds % 60) {
        (0, 0, s) => format!("{s}s"),
        (0, m, s) => format!("{m}m {s}s"),
        (h, m, s) => format!("{h}h {m}m {s}s"),
    }
}
