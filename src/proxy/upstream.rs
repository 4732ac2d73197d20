//! A single upstream exchange.
//!
//! [`dispatch`] sends one request through the pooled client and waits
//! for the complete response body, the whole exchange bounded by the
//! call's timeout. Dropping the returned future aborts the exchange.

use std::time::{Duration, Instant};

use axum::http::{HeaderMap, Method, StatusCode};
use bytes::Bytes;
use http_body_util::{BodyExt, Full};

use crate::error::ProxyError;
use crate::server::HttpClient;

#[derive(Debug)]
pub struct UpstreamCall {
    pub method: Method,
    pub uri: String,
    pub headers: HeaderMap,
    pub body: Bytes,
    pub timeout: Duration,
}

#[derive(Debug)]
pub struct UpstreamReply {
    pub status: StatusCode,
    pub body: Bytes,
    pub latency: Duration,
}

impl UpstreamReply {
    #[must_use]
    pub fn latency_ms(&self) -> u64 {
        u64::try_from(self.latency.as_millis()).unwrap_or(u64::MAX)
    }
}

pub async fn dispatch(client: &HttpClient, call: UpstreamCall) -> Result<UpstreamReply, ProxyError> {
    let UpstreamCall {
        method,
        uri,
        headers,
        body,
        timeout,
    } = call;

    let parsed: hyper::Uri = uri
        .parse()
        .map_err(|e| ProxyError::TransportFailure(format!("invalid upstream URI '{uri}': {e}")))?;

    let mut builder = hyper::Request::builder().method(method).uri(parsed);
    if let Some(map) = builder.headers_mut() {
        map.extend(headers);
    }
    let request = builder
        .body(Full::new(body))
        .map_err(|e| ProxyError::TransportFailure(e.to_string()))?;

    let start = Instant::now();
    let exchange = async {
        let response = client
            .request(request)
            .await
            .map_err(|e| ProxyError::UpstreamUnreachable {
                uri: uri.clone(),
                source: Box::new(e),
            })?;

        let status = response.status();
        let body = response
            .into_body()
            .collect()
            .await
            .map_err(|e| ProxyError::UpstreamBody {
                uri: uri.clone(),
                source: e,
            })?
            .to_bytes();

        Ok::<_, ProxyError>((status, body))
    };

    let (status, body) = tokio::time::timeout(timeout, exchange)
        .await
        .map_err(|_| ProxyError::UpstreamTimeout {
            uri: uri.clone(),
            timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
        })??;

    Ok(UpstreamReply {
        status,
        body,
        latency: start.elapsed(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::build_http_client;

    #[tokio::test]
    async fn malformed_uri_is_a_transport_failure() {
        let client = build_http_client();
        let err = dispatch(
            &client,
            UpstreamCall {
                method: Method::GET,
                uri: "http://exa mple/cart".into(),
                headers: HeaderMap::new(),
                body: Bytes::new(),
                timeout: Duration::from_secs(1),
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.kind(), "transport_failure");
    }

    #[tokio::test]
    async fn refused_connection_is_unreachable() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = build_http_client();
        let err = dispatch(
            &client,
            UpstreamCall {
                method: Method::GET,
                uri: format!("http://{addr}/cart/mini"),
                headers: HeaderMap::new(),
                body: Bytes::new(),
                timeout: Duration::from_secs(5),
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ProxyError::UpstreamUnreachable { .. }));
    }
}
