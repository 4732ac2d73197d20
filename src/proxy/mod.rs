//! Core HTTP request forwarding.
//!
//! [`forward_handler`] is the Axum fallback that receives every
//! non-`/health` request, looks it up in the compiled [`RouteTable`]
//! and hands it to the matching [`ProxyRoute`]. Submodules handle path
//! templates ([`template`]), lookup ([`routing`]), the per-route
//! handler and its factory ([`route`]), header construction
//! ([`headers`]) and the upstream exchange ([`upstream`]).

pub mod headers;
pub mod route;
pub mod routing;
pub mod template;
pub mod upstream;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::{ConnectInfo, State};
use axum::http::{header, HeaderMap, HeaderValue, Method, StatusCode, Uri};
use axum::response::Response;

pub use route::{Delivery, Inbound, ProxyRoute, RouteOptions};
pub use routing::{Lookup, RouteTable};

use crate::error::json_error;
use crate::server::AppState;

pub async fn forward_handler(
    State(state): State<Arc<AppState>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    method: Method,
    uri: Uri,
    req_headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let path = uri.path();
    let correlation_id = req_headers
        .get(headers::CORRELATION_ID)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map_or_else(|| uuid::Uuid::new_v4().to_string(), String::from);

    let (route, params) = match state.routes.lookup(&method, path) {
        Lookup::Matched { route, params } => (route, params),
        Lookup::MethodNotAllowed { allowed } => {
            tracing::warn!(
                correlation_id = %correlation_id,
                method = %method,
                path = %path,
                "method not allowed"
            );
            return route::with_correlation_id(method_not_allowed(&allowed), &correlation_id);
        }
        Lookup::NotFound => {
            tracing::warn!(
                correlation_id = %correlation_id,
                method = %method,
                path = %path,
                "no route matched"
            );
            return route::with_correlation_id(
                json_error(
                    StatusCode::NOT_FOUND,
                    "not_found",
                    "no route matches this path",
                ),
                &correlation_id,
            );
        }
    };

    let body = match body {
        Ok(body) => body,
        Err(rejection) => {
            tracing::warn!(
                correlation_id = %correlation_id,
                route = %route.label(),
                status = rejection.status().as_u16(),
                error = %rejection.body_text(),
                "request body rejected"
            );
            return route::with_correlation_id(
                json_error(
                    rejection.status(),
                    "transport_failure",
                    "the request body could not be read",
                ),
                &correlation_id,
            );
        }
    };

    tracing::info!(
        correlation_id = %correlation_id,
        route = %route.label(),
        path = %path,
        body_bytes = body.len(),
        "request received"
    );

    let inbound = Inbound {
        params,
        headers: req_headers,
        body,
        client_ip: addr.ip().to_string(),
        correlation_id,
    };
    route.handle(&state, inbound).await
}

fn method_not_allowed(allowed: &[Method]) -> Response {
    let mut response = json_error(
        StatusCode::METHOD_NOT_ALLOWED,
        "method_not_allowed",
        "this path does not accept the request method",
    );
    let allow = allowed
        .iter()
        .map(Method::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    if let Ok(val) = HeaderValue::from_str(&allow) {
        response.headers_mut().insert(header::ALLOW, val);
    }
    response
}
