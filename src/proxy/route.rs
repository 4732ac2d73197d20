//! The per-endpoint proxy handler.
//!
//! Every public route is a [`ProxyRoute`] built by the same factory,
//! [`ProxyRoute::new`], from a method, a public path template and
//! [`RouteOptions`]. Handling a request renders the upstream path,
//! forwards the raw body and allow-listed headers, and either relays
//! the upstream reply or, for fire-and-forget routes, answers with the
//! declared status straight away.

use std::collections::HashMap;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use axum::http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;

use super::headers::{self, ForwardMeta, CORRELATION_ID};
use super::template::PathTemplate;
use super::upstream::{self, UpstreamCall};
use crate::config::model::{Defaults, Route, DEFAULT_FIRE_AND_FORGET_STATUS};
use crate::config::UpstreamSettings;
use crate::error::ProxyError;
use crate::server::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Await the upstream and relay its status and body.
    Relay,
    /// Answer with `status` at once; the upstream outcome is only logged.
    FireAndForget { status: StatusCode },
}

#[derive(Debug, Clone)]
pub struct RouteOptions {
    pub upstream: PathTemplate,
    pub delivery: Delivery,
    pub timeout: Duration,
    pub forward_headers: Vec<HeaderName>,
    pub proxy_headers: bool,
}

impl RouteOptions {
    /// Relay options with no forwarded headers.
    #[must_use]
    pub fn relay(upstream: PathTemplate, timeout: Duration) -> Self {
        Self {
            upstream,
            delivery: Delivery::Relay,
            timeout,
            forward_headers: Vec::new(),
            proxy_headers: true,
        }
    }
}

/// Request-scoped input to [`ProxyRoute::handle`].
#[derive(Debug)]
pub struct Inbound {
    pub params: HashMap<String, String>,
    pub headers: HeaderMap,
    pub body: Bytes,
    pub client_ip: String,
    pub correlation_id: String,
}

#[derive(Debug, Clone)]
pub struct ProxyRoute {
    method: Method,
    public: PathTemplate,
    options: RouteOptions,
    label: String,
}

impl ProxyRoute {
    #[must_use]
    pub fn new(method: Method, public: PathTemplate, options: RouteOptions) -> Self {
        let label = format!("{method} {public}");
        Self {
            method,
            public,
            options,
            label,
        }
    }

    /// Compile a declared route. Defaults contribute forwarded headers and
    /// the proxy-header switch; the route's own timeout wins over
    /// `default_timeout`.
    pub fn from_declaration(
        route: &Route,
        defaults: &Defaults,
        default_timeout: Duration,
    ) -> Result<Self, String> {
        let method = route
            .method
            .to_uppercase()
            .parse::<Method>()
            .map_err(|e| format!("invalid method '{}': {e}", route.method))?;
        let public = PathTemplate::parse(&route.path)?;
        let upstream = PathTemplate::parse(&route.upstream)?;

        let delivery = if route.fire_and_forget {
            let code = route.status.unwrap_or(DEFAULT_FIRE_AND_FORGET_STATUS);
            let status = StatusCode::from_u16(code)
                .map_err(|e| format!("invalid status {code}: {e}"))?;
            Delivery::FireAndForget { status }
        } else {
            Delivery::Relay
        };

        let mut forward_headers: Vec<HeaderName> = Vec::new();
        for name in defaults.forward_headers.iter().chain(&route.forward_headers) {
            let parsed = name
                .parse::<HeaderName>()
                .map_err(|e| format!("invalid header '{name}': {e}"))?;
            if !forward_headers.contains(&parsed) {
                forward_headers.push(parsed);
            }
        }

        Ok(Self::new(
            method,
            public,
            RouteOptions {
                upstream,
                delivery,
                timeout: route.timeout.map_or(default_timeout, Duration::from_millis),
                forward_headers,
                proxy_headers: defaults.proxy_headers,
            },
        ))
    }

    #[must_use]
    pub const fn method(&self) -> &Method {
        &self.method
    }

    #[must_use]
    pub const fn public(&self) -> &PathTemplate {
        &self.public
    }

    #[must_use]
    pub const fn options(&self) -> &RouteOptions {
        &self.options
    }

    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Render the upstream path for the captured parameters.
    #[must_use]
    pub fn upstream_path(&self, params: &HashMap<String, String>) -> String {
        self.options.upstream.render(params)
    }

    fn prepare(&self, upstream: &UpstreamSettings, inbound: Inbound) -> UpstreamCall {
        let has_body = !inbound.body.is_empty();
        let headers = headers::build_upstream_headers(
            &inbound.headers,
            &self.options.forward_headers,
            has_body,
            ForwardMeta {
                client_ip: &inbound.client_ip,
                correlation_id: &inbound.correlation_id,
                proxy_headers: self.options.proxy_headers,
            },
        );

        UpstreamCall {
            method: self.method.clone(),
            uri: upstream.join(&self.upstream_path(&inbound.params)),
            headers,
            body: inbound.body,
            timeout: self.options.timeout,
        }
    }

    pub async fn handle(&self, state: &Arc<AppState>, inbound: Inbound) -> Response {
        let correlation_id = inbound.correlation_id.clone();
        let call = self.prepare(&state.config.upstream, inbound);

        match self.options.delivery {
            Delivery::Relay => match upstream::dispatch(&state.http_client, call).await {
                Ok(reply) => {
                    state.stats.relayed.fetch_add(1, Ordering::Relaxed);
                    tracing::info!(
                        correlation_id = %correlation_id,
                        route = %self.label,
                        status = reply.status.as_u16(),
                        latency_ms = reply.latency_ms(),
                        "upstream responded"
                    );
                    (
                        reply.status,
                        headers::relay_headers(&correlation_id),
                        reply.body,
                    )
                        .into_response()
                }
                Err(e) => self.gateway_error(state, &correlation_id, e),
            },
            Delivery::FireAndForget { status } => {
                state.stats.telemetry_accepted.fetch_add(1, Ordering::Relaxed);
                tokio::spawn(forward_detached(
                    Arc::clone(state),
                    self.label.clone(),
                    correlation_id.clone(),
                    call,
                ));
                with_correlation_id(status.into_response(), &correlation_id)
            }
        }
    }

    fn gateway_error(&self, state: &AppState, correlation_id: &str, err: ProxyError) -> Response {
        state.stats.gateway_errors.fetch_add(1, Ordering::Relaxed);
        tracing::error!(
            correlation_id = %correlation_id,
            route = %self.label,
            kind = err.kind(),
            error = %err,
            "upstream call failed"
        );
        if let Some(ref alerts) = state.alerts {
            alerts.notify(&format!(
                ":rotating_light: `{}` failed ({}): {err} [correlation id {correlation_id}]",
                self.label,
                err.kind()
            ));
        }
        with_correlation_id(err.into_response(), correlation_id)
    }
}

/// Fire-and-forget leg: runs after the caller already has its answer,
/// so failures are logged and counted, never surfaced.
async fn forward_detached(
    state: Arc<AppState>,
    label: String,
    correlation_id: String,
    call: UpstreamCall,
) {
    match upstream::dispatch(&state.http_client, call).await {
        Ok(reply) => {
            tracing::debug!(
                correlation_id = %correlation_id,
                route = %label,
                status = reply.status.as_u16(),
                latency_ms = reply.latency_ms(),
                "telemetry forwarded"
            );
        }
        Err(e) => {
            state.stats.telemetry_dropped.fetch_add(1, Ordering::Relaxed);
            tracing::warn!(
                correlation_id = %correlation_id,
                route = %label,
                kind = e.kind(),
                error = %e,
                "telemetry dropped"
            );
        }
    }
}

pub(crate) fn with_correlation_id(mut response: Response, correlation_id: &str) -> Response {
    if let Ok(val) = HeaderValue::from_str(correlation_id) {
        response.headers_mut().insert(CORRELATION_ID, val);
    }
    response
}
