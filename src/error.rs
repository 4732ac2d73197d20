//! Unified error types for the gateway.
//!
//! [`GatewayError`] covers startup and CLI failures (config loading,
//! validation, binding). [`ProxyError`] covers the request path: it is
//! produced when an upstream call cannot complete and renders itself as
//! the standardized gateway-error response. [`ValidationError`] carries
//! one route-declaration problem with an optional hint.

use std::path::PathBuf;

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};

#[derive(Debug, Clone)]
pub struct ValidationError {
    pub route: String,
    pub field: String,
    pub message: String,
    pub suggestion: Option<String>,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "  route {}: {}: {}", self.route, self.field, self.message)?;
        if let Some(ref suggestion) = self.suggestion {
            write!(f, " ({suggestion})")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

fn format_errors(errors: &[ValidationError]) -> String {
    use std::fmt::Write;
    let mut buf = String::new();
    for (i, e) in errors.iter().enumerate() {
        if i > 0 {
            buf.push('\n');
        }
        // write! to String is infallible
        let _ = write!(buf, "{e}");
    }
    buf
}

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum GatewayError {
    #[error("Routes file not found: {}", path.display())]
    RoutesFileNotFound { path: PathBuf },

    #[error("Routes parse error in {path}:\n  {source}")]
    RoutesParse {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Route validation failed:\n{}", format_errors(.errors))]
    RoutesValidation { errors: Vec<ValidationError> },

    #[error("Unsupported routes file format: '{0}'")]
    UnsupportedFormat(String),

    #[error("Invalid API URL '{url}': {reason}")]
    InvalidApiUrl { url: String, reason: String },

    #[error("Invalid address: {0}")]
    AddressParse(#[from] std::net::AddrParseError),

    #[error("Invalid URI: {source}")]
    UriParse {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("HTTP request failed: {source}")]
    HttpRequest {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("File already exists: {}", path.display())]
    FileExists { path: PathBuf },

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("Health check failed with status {0}")]
    HealthCheckFailed(hyper::StatusCode),
}

/// Failure of a single proxied exchange.
///
/// Non-2xx upstream statuses are not errors; they are relayed as-is.
#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    #[error("upstream {uri} unreachable: {source}")]
    UpstreamUnreachable {
        uri: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("upstream {uri} did not respond within {timeout_ms}ms")]
    UpstreamTimeout { uri: String, timeout_ms: u64 },

    #[error("failed to read upstream response from {uri}: {source}")]
    UpstreamBody {
        uri: String,
        #[source]
        source: hyper::Error,
    },

    #[error("could not build upstream request: {0}")]
    TransportFailure(String),
}

impl ProxyError {
    /// Stable machine-readable kind exposed in the gateway-error body.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::UpstreamUnreachable { .. }
            | Self::UpstreamTimeout { .. }
            | Self::UpstreamBody { .. } => "upstream_unreachable",
            Self::TransportFailure(_) => "transport_failure",
        }
    }

    /// Fixed caller-facing message. Internal details stay in the logs.
    #[must_use]
    pub const fn public_message(&self) -> &'static str {
        match self {
            Self::UpstreamUnreachable { .. } => "the upstream API could not be reached",
            Self::UpstreamTimeout { .. } => "the upstream API did not respond in time",
            Self::UpstreamBody { .. } => "the upstream API closed the connection",
            Self::TransportFailure(_) => "the request could not be forwarded",
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        json_error(StatusCode::BAD_GATEWAY, self.kind(), self.public_message())
    }
}

/// Build a JSON error response produced by the gateway itself.
#[must_use]
pub fn json_error(status: StatusCode, error: &str, message: &str) -> Response {
    let body = serde_json::json!({ "error": error, "message": message }).to_string();
    (
        status,
        [(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        )],
        body,
    )
        .into_response()
}
