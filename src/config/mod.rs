//! Gateway configuration.
//!
//! [`GatewayConfig`] is assembled once at startup from the upstream
//! settings (API base URL, timeout) and a route declaration loaded from
//! a [`RouteSource`]. It is immutable afterwards and shared by `Arc`.
//! Submodules provide the declaration data model, validation and the
//! concrete sources.

pub mod model;
pub mod sources;
pub mod validation;

use std::time::Duration;

use async_trait::async_trait;
use url::Url;

use crate::error::GatewayError;
use model::RouteConfig;

/// Upstream base URL used when `API_URL` is unset.
pub const DEFAULT_API_URL: &str = "http://localhost:3001";

/// Upstream call timeout used when neither the CLI nor the route sets one.
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// SHA-256 fingerprint of a route declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteDigest(pub String);

impl RouteDigest {
    #[must_use]
    pub fn short(&self) -> &str {
        self.0.get(..8).unwrap_or(&self.0)
    }
}

// async_trait is required here because RouteSource is used as Box<dyn RouteSource>
// and native async fn in traits does not support dyn dispatch.
#[async_trait]
pub trait RouteSource: Send + Sync {
    fn name(&self) -> &'static str;
    async fn load(&self) -> Result<(RouteConfig, RouteDigest), GatewayError>;
}

#[derive(Debug, Clone)]
pub struct UpstreamSettings {
    pub base_url: Url,
    pub timeout: Duration,
}

impl UpstreamSettings {
    pub fn new(api_url: &str, timeout_ms: u64) -> Result<Self, GatewayError> {
        let invalid = |reason: &str| GatewayError::InvalidApiUrl {
            url: api_url.to_string(),
            reason: reason.to_string(),
        };

        let base_url = Url::parse(api_url).map_err(|e| invalid(&e.to_string()))?;
        if base_url.scheme() != "http" && base_url.scheme() != "https" {
            return Err(invalid("expected an http or https URL"));
        }
        if base_url.host_str().is_none() {
            return Err(invalid("missing host"));
        }
        if base_url.query().is_some() || base_url.fragment().is_some() {
            return Err(invalid("query strings and fragments are not allowed"));
        }
        if timeout_ms == 0 {
            return Err(invalid("timeout must be greater than zero"));
        }

        Ok(Self {
            base_url,
            timeout: Duration::from_millis(timeout_ms),
        })
    }

    /// Join the base URL (including any path prefix) with a rendered
    /// upstream path.
    #[must_use]
    pub fn join(&self, path: &str) -> String {
        format!("{}{path}", self.base_url.as_str().trim_end_matches('/'))
    }
}

#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub upstream: UpstreamSettings,
    pub routes: RouteConfig,
    pub source: String,
    pub digest: RouteDigest,
}

impl GatewayConfig {
    /// Load the route declaration from `source` and pair it with the
    /// upstream settings.
    pub async fn assemble(
        upstream: UpstreamSettings,
        source: &dyn RouteSource,
    ) -> Result<Self, GatewayError> {
        let (routes, digest) = source.load().await?;
        Ok(Self {
            upstream,
            routes,
            source: source.name().to_string(),
            digest,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_upstream_is_local_api() {
        let upstream = UpstreamSettings::new(DEFAULT_API_URL, DEFAULT_TIMEOUT_MS).unwrap();
        assert_eq!(upstream.base_url.as_str(), "http://localhost:3001/");
        assert_eq!(upstream.timeout, Duration::from_secs(10));
    }

    #[test]
    fn join_keeps_path_prefix() {
        let upstream = UpstreamSettings::new("http://api:3001/v1/", 1000).unwrap();
        assert_eq!(upstream.join("/cart/mini"), "http://api:3001/v1/cart/mini");

        let upstream = UpstreamSettings::new("http://api:3001", 1000).unwrap();
        assert_eq!(upstream.join("/cart/mini"), "http://api:3001/cart/mini");
    }

    #[test]
    fn rejects_non_http_urls() {
        assert!(UpstreamSettings::new("ftp://api:21", 1000).is_err());
        assert!(UpstreamSettings::new("not a url", 1000).is_err());
        assert!(UpstreamSettings::new("http://api:3001/?x=1", 1000).is_err());
    }

    #[test]
    fn rejects_zero_timeout() {
        assert!(UpstreamSettings::new(DEFAULT_API_URL, 0).is_err());
    }

    #[test]
    fn digest_short_form() {
        let digest = RouteDigest("0123456789abcdef".into());
        assert_eq!(digest.short(), "01234567");
    }
}
