//! Concrete [`RouteSource`](super::RouteSource) implementations.
//!
//! [`builtin::BuiltinSource`] serves the compiled-in storefront table;
//! [`file_source::FileSource`] reads a YAML, JSON or TOML declaration
//! (formats gated by feature flags). [`parse_routes_str`] does the
//! format-specific deserialization for both the file source and the
//! `validate` command.

pub mod builtin;
pub mod file_source;

use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use crate::config::model::RouteConfig;
use crate::config::{RouteDigest, RouteSource};
use crate::error::GatewayError;
use builtin::BuiltinSource;
use file_source::FileSource;

/// File names probed in the working directory when `--routes` is not given.
pub const AUTO_DETECT_CANDIDATES: &[&str] = &[
    "gateway.yaml",
    "gateway.yml",
    "gateway.json",
    "gateway.toml",
];

/// Pick the route source: an explicit file, else the first
/// auto-detected file in the working directory, else the built-in table.
pub async fn resolve(explicit: Option<&Path>) -> Result<Box<dyn RouteSource>, GatewayError> {
    if let Some(path) = explicit {
        return Ok(Box::new(FileSource::new(path)?));
    }

    for name in AUTO_DETECT_CANDIDATES {
        let path = PathBuf::from(name);
        if tokio::fs::try_exists(&path).await.unwrap_or(false) {
            tracing::info!(path = %path.display(), "auto-detected routes file");
            return Ok(Box::new(FileSource::new(&path)?));
        }
    }

    Ok(Box::new(BuiltinSource))
}

/// Parse a route declaration based on file extension.
pub fn parse_routes_str(
    ext: &str,
    content: &str,
    path_display: &str,
) -> Result<RouteConfig, GatewayError> {
    match ext {
        #[cfg(feature = "yaml")]
        "yaml" | "yml" => serde_yml::from_str(content).map_err(|e| GatewayError::RoutesParse {
            path: path_display.to_string(),
            source: Box::new(e),
        }),

        #[cfg(feature = "json")]
        "json" => serde_json::from_str(content).map_err(|e| GatewayError::RoutesParse {
            path: path_display.to_string(),
            source: Box::new(e),
        }),

        #[cfg(feature = "toml")]
        "toml" => toml::from_str(content).map_err(|e| GatewayError::RoutesParse {
            path: path_display.to_string(),
            source: Box::new(e),
        }),

        other => Err(GatewayError::UnsupportedFormat(other.to_string())),
    }
}

/// Extension of `path`, or an empty string.
#[must_use]
pub fn extension(path: &Path) -> &str {
    path.extension().and_then(|e| e.to_str()).unwrap_or("")
}

/// Compute the digest of a route declaration's source text.
#[must_use]
pub fn digest(data: &[u8]) -> RouteDigest {
    RouteDigest(format!("{:x}", Sha256::digest(data)))
}
