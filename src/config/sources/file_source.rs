//! Async file-based route source with SHA-256 fingerprinting.
//!
//! [`FileSource`] implements [`RouteSource`] for any supported format,
//! chosen from the file extension at construction time. It reads the
//! file via Tokio, validates the declaration and fingerprints the raw
//! content for `/health`.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use super::{digest, extension, parse_routes_str};
use crate::config::model::RouteConfig;
use crate::config::validation::validate;
use crate::config::{RouteDigest, RouteSource};
use crate::error::GatewayError;

#[derive(Debug)]
pub struct FileSource {
    path: PathBuf,
    name: &'static str,
}

impl FileSource {
    /// Build a source for `path`, rejecting extensions this build cannot parse.
    pub fn new(path: &Path) -> Result<Self, GatewayError> {
        let name = match extension(path) {
            #[cfg(feature = "yaml")]
            "yaml" | "yml" => "yaml",
            #[cfg(feature = "json")]
            "json" => "json",
            #[cfg(feature = "toml")]
            "toml" => "toml",
            other => return Err(GatewayError::UnsupportedFormat(other.to_string())),
        };
        Ok(Self {
            path: path.to_path_buf(),
            name,
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_content(&self) -> Result<String, GatewayError> {
        tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                GatewayError::RoutesFileNotFound {
                    path: self.path.clone(),
                }
            } else {
                GatewayError::Io(e)
            }
        })
    }
}

#[async_trait]
impl RouteSource for FileSource {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn load(&self) -> Result<(RouteConfig, RouteDigest), GatewayError> {
        let content = self.read_content().await?;
        let config = parse_routes_str(
            extension(&self.path),
            &content,
            &self.path.display().to_string(),
        )?;

        if let Err(errors) = validate(&config) {
            return Err(GatewayError::RoutesValidation { errors });
        }

        Ok((config, digest(content.as_bytes())))
    }
}

#[cfg(all(test, feature = "yaml"))]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("{}-{name}", uuid::Uuid::new_v4()))
    }

    #[tokio::test]
    async fn loads_and_fingerprints_yaml() {
        let path = temp_path("gateway.yaml");
        let content = "routes:\n  - path: /api/cart/mini\n    method: GET\n    upstream: /cart/mini\n";
        tokio::fs::write(&path, content).await.unwrap();

        let source = FileSource::new(&path).unwrap();
        let (config, version) = source.load().await.unwrap();
        assert_eq!(config.routes.len(), 1);
        assert_eq!(version, digest(content.as_bytes()));

        let _ = tokio::fs::remove_file(&path).await;
    }

    #[tokio::test]
    async fn missing_file_is_reported() {
        let path = temp_path("missing.yaml");
        let err = FileSource::new(&path).unwrap().load().await.unwrap_err();
        assert!(matches!(err, GatewayError::RoutesFileNotFound { .. }));
    }

    #[tokio::test]
    async fn invalid_declaration_fails_validation() {
        let path = temp_path("gateway.yaml");
        tokio::fs::write(&path, "routes: []\n").await.unwrap();

        let err = FileSource::new(&path).unwrap().load().await.unwrap_err();
        assert!(matches!(err, GatewayError::RoutesValidation { .. }));

        let _ = tokio::fs::remove_file(&path).await;
    }

    #[test]
    fn rejects_unknown_extension() {
        assert!(FileSource::new(Path::new("gateway.ini")).is_err());
    }
}
