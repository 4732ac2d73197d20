//! Route source serving the compiled-in storefront table.

use async_trait::async_trait;

use super::digest;
use crate::config::model::RouteConfig;
use crate::config::{RouteDigest, RouteSource};
use crate::error::GatewayError;

#[derive(Debug, Default)]
pub struct BuiltinSource;

#[async_trait]
impl RouteSource for BuiltinSource {
    fn name(&self) -> &'static str {
        "builtin"
    }

    async fn load(&self) -> Result<(RouteConfig, RouteDigest), GatewayError> {
        let config = RouteConfig::builtin();
        let canonical = serde_json::to_vec(&config).map_err(|e| GatewayError::RoutesParse {
            path: "builtin".into(),
            source: Box::new(e),
        })?;
        Ok((config, digest(&canonical)))
    }
}
