//! `storefront-gateway init`: write the built-in route table to a file.
//!
//! Serializes [`RouteConfig::builtin`] as YAML, JSON or TOML so it can
//! be edited and passed back with `--routes`. Refuses to overwrite an
//! existing file.

use std::path::PathBuf;

use crate::cli::{ConfigFormat, InitArgs};
use crate::config::model::RouteConfig;
use crate::error::GatewayError;

pub fn execute(args: &InitArgs) -> Result<(), GatewayError> {
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(format!("gateway.{}", args.format.extension())));

    if output.exists() {
        return Err(GatewayError::FileExists { path: output });
    }

    let content = serialize_routes(&RouteConfig::builtin(), &args.format)?;
    std::fs::write(&output, content)?;
    println!("Created {}", output.display());
    Ok(())
}

/// Serialize a route declaration in the given format.
pub fn serialize_routes(config: &RouteConfig, format: &ConfigFormat) -> Result<String, GatewayError> {
    match format {
        #[cfg(feature = "yaml")]
        ConfigFormat::Yaml => serde_yml::to_string(config)
            .map_err(|e| GatewayError::Io(std::io::Error::other(e.to_string()))),

        #[cfg(not(feature = "yaml"))]
        ConfigFormat::Yaml => Err(GatewayError::UnsupportedFormat("yaml".into())),

        ConfigFormat::Json => serde_json::to_string_pretty(config)
            .map(|mut s| {
                s.push('\n');
                s
            })
            .map_err(|e| GatewayError::Io(std::io::Error::other(e.to_string()))),

        #[cfg(feature = "toml")]
        ConfigFormat::Toml => toml::to_string_pretty(config)
            .map_err(|e| GatewayError::Io(std::io::Error::other(e.to_string()))),

        #[cfg(not(feature = "toml"))]
        ConfigFormat::Toml => Err(GatewayError::UnsupportedFormat("toml".into())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::validation::validate;

    #[test]
    fn json_output_parses_back_to_a_valid_table() {
        let text = serialize_routes(&RouteConfig::builtin(), &ConfigFormat::Json).unwrap();
        let parsed: RouteConfig = serde_json::from_str(&text).unwrap();
        assert!(validate(&parsed).is_ok());
        assert_eq!(parsed.routes.len(), RouteConfig::builtin().routes.len());
    }

    #[test]
    fn refuses_to_overwrite() {
        let path = std::env::temp_dir().join(format!("{}-gateway.json", uuid::Uuid::new_v4()));
        std::fs::write(&path, "{}").unwrap();

        let err = execute(&InitArgs {
            format: ConfigFormat::Json,
            output: Some(path.clone()),
        })
        .unwrap_err();
        assert!(matches!(err, GatewayError::FileExists { .. }));

        let _ = std::fs::remove_file(&path);
    }
}
