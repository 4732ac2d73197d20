//! `storefront-gateway validate`: check a routes file for errors.
//!
//! Loads the file through the same [`FileSource`] that `run` uses, so a
//! file that validates here is accepted at startup too.

use crate::cli::{ValidateArgs, ValidateFormat};
use crate::config::model::RouteConfig;
use crate::config::sources::file_source::FileSource;
use crate::config::validation::format_validation_report;
use crate::config::{RouteDigest, RouteSource};
use crate::error::{GatewayError, ValidationError};

pub async fn execute(args: &ValidateArgs) -> Result<(), GatewayError> {
    let source = FileSource::new(&args.routes)?;
    let display = args.routes.display().to_string();

    match source.load().await {
        Ok((config, digest)) => {
            match args.format {
                ValidateFormat::Text => println!(
                    "\u{2713} {}",
                    format_validation_report(&display, &config, args.timeout)
                ),
                ValidateFormat::Json => println!("{}", valid_json(&config, &digest)),
            }
            Ok(())
        }
        Err(GatewayError::RoutesValidation { errors }) => {
            match args.format {
                ValidateFormat::Text => {
                    eprintln!("\u{2717} {display} has {} errors\n", errors.len());
                    for error in &errors {
                        eprintln!("{error}");
                    }
                }
                ValidateFormat::Json => println!("{}", invalid_json(&errors)),
            }
            Err(GatewayError::RoutesValidation { errors })
        }
        Err(e) => Err(e),
    }
}

fn valid_json(config: &RouteConfig, digest: &RouteDigest) -> serde_json::Value {
    let routes: Vec<_> = config
        .routes
        .iter()
        .map(|r| {
            serde_json::json!({
                "route": r.label(),
                "upstream": r.upstream,
                "fire_and_forget": r.fire_and_forget,
            })
        })
        .collect();
    serde_json::json!({ "valid": true, "digest": digest.short(), "routes": routes })
}

fn invalid_json(errors: &[ValidationError]) -> serde_json::Value {
    let errors: Vec<_> = errors
        .iter()
        .map(|e| {
            serde_json::json!({
                "route": e.route,
                "field": e.field,
                "message": e.message,
                "suggestion": e.suggestion,
            })
        })
        .collect();
    serde_json::json!({ "valid": false, "errors": errors })
}
