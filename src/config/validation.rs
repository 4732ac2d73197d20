//! Route declaration validation with detailed error reporting.
//!
//! The [`validate`] function checks a parsed [`RouteConfig`] for
//! malformed path templates, unknown methods, duplicate declarations,
//! upstream parameters the public path never captures, misplaced
//! fire-and-forget statuses, zero timeouts and unusable forwarded
//! header names. Returns every [`ValidationError`] found.

use std::collections::HashSet;

use axum::http::HeaderName;

use super::model::{Route, RouteConfig};
use crate::error::ValidationError;
use crate::proxy::headers::is_hop_by_hop;
use crate::proxy::template::{PathTemplate, Segment};

pub const VALID_METHODS: &[&str] = &["GET", "POST", "PUT", "PATCH", "DELETE", "HEAD", "OPTIONS"];

/// Validate an HTTP method string. Returns `Ok(())` or a human-readable error.
pub fn validate_method(method: &str) -> Result<(), String> {
    let upper = method.to_uppercase();
    if VALID_METHODS.contains(&upper.as_str()) {
        Ok(())
    } else {
        Err(format!("'{method}' is not a supported HTTP method"))
    }
}

/// Validate a header name listed for forwarding.
pub fn validate_forward_header(name: &str) -> Result<(), String> {
    let parsed = name
        .parse::<HeaderName>()
        .map_err(|_| format!("'{name}' is not a valid header name"))?;
    if is_hop_by_hop(&parsed) {
        return Err(format!("'{name}' is a hop-by-hop header and cannot be forwarded"));
    }
    Ok(())
}

pub fn validate(config: &RouteConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    for header in &config.defaults.forward_headers {
        if let Err(msg) = validate_forward_header(header) {
            errors.push(ValidationError {
                route: "(defaults)".into(),
                field: "forward_headers".into(),
                message: msg,
                suggestion: None,
            });
        }
    }

    if config.routes.is_empty() {
        errors.push(ValidationError {
            route: "(root)".into(),
            field: "routes".into(),
            message: "at least one route must be defined".into(),
            suggestion: None,
        });
        return Err(errors);
    }

    let mut seen = HashSet::new();
    for (i, route) in config.routes.iter().enumerate() {
        let route_id = if route.path.is_empty() {
            format!("routes[{i}]")
        } else {
            route.label()
        };
        validate_route(route, &route_id, &mut errors);

        if !seen.insert((route.method.to_uppercase(), path_shape(&route.path))) {
            errors.push(ValidationError {
                route: route_id,
                field: "path".into(),
                message: "duplicate route declaration".into(),
                suggestion: Some("parameter names do not distinguish routes".into()),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// The path with every parameter collapsed to `{}`, so `/a/{id}` and
/// `/a/{x}` compare equal.
fn path_shape(path: &str) -> String {
    let Ok(template) = PathTemplate::parse(path) else {
        return path.to_string();
    };
    let shape: Vec<&str> = template
        .segments()
        .iter()
        .map(|segment| match segment {
            Segment::Literal(literal) => literal.as_str(),
            Segment::Param(_) => "{}",
        })
        .collect();
    format!("/{}", shape.join("/"))
}

fn validate_route(route: &Route, route_id: &str, errors: &mut Vec<ValidationError>) {
    let mut push = |field: &str, message: String, suggestion: Option<String>| {
        errors.push(ValidationError {
            route: route_id.to_string(),
            field: field.into(),
            message,
            suggestion,
        });
    };

    let public = match PathTemplate::parse(&route.path) {
        Ok(t) => Some(t),
        Err(msg) => {
            let suggestion = (!route.path.is_empty() && !route.path.starts_with('/'))
                .then(|| format!("did you mean '/{}'?", route.path));
            push("path", msg, suggestion);
            None
        }
    };

    let upstream = match PathTemplate::parse(&route.upstream) {
        Ok(t) => Some(t),
        Err(msg) => {
            push("upstream", msg, None);
            None
        }
    };

    if let (Some(public), Some(upstream)) = (&public, &upstream) {
        let captured: HashSet<&str> = public.params().collect();
        for name in upstream.params() {
            if !captured.contains(name) {
                push(
                    "upstream",
                    format!("parameter '{name}' is not captured by the public path"),
                    Some(format!("add '{{{name}}}' to '{}'", route.path)),
                );
            }
        }
    }

    if let Err(msg) = validate_method(&route.method) {
        push("method", msg, None);
    }

    if let Some(status) = route.status {
        if !route.fire_and_forget {
            push(
                "status",
                "status can only be declared on fire-and-forget routes".into(),
                Some("set 'fire_and_forget: true' or remove 'status'".into()),
            );
        } else if !(200..300).contains(&status) {
            push(
                "status",
                format!("{status} is not a success status (expected 2xx)"),
                None,
            );
        }
    }

    if route.timeout == Some(0) {
        push("timeout", "timeout must be greater than zero".into(), None);
    }

    for header in &route.forward_headers {
        if let Err(msg) = validate_forward_header(header) {
            push("forward_headers", msg, None);
        }
    }
}

#[must_use]
pub fn format_validation_report(path: &str, config: &RouteConfig, default_timeout_ms: u64) -> String {
    let mut lines = vec![format!("  {} routes\n", config.routes.len())];

    for route in &config.routes {
        let delivery = if route.fire_and_forget {
            format!(
                "fire-and-forget ({})",
                route
                    .status
                    .unwrap_or(super::model::DEFAULT_FIRE_AND_FORGET_STATUS)
            )
        } else {
            "relay".to_string()
        };
        let timeout = route.timeout.map_or_else(
            || format!("{default_timeout_ms}ms (default)"),
            |t| format!("{t}ms"),
        );

        lines.push(format!("  {}  -> {}", route.label(), route.upstream));
        lines.push(format!("    delivery: {delivery}"));
        lines.push(format!("    timeout:  {timeout}"));
    }

    format!("{} is valid\n{}", path, lines.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::model::{Defaults, Route, RouteConfig};

    fn route(method: &str, path: &str, upstream: &str) -> Route {
        Route {
            path: path.into(),
            method: method.into(),
            upstream: upstream.into(),
            fire_and_forget: false,
            status: None,
            timeout: None,
            forward_headers: Vec::new(),
        }
    }

    fn config(routes: Vec<Route>) -> RouteConfig {
        RouteConfig {
            defaults: Defaults::default(),
            routes,
        }
    }

    #[test]
    fn builtin_table_passes() {
        assert!(validate(&RouteConfig::builtin()).is_ok());
    }

    #[test]
    fn empty_routes_fails() {
        let errors = validate(&config(vec![])).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("at least one route"));
    }

    #[test]
    fn path_without_slash_fails_with_suggestion() {
        let errors = validate(&config(vec![route("GET", "api/cart/mini", "/cart/mini")])).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.suggestion.as_deref() == Some("did you mean '/api/cart/mini'?")));
    }

    #[test]
    fn uncaptured_upstream_param_fails() {
        let errors = validate(&config(vec![route(
            "POST",
            "/api/curation/ticket/claim",
            "/curation/ticket/{id}/claim",
        )]))
        .unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.field == "upstream" && e.message.contains("'id'")));
    }

    #[test]
    fn public_param_may_be_dropped_upstream() {
        assert!(validate(&config(vec![route("GET", "/api/shop/{slug}", "/shop")])).is_ok());
    }

    #[test]
    fn wildcard_method_is_rejected() {
        let errors = validate(&config(vec![route("*", "/api/a", "/a")])).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.message.contains("not a supported HTTP method")));
    }

    #[test]
    fn duplicate_declaration_fails() {
        let errors = validate(&config(vec![
            route("GET", "/api/a", "/a"),
            route("get", "/api/a", "/b"),
        ]))
        .unwrap_err();
        assert!(errors.iter().any(|e| e.message.contains("duplicate")));
    }

    #[test]
    fn renamed_parameter_is_still_a_duplicate() {
        let errors = validate(&config(vec![
            route("POST", "/api/a/{id}/claim", "/a/{id}"),
            route("POST", "/api/a/{ticket}/claim", "/b/{ticket}"),
        ]))
        .unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].route, "POST /api/a/{ticket}/claim");
        assert!(errors[0].message.contains("duplicate"));
    }

    #[test]
    fn literal_and_parameter_segments_do_not_collide() {
        assert!(validate(&config(vec![
            route("GET", "/api/a/{id}", "/a/{id}"),
            route("GET", "/api/a/featured", "/a/featured"),
        ]))
        .is_ok());
    }

    #[test]
    fn same_path_different_methods_is_fine() {
        assert!(validate(&config(vec![
            route("GET", "/api/a", "/a"),
            route("POST", "/api/a", "/a"),
        ]))
        .is_ok());
    }

    #[test]
    fn status_on_relay_route_fails() {
        let mut r = route("POST", "/api/a", "/a");
        r.status = Some(204);
        let errors = validate(&config(vec![r])).unwrap_err();
        assert!(errors.iter().any(|e| e.field == "status"));
    }

    #[test]
    fn non_success_fire_and_forget_status_fails() {
        let mut r = route("POST", "/api/vitals", "/metrics/web-vitals");
        r.fire_and_forget = true;
        r.status = Some(500);
        let errors = validate(&config(vec![r])).unwrap_err();
        assert!(errors.iter().any(|e| e.message.contains("expected 2xx")));
    }

    #[test]
    fn zero_timeout_fails() {
        let mut r = route("GET", "/api/a", "/a");
        r.timeout = Some(0);
        assert!(validate(&config(vec![r])).is_err());
    }

    #[test]
    fn hop_by_hop_forward_header_fails() {
        let mut r = route("GET", "/api/a", "/a");
        r.forward_headers = vec!["connection".into()];
        let errors = validate(&config(vec![r])).unwrap_err();
        assert!(errors.iter().any(|e| e.message.contains("hop-by-hop")));
    }

    #[test]
    fn invalid_default_header_fails() {
        let mut c = config(vec![route("GET", "/api/a", "/a")]);
        c.defaults.forward_headers = vec!["bad header".into()];
        let errors = validate(&c).unwrap_err();
        assert_eq!(errors[0].route, "(defaults)");
    }

    #[test]
    fn report_lists_delivery_mode() {
        let report = format_validation_report("gateway.yaml", &RouteConfig::builtin(), 10_000);
        assert!(report.starts_with("gateway.yaml is valid"));
        assert!(report.contains("POST /api/vitals  -> /metrics/web-vitals"));
        assert!(report.contains("fire-and-forget (204)"));
        assert!(report.contains("10000ms (default)"));
    }
}
