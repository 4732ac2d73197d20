//! Loading the shipped route files and checking them against the built-in table.

use storefront_gateway::config::model::RouteConfig;
use storefront_gateway::config::sources::parse_routes_str;
use storefront_gateway::config::validation::validate;
use storefront_gateway::error::GatewayError;

fn load_example(name: &str) -> String {
    let path = format!("{}/example/{name}", env!("CARGO_MANIFEST_DIR"));
    std::fs::read_to_string(&path).unwrap_or_else(|e| panic!("failed to read {path}: {e}"))
}

fn as_value(config: &RouteConfig) -> serde_json::Value {
    serde_json::to_value(config).unwrap()
}

#[cfg(feature = "yaml")]
#[test]
fn yaml_example_matches_builtin_table() {
    let content = load_example("gateway.yaml");
    let config = parse_routes_str("yaml", &content, "gateway.yaml").unwrap();
    validate(&config).unwrap();
    assert_eq!(as_value(&config), as_value(&RouteConfig::builtin()));
}

#[cfg(feature = "json")]
#[test]
fn json_example_matches_builtin_table() {
    let content = load_example("gateway.json");
    let config = parse_routes_str("json", &content, "gateway.json").unwrap();
    validate(&config).unwrap();
    assert_eq!(as_value(&config), as_value(&RouteConfig::builtin()));
}

#[cfg(feature = "toml")]
#[test]
fn toml_example_matches_builtin_table() {
    let content = load_example("gateway.toml");
    let config = parse_routes_str("toml", &content, "gateway.toml").unwrap();
    validate(&config).unwrap();
    assert_eq!(as_value(&config), as_value(&RouteConfig::builtin()));
}

#[test]
fn builtin_table_validates() {
    validate(&RouteConfig::builtin()).unwrap();
}

#[test]
fn unsupported_format_returns_error() {
    let result = parse_routes_str("ini", "", "gateway.ini");
    assert!(matches!(result, Err(GatewayError::UnsupportedFormat(ext)) if ext == "ini"));
}

#[cfg(feature = "yaml")]
#[test]
fn unknown_fields_are_rejected() {
    let content = r"
routes:
  - path: /api/cart/mini
    method: GET
    upstream: /cart/mini
    targets: []
";
    let result = parse_routes_str("yaml", content, "gateway.yaml");
    assert!(matches!(result, Err(GatewayError::RoutesParse { .. })));
}

#[cfg(feature = "yaml")]
#[test]
fn unbound_upstream_parameter_fails_validation() {
    let content = r"
routes:
  - path: /api/ticket/{id}/claim
    method: POST
    upstream: /curation/ticket/{ticketId}/claim
";
    let config = parse_routes_str("yaml", content, "gateway.yaml").unwrap();
    let errors = validate(&config).unwrap_err();
    assert!(errors.iter().any(|e| e.field == "upstream"));
}
