//! Serde data structures for route declaration files.
//!
//! Contains [`RouteConfig`] (the root), [`Route`] and [`Defaults`]. All
//! types derive `Serialize` and `Deserialize` with `deny_unknown_fields`
//! for strict parsing. [`RouteConfig::builtin`] is the storefront's own
//! route table, used when no file is supplied.

use serde::{Deserialize, Serialize};

/// Status returned by fire-and-forget routes that do not declare one.
pub const DEFAULT_FIRE_AND_FORGET_STATUS: u16 = 204;

const fn default_true() -> bool {
    true
}

fn is_true(v: &bool) -> bool {
    *v
}

fn is_false(v: &bool) -> bool {
    !*v
}

fn is_default_defaults(v: &Defaults) -> bool {
    v.forward_headers.is_empty() && v.proxy_headers
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RouteConfig {
    #[serde(default, skip_serializing_if = "is_default_defaults")]
    pub defaults: Defaults,

    pub routes: Vec<Route>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Defaults {
    /// Inbound headers copied to the upstream on every route.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub forward_headers: Vec<String>,

    /// Add `x-forwarded-for` and `via` to upstream requests.
    #[serde(default = "default_true", skip_serializing_if = "is_true")]
    pub proxy_headers: bool,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            forward_headers: Vec::new(),
            proxy_headers: default_true(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Route {
    /// Public path template, e.g. `/api/curation/ticket/{id}/claim`.
    pub path: String,

    pub method: String,

    /// Upstream path template, e.g. `/curation/ticket/{id}/claim`.
    pub upstream: String,

    #[serde(default, skip_serializing_if = "is_false")]
    pub fire_and_forget: bool,

    /// Declared success status of a fire-and-forget route.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,

    /// Upstream timeout in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub forward_headers: Vec<String>,
}

impl Route {
    fn relay(method: &str, path: &str, upstream: &str) -> Self {
        Self {
            path: path.into(),
            method: method.into(),
            upstream: upstream.into(),
            fire_and_forget: false,
            status: None,
            timeout: None,
            forward_headers: Vec::new(),
        }
    }

    /// `METHOD /path`, used to identify the route in logs and reports.
    #[must_use]
    pub fn label(&self) -> String {
        format!("{} {}", self.method.to_uppercase(), self.path)
    }
}

impl RouteConfig {
    /// The storefront's route table.
    #[must_use]
    pub fn builtin() -> Self {
        let mut cart = Route::relay("GET", "/api/cart/mini", "/cart/mini");
        cart.forward_headers = vec!["cookie".into()];

        let mut vitals = Route::relay("POST", "/api/vitals", "/metrics/web-vitals");
        vitals.fire_and_forget = true;
        vitals.status = Some(DEFAULT_FIRE_AND_FORGET_STATUS);

        Self {
            defaults: Defaults::default(),
            routes: vec![
                Route::relay(
                    "POST",
                    "/api/admin/curators/payouts/create",
                    "/admin/curators/payouts/create",
                ),
                Route::relay(
                    "POST",
                    "/api/admin/curators/payouts/{batchId}/process",
                    "/admin/curators/payouts/{batchId}/process",
                ),
                Route::relay(
                    "POST",
                    "/api/admin/exhibitions/{exhId}/delete",
                    "/admin/exhibitions/{exhId}/delete",
                ),
                cart,
                Route::relay(
                    "POST",
                    "/api/curation/ticket/{id}/claim",
                    "/curation/ticket/{id}/claim",
                ),
                vitals,
            ],
        }
    }
}
