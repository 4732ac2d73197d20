//! Specificity-based lookup over the compiled route table.
//!
//! [`RouteTable::lookup`] scores every route whose public template
//! matches the raw request path: literal segments score 10, parameters
//! score 5. Among routes accepting the request method the highest score
//! wins (first declared on ties). `HEAD` is served by `GET` routes unless
//! a `HEAD` route matches as well. A path that matches only under other
//! methods yields [`Lookup::MethodNotAllowed`].

use std::collections::HashMap;
use std::time::Duration;

use axum::http::Method;

use super::route::ProxyRoute;
use super::template::split_path;
use crate::config::model::RouteConfig;
use crate::config::validation::validate;
use crate::error::{GatewayError, ValidationError};

#[derive(Debug)]
pub enum Lookup<'a> {
    Matched {
        route: &'a ProxyRoute,
        params: HashMap<String, String>,
    },
    MethodNotAllowed {
        allowed: Vec<Method>,
    },
    NotFound,
}

#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: Vec<ProxyRoute>,
}

/// Methods a route answers: GET routes also serve HEAD.
fn allowed_methods(method: &Method) -> Vec<Method> {
    if *method == Method::GET {
        vec![Method::GET, Method::HEAD]
    } else {
        vec![method.clone()]
    }
}

impl RouteTable {
    #[must_use]
    pub const fn new(routes: Vec<ProxyRoute>) -> Self {
        Self { routes }
    }

    /// Validate a declaration and compile every route through the factory.
    pub fn compile(config: &RouteConfig, default_timeout: Duration) -> Result<Self, GatewayError> {
        validate(config).map_err(|errors| GatewayError::RoutesValidation { errors })?;

        let routes = config
            .routes
            .iter()
            .map(|route| {
                ProxyRoute::from_declaration(route, &config.defaults, default_timeout).map_err(
                    |message| GatewayError::RoutesValidation {
                        errors: vec![ValidationError {
                            route: route.label(),
                            field: "route".into(),
                            message,
                            suggestion: None,
                        }],
                    },
                )
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self::new(routes))
    }

    #[must_use]
    pub fn lookup(&self, method: &Method, path: &str) -> Lookup<'_> {
        let segments = split_path(path);

        let mut best: Option<((u32, bool), &ProxyRoute, HashMap<String, String>)> = None;
        let mut allowed = Vec::new();

        for route in &self.routes {
            let Some((specificity, params)) = route.public().capture(&segments) else {
                continue;
            };

            let exact = route.method() == method;
            if !exact && !(*method == Method::HEAD && *route.method() == Method::GET) {
                for m in allowed_methods(route.method()) {
                    if !allowed.contains(&m) {
                        allowed.push(m);
                    }
                }
                continue;
            }

            // An exact method match outranks HEAD served by a GET route.
            let rank = (specificity, exact);
            if best.as_ref().map_or(true, |(r, _, _)| rank > *r) {
                best = Some((rank, route, params));
            }
        }

        match best {
            Some((_, route, params)) => Lookup::Matched { route, params },
            None if !allowed.is_empty() => Lookup::MethodNotAllowed { allowed },
            None => Lookup::NotFound,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProxyRoute> {
        self.routes.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
