//! Storefront gateway: the API-proxy route layer of the art marketplace.
//!
//! Every public `/api/...` route forwards the browser's request to the
//! upstream API at a fixed path, carrying the raw body and a small set
//! of headers, and relays the upstream status and body unchanged with a
//! JSON content type. When the upstream cannot be reached, relay routes
//! answer with a standardized `502` gateway error while fire-and-forget
//! telemetry routes still answer with their declared success status.
//!
//! # Architecture
//!
//! - [`cli`] -- Command-line argument parsing with clap derive macros.
//! - [`cmd`] -- Subcommand dispatch and execution (run, init, validate,
//!   routes, health).
//! - [`config`] -- Immutable gateway configuration and route declaration
//!   loading via the [`RouteSource`](config::RouteSource) trait.
//! - [`error`] -- Startup errors and the gateway-error response.
//! - [`health`] -- `GET /health` diagnostics.
//! - [`logging`] -- Structured tracing setup with JSON and pretty output.
//! - [`alert`] -- Throttled Slack alerts on gateway errors.
//! - [`proxy`] -- Path templates, route lookup, the route factory and the
//!   upstream exchange.
//! - [`server`] -- Axum server setup, shared state, HTTP client, and
//!   graceful shutdown.
//!
//! # Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `yaml` | YAML routes file support _(enabled by default)_ |
//! | `json` | JSON routes file support |
//! | `toml` | TOML routes file support |
//! | `sentry-integration` | Sentry error tracking |
//! | `file-backends` | All file formats |
//! | `full` | All features |

// Binary crate: public functions are internal, not consumed by external users.
#![allow(clippy::missing_errors_doc)]

pub mod alert;
pub mod cli;
pub mod cmd;
pub mod config;
pub mod error;
pub mod health;
pub mod logging;
pub mod proxy;
pub mod server;

#[cfg(feature = "sentry-integration")]
pub mod sentry_integration;
