//! Optional Sentry error tracking integration.
//!
//! Initializes the Sentry SDK with the provided DSN and environment
//! (`SENTRY_DSN`, `SENTRY_ENV`). The returned guard must be held for
//! the lifetime of the process so gateway errors and panics are
//! flushed before exit.

pub fn init(dsn: &str, environment: Option<&str>) -> sentry::ClientInitGuard {
    let parsed_dsn = match dsn.parse() {
        Ok(d) => Some(d),
        Err(e) => {
            tracing::warn!(error = %e, "invalid Sentry DSN, error tracking disabled");
            None
        }
    };

    sentry::init(sentry::ClientOptions {
        dsn: parsed_dsn,
        environment: environment.map(|e| e.to_string().into()),
        release: Some(
            format!(
                "{}@{}+{}",
                env!("CARGO_PKG_NAME"),
                env!("CARGO_PKG_VERSION"),
                env!("GATEWAY_GIT_SHORT")
            )
            .into(),
        ),
        ..Default::default()
    })
}
