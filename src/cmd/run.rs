//! `storefront-gateway run`: start the gateway.
//!
//! Assembles the immutable [`GatewayConfig`], compiles the route table,
//! wires up Sentry and Slack when configured, and serves until SIGTERM
//! or Ctrl+C.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use crate::alert::SlackNotifier;
use crate::cli::RunArgs;
use crate::config::{sources, GatewayConfig, UpstreamSettings};
use crate::error::GatewayError;
use crate::logging;
use crate::server::{self, AppState};

pub async fn execute(args: RunArgs) -> Result<(), GatewayError> {
    let log_format = logging::resolve_format(args.pretty, args.json);
    logging::init(&args.log_level, log_format);

    #[cfg(feature = "sentry-integration")]
    let _sentry_guard = args
        .sentry_dsn
        .as_ref()
        .map(|dsn| crate::sentry_integration::init(dsn, args.sentry_env.as_deref()));

    let upstream = UpstreamSettings::new(&args.api_url, args.timeout)?;
    let source = sources::resolve(args.routes.as_deref()).await?;
    let config = GatewayConfig::assemble(upstream, source.as_ref()).await?;

    let http_client = server::build_http_client();
    let mut state = AppState::new(config, http_client.clone())?;
    if let Some(ref webhook) = args.slack_webhook_url {
        let notifier = SlackNotifier::new(
            http_client,
            webhook,
            Duration::from_secs(args.alert_interval),
        )?;
        state = state.with_alerts(notifier);
        tracing::info!("Slack alerting enabled");
    }
    let state = Arc::new(state);

    let route_count = state.routes.len();
    let api_url = state.config.upstream.base_url.to_string();
    let source_name = state.config.source.clone();

    let router = server::build_router(state, args.max_body);

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!(
        addr = %addr,
        api_url = %api_url,
        routes = route_count,
        source = %source_name,
        "storefront-gateway started"
    );

    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(server::shutdown_signal())
    .await?;

    tracing::info!("storefront-gateway stopped");
    Ok(())
}
