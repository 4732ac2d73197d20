//! `storefront-gateway routes`: print the effective route table.
//!
//! Resolves the route source exactly as `run` does (explicit file,
//! auto-detected file, built-in table), compiles it, and prints one
//! line per route with its upstream URL and delivery mode.

use crate::cli::RoutesArgs;
use crate::config::{sources, GatewayConfig, UpstreamSettings};
use crate::error::GatewayError;
use crate::proxy::{Delivery, ProxyRoute, RouteTable};

pub async fn execute(args: &RoutesArgs) -> Result<(), GatewayError> {
    let upstream = UpstreamSettings::new(&args.api_url, args.timeout)?;
    let source = sources::resolve(args.routes.as_deref()).await?;
    let config = GatewayConfig::assemble(upstream, source.as_ref()).await?;
    let table = RouteTable::compile(&config.routes, config.upstream.timeout)?;

    println!(
        "{} routes from {} ({})\n",
        table.len(),
        config.source,
        config.digest.short()
    );
    for route in table.iter() {
        println!("{}", describe(route, &config.upstream));
    }
    Ok(())
}

#[must_use]
pub fn describe(route: &ProxyRoute, upstream: &UpstreamSettings) -> String {
    let options = route.options();
    let delivery = match options.delivery {
        Delivery::Relay => "relay".to_string(),
        Delivery::FireAndForget { status } => format!("fire-and-forget {}", status.as_u16()),
    };
    format!(
        "  {:<7} {:<48} -> {}  [{delivery}, {}ms]",
        route.method().as_str(),
        route.public().as_str(),
        upstream.join(options.upstream.as_str()),
        options.timeout.as_millis()
    )
}
