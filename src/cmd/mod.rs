//! Subcommand dispatch and execution.
//!
//! The [`dispatch`] function routes the parsed CLI to the appropriate
//! subcommand handler: [`run`], [`init`], [`validate`], [`routes`] or
//! [`health`]. Each handler lives in its own submodule.

pub mod health;
pub mod init;
pub mod routes;
pub mod run;
pub mod validate;

use crate::cli::{Cli, Commands};
use crate::error::GatewayError;

pub async fn dispatch(cli: Cli) -> Result<(), GatewayError> {
    match cli.command {
        Some(Commands::Run(args)) => run::execute(*args).await,
        Some(Commands::Init(ref args)) => init::execute(args),
        Some(Commands::Validate(ref args)) => validate::execute(args).await,
        Some(Commands::Routes(ref args)) => routes::execute(args).await,
        Some(Commands::Health(args)) => health::execute(args).await,
        None => {
            print_welcome();
            Ok(())
        }
    }
}

fn print_welcome() {
    let version = env!("CARGO_PKG_VERSION");
    println!(
        "\n  storefront-gateway v{version}: API proxy for the storefront\n\n  \
         No command provided. To get started:\n\n    \
         storefront-gateway run                 Start with the built-in routes\n    \
         storefront-gateway routes              Show the route table\n    \
         storefront-gateway init                Write the routes to gateway.yaml\n    \
         storefront-gateway --help              See all commands and options\n"
    );
}
