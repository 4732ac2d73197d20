use clap::Parser;

#[tokio::main]
async fn main() {
    let cli = storefront_gateway::cli::Cli::parse();
    if let Err(e) = storefront_gateway::cmd::dispatch(cli).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
