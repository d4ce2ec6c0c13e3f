use clap::Parser;
use geoctf::endpoints::server::load_catalog;
use geoctf::utils::summary::print_catalog_summary;
use geoctf::{Args, Config, GeoCtfServer};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .init();

    let config = Config::from(&args);

    if args.check {
        let catalog = load_catalog(&config.source)?;
        print_catalog_summary(&catalog);
        return Ok(());
    }

    let server = GeoCtfServer::new(config)?;
    print_catalog_summary(server.catalog());
    server.start().await
}
