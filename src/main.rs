use anyhow::Context;
use clap::Parser;
use price_feed::cli::{Cli, Commands};
use price_feed::config::ServerConfig;
use price_feed::error::{ErrorResponse, PriceFeedError};
use price_feed::items::{seed, ItemFilter};
use price_feed::logging::{ApplicationMode, LoggingConfig};
use price_feed::web::PriceServer;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let log_config = match (&cli.command, cli.log_file.clone()) {
        // Detached server writing to a file gets the long-running preset
        (Commands::Serve { .. }, Some(path)) if cli.verbose == 0 && !cli.json => {
            LoggingConfig::for_mode(ApplicationMode::Server).with_file_output(path)
        },
        (_, Some(path)) => LoggingConfig::from_args(cli.quiet, cli.verbose > 0, cli.json)
            .with_file_output(path),
        (Commands::Items { .. }, None) if cli.verbose == 0 && !cli.quiet && !cli.json => {
            LoggingConfig::for_mode(ApplicationMode::Cli)
        },
        _ => LoggingConfig::from_args(cli.quiet, cli.verbose > 0, cli.json),
    };

    if let Err(e) = price_feed::logging::init_logging(log_config) {
        eprintln!("Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    if let Err(e) = run(cli).await {
        let error_response = match e.downcast_ref::<PriceFeedError>() {
            Some(err) => err.to_error_response(),
            None => ErrorResponse {
                error: format!("{:#}", e),
                code: "INTERNAL_ERROR".to_string(),
            },
        };
        eprintln!(
            "{}",
            serde_json::to_string_pretty(&error_response)
                .unwrap_or_else(|_| error_response.error.clone())
        );
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Serve {
            host,
            port,
            items,
            static_dir,
            evict_on_failure,
        } => {
            let mut config = ServerConfig::from_env()?;
            if let Some(host) = host {
                config.host = host;
            }
            if let Some(port) = port {
                config.port = port;
            }
            if items.is_some() {
                config.items_file = items;
            }
            if static_dir.is_some() {
                config.static_dir = static_dir;
            }
            config.evict_on_failure |= evict_on_failure;

            tracing::debug!(?config, "Resolved server configuration");
            PriceServer::new(config).run().await?;
        },

        Commands::Items {
            items,
            category,
            min_price,
            max_price,
            available,
        } => {
            let catalog = match items {
                Some(path) => seed::read_seed_file(&path)
                    .with_context(|| format!("Failed to read {}", path.display()))?,
                None => seed::sample_catalog(),
            };

            let filter = ItemFilter {
                category,
                min_price,
                max_price,
                available,
            };
            let matching: Vec<_> = catalog
                .into_iter()
                .filter(|item| filter.matches(item))
                .collect();

            println!("{}", serde_json::to_string_pretty(&matching)?);
        },
    }

    Ok(())
}
