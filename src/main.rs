use anyhow::{Context, Result};
use btc_buyer::config::AppConfig;
use btc_buyer::execution::PurchaseWorkflow;
use btc_buyer::models::CurrencyPair;
use btc_buyer::secrets::EnvSecretProvider;
use btc_buyer::MarketDataClient;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Places one budgeted limit buy order on bitFlyer per invocation
#[derive(Parser, Debug)]
#[command(name = "btc-buyer")]
#[command(author, version, about)]
struct Cli {
    /// Extra TOML config file layered over config/default.toml
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Fetch a quote and place one limit buy order
    Run,

    /// Print the current ticker for a currency pair
    Ticker {
        /// Pair id (0 = BTC_JPY, 1 = ETH_JPY, 2 = FX_BTC_JPY, 3 = ETH_BTC, 4 = BCH_BTC)
        #[arg(short, long, default_value = "0")]
        pair: i64,
    },

    /// Show the order that would be placed, without sending it
    Plan,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    setup_logging();

    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;

    match cli.command {
        Commands::Run => {
            let workflow = PurchaseWorkflow::from_config(&config, Arc::new(EnvSecretProvider::new()));
            let response = workflow.handle().await;

            println!("{}", serde_json::to_string_pretty(&response)?);
            if !response.is_success() {
                std::process::exit(1);
            }
        }
        Commands::Ticker { pair } => {
            let client = MarketDataClient::with_base_url(config.exchange.base_url.clone());
            let quote = client.get_ticker(CurrencyPair::from_id(pair)).await?;
            println!("{}", serde_json::to_string_pretty(&quote)?);
        }
        Commands::Plan => {
            let workflow = PurchaseWorkflow::from_config(&config, Arc::new(EnvSecretProvider::new()));
            let settings = workflow.settings();
            let (quote, plan) = workflow.preview().await?;

            tracing::info!("📊 Order preview:");
            tracing::info!("  Pair: {}", settings.pair);
            tracing::info!("  Strategy: {}", settings.strategy.name());
            tracing::info!("  Budget: {:.0}", settings.budget);
            tracing::info!("  Last traded: {:.0}  Best ask: {:.0}", quote.ltp, quote.best_ask);
            tracing::info!("  Limit price: {:.0}", plan.price);
            tracing::info!("  Size: {}", plan.size);
            tracing::info!("  Notional: {:.0}", plan.notional());
            println!("{}", serde_json::to_string_pretty(&plan)?);
        }
    }

    Ok(())
}

fn setup_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("btc_buyer=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
