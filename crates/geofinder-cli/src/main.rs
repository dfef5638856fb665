mod locate;
mod lookup;
mod nearby;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use geofinder_core::AppConfig;
use geofinder_provider::{FallbackProvider, GeoProvider};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "geofinder")]
#[command(about = "Geocode places and find nearby stores")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Forward-geocode free text into candidate places.
    Search {
        query: String,
        /// Maximum number of candidates (defaults to `GEOFINDER_SEARCH_LIMIT`).
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Reverse-geocode a coordinate into an address.
    Reverse {
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,
        #[arg(long, allow_negative_numbers = true)]
        lon: f64,
    },
    /// List stores nearest a coordinate.
    Nearby {
        /// Stores file (defaults to `GEOFINDER_STORES_PATH`).
        #[arg(long)]
        stores: Option<PathBuf>,
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,
        #[arg(long, allow_negative_numbers = true)]
        lon: f64,
        /// Drop stores farther than this many kilometres.
        #[arg(long)]
        radius: Option<f64>,
    },
    /// Resolve free text to a location, then list stores around it.
    Locate {
        query: String,
        #[arg(long)]
        stores: Option<PathBuf>,
        #[arg(long)]
        radius: Option<f64>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = geofinder_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Search { query, limit } => {
            let provider = build_provider(&config)?;
            let limit = limit.unwrap_or(config.search_limit);
            lookup::run_search(provider.as_ref(), &query, limit).await?;
        }
        Commands::Reverse { lat, lon } => {
            let provider = build_provider(&config)?;
            lookup::run_reverse(provider.as_ref(), lat, lon).await?;
        }
        Commands::Nearby {
            stores,
            lat,
            lon,
            radius,
        } => {
            let path = stores.unwrap_or_else(|| config.stores_path.clone());
            nearby::run_nearby(&path, lat, lon, radius)?;
        }
        Commands::Locate {
            query,
            stores,
            radius,
        } => {
            let provider = build_provider(&config)?;
            let path = stores.unwrap_or_else(|| config.stores_path.clone());
            locate::run_locate(provider, &config, &path, &query, radius).await?;
        }
    }

    Ok(())
}

fn build_provider(config: &AppConfig) -> anyhow::Result<Arc<dyn GeoProvider>> {
    let provider = FallbackProvider::from_config(config)?;
    tracing::debug!(providers = provider.len(), "geocoding provider chain ready");
    Ok(Arc::new(provider))
}
