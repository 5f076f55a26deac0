use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;

use phimtv_core::provider::{Catalog, ContentProvider, KkPhimProvider, NguonCProvider, OPhimProvider};
use phimtv_core::service::{CatalogAggregator, EnrichmentService};
use phimtv_core::{logging, Config};

#[derive(Parser)]
#[command(name = "phimtv", about = "Aggregated movie catalog lookups", version)]
struct Cli {
    /// Path to a config file; environment variables override it.
    #[arg(long, env = "PHIMTV_CONFIG")]
    config: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Merged movie detail for a slug.
    Detail {
        slug: String,
        /// Decorate with TMDB rating/backdrop when an API key is configured.
        #[arg(long)]
        enrich: bool,
    },
    /// Search all providers.
    Search {
        keyword: String,
        #[arg(long, default_value_t = 20)]
        limit: u32,
    },
    /// One page of a catalog listing (e.g. phim-le, phim-bo).
    List {
        kind: String,
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = 24)]
        limit: u32,
    },
}

fn build_aggregator(config: &Config, enrich: bool) -> CatalogAggregator {
    let providers: Vec<Arc<dyn ContentProvider>> = vec![
        Arc::new(KkPhimProvider::new(&config.providers.kkphim)),
        Arc::new(OPhimProvider::new(&config.providers.ophim)),
        Arc::new(NguonCProvider::new(&config.providers.nguonc)),
    ];
    let mut aggregator = CatalogAggregator::new(providers, &config.providers);
    if enrich {
        aggregator.set_enrichment(Arc::new(EnrichmentService::new(&config.tmdb)));
    }
    aggregator
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load(cli.config.as_deref())?;
    logging::init_logging(&config.logging)?;

    match cli.command {
        Command::Detail { slug, enrich } => {
            let aggregator = build_aggregator(&config, enrich);
            match aggregator.movie_detail(&slug).await {
                Some(detail) => println!("{}", serde_json::to_string_pretty(&*detail)?),
                None => {
                    info!(slug = %slug, "no provider returned a record");
                    println!("not found");
                }
            }
        }
        Command::Search { keyword, limit } => {
            let aggregator = build_aggregator(&config, false);
            let movies = aggregator.search(&keyword, limit).await;
            println!("{}", serde_json::to_string_pretty(&movies)?);
        }
        Command::List { kind, page, limit } => {
            let aggregator = build_aggregator(&config, false);
            let movies = aggregator
                .movie_list(&Catalog::List(kind), page, limit)
                .await;
            println!("{}", serde_json::to_string_pretty(&movies)?);
        }
    }

    Ok(())
}
