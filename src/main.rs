use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use fundalytics::app::{AppState, IngestStatus};
use fundalytics::scrapers::{JsonFileSource, PropertyType, SearchParams, WantTo, ALL_AREAS};
use fundalytics::settings::Settings;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "fundalytics", about = "Search and analyze scraped Funda listings")]
struct Cli {
    /// Settings file, layered under FUNDALYTICS__* environment variables
    #[arg(long, env = "FUNDALYTICS_CONFIG", default_value = "fundalytics.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the selectable areas
    Cities,
    /// Normalize a scraper export and import it into the store
    Ingest {
        /// JSON export written by the scraper
        #[arg(long)]
        input: PathBuf,
        /// City name, or `nl` for the whole country
        #[arg(long)]
        area: String,
        #[arg(long, value_enum)]
        want_to: WantTo,
        #[arg(long, value_enum)]
        property_type: PropertyType,
        #[arg(long)]
        min_price: Option<i64>,
        #[arg(long)]
        max_price: Option<i64>,
        /// Minimum living area in m2
        #[arg(long)]
        min_living_area: Option<i64>,
        /// Only listings published within this many days
        #[arg(long)]
        days_since: Option<u32>,
        #[arg(long, default_value_t = 1)]
        page_start: u32,
        #[arg(long, default_value_t = 1)]
        n_pages: u32,
        /// Print the data viewer table for the area after importing
        #[arg(long)]
        table: bool,
    },
    /// Render the stored listings of a city as an HTML table
    Table {
        #[arg(long)]
        city: String,
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Search by image URL or free text
    Search {
        query: String,
        /// City to search in, or `nl` for the whole country
        #[arg(long, default_value = ALL_AREAS)]
        city: String,
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Print the stored embeddings of a city as JSON lines
    Vectors {
        #[arg(long)]
        city: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let settings = Settings::load(&cli.config)
        .with_context(|| format!("Failed to load settings from {}", cli.config.display()))?;

    info!("🏠 Fundalytics");
    let app = AppState::bootstrap(settings).await?;

    let result = run(&app, cli.command).await;
    app.shutdown().await;
    result
}

async fn run(app: &AppState, command: Command) -> Result<()> {
    match command {
        Command::Cities => {
            for city in app.cities().await? {
                println!("{}", city);
            }
        }
        Command::Ingest {
            input,
            area,
            want_to,
            property_type,
            min_price,
            max_price,
            min_living_area,
            days_since,
            page_start,
            n_pages,
            table,
        } => {
            let params = SearchParams {
                area: area.to_lowercase(),
                want_to,
                property_type,
                min_price,
                max_price,
                min_living_area,
                days_since,
                page_start,
                n_pages,
            };
            let source = JsonFileSource::new(input);

            match app.ingest(&source, &params).await? {
                IngestStatus::Empty => {
                    println!("No listings found for {:?}s to {:?} in {}.", property_type, want_to, params.area);
                }
                IngestStatus::Imported { written, rejected } => {
                    println!("✅ Imported {} listings", written);
                    if !rejected.is_empty() {
                        warn!("{} listings were rejected", rejected.len());
                        for rejection in &rejected {
                            println!("   skipped {}: {}", rejection.house_id, rejection.error);
                        }
                    }
                    if table && written > 0 {
                        println!("{}", app.data_viewer(&params.area).await?);
                    }
                }
            }
        }
        Command::Table { city, output } => {
            let html = app.data_viewer(&city.to_lowercase()).await?;
            emit(&html, output).await?;
        }
        Command::Search { query, city, output } => match app.search_table(&query, &city).await? {
            Some(html) => emit(&html, output).await?,
            None => println!("Enter a URL for an image or a text description to find related properties."),
        },
        Command::Vectors { city } => {
            for listing in app.vector_view(&city.to_lowercase()).await? {
                let line = serde_json::json!({
                    "house_id": listing.house_id,
                    "url": listing.url,
                    "price": listing.price,
                    "vector": listing.vector,
                });
                println!("{}", line);
            }
        }
    }

    Ok(())
}

async fn emit(html: &str, output: Option<PathBuf>) -> Result<()> {
    match output {
        Some(path) => {
            tokio::fs::write(&path, html)
                .await
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!("💾 Saved table to {}", path.display());
        }
        None => println!("{}", html),
    }
    Ok(())
}
