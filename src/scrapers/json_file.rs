use crate::models::RawListing;
use crate::scrapers::traits::ListingSource;
use crate::scrapers::types::SearchParams;
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::path::PathBuf;
use tracing::{debug, info};

/// Reads the JSON export of the Funda scraper.
///
/// The export is an array of row objects, one per listing.
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn parse(json: &str) -> Result<Vec<RawListing>> {
        let rows: Vec<Value> = serde_json::from_str(json).context("Export is not a JSON array")?;

        rows.into_iter()
            .enumerate()
            .map(|(index, row)| {
                serde_json::from_value::<RawListing>(row)
                    .with_context(|| format!("Invalid listing at row {}", index))
            })
            .collect()
    }
}

#[async_trait]
impl ListingSource for JsonFileSource {
    async fn fetch(&self, params: &SearchParams) -> Result<Vec<RawListing>> {
        info!(
            "Loading {:?} {:?} listings in {} from {}",
            params.property_type,
            params.want_to,
            params.area,
            self.path.display()
        );

        let json = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("Failed to read {}", self.path.display()))?;

        let rows = Self::parse(&json)?;
        let total = rows.len();
        let listings: Vec<RawListing> = rows.into_iter().filter(|row| params.admits(row)).collect();

        debug!("{} of {} rows match the search", listings.len(), total);
        info!("Loaded {} listings", listings.len());
        Ok(listings)
    }

    fn source_name(&self) -> &'static str {
        "Funda export"
    }
}
