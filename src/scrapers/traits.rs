use crate::models::RawListing;
use crate::scrapers::types::SearchParams;
use anyhow::Result;
use async_trait::async_trait;

/// Common trait for listing sources.
///
/// The scraping itself happens elsewhere; a source hands over the rows it
/// produced for a search.
#[async_trait]
pub trait ListingSource: Send + Sync {
    /// Fetch the raw listings matching `params`
    async fn fetch(&self, params: &SearchParams) -> Result<Vec<RawListing>>;

    /// Get the name of the listing source
    fn source_name(&self) -> &'static str;
}
