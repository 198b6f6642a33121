use crate::ingest::error::IngestError;
use crate::ingest::fetch::{encode_image, ImageFetcher};
use crate::ingest::identifier::listing_uuid;
use crate::ingest::markup::{html_url, linked_image};
use crate::ingest::photo::select_cover_photo;
use crate::models::{NormalizedListing, RawListing};
use crate::settings::IngestSettings;
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::pin::pin;
use tracing::{debug, info, warn};

/// What happens to a batch when one of its rows cannot be normalized
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Report the row in [`NormalizeOutcome::rejected`] and carry on
    #[default]
    SkipRow,
    /// Fail the whole batch with the first row error
    AbortBatch,
}

/// A row that was left out of the normalized batch
#[derive(Debug)]
pub struct RejectedListing {
    pub house_id: String,
    pub error: IngestError,
}

#[derive(Debug, Default)]
pub struct NormalizeOutcome {
    /// Normalized listings in input order
    pub listings: Vec<NormalizedListing>,
    pub rejected: Vec<RejectedListing>,
}

/// Turns scraped listings into store documents
pub struct Normalizer<F> {
    fetcher: F,
    preferred_tag: String,
    concurrency: usize,
    policy: FailurePolicy,
}

impl<F: ImageFetcher> Normalizer<F> {
    pub fn new(fetcher: F, settings: &IngestSettings) -> Self {
        Self {
            fetcher,
            preferred_tag: settings.preferred_size_tag.clone(),
            concurrency: settings.fetch_concurrency.max(1),
            policy: settings.failure_policy,
        }
    }

    /// Normalize a scraped batch.
    ///
    /// Rows sharing a `house_id` collapse into one, the last occurrence
    /// winning, at the position of the first. Cover images are fetched up to
    /// `fetch_concurrency` at a time; results keep input order either way.
    pub async fn normalize(&self, batch: Vec<RawListing>) -> Result<NormalizeOutcome, IngestError> {
        let batch = dedup_by_house_id(batch);
        info!(
            "Normalizing {} listings (cover tag {}, {} concurrent fetches)",
            batch.len(),
            self.preferred_tag,
            self.concurrency
        );

        let mut outcome = NormalizeOutcome::default();
        let mut rows = pin!(stream::iter(batch)
            .map(|raw| async move {
                let house_id = raw.house_id().to_string();
                (house_id, self.normalize_one(raw).await)
            })
            .buffered(self.concurrency));

        while let Some((house_id, result)) = rows.next().await {
            match result {
                Ok(listing) => outcome.listings.push(listing),
                Err(error) if self.policy == FailurePolicy::AbortBatch => {
                    warn!("Aborting batch on listing {}: {}", house_id, error);
                    return Err(error);
                }
                Err(error) => {
                    warn!("Skipping listing {}: {}", house_id, error);
                    outcome.rejected.push(RejectedListing { house_id, error });
                }
            }
        }

        info!(
            "Normalized {} listings, rejected {}",
            outcome.listings.len(),
            outcome.rejected.len()
        );
        Ok(outcome)
    }

    async fn normalize_one(&self, raw: RawListing) -> Result<NormalizedListing, IngestError> {
        if raw.house_id().trim().is_empty() {
            return Err(IngestError::InvalidListing {
                reason: format!("empty house_id for listing {}", raw.fields.url),
            });
        }

        let image_url = select_cover_photo(&raw, &self.preferred_tag)?.to_string();
        let bytes = self
            .fetcher
            .fetch(&image_url)
            .await
            .map_err(|source| IngestError::ImageFetchFailure {
                house_id: raw.house_id().to_string(),
                url: image_url.clone(),
                source,
            })?;
        debug!("Listing {}: cover {} ({} bytes)", raw.house_id(), image_url, bytes.len());

        let fields = raw.fields;
        Ok(NormalizedListing {
            uuid: listing_uuid(&fields.house_id),
            html_url: html_url(&fields.url),
            linked_image: linked_image(&fields.url, &image_url),
            image_enc: encode_image(&bytes),
            image_url,
            fields,
        })
    }
}

fn dedup_by_house_id(batch: Vec<RawListing>) -> Vec<RawListing> {
    let mut positions: HashMap<String, usize> = HashMap::with_capacity(batch.len());
    let mut unique: Vec<RawListing> = Vec::with_capacity(batch.len());

    for raw in batch {
        match positions.get(raw.house_id()).copied() {
            Some(index) => {
                debug!("Duplicate listing {} in batch, keeping the later row", raw.house_id());
                unique[index] = raw;
            }
            None => {
                positions.insert(raw.house_id().to_string(), unique.len());
                unique.push(raw);
            }
        }
    }

    unique
}
