use thiserror::Error;

/// Failure while materializing a cover image
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned status {status}")]
    Status { url: String, status: u16 },
}

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("listing {house_id} has no photo tagged {preferred_tag}")]
    MissingPreferredPhoto {
        house_id: String,
        preferred_tag: String,
    },

    #[error("failed to fetch cover image {url} for listing {house_id}: {source}")]
    ImageFetchFailure {
        house_id: String,
        url: String,
        #[source]
        source: FetchError,
    },

    #[error("invalid listing: {reason}")]
    InvalidListing { reason: String },

    #[error("store rejected {failed} of {total} listings: {first_error}")]
    StoreWriteFailure {
        failed: usize,
        total: usize,
        first_error: String,
    },
}
