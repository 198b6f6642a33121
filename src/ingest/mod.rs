pub mod error;
pub mod fetch;
pub mod identifier;
pub mod markup;
pub mod normalizer;
pub mod photo;

pub use error::{FetchError, IngestError};
pub use fetch::{encode_image, HttpImageFetcher, ImageFetcher};
pub use identifier::listing_uuid;
pub use normalizer::{FailurePolicy, NormalizeOutcome, Normalizer, RejectedListing};
