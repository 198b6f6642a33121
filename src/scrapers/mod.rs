pub mod json_file;
pub mod traits;
pub mod types;

pub use json_file::JsonFileSource;
pub use traits::ListingSource;
pub use types::{PropertyType, SearchParams, WantTo, ALL_AREAS};
