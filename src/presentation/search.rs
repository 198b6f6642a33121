use url::Url;

/// Columns shown in the data viewer table
pub const DATA_VIEWER_COLUMNS: &[&str] = &[
    "address",
    "living_area",
    "price",
    "price_m2",
    "bedroom",
    "bathroom",
    "energy_label",
];

/// Columns fetched for the 3D viewer
pub const VECTOR_VIEWER_COLUMNS: &[&str] = &["house_id", "url", "price"];

/// Index column of every listing table
pub const LINKED_IMAGE: &str = "linked_image";

/// Search box input, classified by what the store should search with
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchQuery {
    /// An image URL: fetch it and search by image similarity
    Image(Url),
    Text(String),
}

impl SearchQuery {
    /// `None` for blank input
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim();
        if input.is_empty() {
            return None;
        }

        match Url::parse(input) {
            Ok(url) if matches!(url.scheme(), "http" | "https") && url.host().is_some() => {
                Some(Self::Image(url))
            }
            _ => Some(Self::Text(input.to_string())),
        }
    }
}
