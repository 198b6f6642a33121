use crate::models::NormalizedListing;
use crate::store::StoreError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::path::Path;

/// Weaviate class definition for the listing collection.
///
/// Vectorizer and module settings are carried through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionDef {
    pub class: String,
    pub properties: Vec<PropertyDef>,
    #[serde(flatten)]
    pub config: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyDef {
    pub name: String,
    #[serde(rename = "dataType")]
    pub data_type: Vec<String>,
    #[serde(flatten)]
    pub config: Map<String, Value>,
}

impl CollectionDef {
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let json = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| StoreError::Schema(format!("cannot read {}: {}", path.display(), e)))?;
        Self::from_json(&json)
    }

    pub fn from_json(json: &str) -> Result<Self, StoreError> {
        serde_json::from_str(json).map_err(|e| StoreError::Schema(e.to_string()))
    }

    /// The definition must declare exactly the properties a normalized
    /// listing serializes to.
    pub fn check_listing_properties(&self) -> Result<(), StoreError> {
        let declared: BTreeSet<&str> = self.properties.iter().map(|p| p.name.as_str()).collect();
        let listing: BTreeSet<&str> = NormalizedListing::property_names().collect();

        let missing: Vec<&str> = listing.difference(&declared).copied().collect();
        let unknown: Vec<&str> = declared.difference(&listing).copied().collect();

        if missing.is_empty() && unknown.is_empty() {
            return Ok(());
        }

        Err(StoreError::Schema(format!(
            "class {} does not match listing fields (missing: [{}], unknown: [{}])",
            self.class,
            missing.join(", "),
            unknown.join(", ")
        )))
    }
}
