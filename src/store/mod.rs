pub mod memory;
pub mod schema;
pub mod weaviate;

pub use memory::MemoryStore;
pub use schema::CollectionDef;
pub use weaviate::WeaviateStore;

use crate::ingest::IngestError;
use crate::models::NormalizedListing;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("store request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("store returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("unexpected store response: {0}")]
    Decode(String),

    #[error("store query failed: {0}")]
    Query(String),

    #[error("collection definition: {0}")]
    Schema(String),
}

/// How an import makes room for a fresh batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportMode {
    /// Drop and recreate the whole collection
    #[default]
    RecreateCollection,
    /// Delete stored listings of every city in the batch, keep the rest
    ReplaceCity,
}

/// Equality match on a single text property
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    pub property: String,
    pub value: String,
}

impl Filter {
    pub fn equal(property: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            value: value.into(),
        }
    }

    pub fn matches(&self, properties: &Map<String, Value>) -> bool {
        properties
            .get(&self.property)
            .and_then(Value::as_str)
            .map(|value| value == self.value)
            .unwrap_or(false)
    }
}

/// An object returned by a store query
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StoredObject {
    pub uuid: Uuid,
    pub properties: Map<String, Value>,
    /// Distance to the query, for similarity searches
    pub distance: Option<f64>,
    pub vector: Option<Vec<f32>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpsertFailure {
    pub uuid: Uuid,
    pub message: String,
}

/// Per-object result of a batch upsert
#[derive(Debug, Clone, PartialEq, Default)]
pub struct UpsertReport {
    pub total: usize,
    pub failures: Vec<UpsertFailure>,
}

impl UpsertReport {
    pub fn written(&self) -> usize {
        self.total - self.failures.len()
    }

    /// Number of written objects, or a write failure naming the first error
    pub fn into_result(self) -> Result<usize, IngestError> {
        match self.failures.first() {
            None => Ok(self.total),
            Some(first) => Err(IngestError::StoreWriteFailure {
                failed: self.failures.len(),
                total: self.total,
                first_error: format!("{}: {}", first.uuid, first.message),
            }),
        }
    }
}

/// Vector store holding normalized listings
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Drop the collection if it exists and create it from `def`
    async fn recreate_collection(&self, def: &CollectionDef) -> Result<(), StoreError>;

    /// Delete every object matching `filter`, returning how many went
    async fn delete_where(&self, filter: &Filter) -> Result<usize, StoreError>;

    /// Insert or fully replace listings by their uuid
    async fn upsert_batch(&self, listings: &[NormalizedListing]) -> Result<UpsertReport, StoreError>;

    /// Up to `limit` objects matching `filter`, or any object without one
    async fn fetch_objects(
        &self,
        filter: Option<&Filter>,
        properties: &[&str],
        include_vector: bool,
        limit: usize,
    ) -> Result<Vec<StoredObject>, StoreError>;

    async fn near_text(
        &self,
        query: &str,
        filter: Option<&Filter>,
        properties: &[&str],
        limit: usize,
    ) -> Result<Vec<StoredObject>, StoreError>;

    /// Similarity search by a base64 encoded image
    async fn near_image(
        &self,
        image: &str,
        filter: Option<&Filter>,
        properties: &[&str],
        limit: usize,
    ) -> Result<Vec<StoredObject>, StoreError>;

    async fn is_live(&self) -> Result<bool, StoreError>;
}
