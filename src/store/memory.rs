use crate::models::NormalizedListing;
use crate::store::{
    CollectionDef, DocumentStore, Filter, StoreError, StoredObject, UpsertFailure, UpsertReport,
};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashSet};
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

/// In-process document store.
///
/// Similarity search degrades to exact matching: `near_text` finds objects with
/// a text property containing the query, `near_image` finds identical images.
/// Both report a distance of zero.
#[derive(Default)]
pub struct MemoryStore {
    collection: RwLock<Option<CollectionDef>>,
    objects: RwLock<BTreeMap<Uuid, StoredObject>>,
    rejected_house_ids: HashSet<String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Refuse writes of the given listings, as a store with a stricter
    /// schema would
    #[cfg(test)]
    pub fn rejecting<I, S>(house_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            rejected_house_ids: house_ids.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }

    pub async fn get(&self, uuid: &Uuid) -> Option<StoredObject> {
        self.objects.read().await.get(uuid).cloned()
    }

    pub async fn collection(&self) -> Option<CollectionDef> {
        self.collection.read().await.clone()
    }

    async fn select<P>(
        &self,
        filter: Option<&Filter>,
        properties: &[&str],
        limit: usize,
        predicate: P,
    ) -> Vec<StoredObject>
    where
        P: Fn(&StoredObject) -> bool,
    {
        self.objects
            .read()
            .await
            .values()
            .filter(|object| filter.map_or(true, |filter| filter.matches(&object.properties)))
            .filter(|object| predicate(object))
            .take(limit)
            .map(|object| project(object, properties))
            .collect()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn recreate_collection(&self, def: &CollectionDef) -> Result<(), StoreError> {
        self.objects.write().await.clear();
        *self.collection.write().await = Some(def.clone());
        Ok(())
    }

    async fn delete_where(&self, filter: &Filter) -> Result<usize, StoreError> {
        let mut objects = self.objects.write().await;
        let before = objects.len();
        objects.retain(|_, object| !filter.matches(&object.properties));
        Ok(before - objects.len())
    }

    async fn upsert_batch(&self, listings: &[NormalizedListing]) -> Result<UpsertReport, StoreError> {
        let mut report = UpsertReport {
            total: listings.len(),
            failures: Vec::new(),
        };
        let mut objects = self.objects.write().await;

        for listing in listings {
            if self.rejected_house_ids.contains(listing.house_id()) {
                report.failures.push(UpsertFailure {
                    uuid: listing.uuid,
                    message: format!("listing {} rejected", listing.house_id()),
                });
                continue;
            }

            let properties = match listing.properties() {
                Value::Object(properties) => properties,
                _ => Map::new(),
            };
            debug!("Storing listing {} as {}", listing.house_id(), listing.uuid);
            objects.insert(
                listing.uuid,
                StoredObject {
                    uuid: listing.uuid,
                    properties,
                    distance: None,
                    vector: None,
                },
            );
        }

        Ok(report)
    }

    async fn fetch_objects(
        &self,
        filter: Option<&Filter>,
        properties: &[&str],
        _include_vector: bool,
        limit: usize,
    ) -> Result<Vec<StoredObject>, StoreError> {
        Ok(self.select(filter, properties, limit, |_| true).await)
    }

    async fn near_text(
        &self,
        query: &str,
        filter: Option<&Filter>,
        properties: &[&str],
        limit: usize,
    ) -> Result<Vec<StoredObject>, StoreError> {
        let query = query.to_lowercase();
        let mut found = self
            .select(filter, properties, limit, |object| {
                object
                    .properties
                    .values()
                    .filter_map(Value::as_str)
                    .any(|text| text.to_lowercase().contains(&query))
            })
            .await;
        found.iter_mut().for_each(|object| object.distance = Some(0.0));
        Ok(found)
    }

    async fn near_image(
        &self,
        image: &str,
        filter: Option<&Filter>,
        properties: &[&str],
        limit: usize,
    ) -> Result<Vec<StoredObject>, StoreError> {
        let mut found = self
            .select(filter, properties, limit, |object| {
                object.properties.get("image_enc").and_then(Value::as_str) == Some(image)
            })
            .await;
        found.iter_mut().for_each(|object| object.distance = Some(0.0));
        Ok(found)
    }

    async fn is_live(&self) -> Result<bool, StoreError> {
        Ok(true)
    }
}

fn project(object: &StoredObject, properties: &[&str]) -> StoredObject {
    StoredObject {
        uuid: object.uuid,
        properties: object
            .properties
            .iter()
            .filter(|(name, _)| properties.contains(&name.as_str()))
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect(),
        distance: None,
        vector: object.vector.clone(),
    }
}
