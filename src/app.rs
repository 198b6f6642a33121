use crate::ingest::{encode_image, HttpImageFetcher, ImageFetcher, Normalizer, RejectedListing};
use crate::models::NormalizedListing;
use crate::presentation::{
    render_table, SearchQuery, DATA_VIEWER_COLUMNS, DISTANCE_COLUMN, LINKED_IMAGE,
    VECTOR_VIEWER_COLUMNS,
};
use crate::scrapers::{ListingSource, SearchParams, ALL_AREAS};
use crate::settings::{Settings, StoreBackend};
use crate::store::{
    CollectionDef, DocumentStore, Filter, ImportMode, MemoryStore, StoredObject, WeaviateStore,
};
use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{info, warn};

/// Result of an ingest run that did not fail
#[derive(Debug)]
pub enum IngestStatus {
    /// The source had no listings for the search; the store was not touched
    Empty,
    Imported {
        written: usize,
        rejected: Vec<RejectedListing>,
    },
}

/// The batch most recently imported
#[derive(Debug, Clone)]
pub struct IngestedBatch {
    pub params: SearchParams,
    pub listings: Vec<NormalizedListing>,
    pub ingested_at: DateTime<Utc>,
}

/// A stored listing with its embedding, for the 3D viewer
#[derive(Debug, Clone, PartialEq)]
pub struct ListingVector {
    pub house_id: String,
    pub url: String,
    pub price: Option<i64>,
    pub vector: Vec<f32>,
}

#[derive(Deserialize)]
struct CityEntry {
    city: String,
}

/// Process-wide state: built once at startup, shared by every request, and
/// closed with [`AppState::shutdown`].
pub struct AppState {
    settings: Settings,
    collection_def: CollectionDef,
    store: Arc<dyn DocumentStore>,
    fetcher: Arc<dyn ImageFetcher>,
    client: Client,
    cities: RwLock<Option<Vec<String>>>,
    batch: RwLock<Option<IngestedBatch>>,
}

impl AppState {
    /// Connect to the configured store and load the collection definition
    pub async fn bootstrap(settings: Settings) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.http.timeout_secs))
            .user_agent(settings.http.user_agent.as_str())
            .build()
            .context("Failed to create HTTP client")?;

        let collection_def = CollectionDef::load(&settings.store.collection_def)
            .await
            .with_context(|| {
                format!(
                    "Failed to load collection definition {}",
                    settings.store.collection_def.display()
                )
            })?;

        let store: Arc<dyn DocumentStore> = match settings.store.backend {
            StoreBackend::Weaviate => Arc::new(WeaviateStore::new(
                client.clone(),
                &settings.store.url,
                collection_def.class.clone(),
            )),
            StoreBackend::Memory => Arc::new(MemoryStore::new()),
        };

        if !store.is_live().await.context("Failed to reach the document store")? {
            bail!("Document store at {} is not live", settings.store.url);
        }
        info!("Connected to {:?} store", settings.store.backend);

        let fetcher = Arc::new(HttpImageFetcher::with_client(client.clone()));
        Self::new(settings, collection_def, store, fetcher, client)
    }

    pub fn new(
        settings: Settings,
        collection_def: CollectionDef,
        store: Arc<dyn DocumentStore>,
        fetcher: Arc<dyn ImageFetcher>,
        client: Client,
    ) -> Result<Self> {
        collection_def
            .check_listing_properties()
            .context("Collection definition does not fit the listing model")?;

        Ok(Self {
            settings,
            collection_def,
            store,
            fetcher,
            client,
            cities: RwLock::new(None),
            batch: RwLock::new(None),
        })
    }

    /// Pull listings from `source`, normalize them and write them to the store
    pub async fn ingest(
        &self,
        source: &dyn ListingSource,
        params: &SearchParams,
    ) -> Result<IngestStatus> {
        let raw = source
            .fetch(params)
            .await
            .with_context(|| format!("Failed to fetch listings from {}", source.source_name()))?;

        if raw.is_empty() {
            info!("No listings for {} in {}", source.source_name(), params.area);
            self.reset_ingest().await;
            return Ok(IngestStatus::Empty);
        }

        let normalizer = Normalizer::new(self.fetcher.clone(), &self.settings.ingest);
        let outcome = normalizer
            .normalize(raw)
            .await
            .context("Failed to normalize listings")?;

        if outcome.listings.is_empty() {
            warn!("Every listing was rejected, leaving the store untouched");
            return Ok(IngestStatus::Imported {
                written: 0,
                rejected: outcome.rejected,
            });
        }

        self.prepare_store(&outcome.listings).await?;

        let written = self
            .store
            .upsert_batch(&outcome.listings)
            .await
            .context("Failed to write listings")?
            .into_result()?;

        info!(
            "Imported {} listings for {} ({} rejected)",
            written,
            params.area,
            outcome.rejected.len()
        );

        *self.batch.write().await = Some(IngestedBatch {
            params: params.clone(),
            listings: outcome.listings,
            ingested_at: Utc::now(),
        });

        Ok(IngestStatus::Imported {
            written,
            rejected: outcome.rejected,
        })
    }

    async fn prepare_store(&self, listings: &[NormalizedListing]) -> Result<()> {
        match self.settings.ingest.import_mode {
            ImportMode::RecreateCollection => self
                .store
                .recreate_collection(&self.collection_def)
                .await
                .context("Failed to recreate collection"),
            ImportMode::ReplaceCity => {
                let cities: BTreeSet<&str> = listings
                    .iter()
                    .filter_map(|listing| listing.fields.city.as_deref())
                    .collect();

                for city in cities {
                    let deleted = self
                        .store
                        .delete_where(&Filter::equal("city", city))
                        .await
                        .with_context(|| format!("Failed to clear listings for {}", city))?;
                    info!("Cleared {} stored listings for {}", deleted, city);
                }
                Ok(())
            }
        }
    }

    /// Forget the cached batch, as when the search parameters change
    pub async fn reset_ingest(&self) {
        *self.batch.write().await = None;
    }

    pub async fn current_batch(&self) -> Option<IngestedBatch> {
        self.batch.read().await.clone()
    }

    /// HTML table of the stored listings of a city, or of every city for `nl`
    pub async fn data_viewer(&self, city: &str) -> Result<String> {
        let properties: Vec<&str> = DATA_VIEWER_COLUMNS
            .iter()
            .copied()
            .chain(std::iter::once(LINKED_IMAGE))
            .collect();

        let filter = area_filter(city);
        let objects = self
            .store
            .fetch_objects(filter.as_ref(), &properties, false, self.settings.store.fetch_limit)
            .await
            .with_context(|| format!("Failed to fetch listings for {}", city))?;

        Ok(render_table(&objects, LINKED_IMAGE, DATA_VIEWER_COLUMNS))
    }

    /// Stored embeddings of a city's listings
    pub async fn vector_view(&self, city: &str) -> Result<Vec<ListingVector>> {
        let filter = area_filter(city);
        let objects = self
            .store
            .fetch_objects(
                filter.as_ref(),
                VECTOR_VIEWER_COLUMNS,
                true,
                self.settings.store.fetch_limit,
            )
            .await
            .with_context(|| format!("Failed to fetch vectors for {}", city))?;

        Ok(objects
            .into_iter()
            .filter_map(|object| {
                let house_id = object.properties.get("house_id")?.as_str()?.to_string();
                Some(ListingVector {
                    house_id,
                    url: object
                        .properties
                        .get("url")
                        .and_then(Value::as_str)
                        .unwrap_or_default()
                        .to_string(),
                    price: object.properties.get("price").and_then(Value::as_i64),
                    vector: object.vector?,
                })
            })
            .collect())
    }

    /// Similarity search by image URL or free text within `city`; `None` for
    /// blank input
    pub async fn search(&self, input: &str, city: &str) -> Result<Option<Vec<StoredObject>>> {
        let Some(query) = SearchQuery::parse(input) else {
            return Ok(None);
        };
        let filter = area_filter(city);

        let properties: Vec<&str> = std::iter::once(LINKED_IMAGE)
            .chain(DATA_VIEWER_COLUMNS.iter().copied())
            .collect();
        let limit = self.settings.search.limit;

        let objects = match query {
            SearchQuery::Image(url) => {
                info!("Searching by image {}", url);
                let bytes = self
                    .fetcher
                    .fetch(url.as_str())
                    .await
                    .with_context(|| format!("Failed to fetch search image {}", url))?;
                self.store
                    .near_image(&encode_image(&bytes), filter.as_ref(), &properties, limit)
                    .await
            }
            SearchQuery::Text(text) => {
                info!("Searching by text {:?}", text);
                self.store
                    .near_text(&text, filter.as_ref(), &properties, limit)
                    .await
            }
        }
        .context("Search failed")?;

        Ok(Some(objects))
    }

    /// Search results as an HTML table with a distance column
    pub async fn search_table(&self, input: &str, city: &str) -> Result<Option<String>> {
        let columns: Vec<&str> = DATA_VIEWER_COLUMNS
            .iter()
            .copied()
            .chain(std::iter::once(DISTANCE_COLUMN))
            .collect();

        Ok(self
            .search(input, city)
            .await?
            .map(|objects| render_table(&objects, LINKED_IMAGE, &columns)))
    }

    /// Selectable areas: `nl` followed by every city, sorted
    pub async fn cities(&self) -> Result<Vec<String>> {
        if let Some(cities) = self.cities.read().await.as_ref() {
            return Ok(cities.clone());
        }

        let response = self
            .client
            .get(&self.settings.cities.url)
            .send()
            .await
            .context("Failed to fetch city list")?;
        if !response.status().is_success() {
            bail!("City list returned status: {}", response.status());
        }
        let entries: Vec<CityEntry> = response.json().await.context("Failed to parse city list")?;

        let cities = city_list(entries);
        info!("Loaded {} cities", cities.len() - 1);
        *self.cities.write().await = Some(cities.clone());
        Ok(cities)
    }

    pub async fn shutdown(self) {
        self.reset_ingest().await;
        info!("Shut down");
    }
}

/// Store filter for an area; the whole country is unfiltered
fn area_filter(area: &str) -> Option<Filter> {
    let area = area.to_lowercase();
    (area != ALL_AREAS).then(|| Filter::equal("city", area))
}

fn city_list(entries: Vec<CityEntry>) -> Vec<String> {
    let mut cities: Vec<String> = entries
        .into_iter()
        .map(|entry| entry.city.to_lowercase())
        .collect();
    cities.sort();
    cities.insert(0, ALL_AREAS.to_string());
    cities
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::{listing_uuid, FailurePolicy, FetchError, IngestError};
    use crate::models::{ListingFields, RawListing};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    struct FixedSource(Vec<RawListing>);

    #[async_trait]
    impl ListingSource for FixedSource {
        async fn fetch(&self, params: &SearchParams) -> Result<Vec<RawListing>> {
            Ok(self.0.iter().filter(|l| params.admits(l)).cloned().collect())
        }

        fn source_name(&self) -> &'static str {
            "fixed"
        }
    }

    struct StubFetcher(HashMap<String, Vec<u8>>);

    #[async_trait]
    impl ImageFetcher for StubFetcher {
        async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
            self.0.get(url).cloned().ok_or(FetchError::Status {
                url: url.to_string(),
                status: 404,
            })
        }
    }

    fn raw(house_id: &str, city: &str, photo: &str) -> RawListing {
        RawListing {
            fields: ListingFields {
                house_id: house_id.to_string(),
                url: format!("https://listing/{}", house_id),
                city: Some(city.to_string()),
                address: Some(format!("Kerkstraat {}", house_id)),
                price: Some(400_000),
                ..Default::default()
            },
            photo: photo.to_string(),
        }
    }

    fn fetcher() -> Arc<StubFetcher> {
        Arc::new(StubFetcher(
            [
                ("https://x/1", b"ONE".to_vec()),
                ("https://x/2", b"TWO".to_vec()),
                ("https://x/3", b"THREE".to_vec()),
            ]
            .into_iter()
            .map(|(url, bytes)| (url.to_string(), bytes))
            .collect(),
        ))
    }

    async fn state(settings: Settings, store: Arc<MemoryStore>) -> AppState {
        let def = CollectionDef::load(concat!(env!("CARGO_MANIFEST_DIR"), "/collection_def.json"))
            .await
            .unwrap();
        AppState::new(settings, def, store, fetcher(), Client::new()).unwrap()
    }

    fn params(area: &str) -> SearchParams {
        SearchParams {
            area: area.to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_ingest_writes_normalized_listings() {
        let store = Arc::new(MemoryStore::new());
        let app = state(Settings::default(), store.clone()).await;
        let source = FixedSource(vec![
            raw("1", "haarlem", "https://x/1 180w"),
            raw("2", "haarlem", "https://x/2 180w"),
        ]);

        let status = app.ingest(&source, &params("haarlem")).await.unwrap();

        assert!(matches!(status, IngestStatus::Imported { written: 2, ref rejected } if rejected.is_empty()));
        assert_eq!(store.len().await, 2);
        assert_eq!(store.collection().await.unwrap().class, "Listing");
        let stored = store.get(&listing_uuid("1")).await.unwrap();
        assert_eq!(stored.properties["image_enc"], "T05F");
        assert_eq!(app.current_batch().await.unwrap().listings.len(), 2);
    }

    #[tokio::test]
    async fn test_empty_source_is_not_a_failure() {
        let store = Arc::new(MemoryStore::new());
        let app = state(Settings::default(), store.clone()).await;
        let source = FixedSource(vec![raw("1", "haarlem", "https://x/1 180w")]);

        let status = app.ingest(&source, &params("leiden")).await.unwrap();

        assert!(matches!(status, IngestStatus::Empty));
        assert!(store.collection().await.is_none());
        assert!(app.current_batch().await.is_none());
    }

    #[tokio::test]
    async fn test_rejected_rows_are_reported() {
        let store = Arc::new(MemoryStore::new());
        let app = state(Settings::default(), store.clone()).await;
        let source = FixedSource(vec![
            raw("1", "haarlem", "https://x/1 180w"),
            raw("2", "haarlem", "https://x/2 360w"),
            raw("9", "haarlem", "https://x/9 180w"),
        ]);

        let status = app.ingest(&source, &params("haarlem")).await.unwrap();

        match status {
            IngestStatus::Imported { written, rejected } => {
                assert_eq!(written, 1);
                let ids: Vec<&str> = rejected.iter().map(|r| r.house_id.as_str()).collect();
                assert_eq!(ids, vec!["2", "9"]);
                assert!(matches!(rejected[0].error, IngestError::MissingPreferredPhoto { .. }));
                assert!(matches!(rejected[1].error, IngestError::ImageFetchFailure { .. }));
            }
            other => panic!("expected import, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_abort_policy_fails_ingest_without_writes() {
        let mut settings = Settings::default();
        settings.ingest.failure_policy = FailurePolicy::AbortBatch;
        let store = Arc::new(MemoryStore::new());
        let app = state(settings, store.clone()).await;
        let source = FixedSource(vec![
            raw("1", "haarlem", "https://x/1 180w"),
            raw("2", "haarlem", "https://x/2 360w"),
        ]);

        let err = app.ingest(&source, &params("haarlem")).await.unwrap_err();

        assert!(matches!(
            err.downcast_ref::<IngestError>(),
            Some(IngestError::MissingPreferredPhoto { .. })
        ));
        assert_eq!(store.len().await, 0);
    }

    #[tokio::test]
    async fn test_store_write_failure_is_surfaced() {
        let store = Arc::new(MemoryStore::rejecting(["2"]));
        let app = state(Settings::default(), store.clone()).await;
        let source = FixedSource(vec![
            raw("1", "haarlem", "https://x/1 180w"),
            raw("2", "haarlem", "https://x/2 180w"),
        ]);

        let err = app.ingest(&source, &params("haarlem")).await.unwrap_err();

        match err.downcast_ref::<IngestError>() {
            Some(IngestError::StoreWriteFailure { failed, total, .. }) => {
                assert_eq!((*failed, *total), (1, 2));
            }
            other => panic!("expected StoreWriteFailure, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_replace_city_keeps_other_cities() {
        let mut settings = Settings::default();
        settings.ingest.import_mode = ImportMode::ReplaceCity;
        let store = Arc::new(MemoryStore::new());
        let app = state(settings, store.clone()).await;

        app.ingest(
            &FixedSource(vec![raw("1", "haarlem", "https://x/1 180w"), raw("2", "leiden", "https://x/2 180w")]),
            &params(ALL_AREAS),
        )
        .await
        .unwrap();
        app.ingest(
            &FixedSource(vec![raw("3", "haarlem", "https://x/3 180w")]),
            &params("haarlem"),
        )
        .await
        .unwrap();

        assert_eq!(store.len().await, 2);
        assert!(store.get(&listing_uuid("1")).await.is_none());
        assert!(store.get(&listing_uuid("2")).await.is_some());
        assert!(store.get(&listing_uuid("3")).await.is_some());
    }

    #[tokio::test]
    async fn test_reingest_replaces_by_house_id() {
        let store = Arc::new(MemoryStore::new());
        let mut settings = Settings::default();
        settings.ingest.import_mode = ImportMode::ReplaceCity;
        let app = state(settings, store.clone()).await;

        let mut cheaper = raw("1", "haarlem", "https://x/1 180w");
        cheaper.fields.price = Some(350_000);

        app.ingest(&FixedSource(vec![raw("1", "haarlem", "https://x/1 180w")]), &params("haarlem"))
            .await
            .unwrap();
        app.ingest(&FixedSource(vec![cheaper]), &params("haarlem"))
            .await
            .unwrap();

        assert_eq!(store.len().await, 1);
        let stored = store.get(&listing_uuid("1")).await.unwrap();
        assert_eq!(stored.properties["price"], 350_000);
    }

    #[tokio::test]
    async fn test_data_viewer_renders_city_listings() {
        let store = Arc::new(MemoryStore::new());
        let app = state(Settings::default(), store).await;
        app.ingest(
            &FixedSource(vec![raw("1", "haarlem", "https://x/1 180w"), raw("2", "leiden", "https://x/2 180w")]),
            &params(ALL_AREAS),
        )
        .await
        .unwrap();

        let html = app.data_viewer("haarlem").await.unwrap();

        assert!(html.contains(r#"<img src="https://x/1" width="60" >"#));
        assert!(html.contains("Kerkstraat 1"));
        assert!(!html.contains("Kerkstraat 2"));
    }

    #[tokio::test]
    async fn test_data_viewer_for_nl_covers_every_city() {
        let store = Arc::new(MemoryStore::new());
        let app = state(Settings::default(), store).await;
        app.ingest(
            &FixedSource(vec![raw("1", "haarlem", "https://x/1 180w"), raw("2", "leiden", "https://x/2 180w")]),
            &params(ALL_AREAS),
        )
        .await
        .unwrap();

        let html = app.data_viewer(ALL_AREAS).await.unwrap();

        assert!(html.contains("Kerkstraat 1"));
        assert!(html.contains("Kerkstraat 2"));
    }

    #[tokio::test]
    async fn test_data_viewer_city_is_case_insensitive() {
        let store = Arc::new(MemoryStore::new());
        let app = state(Settings::default(), store).await;
        app.ingest(&FixedSource(vec![raw("1", "haarlem", "https://x/1 180w")]), &params("haarlem"))
            .await
            .unwrap();

        let html = app.data_viewer("Haarlem").await.unwrap();
        assert!(html.contains("Kerkstraat 1"));
    }

    #[tokio::test]
    async fn test_vector_view_queries_whole_country_with_fetch_limit() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/graphql"))
            .and(body_string_contains("limit: 250"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": {"Get": {"Listing": [
                    {"house_id": "1", "url": "https://listing/1", "price": 400000,
                     "_additional": {"id": listing_uuid("1").to_string(), "vector": [0.5, 0.25]}},
                    {"house_id": "2", "url": "https://listing/2", "price": null,
                     "_additional": {"id": listing_uuid("2").to_string(), "vector": [1.0, 0.0]}}
                ]}}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let mut settings = Settings::default();
        settings.store.fetch_limit = 250;
        let def = CollectionDef::load(concat!(env!("CARGO_MANIFEST_DIR"), "/collection_def.json"))
            .await
            .unwrap();
        let store = Arc::new(WeaviateStore::new(Client::new(), &server.uri(), "Listing"));
        let app = AppState::new(settings, def, store, fetcher(), Client::new()).unwrap();

        let vectors = app.vector_view(ALL_AREAS).await.unwrap();

        assert_eq!(vectors.len(), 2);
        assert_eq!(vectors[0].vector, vec![0.5, 0.25]);
        assert_eq!(vectors[1].price, None);

        let requests = server.received_requests().await.unwrap();
        let body = String::from_utf8_lossy(&requests[0].body).to_string();
        assert!(!body.contains("where"));
    }

    #[tokio::test]
    async fn test_search_is_limited_to_city() {
        let store = Arc::new(MemoryStore::new());
        let app = state(Settings::default(), store).await;
        app.ingest(
            &FixedSource(vec![raw("1", "haarlem", "https://x/1 180w"), raw("2", "leiden", "https://x/2 180w")]),
            &params(ALL_AREAS),
        )
        .await
        .unwrap();

        let everywhere = app.search("kerkstraat", ALL_AREAS).await.unwrap().unwrap();
        assert_eq!(everywhere.len(), 2);

        let leiden = app.search("kerkstraat", "leiden").await.unwrap().unwrap();
        assert_eq!(leiden.len(), 1);
        assert_eq!(leiden[0].uuid, listing_uuid("2"));

        let image = app.search("https://x/1", "leiden").await.unwrap().unwrap();
        assert!(image.is_empty());
    }

    #[test]
    fn test_area_filter() {
        assert_eq!(area_filter("nl"), None);
        assert_eq!(area_filter("NL"), None);
        assert_eq!(area_filter("Haarlem"), Some(Filter::equal("city", "haarlem")));
    }

    #[tokio::test]
    async fn test_search_by_text_and_image() {
        let store = Arc::new(MemoryStore::new());
        let app = state(Settings::default(), store).await;
        app.ingest(
            &FixedSource(vec![raw("1", "haarlem", "https://x/1 180w"), raw("2", "haarlem", "https://x/2 180w")]),
            &params("haarlem"),
        )
        .await
        .unwrap();

        assert!(app.search("  ", ALL_AREAS).await.unwrap().is_none());

        let text = app.search("kerkstraat 2", ALL_AREAS).await.unwrap().unwrap();
        assert_eq!(text.len(), 1);
        assert_eq!(text[0].properties["address"], "Kerkstraat 2");

        let image = app.search("https://x/1", "haarlem").await.unwrap().unwrap();
        assert_eq!(image.len(), 1);
        assert_eq!(image[0].uuid, listing_uuid("1"));

        let table = app.search_table("https://x/1", "haarlem").await.unwrap().unwrap();
        assert!(table.contains("<th>distance</th>"));
        assert!(table.contains("<td>0.0000</td>"));
    }

    #[tokio::test]
    async fn test_cities_are_shaped_and_cached() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/nl.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"city": "Utrecht", "lat": "52.09", "lng": "5.12"},
                {"city": "Amsterdam", "lat": "52.37", "lng": "4.89"},
                {"city": "Haarlem", "lat": "52.38", "lng": "4.63"}
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let mut settings = Settings::default();
        settings.cities.url = format!("{}/nl.json", server.uri());
        let app = state(settings, Arc::new(MemoryStore::new())).await;

        let cities = app.cities().await.unwrap();
        assert_eq!(cities, vec!["nl", "amsterdam", "haarlem", "utrecht"]);
        assert_eq!(app.cities().await.unwrap(), cities);
    }

    #[tokio::test]
    async fn test_mismatched_definition_is_rejected() {
        let def = CollectionDef::from_json(r#"{"class": "Listing", "properties": []}"#).unwrap();
        let result = AppState::new(
            Settings::default(),
            def,
            Arc::new(MemoryStore::new()),
            fetcher(),
            Client::new(),
        );
        assert!(result.is_err());
    }
}
