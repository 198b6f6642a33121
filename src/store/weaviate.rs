use crate::models::NormalizedListing;
use crate::store::{
    CollectionDef, DocumentStore, Filter, StoreError, StoredObject, UpsertFailure, UpsertReport,
};
use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Objects sent per batch request
const BATCH_SIZE: usize = 100;

/// Weaviate client over the REST and GraphQL endpoints
pub struct WeaviateStore {
    client: Client,
    base_url: String,
    class: String,
}

impl WeaviateStore {
    pub fn new(client: Client, base_url: &str, class: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            class: class.into(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/v1/{}", self.base_url, path)
    }

    async fn query(
        &self,
        arguments: Vec<String>,
        properties: &[&str],
        additional: &[&str],
    ) -> Result<Vec<StoredObject>, StoreError> {
        let query = get_query(&self.class, &arguments, properties, additional);
        debug!("GraphQL query: {}", query);

        let response = self
            .client
            .post(self.endpoint("graphql"))
            .json(&json!({ "query": query }))
            .send()
            .await?;
        let body: GraphQlResponse = ensure_success(response).await?.json().await?;

        if !body.errors.is_empty() {
            let messages: Vec<String> = body.errors.into_iter().map(|e| e.message).collect();
            return Err(StoreError::Query(messages.join("; ")));
        }

        let objects = body
            .data
            .as_ref()
            .and_then(|data| data.get("Get"))
            .and_then(|get| get.get(&self.class))
            .and_then(Value::as_array)
            .ok_or_else(|| StoreError::Decode(format!("no Get.{} in response", self.class)))?;

        objects.iter().map(stored_object).collect()
    }
}

#[async_trait]
impl DocumentStore for WeaviateStore {
    async fn recreate_collection(&self, def: &CollectionDef) -> Result<(), StoreError> {
        if def.class != self.class {
            return Err(StoreError::Schema(format!(
                "definition is for class {}, store is bound to {}",
                def.class, self.class
            )));
        }

        let response = self
            .client
            .delete(self.endpoint(&format!("schema/{}", self.class)))
            .send()
            .await?;
        if response.status() != StatusCode::NOT_FOUND {
            ensure_success(response).await?;
        }

        let response = self.client.post(self.endpoint("schema")).json(def).send().await?;
        ensure_success(response).await?;

        info!("Recreated collection {}", self.class);
        Ok(())
    }

    async fn delete_where(&self, filter: &Filter) -> Result<usize, StoreError> {
        let body = json!({
            "match": {
                "class": self.class,
                "where": {
                    "path": [filter.property],
                    "operator": "Equal",
                    "valueText": filter.value,
                },
            },
            "output": "minimal",
        });

        let response = self
            .client
            .delete(self.endpoint("batch/objects"))
            .json(&body)
            .send()
            .await?;
        let body: BatchDeleteResponse = ensure_success(response).await?.json().await?;

        if body.results.failed > 0 {
            return Err(StoreError::Query(format!(
                "{} of {} deletions failed",
                body.results.failed, body.results.matches
            )));
        }

        info!(
            "Deleted {} objects where {} = {}",
            body.results.successful, filter.property, filter.value
        );
        Ok(body.results.successful)
    }

    async fn upsert_batch(&self, listings: &[NormalizedListing]) -> Result<UpsertReport, StoreError> {
        let mut report = UpsertReport {
            total: listings.len(),
            failures: Vec::new(),
        };

        for chunk in listings.chunks(BATCH_SIZE) {
            let objects: Vec<Value> = chunk
                .iter()
                .map(|listing| {
                    json!({
                        "class": self.class,
                        "id": listing.uuid,
                        "properties": listing.properties(),
                    })
                })
                .collect();

            let response = self
                .client
                .post(self.endpoint("batch/objects"))
                .json(&json!({ "objects": objects }))
                .send()
                .await?;
            let results: Vec<BatchObjectResult> = ensure_success(response).await?.json().await?;

            for (listing, result) in chunk.iter().zip(results.iter()) {
                if let Some(message) = result.error_message() {
                    warn!("Store rejected listing {}: {}", listing.house_id(), message);
                    report.failures.push(UpsertFailure {
                        uuid: listing.uuid,
                        message,
                    });
                }
            }

            if results.len() < chunk.len() {
                for listing in &chunk[results.len()..] {
                    report.failures.push(UpsertFailure {
                        uuid: listing.uuid,
                        message: "missing from batch response".to_string(),
                    });
                }
            }
        }

        info!("Upserted {} of {} listings", report.written(), report.total);
        Ok(report)
    }

    async fn fetch_objects(
        &self,
        filter: Option<&Filter>,
        properties: &[&str],
        include_vector: bool,
        limit: usize,
    ) -> Result<Vec<StoredObject>, StoreError> {
        let additional: &[&str] = if include_vector { &["id", "vector"] } else { &["id"] };
        self.query(arguments(None, filter, limit), properties, additional)
            .await
    }

    async fn near_text(
        &self,
        query: &str,
        filter: Option<&Filter>,
        properties: &[&str],
        limit: usize,
    ) -> Result<Vec<StoredObject>, StoreError> {
        let near = format!("nearText: {{ concepts: [{}] }}", graphql_string(query));
        self.query(arguments(Some(near), filter, limit), properties, &["id", "distance"])
            .await
    }

    async fn near_image(
        &self,
        image: &str,
        filter: Option<&Filter>,
        properties: &[&str],
        limit: usize,
    ) -> Result<Vec<StoredObject>, StoreError> {
        let near = format!("nearImage: {{ image: {} }}", graphql_string(image));
        self.query(arguments(Some(near), filter, limit), properties, &["id", "distance"])
            .await
    }

    async fn is_live(&self) -> Result<bool, StoreError> {
        let response = self
            .client
            .get(self.endpoint(".well-known/live"))
            .send()
            .await?;
        Ok(response.status().is_success())
    }
}

async fn ensure_success(response: Response) -> Result<Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    warn!("Weaviate returned status: {}", status);
    Err(StoreError::Status {
        status: status.as_u16(),
        body,
    })
}

fn graphql_string(value: &str) -> String {
    // JSON string escaping is valid GraphQL string syntax.
    Value::String(value.to_string()).to_string()
}

fn where_argument(filter: &Filter) -> String {
    format!(
        "where: {{ path: [{}], operator: Equal, valueText: {} }}",
        graphql_string(&filter.property),
        graphql_string(&filter.value)
    )
}

fn arguments(near: Option<String>, filter: Option<&Filter>, limit: usize) -> Vec<String> {
    near.into_iter()
        .chain(filter.map(where_argument))
        .chain(std::iter::once(format!("limit: {}", limit)))
        .collect()
}

fn get_query(class: &str, arguments: &[String], properties: &[&str], additional: &[&str]) -> String {
    let arguments = if arguments.is_empty() {
        String::new()
    } else {
        format!("({})", arguments.join(", "))
    };

    format!(
        "{{ Get {{ {}{} {{ {} _additional {{ {} }} }} }} }}",
        class,
        arguments,
        properties.join(" "),
        additional.join(" ")
    )
}

fn stored_object(value: &Value) -> Result<StoredObject, StoreError> {
    let mut properties: Map<String, Value> = value
        .as_object()
        .cloned()
        .ok_or_else(|| StoreError::Decode("result is not an object".to_string()))?;
    let additional = properties.remove("_additional").unwrap_or(Value::Null);

    let uuid = additional
        .get("id")
        .and_then(Value::as_str)
        .ok_or_else(|| StoreError::Decode("result without _additional.id".to_string()))?;
    let uuid = Uuid::parse_str(uuid).map_err(|e| StoreError::Decode(e.to_string()))?;

    let vector = match additional.get("vector") {
        Some(Value::Null) | None => None,
        Some(vector) => Some(
            serde_json::from_value::<Vec<f32>>(vector.clone())
                .map_err(|e| StoreError::Decode(format!("vector: {}", e)))?,
        ),
    };

    Ok(StoredObject {
        uuid,
        properties,
        distance: additional.get("distance").and_then(Value::as_f64),
        vector,
    })
}

#[derive(Deserialize)]
struct GraphQlResponse {
    data: Option<Value>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Deserialize)]
struct GraphQlError {
    message: String,
}

#[derive(Deserialize)]
struct BatchDeleteResponse {
    results: BatchDeleteResults,
}

#[derive(Deserialize)]
struct BatchDeleteResults {
    #[serde(default)]
    matches: usize,
    #[serde(default)]
    successful: usize,
    #[serde(default)]
    failed: usize,
}

#[derive(Deserialize)]
struct BatchObjectResult {
    #[serde(default)]
    result: Option<BatchResultStatus>,
}

#[derive(Deserialize)]
struct BatchResultStatus {
    #[serde(default)]
    errors: Option<BatchErrors>,
}

#[derive(Deserialize)]
struct BatchErrors {
    #[serde(default)]
    error: Vec<GraphQlError>,
}

impl BatchObjectResult {
    fn error_message(&self) -> Option<String> {
        let errors = self.result.as_ref()?.errors.as_ref()?;
        if errors.error.is_empty() {
            return None;
        }
        Some(
            errors
                .error
                .iter()
                .map(|e| e.message.as_str())
                .collect::<Vec<_>>()
                .join("; "),
        )
    }
}
