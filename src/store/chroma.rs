use crate::errors::{Error, Result};
use crate::store::{Collection, QueryHit, VectorStore};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::Mutex;
use uuid::Uuid;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// ChromaDB client over its REST API. Collection ids are resolved with
/// get_or_create on first use and cached for the session.
#[derive(Debug)]
pub struct ChromaStore {
    client: reqwest::Client,
    base_url: String,
    collection_ids: Mutex<HashMap<Collection, String>>,
}

#[derive(Debug, Serialize)]
struct CreateCollectionRequest<'a> {
    name: &'a str,
    get_or_create: bool,
}

#[derive(Debug, Deserialize)]
struct CollectionResponse {
    id: String,
}

#[derive(Debug, Serialize)]
struct UpsertRequest<'a> {
    ids: Vec<String>,
    embeddings: Vec<Vec<f32>>,
    documents: Vec<&'a str>,
}

#[derive(Debug, Serialize)]
struct DeleteRequest {
    ids: Vec<String>,
}

#[derive(Debug, Serialize)]
struct QueryRequest {
    query_embeddings: Vec<Vec<f32>>,
    n_results: usize,
    include: Vec<&'static str>,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    ids: Vec<Vec<String>>,
    #[serde(default)]
    distances: Option<Vec<Vec<f32>>>,
    #[serde(default)]
    documents: Option<Vec<Vec<Option<String>>>>,
}

impl ChromaStore {
    pub fn new(host: impl AsRef<str>, port: u16) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .unwrap_or_default(),
            base_url: format!("http://{}:{}/api/v1", host.as_ref(), port),
            collection_ids: Mutex::new(HashMap::new()),
        }
    }

    async fn collection_id(&self, collection: Collection) -> Result<String> {
        let mut cache = self.collection_ids.lock().await;
        if let Some(id) = cache.get(&collection) {
            return Ok(id.clone());
        }
        let response = self
            .client
            .post(format!("{}/collections", self.base_url))
            .json(&CreateCollectionRequest {
                name: collection.as_str(),
                get_or_create: true,
            })
            .send()
            .await?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::store(format!(
                "ChromaDB collection '{}' unavailable ({status}): {body}",
                collection.as_str()
            )));
        }
        let parsed: CollectionResponse = response.json().await?;
        cache.insert(collection, parsed.id.clone());
        Ok(parsed.id)
    }

    async fn post_checked(&self, url: String, body: impl Serialize) -> Result<reqwest::Response> {
        let response = self.client.post(&url).json(&body).send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(Error::store(format!("ChromaDB returned {status}: {text}")));
        }
        Ok(response)
    }
}

#[async_trait]
impl VectorStore for ChromaStore {
    fn name(&self) -> &'static str {
        "ChromaDB"
    }

    async fn health_check(&self) -> Result<()> {
        let response = self
            .client
            .get(format!("{}/heartbeat", self.base_url))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Error::store(format!(
                "ChromaDB heartbeat returned {}",
                response.status()
            )));
        }
        Ok(())
    }

    async fn upsert(
        &self,
        collection: Collection,
        id: Uuid,
        document: &str,
        embedding: Vec<f32>,
    ) -> Result<()> {
        let cid = self.collection_id(collection).await?;
        self.post_checked(
            format!("{}/collections/{}/upsert", self.base_url, cid),
            UpsertRequest {
                ids: vec![id.to_string()],
                embeddings: vec![embedding],
                documents: vec![document],
            },
        )
        .await
        .map(|_| ())
    }

    async fn delete(&self, collection: Collection, id: Uuid) -> Result<()> {
        let cid = self.collection_id(collection).await?;
        self.post_checked(
            format!("{}/collections/{}/delete", self.base_url, cid),
            DeleteRequest {
                ids: vec![id.to_string()],
            },
        )
        .await
        .map(|_| ())
    }

    async fn query(
        &self,
        collection: Collection,
        embedding: Vec<f32>,
        top_k: usize,
    ) -> Result<Vec<QueryHit>> {
        let cid = self.collection_id(collection).await?;
        let response = self
            .post_checked(
                format!("{}/collections/{}/query", self.base_url, cid),
                QueryRequest {
                    query_embeddings: vec![embedding],
                    n_results: top_k,
                    include: vec!["documents", "distances"],
                },
            )
            .await?;
        let parsed: QueryResponse = response.json().await?;

        let ids = parsed.ids.into_iter().next().unwrap_or_default();
        let distances = parsed
            .distances
            .and_then(|d| d.into_iter().next())
            .unwrap_or_default();
        let documents = parsed
            .documents
            .and_then(|d| d.into_iter().next())
            .unwrap_or_default();

        let mut hits = Vec::with_capacity(ids.len());
        for (i, raw_id) in ids.iter().enumerate() {
            let id = Uuid::parse_str(raw_id)
                .map_err(|e| Error::store(format!("ChromaDB returned a bad id: {e}")))?;
            hits.push(QueryHit {
                id,
                document: documents
                    .get(i)
                    .and_then(|d| d.clone())
                    .unwrap_or_default(),
                distance: distances.get(i).copied().unwrap_or(f32::MAX),
            });
        }
        Ok(hits)
    }
}
