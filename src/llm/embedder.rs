use crate::errors::{Error, Result};
use crate::llm::EmbeddingProvider;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const OPENAI_DIMENSIONS: usize = 1536;

/// Embedding client for an OpenAI-compatible `/embeddings` endpoint.
#[derive(Debug, Clone)]
pub struct OpenAiEmbedder {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: Vec<&'a str>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

impl OpenAiEmbedder {
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: Option<String>,
    ) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            client: reqwest::Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .unwrap_or_default(),
            base_url,
            api_key,
            model: model.into(),
        }
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAiEmbedder {
    fn name(&self) -> &'static str {
        "openai"
    }

    fn dimensions(&self) -> usize {
        OPENAI_DIMENSIONS
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut embeddings = self.embed_batch(&[text]).await?;
        embeddings
            .pop()
            .ok_or_else(|| Error::llm("Embedding API returned no data."))
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let mut builder = self
            .client
            .post(format!("{}/embeddings", self.base_url))
            .json(&EmbeddingRequest {
                model: &self.model,
                input: texts.to_vec(),
            });
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }
        let response = builder.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::llm(format!(
                "Embedding API returned {status}: {body}"
            )));
        }

        let parsed: EmbeddingResponse = response.json().await?;
        if parsed.data.len() != texts.len() {
            return Err(Error::llm(format!(
                "Embedding count mismatch: got {} for {} inputs.",
                parsed.data.len(),
                texts.len()
            )));
        }
        Ok(parsed.data.into_iter().map(|d| d.embedding).collect())
    }
}

/// Deterministic bag-of-words embedder used when no API key is present.
/// Token hashes pick a bucket, counts accumulate, and the vector is
/// L2-normalized. Coarse, but similar texts land near each other and the
/// whole pipeline stays testable offline.
#[derive(Debug, Clone)]
pub struct HashEmbedder {
    dimensions: usize,
}

impl HashEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(1),
        }
    }

    fn bucket(&self, token: &str) -> usize {
        let mut hasher = DefaultHasher::new();
        token.hash(&mut hasher);
        (hasher.finish() % self.dimensions as u64) as usize
    }
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self::new(256)
    }
}

#[async_trait]
impl EmbeddingProvider for HashEmbedder {
    fn name(&self) -> &'static str {
        "hash"
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut vector = vec![0.0f32; self.dimensions];
        for token in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            let token = token.to_lowercase();
            vector[self.bucket(&token)] += 1.0;
        }
        let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut vector {
                *v /= norm;
            }
        }
        Ok(vector)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn hash_embedder_is_deterministic() {
        let embedder = HashEmbedder::default();
        let a = embedder.embed("install roof trusses").await.unwrap();
        let b = embedder.embed("install roof trusses").await.unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 256);
    }

    #[tokio::test]
    async fn hash_embedder_normalizes_nonempty_text() {
        let embedder = HashEmbedder::default();
        let v = embedder.embed("pour the slab").await.unwrap();
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[tokio::test]
    async fn hash_embedder_handles_empty_text() {
        let embedder = HashEmbedder::default();
        let v = embedder.embed("").await.unwrap();
        assert!(v.iter().all(|x| *x == 0.0));
    }

    #[tokio::test]
    async fn similar_texts_score_closer_than_unrelated_ones() {
        let embedder = HashEmbedder::default();
        let roof_a = embedder.embed("install roof trusses").await.unwrap();
        let roof_b = embedder.embed("inspect roof trusses").await.unwrap();
        let other = embedder.embed("negotiate vendor contract").await.unwrap();

        let dot = |a: &[f32], b: &[f32]| -> f32 { a.iter().zip(b).map(|(x, y)| x * y).sum() };
        assert!(dot(&roof_a, &roof_b) > dot(&roof_a, &other));
    }

    #[test]
    fn embedding_response_parses_openai_shape() {
        let body = r#"{"data": [{"embedding": [0.1, 0.2], "index": 0}], "model": "m"}"#;
        let parsed: EmbeddingResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.data[0].embedding, vec![0.1, 0.2]);
    }
}
