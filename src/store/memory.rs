use crate::core::models::{Activity, Relationship};
use crate::errors::{Error, Result};
use crate::store::{Collection, GraphStore, QueryHit, VectorStore};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

/// Process-local graph store used when Neo4j is unreachable. Nothing
/// survives the session, which the startup banner makes clear.
#[derive(Debug, Default)]
pub struct MemoryGraphStore {
    activities: Mutex<HashMap<Uuid, Activity>>,
    relationships: Mutex<HashMap<Uuid, Relationship>>,
}

impl MemoryGraphStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl GraphStore for MemoryGraphStore {
    fn name(&self) -> &'static str {
        "in-memory graph store"
    }

    async fn health_check(&self) -> Result<()> {
        Ok(())
    }

    async fn load(&self) -> Result<(Vec<Activity>, Vec<Relationship>)> {
        let activities = self
            .activities
            .lock()
            .map_err(|_| Error::store("graph store lock poisoned"))?
            .values()
            .cloned()
            .collect();
        let relationships = self
            .relationships
            .lock()
            .map_err(|_| Error::store("graph store lock poisoned"))?
            .values()
            .cloned()
            .collect();
        Ok((activities, relationships))
    }

    async fn put_activity(&self, activity: &Activity) -> Result<()> {
        self.activities
            .lock()
            .map_err(|_| Error::store("graph store lock poisoned"))?
            .insert(activity.id, activity.clone());
        Ok(())
    }

    async fn delete_activity(&self, id: Uuid) -> Result<()> {
        let mut activities = self
            .activities
            .lock()
            .map_err(|_| Error::store("graph store lock poisoned"))?;
        activities.remove(&id);
        // Mirrors DETACH DELETE: relationships touching the node go too.
        self.relationships
            .lock()
            .map_err(|_| Error::store("graph store lock poisoned"))?
            .retain(|_, r| r.predecessor != id && r.successor != id);
        Ok(())
    }

    async fn put_relationship(&self, relationship: &Relationship) -> Result<()> {
        self.relationships
            .lock()
            .map_err(|_| Error::store("graph store lock poisoned"))?
            .insert(relationship.id, relationship.clone());
        Ok(())
    }

    async fn delete_relationship(&self, id: Uuid) -> Result<()> {
        self.relationships
            .lock()
            .map_err(|_| Error::store("graph store lock poisoned"))?
            .remove(&id);
        Ok(())
    }
}

#[derive(Debug, Clone)]
struct VectorEntry {
    document: String,
    embedding: Vec<f32>,
}

/// Process-local vector store with exact cosine-distance search.
#[derive(Debug, Default)]
pub struct MemoryVectorStore {
    collections: Mutex<HashMap<Collection, HashMap<Uuid, VectorEntry>>>,
}

impl MemoryVectorStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 1.0;
    }
    let mut dot = 0.0f32;
    let mut na = 0.0f32;
    let mut nb = 0.0f32;
    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        na += x * x;
        nb += y * y;
    }
    if na == 0.0 || nb == 0.0 {
        return 1.0;
    }
    1.0 - dot / (na.sqrt() * nb.sqrt())
}

#[async_trait]
impl VectorStore for MemoryVectorStore {
    fn name(&self) -> &'static str {
        "in-memory vector store"
    }

    async fn health_check(&self) -> Result<()> {
        Ok(())
    }

    async fn upsert(
        &self,
        collection: Collection,
        id: Uuid,
        document: &str,
        embedding: Vec<f32>,
    ) -> Result<()> {
        self.collections
            .lock()
            .map_err(|_| Error::store("vector store lock poisoned"))?
            .entry(collection)
            .or_default()
            .insert(
                id,
                VectorEntry {
                    document: document.to_string(),
                    embedding,
                },
            );
        Ok(())
    }

    async fn delete(&self, collection: Collection, id: Uuid) -> Result<()> {
        if let Some(entries) = self
            .collections
            .lock()
            .map_err(|_| Error::store("vector store lock poisoned"))?
            .get_mut(&collection)
        {
            entries.remove(&id);
        }
        Ok(())
    }

    async fn query(
        &self,
        collection: Collection,
        embedding: Vec<f32>,
        top_k: usize,
    ) -> Result<Vec<QueryHit>> {
        let collections = self
            .collections
            .lock()
            .map_err(|_| Error::store("vector store lock poisoned"))?;
        let Some(entries) = collections.get(&collection) else {
            return Ok(Vec::new());
        };
        let mut hits: Vec<QueryHit> = entries
            .iter()
            .map(|(id, entry)| QueryHit {
                id: *id,
                document: entry.document.clone(),
                distance: cosine_distance(&embedding, &entry.embedding),
            })
            .collect();
        hits.sort_by(|a, b| {
            a.distance
                .partial_cmp(&b.distance)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.id.cmp(&b.id))
        });
        hits.truncate(top_k);
        Ok(hits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::RelationType;

    #[tokio::test]
    async fn graph_store_round_trips_entities() {
        let store = MemoryGraphStore::new();
        let a = Activity::new("excavate", "dig foundations", 4.0);
        let b = Activity::new("pour slab", "pour concrete", 2.0);
        let rel = Relationship::new(a.id, b.id, RelationType::FS, 1.0);

        store.put_activity(&a).await.unwrap();
        store.put_activity(&b).await.unwrap();
        store.put_relationship(&rel).await.unwrap();

        let (activities, relationships) = store.load().await.unwrap();
        assert_eq!(activities.len(), 2);
        assert_eq!(relationships.len(), 1);
        assert_eq!(relationships[0].id, rel.id);
    }

    #[tokio::test]
    async fn deleting_activity_detaches_relationships() {
        let store = MemoryGraphStore::new();
        let a = Activity::new("a", "", 1.0);
        let b = Activity::new("b", "", 1.0);
        let rel = Relationship::new(a.id, b.id, RelationType::FS, 0.0);
        store.put_activity(&a).await.unwrap();
        store.put_activity(&b).await.unwrap();
        store.put_relationship(&rel).await.unwrap();

        store.delete_activity(a.id).await.unwrap();
        let (activities, relationships) = store.load().await.unwrap();
        assert_eq!(activities.len(), 1);
        assert!(relationships.is_empty());
    }

    #[tokio::test]
    async fn vector_query_orders_by_cosine_distance() {
        let store = MemoryVectorStore::new();
        let close = Uuid::new_v4();
        let far = Uuid::new_v4();
        store
            .upsert(Collection::Activities, close, "close", vec![1.0, 0.0])
            .await
            .unwrap();
        store
            .upsert(Collection::Activities, far, "far", vec![0.0, 1.0])
            .await
            .unwrap();

        let hits = store
            .query(Collection::Activities, vec![1.0, 0.1], 2)
            .await
            .unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].id, close);
        assert!(hits[0].distance < hits[1].distance);
    }

    #[tokio::test]
    async fn vector_query_respects_top_k_and_missing_collection() {
        let store = MemoryVectorStore::new();
        for i in 0..5 {
            store
                .upsert(
                    Collection::Activities,
                    Uuid::new_v4(),
                    &format!("doc {i}"),
                    vec![i as f32, 1.0],
                )
                .await
                .unwrap();
        }
        let hits = store
            .query(Collection::Activities, vec![1.0, 1.0], 3)
            .await
            .unwrap();
        assert_eq!(hits.len(), 3);

        let empty = store
            .query(Collection::Relationships, vec![1.0, 1.0], 3)
            .await
            .unwrap();
        assert!(empty.is_empty());
    }

    #[tokio::test]
    async fn vector_delete_removes_entry() {
        let store = MemoryVectorStore::new();
        let id = Uuid::new_v4();
        store
            .upsert(Collection::Relationships, id, "doc", vec![1.0])
            .await
            .unwrap();
        store.delete(Collection::Relationships, id).await.unwrap();
        let hits = store
            .query(Collection::Relationships, vec![1.0], 5)
            .await
            .unwrap();
        assert!(hits.is_empty());
    }

    #[test]
    fn cosine_distance_handles_degenerate_vectors() {
        assert_eq!(cosine_distance(&[], &[]), 1.0);
        assert_eq!(cosine_distance(&[0.0, 0.0], &[1.0, 0.0]), 1.0);
        assert!(cosine_distance(&[1.0, 0.0], &[1.0, 0.0]).abs() < 1e-6);
    }
}
