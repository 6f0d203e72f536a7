pub mod chroma;
pub mod memory;
pub mod neo4j;

use crate::core::models::{Activity, Relationship};
use crate::errors::Result;
use async_trait::async_trait;
use uuid::Uuid;

/// Named vector collections, one per entity kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Activities,
    Relationships,
}

impl Collection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Activities => "activities",
            Collection::Relationships => "relationships",
        }
    }
}

/// One semantic search result. Lower distance means a closer match.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryHit {
    pub id: Uuid,
    pub document: String,
    pub distance: f32,
}

/// Durable home of the schedule topology.
#[async_trait]
pub trait GraphStore: Send + Sync {
    fn name(&self) -> &'static str;
    async fn health_check(&self) -> Result<()>;
    async fn load(&self) -> Result<(Vec<Activity>, Vec<Relationship>)>;
    async fn put_activity(&self, activity: &Activity) -> Result<()>;
    async fn delete_activity(&self, id: Uuid) -> Result<()>;
    async fn put_relationship(&self, relationship: &Relationship) -> Result<()>;
    async fn delete_relationship(&self, id: Uuid) -> Result<()>;
}

/// Embedding index over the same entities, kept in lockstep with the
/// graph store by the two-phase commit in [`crate::core::schedule`].
#[async_trait]
pub trait VectorStore: Send + Sync {
    fn name(&self) -> &'static str;
    async fn health_check(&self) -> Result<()>;
    async fn upsert(
        &self,
        collection: Collection,
        id: Uuid,
        document: &str,
        embedding: Vec<f32>,
    ) -> Result<()>;
    async fn delete(&self, collection: Collection, id: Uuid) -> Result<()>;
    async fn query(
        &self,
        collection: Collection,
        embedding: Vec<f32>,
        top_k: usize,
    ) -> Result<Vec<QueryHit>>;
}
