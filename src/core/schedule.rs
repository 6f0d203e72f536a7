use crate::core::graph::{CriticalPath, ScheduleGraph};
use crate::core::models::{Activity, ActivityDraft, Relationship, RelationshipDraft};
use crate::errors::{Error, Result};
use crate::llm::EmbeddingProvider;
use crate::logging::{LogTarget, Logger};
use crate::store::{Collection, GraphStore, QueryHit, VectorStore};
use std::sync::Arc;
use uuid::Uuid;

/// What a dissolve did, for rendering and for undo.
#[derive(Debug, Clone)]
pub struct DissolveOutcome {
    pub removed: Activity,
    pub dropped: Vec<Relationship>,
    pub created: Vec<Relationship>,
}

/// Coordinates the in-memory topology with the graph and vector stores.
///
/// Every mutation validates against the in-memory graph first, then writes
/// the graph store, then the vector store. A vector-store failure undoes
/// the graph-store write so the two backends never drift.
pub struct Schedule {
    graph: ScheduleGraph,
    graph_store: Arc<dyn GraphStore>,
    vector_store: Arc<dyn VectorStore>,
    embedder: Arc<dyn EmbeddingProvider>,
    logger: Logger,
}

impl Schedule {
    pub fn new(
        graph_store: Arc<dyn GraphStore>,
        vector_store: Arc<dyn VectorStore>,
        embedder: Arc<dyn EmbeddingProvider>,
        logger: Logger,
    ) -> Self {
        Self {
            graph: ScheduleGraph::new(),
            graph_store,
            vector_store,
            embedder,
            logger,
        }
    }

    /// Reload the in-memory topology from the graph store.
    pub async fn refresh(&mut self) -> Result<()> {
        let (activities, relationships) = self.graph_store.load().await?;
        self.logger.info(
            format!(
                "Loaded {} activities and {} relationships from {}.",
                activities.len(),
                relationships.len(),
                self.graph_store.name()
            ),
            LogTarget::FileOnly,
        );
        self.graph.replace(activities, relationships);
        Ok(())
    }

    pub fn activities(&self) -> Vec<&Activity> {
        self.graph.activities()
    }

    pub fn relationships(&self) -> Vec<&Relationship> {
        self.graph.relationships()
    }

    pub fn activity(&self, id: Uuid) -> Result<&Activity> {
        self.graph.activity(id)
    }

    pub fn find_activity_by_name(&self, name: &str) -> Option<&Activity> {
        self.graph.find_activity_by_name(name)
    }

    pub fn relationship(&self, id: Uuid) -> Result<&Relationship> {
        self.graph.relationship(id)
    }

    pub fn find_relationship(
        &self,
        predecessor: Uuid,
        successor: Uuid,
        relation: crate::core::types::RelationType,
    ) -> Option<&Relationship> {
        self.graph
            .relationships()
            .into_iter()
            .find(|r| r.predecessor == predecessor && r.successor == successor && r.relation == relation)
    }

    pub fn critical_path(&self) -> Result<CriticalPath> {
        self.graph.critical_path()
    }

    pub async fn add_activity(&mut self, draft: ActivityDraft) -> Result<Activity> {
        let activity = draft.validate()?;
        if self.graph.find_activity_by_name(&activity.name).is_some() {
            return Err(Error::Domain(format!(
                "An activity named '{}' already exists.",
                activity.name
            )));
        }
        self.graph.insert_activity(activity.clone())?;
        if let Err(err) = self.commit_activity(&activity).await {
            let _ = self.graph.remove_activity(activity.id);
            return Err(err);
        }
        self.logger
            .info(format!("Added {activity}."), LogTarget::FileOnly);
        Ok(activity)
    }

    pub async fn remove_activity(&mut self, id: Uuid) -> Result<(Activity, Vec<Relationship>)> {
        let (activity, dropped) = self.graph.remove_activity(id)?;

        if let Err(err) = self.graph_store.delete_activity(id).await {
            self.restore_in_memory(&activity, &dropped);
            return Err(err);
        }
        if let Err(err) = self.delete_embeddings(&activity, &dropped).await {
            // Vector write failed: put the graph store back.
            self.rollback_activity_delete(&activity, &dropped).await;
            return Err(err);
        }
        self.logger
            .info(format!("Removed {activity}."), LogTarget::FileOnly);
        Ok((activity, dropped))
    }

    pub async fn add_relationship(&mut self, draft: RelationshipDraft) -> Result<Relationship> {
        let relationship = draft.validate()?;
        self.graph.insert_relationship(relationship.clone())?;
        if let Err(err) = self.commit_relationship(&relationship).await {
            let _ = self.graph.remove_relationship(relationship.id);
            return Err(err);
        }
        self.logger
            .info(format!("Added {relationship}."), LogTarget::FileOnly);
        Ok(relationship)
    }

    pub async fn remove_relationship(&mut self, id: Uuid) -> Result<Relationship> {
        let relationship = self.graph.remove_relationship(id)?;

        if let Err(err) = self.graph_store.delete_relationship(id).await {
            let _ = self.graph.insert_relationship(relationship.clone());
            return Err(err);
        }
        if let Err(err) = self.vector_store.delete(Collection::Relationships, id).await {
            let _ = self.graph.insert_relationship(relationship.clone());
            let _ = self.graph_store.put_relationship(&relationship).await;
            self.warn_rollback("relationship removal");
            return Err(err);
        }
        self.logger
            .info(format!("Removed {relationship}."), LogTarget::FileOnly);
        Ok(relationship)
    }

    /// Put back an activity exactly as it was, including its relationships.
    /// Used when a natural-language change set is rejected.
    pub async fn restore_activity(
        &mut self,
        activity: Activity,
        relationships: Vec<Relationship>,
    ) -> Result<()> {
        self.graph.insert_activity(activity.clone())?;
        self.commit_activity(&activity).await?;
        for relationship in relationships {
            self.restore_relationship(relationship).await?;
        }
        Ok(())
    }

    pub async fn restore_relationship(&mut self, relationship: Relationship) -> Result<()> {
        self.graph.insert_relationship(relationship.clone())?;
        self.commit_relationship(&relationship).await
    }

    /// Remove an activity but keep the schedule connected: every
    /// predecessor is linked to every successor, carrying over the
    /// successor-side relationship type and lag.
    pub async fn dissolve_activity(&mut self, id: Uuid) -> Result<DissolveOutcome> {
        let incoming: Vec<Relationship> =
            self.graph.incoming(id).into_iter().cloned().collect();
        let outgoing: Vec<Relationship> =
            self.graph.outgoing(id).into_iter().cloned().collect();

        let (activity, dropped) = {
            let (activity, dropped) = self.remove_activity(id).await?;
            (activity, dropped)
        };

        let mut created = Vec::new();
        for inc in &incoming {
            for out in &outgoing {
                if inc.predecessor == out.successor {
                    continue;
                }
                let bridge =
                    Relationship::new(inc.predecessor, out.successor, out.relation, out.lag);
                if self
                    .graph
                    .relationships()
                    .iter()
                    .any(|r| r.same_link(&bridge))
                {
                    continue;
                }
                match self.insert_bridge(bridge.clone()).await {
                    Ok(()) => created.push(bridge),
                    Err(err) => {
                        self.undo_dissolve(&activity, &dropped, &created).await;
                        return Err(err);
                    }
                }
            }
        }

        self.logger.info(
            format!(
                "Dissolved {}: dropped {} relationships, bridged {}.",
                activity,
                dropped.len(),
                created.len()
            ),
            LogTarget::FileOnly,
        );
        Ok(DissolveOutcome {
            removed: activity,
            dropped,
            created,
        })
    }

    pub async fn search_activities(&self, query: &str, top_k: usize) -> Result<Vec<QueryHit>> {
        let embedding = self.embedder.embed(query).await?;
        self.vector_store
            .query(Collection::Activities, embedding, top_k)
            .await
    }

    pub async fn search_relationships(&self, query: &str, top_k: usize) -> Result<Vec<QueryHit>> {
        let embedding = self.embedder.embed(query).await?;
        self.vector_store
            .query(Collection::Relationships, embedding, top_k)
            .await
    }

    async fn commit_activity(&self, activity: &Activity) -> Result<()> {
        self.graph_store.put_activity(activity).await?;
        let embedding = match self.embedder.embed(&activity.embedding_text()).await {
            Ok(e) => e,
            Err(err) => {
                self.compensate_activity_put(activity.id).await;
                return Err(err);
            }
        };
        if let Err(err) = self
            .vector_store
            .upsert(
                Collection::Activities,
                activity.id,
                &activity.embedding_text(),
                embedding,
            )
            .await
        {
            self.compensate_activity_put(activity.id).await;
            return Err(err);
        }
        Ok(())
    }

    async fn commit_relationship(&self, relationship: &Relationship) -> Result<()> {
        self.graph_store.put_relationship(relationship).await?;
        let document = self.relationship_document(relationship);
        let embedding = match self.embedder.embed(&document).await {
            Ok(e) => e,
            Err(err) => {
                self.compensate_relationship_put(relationship.id).await;
                return Err(err);
            }
        };
        if let Err(err) = self
            .vector_store
            .upsert(Collection::Relationships, relationship.id, &document, embedding)
            .await
        {
            self.compensate_relationship_put(relationship.id).await;
            return Err(err);
        }
        Ok(())
    }

    fn relationship_document(&self, relationship: &Relationship) -> String {
        let pred = self
            .graph
            .activity(relationship.predecessor)
            .map(|a| a.name.clone())
            .unwrap_or_else(|_| relationship.predecessor.to_string());
        let succ = self
            .graph
            .activity(relationship.successor)
            .map(|a| a.name.clone())
            .unwrap_or_else(|_| relationship.successor.to_string());
        relationship.embedding_text(&pred, &succ)
    }

    async fn insert_bridge(&mut self, bridge: Relationship) -> Result<()> {
        self.graph.insert_relationship(bridge.clone())?;
        if let Err(err) = self.commit_relationship(&bridge).await {
            let _ = self.graph.remove_relationship(bridge.id);
            return Err(err);
        }
        Ok(())
    }

    async fn delete_embeddings(
        &self,
        activity: &Activity,
        relationships: &[Relationship],
    ) -> Result<()> {
        self.vector_store
            .delete(Collection::Activities, activity.id)
            .await?;
        for relationship in relationships {
            self.vector_store
                .delete(Collection::Relationships, relationship.id)
                .await?;
        }
        Ok(())
    }

    fn restore_in_memory(&mut self, activity: &Activity, relationships: &[Relationship]) {
        let _ = self.graph.insert_activity(activity.clone());
        for relationship in relationships {
            let _ = self.graph.insert_relationship(relationship.clone());
        }
    }

    async fn rollback_activity_delete(
        &mut self,
        activity: &Activity,
        relationships: &[Relationship],
    ) {
        self.restore_in_memory(activity, relationships);
        let _ = self.graph_store.put_activity(activity).await;
        for relationship in relationships {
            let _ = self.graph_store.put_relationship(relationship).await;
        }
        self.warn_rollback("activity removal");
    }

    async fn undo_dissolve(
        &mut self,
        activity: &Activity,
        dropped: &[Relationship],
        created: &[Relationship],
    ) {
        for bridge in created {
            if self.graph.remove_relationship(bridge.id).is_ok() {
                let _ = self.graph_store.delete_relationship(bridge.id).await;
                let _ = self
                    .vector_store
                    .delete(Collection::Relationships, bridge.id)
                    .await;
            }
        }
        self.restore_in_memory(activity, dropped);
        let _ = self.graph_store.put_activity(activity).await;
        for relationship in dropped {
            let _ = self.graph_store.put_relationship(relationship).await;
        }
        self.warn_rollback("dissolve");
    }

    async fn compensate_activity_put(&self, id: Uuid) {
        let _ = self.graph_store.delete_activity(id).await;
        self.warn_rollback("activity write");
    }

    async fn compensate_relationship_put(&self, id: Uuid) {
        let _ = self.graph_store.delete_relationship(id).await;
        self.warn_rollback("relationship write");
    }

    fn warn_rollback(&self, operation: &str) {
        self.logger.warn(
            format!("Stores disagreed during {operation}; change rolled back."),
            LogTarget::ConsoleAndFile,
        );
    }
}
