pub mod ledger;
pub mod models;

use crate::core::models::RelationshipDraft;
use crate::core::schedule::Schedule;
use crate::core::types::RelationType;
use crate::errors::{Error, Result};
use crate::llm::prompts::{ADD_SCOPE, READ_SCOPE, READ_SCOPE_TOOLS, REMOVE_SCOPE, SEPARATE_SCOPE};
use crate::llm::{LlmProvider, ToolCall, parse_structured};
use crate::scope::ledger::{ChangeLedger, ChangeRecord};
use crate::scope::models::{AdditionSet, RemovalSet, ScopeSplit};
use serde::de::DeserializeOwned;
use std::sync::Arc;

/// One retry after a malformed model reply, then give up.
const PARSE_RETRIES: usize = 1;
/// Upper bound on read_scope tool rounds.
const MAX_TOOL_ROUNDS: usize = 6;

/// Translates natural-language instructions into schedule mutations.
///
/// Removals always run before additions so an instruction like "replace x
/// with y" never trips over the entity it is retiring. Every applied
/// change lands in a [`ChangeLedger`] the caller can accept or undo.
pub struct ScopeManager {
    llm: Arc<dyn LlmProvider>,
    search_count: usize,
}

impl ScopeManager {
    pub fn new(llm: Arc<dyn LlmProvider>, search_count: usize) -> Self {
        Self {
            llm,
            search_count: search_count.max(1),
        }
    }

    /// Apply one instruction end to end. On any failure the changes made
    /// so far are rolled back and the error is returned.
    pub async fn dispatch(
        &self,
        schedule: &mut Schedule,
        instruction: &str,
    ) -> Result<ChangeLedger> {
        let split: ScopeSplit = self
            .complete_structured(SEPARATE_SCOPE, instruction)
            .await?;
        // An empty split is not an error: the caller treats it as a
        // read-only question.
        if split.is_empty() {
            return Ok(ChangeLedger::new());
        }

        let mut ledger = ChangeLedger::new();
        if let Err(err) = self.apply_split(schedule, &split, &mut ledger).await {
            // The original failure stays visible even when the rollback
            // fails too.
            return match ledger.undo(schedule).await {
                Ok(()) => Err(err),
                Err(undo_err) => Err(Error::Domain(format!(
                    "{err} (rollback also failed: {undo_err})"
                ))),
            };
        }
        Ok(ledger)
    }

    async fn apply_split(
        &self,
        schedule: &mut Schedule,
        split: &ScopeSplit,
        ledger: &mut ChangeLedger,
    ) -> Result<()> {
        for removal in &split.removals {
            self.remove_scope(schedule, removal, ledger).await?;
        }
        for addition in &split.additions {
            self.add_scope(schedule, addition, ledger).await?;
        }
        Ok(())
    }

    async fn remove_scope(
        &self,
        schedule: &mut Schedule,
        instruction: &str,
        ledger: &mut ChangeLedger,
    ) -> Result<()> {
        let user = format!(
            "Instruction: {instruction}\n\nCurrent schedule:\n{}",
            schedule_context(schedule)
        );
        let set: RemovalSet = self.complete_structured(REMOVE_SCOPE, &user).await?;

        for rel_ref in &set.relationships {
            let relation = RelationType::try_from(&rel_ref.relation)?;
            let predecessor = resolve_activity(schedule, &rel_ref.predecessor)?;
            let successor = resolve_activity(schedule, &rel_ref.successor)?;
            let relationship = schedule
                .find_relationship(predecessor, successor, relation)
                .cloned()
                .ok_or_else(|| {
                    Error::RelationshipNotFound(format!(
                        "{} '{}' -> '{}'",
                        relation, rel_ref.predecessor, rel_ref.successor
                    ))
                })?;
            let removed = schedule.remove_relationship(relationship.id).await?;
            ledger.record(ChangeRecord::RemovedRelationship {
                relationship: removed,
                predecessor_name: rel_ref.predecessor.clone(),
                successor_name: rel_ref.successor.clone(),
            });
        }

        for name in &set.activities {
            let id = resolve_activity(schedule, name)?;
            let (activity, relationships) = schedule.remove_activity(id).await?;
            ledger.record(ChangeRecord::RemovedActivity {
                activity,
                relationships,
            });
        }
        Ok(())
    }

    async fn add_scope(
        &self,
        schedule: &mut Schedule,
        instruction: &str,
        ledger: &mut ChangeLedger,
    ) -> Result<()> {
        let user = format!(
            "Instruction: {instruction}\n\nCurrent schedule:\n{}",
            schedule_context(schedule)
        );
        let set: AdditionSet = self.complete_structured(ADD_SCOPE, &user).await?;

        // Activities first so relationships can reference them.
        for draft in set.activities {
            let activity = schedule.add_activity(draft).await?;
            ledger.record(ChangeRecord::AddedActivity(activity));
        }
        for named in set.relationships {
            let predecessor = resolve_activity(schedule, &named.predecessor)?;
            let successor = resolve_activity(schedule, &named.successor)?;
            let relationship = schedule
                .add_relationship(RelationshipDraft {
                    predecessor,
                    successor,
                    relation: named.relation.clone(),
                    lag: named.lag,
                })
                .await?;
            ledger.record(ChangeRecord::AddedRelationship {
                relationship,
                predecessor_name: named.predecessor,
                successor_name: named.successor,
            });
        }
        Ok(())
    }

    /// Answer a read-only question. The model inspects the schedule via
    /// tools; results are folded back into the conversation until it
    /// answers in plain text.
    pub async fn read_scope(&self, schedule: &Schedule, question: &str) -> Result<String> {
        let mut transcript = format!("Question: {question}");
        for _ in 0..MAX_TOOL_ROUNDS {
            let outcome = self
                .llm
                .complete_with_tools(READ_SCOPE, &transcript, &READ_SCOPE_TOOLS)
                .await?;
            if outcome.calls.is_empty() {
                return outcome
                    .message
                    .filter(|m| !m.trim().is_empty())
                    .ok_or_else(|| Error::llm("Model returned neither an answer nor a tool call."));
            }
            for call in &outcome.calls {
                let result = self.run_tool(schedule, call).await?;
                transcript.push_str(&format!(
                    "\n\nTool {} returned:\n{}",
                    call.name, result
                ));
            }
        }
        Err(Error::llm(
            "Model kept requesting tools without answering.",
        ))
    }

    async fn run_tool(&self, schedule: &Schedule, call: &ToolCall) -> Result<String> {
        match call.name.as_str() {
            "list_activities" => Ok(activities_context(schedule)),
            "list_relationships" => Ok(relationships_context(schedule)),
            "find_activities" => {
                let query = tool_query(call)?;
                let hits = schedule.search_activities(&query, self.search_count).await?;
                Ok(render_hits(&hits))
            }
            "find_relationships" => {
                let query = tool_query(call)?;
                let hits = schedule
                    .search_relationships(&query, self.search_count)
                    .await?;
                Ok(render_hits(&hits))
            }
            "critical_path" => {
                let cp = schedule.critical_path()?;
                let names: Vec<String> = cp
                    .activities
                    .iter()
                    .filter_map(|id| schedule.activity(*id).ok())
                    .map(|a| a.name.clone())
                    .collect();
                Ok(format!(
                    "Project duration: {} days. Critical path: {}",
                    cp.duration,
                    if names.is_empty() {
                        "(empty schedule)".to_string()
                    } else {
                        names.join(" -> ")
                    }
                ))
            }
            other => Err(Error::llm(format!("Model requested unknown tool '{other}'."))),
        }
    }

    async fn complete_structured<T: DeserializeOwned>(
        &self,
        system: &str,
        user: &str,
    ) -> Result<T> {
        let mut last_err = None;
        for _ in 0..=PARSE_RETRIES {
            let raw = self.llm.complete(system, user).await?;
            match parse_structured(&raw) {
                Ok(parsed) => return Ok(parsed),
                Err(err) => last_err = Some(err),
            }
        }
        Err(last_err.unwrap_or_else(|| Error::llm("Model returned nothing.")))
    }
}

fn resolve_activity(schedule: &Schedule, name: &str) -> Result<uuid::Uuid> {
    schedule
        .find_activity_by_name(name)
        .map(|a| a.id)
        .ok_or_else(|| Error::ActivityNotFound(name.to_string()))
}

fn tool_query(call: &ToolCall) -> Result<String> {
    call.arguments
        .get("query")
        .and_then(|v| v.as_str())
        .map(str::to_string)
        .ok_or_else(|| Error::llm(format!("Tool '{}' was called without a query.", call.name)))
}

fn render_hits(hits: &[crate::store::QueryHit]) -> String {
    if hits.is_empty() {
        return "(no matches)".into();
    }
    hits.iter()
        .map(|h| format!("- {} (distance {:.3})", h.document, h.distance))
        .collect::<Vec<_>>()
        .join("\n")
}

fn activities_context(schedule: &Schedule) -> String {
    let activities = schedule.activities();
    if activities.is_empty() {
        return "(no activities)".into();
    }
    activities
        .iter()
        .map(|a| format!("- {} ({} days): {}", a.name, a.duration, a.description))
        .collect::<Vec<_>>()
        .join("\n")
}

fn relationships_context(schedule: &Schedule) -> String {
    let relationships = schedule.relationships();
    if relationships.is_empty() {
        return "(no relationships)".into();
    }
    relationships
        .iter()
        .map(|r| {
            let pred = schedule
                .activity(r.predecessor)
                .map(|a| a.name.clone())
                .unwrap_or_else(|_| r.predecessor.to_string());
            let succ = schedule
                .activity(r.successor)
                .map(|a| a.name.clone())
                .unwrap_or_else(|_| r.successor.to_string());
            format!("- {} '{}' -> '{}' (lag {} days)", r.relation, pred, succ, r.lag)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Compact schedule dump included in mutation prompts.
pub fn schedule_context(schedule: &Schedule) -> String {
    format!(
        "Activities:\n{}\n\nRelationships:\n{}",
        activities_context(schedule),
        relationships_context(schedule)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::ActivityDraft;
    use crate::errors::Error;
    use crate::llm::embedder::HashEmbedder;
    use crate::llm::{LlmProvider, ToolOutcome, ToolSpec};
    use crate::logging::Logger;
    use crate::core::models::{Activity, Relationship};
    use crate::store::GraphStore;
    use crate::store::memory::{MemoryGraphStore, MemoryVectorStore};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, Ordering};

    /// Replays canned replies in order; tool replies come from a second
    /// queue.
    struct ScriptedLlm {
        completions: Mutex<Vec<String>>,
        tool_outcomes: Mutex<Vec<ToolOutcome>>,
    }

    impl ScriptedLlm {
        fn completions(replies: &[&str]) -> Self {
            Self {
                completions: Mutex::new(replies.iter().rev().map(|s| s.to_string()).collect()),
                tool_outcomes: Mutex::new(Vec::new()),
            }
        }

        fn with_tools(mut outcomes: Vec<ToolOutcome>) -> Self {
            outcomes.reverse();
            Self {
                completions: Mutex::new(Vec::new()),
                tool_outcomes: Mutex::new(outcomes),
            }
        }
    }

    #[async_trait]
    impl LlmProvider for ScriptedLlm {
        fn name(&self) -> &'static str {
            "scripted"
        }

        async fn complete(&self, _system: &str, _user: &str) -> Result<String> {
            self.completions
                .lock()
                .unwrap()
                .pop()
                .ok_or_else(|| Error::llm("script exhausted"))
        }

        async fn complete_with_tools(
            &self,
            _system: &str,
            _user: &str,
            _tools: &[ToolSpec],
        ) -> Result<ToolOutcome> {
            self.tool_outcomes
                .lock()
                .unwrap()
                .pop()
                .ok_or_else(|| Error::llm("script exhausted"))
        }
    }

    /// Graph store whose writes can be switched off mid-test.
    #[derive(Default)]
    struct TogglingGraphStore {
        inner: MemoryGraphStore,
        fail_puts: AtomicBool,
    }

    impl TogglingGraphStore {
        fn refuse_puts(&self) {
            self.fail_puts.store(true, Ordering::SeqCst);
        }

        fn puts_allowed(&self) -> Result<()> {
            if self.fail_puts.load(Ordering::SeqCst) {
                return Err(Error::store("write refused"));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl GraphStore for TogglingGraphStore {
        fn name(&self) -> &'static str {
            "toggling graph store"
        }

        async fn health_check(&self) -> Result<()> {
            Ok(())
        }

        async fn load(&self) -> Result<(Vec<Activity>, Vec<Relationship>)> {
            self.inner.load().await
        }

        async fn put_activity(&self, activity: &Activity) -> Result<()> {
            self.puts_allowed()?;
            self.inner.put_activity(activity).await
        }

        async fn delete_activity(&self, id: uuid::Uuid) -> Result<()> {
            self.inner.delete_activity(id).await
        }

        async fn put_relationship(&self, relationship: &Relationship) -> Result<()> {
            self.puts_allowed()?;
            self.inner.put_relationship(relationship).await
        }

        async fn delete_relationship(&self, id: uuid::Uuid) -> Result<()> {
            self.inner.delete_relationship(id).await
        }
    }

    fn schedule() -> Schedule {
        let logger = Logger::new();
        logger.set_file_logging_enabled(false);
        Schedule::new(
            std::sync::Arc::new(MemoryGraphStore::new()),
            std::sync::Arc::new(MemoryVectorStore::new()),
            std::sync::Arc::new(HashEmbedder::default()),
            logger,
        )
    }

    async fn seed(schedule: &mut Schedule, name: &str, duration: f64) {
        schedule
            .add_activity(ActivityDraft {
                name: name.into(),
                description: String::new(),
                duration,
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn dispatch_applies_additions() {
        let mut s = schedule();
        let llm = Arc::new(ScriptedLlm::completions(&[
            r#"{"additions": ["add framing after excavation"], "removals": []}"#,
            r#"{
                "activities": [
                    {"name": "excavate", "description": "dig", "duration": 4.0},
                    {"name": "frame", "description": "framing", "duration": 6.0}
                ],
                "relationships": [
                    {"predecessor": "excavate", "successor": "frame", "relation": "FS", "lag": 1.0}
                ]
            }"#,
        ]));
        let manager = ScopeManager::new(llm, 3);

        let ledger = manager.dispatch(&mut s, "add framing").await.unwrap();
        assert_eq!(ledger.len(), 3);
        assert_eq!(s.activities().len(), 2);
        assert_eq!(s.relationships().len(), 1);
        assert!(ledger.summary()[0].contains("excavate"));
    }

    #[tokio::test]
    async fn dispatch_runs_removals_before_additions() {
        let mut s = schedule();
        seed(&mut s, "old survey", 2.0).await;

        let llm = Arc::new(ScriptedLlm::completions(&[
            r#"{"additions": ["add a drone survey"], "removals": ["drop the old survey"]}"#,
            r#"{"activities": ["old survey"], "relationships": []}"#,
            r#"{"activities": [{"name": "drone survey", "duration": 1.0}], "relationships": []}"#,
        ]));
        let manager = ScopeManager::new(llm, 3);

        let ledger = manager
            .dispatch(&mut s, "replace the survey")
            .await
            .unwrap();
        assert_eq!(ledger.len(), 2);
        assert!(s.find_activity_by_name("old survey").is_none());
        assert!(s.find_activity_by_name("drone survey").is_some());
    }

    #[tokio::test]
    async fn dispatch_rolls_back_on_midway_failure() {
        let mut s = schedule();
        let llm = Arc::new(ScriptedLlm::completions(&[
            r#"{"additions": ["two things"], "removals": []}"#,
            // Second relationship references an activity that does not exist.
            r#"{
                "activities": [{"name": "pour slab", "duration": 2.0}],
                "relationships": [
                    {"predecessor": "pour slab", "successor": "ghost", "relation": "FS", "lag": 0.0}
                ]
            }"#,
        ]));
        let manager = ScopeManager::new(llm, 3);

        let err = manager.dispatch(&mut s, "do it").await.unwrap_err();
        assert!(matches!(err, Error::ActivityNotFound(_)));
        // The added activity was rolled back.
        assert!(s.activities().is_empty());
    }

    #[tokio::test]
    async fn dispatch_keeps_original_error_when_rollback_fails() {
        let store = std::sync::Arc::new(TogglingGraphStore::default());
        let logger = Logger::new();
        logger.set_file_logging_enabled(false);
        let mut s = Schedule::new(
            store.clone(),
            std::sync::Arc::new(MemoryVectorStore::new()),
            std::sync::Arc::new(HashEmbedder::default()),
            logger,
        );
        seed(&mut s, "inspect", 1.0).await;

        // Removal applies, the addition then names a missing activity, and
        // the rollback cannot rewrite the store.
        store.refuse_puts();
        let llm = Arc::new(ScriptedLlm::completions(&[
            r#"{"additions": ["link the ghost"], "removals": ["drop inspect"]}"#,
            r#"{"activities": ["inspect"], "relationships": []}"#,
            r#"{
                "activities": [],
                "relationships": [
                    {"predecessor": "ghost", "successor": "inspect", "relation": "FS", "lag": 0.0}
                ]
            }"#,
        ]));
        let manager = ScopeManager::new(llm, 3);

        let err = manager.dispatch(&mut s, "replace inspect").await.unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("'ghost' not found"));
        assert!(msg.contains("rollback also failed"));
    }

    #[tokio::test]
    async fn dispatch_retries_once_on_malformed_json() {
        let mut s = schedule();
        let llm = Arc::new(ScriptedLlm::completions(&[
            "that is not json",
            r#"{"additions": ["x"], "removals": []}"#,
            r#"{"activities": [{"name": "x", "duration": 1.0}], "relationships": []}"#,
        ]));
        let manager = ScopeManager::new(llm, 3);

        manager.dispatch(&mut s, "add x").await.unwrap();
        assert_eq!(s.activities().len(), 1);
    }

    #[tokio::test]
    async fn dispatch_returns_empty_ledger_for_pure_question() {
        let mut s = schedule();
        let llm = Arc::new(ScriptedLlm::completions(&[
            r#"{"additions": [], "removals": []}"#,
        ]));
        let manager = ScopeManager::new(llm, 3);

        let ledger = manager.dispatch(&mut s, "how long is this?").await.unwrap();
        assert!(ledger.is_empty());
    }

    #[tokio::test]
    async fn undo_restores_removed_entities() {
        let mut s = schedule();
        seed(&mut s, "inspect", 1.0).await;

        let llm = Arc::new(ScriptedLlm::completions(&[
            r#"{"additions": [], "removals": ["drop inspect"]}"#,
            r#"{"activities": ["inspect"], "relationships": []}"#,
        ]));
        let manager = ScopeManager::new(llm, 3);

        let ledger = manager.dispatch(&mut s, "drop inspect").await.unwrap();
        assert!(s.activities().is_empty());

        ledger.undo(&mut s).await.unwrap();
        assert!(s.find_activity_by_name("inspect").is_some());
    }

    #[tokio::test]
    async fn read_scope_folds_tool_results_into_answer() {
        let mut s = schedule();
        seed(&mut s, "roofing", 3.0).await;

        let llm = Arc::new(ScriptedLlm::with_tools(vec![
            ToolOutcome {
                message: None,
                calls: vec![ToolCall {
                    name: "list_activities".into(),
                    arguments: json!({}),
                }],
            },
            ToolOutcome {
                message: Some("The schedule has one activity: roofing.".into()),
                calls: vec![],
            },
        ]));
        let manager = ScopeManager::new(llm, 3);

        let answer = manager.read_scope(&s, "what is scheduled?").await.unwrap();
        assert!(answer.contains("roofing"));
    }

    #[tokio::test]
    async fn read_scope_rejects_unknown_tool() {
        let s = schedule();
        let llm = Arc::new(ScriptedLlm::with_tools(vec![ToolOutcome {
            message: None,
            calls: vec![ToolCall {
                name: "drop_database".into(),
                arguments: json!({}),
            }],
        }]));
        let manager = ScopeManager::new(llm, 3);

        let err = manager.read_scope(&s, "anything").await.unwrap_err();
        assert!(matches!(err, Error::Llm(_)));
    }

    #[tokio::test]
    async fn read_scope_gives_up_after_bounded_rounds() {
        let s = schedule();
        let outcomes = (0..super::MAX_TOOL_ROUNDS)
            .map(|_| ToolOutcome {
                message: None,
                calls: vec![ToolCall {
                    name: "list_activities".into(),
                    arguments: json!({}),
                }],
            })
            .collect();
        let manager = ScopeManager::new(Arc::new(ScriptedLlm::with_tools(outcomes)), 3);

        let err = manager.read_scope(&s, "loop forever").await.unwrap_err();
        assert!(matches!(err, Error::Llm(_)));
    }
}
