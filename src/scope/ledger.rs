use crate::core::models::{Activity, Relationship};
use crate::core::schedule::Schedule;
use crate::errors::Result;

/// One applied change, carrying enough state to be undone.
#[derive(Debug, Clone)]
pub enum ChangeRecord {
    AddedActivity(Activity),
    RemovedActivity {
        activity: Activity,
        relationships: Vec<Relationship>,
    },
    AddedRelationship {
        relationship: Relationship,
        predecessor_name: String,
        successor_name: String,
    },
    RemovedRelationship {
        relationship: Relationship,
        predecessor_name: String,
        successor_name: String,
    },
}

impl ChangeRecord {
    pub fn describe(&self) -> String {
        match self {
            ChangeRecord::AddedActivity(a) => {
                format!("+ Activity '{}' ({} days)", a.name, a.duration)
            }
            ChangeRecord::RemovedActivity { activity, relationships } => {
                if relationships.is_empty() {
                    format!("- Activity '{}'", activity.name)
                } else {
                    format!(
                        "- Activity '{}' (and {} attached relationships)",
                        activity.name,
                        relationships.len()
                    )
                }
            }
            ChangeRecord::AddedRelationship {
                relationship,
                predecessor_name,
                successor_name,
            } => format!(
                "+ {} '{}' -> '{}' (lag {} days)",
                relationship.relation, predecessor_name, successor_name, relationship.lag
            ),
            ChangeRecord::RemovedRelationship {
                relationship,
                predecessor_name,
                successor_name,
            } => format!(
                "- {} '{}' -> '{}'",
                relationship.relation, predecessor_name, successor_name
            ),
        }
    }
}

/// Applied changes from one natural-language instruction, in order.
/// Rejecting the instruction replays the ledger backwards.
#[derive(Debug, Clone, Default)]
pub struct ChangeLedger {
    records: Vec<ChangeRecord>,
}

impl ChangeLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, record: ChangeRecord) {
        self.records.push(record);
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn summary(&self) -> Vec<String> {
        self.records.iter().map(ChangeRecord::describe).collect()
    }

    /// Undo every change, newest first. Consumes the ledger so a change
    /// set cannot be rolled back twice.
    pub async fn undo(self, schedule: &mut Schedule) -> Result<()> {
        for record in self.records.into_iter().rev() {
            match record {
                ChangeRecord::AddedActivity(activity) => {
                    schedule.remove_activity(activity.id).await?;
                }
                ChangeRecord::RemovedActivity { activity, relationships } => {
                    schedule.restore_activity(activity, relationships).await?;
                }
                ChangeRecord::AddedRelationship { relationship, .. } => {
                    schedule.remove_relationship(relationship.id).await?;
                }
                ChangeRecord::RemovedRelationship { relationship, .. } => {
                    schedule.restore_relationship(relationship).await?;
                }
            }
        }
        Ok(())
    }
}
