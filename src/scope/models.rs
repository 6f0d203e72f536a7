use crate::core::models::ActivityDraft;
use serde::{Deserialize, Serialize};

/// Output of the separation step: self-contained instructions, removals
/// to run before additions.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ScopeSplit {
    #[serde(default)]
    pub additions: Vec<String>,
    #[serde(default)]
    pub removals: Vec<String>,
}

impl ScopeSplit {
    pub fn is_empty(&self) -> bool {
        self.additions.is_empty() && self.removals.is_empty()
    }
}

/// A relationship the model describes by activity name rather than id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamedRelationship {
    pub predecessor: String,
    pub successor: String,
    pub relation: String,
    #[serde(default)]
    pub lag: f64,
}

/// Entities to create for one addition instruction.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AdditionSet {
    #[serde(default)]
    pub activities: Vec<ActivityDraft>,
    #[serde(default)]
    pub relationships: Vec<NamedRelationship>,
}

/// A relationship to delete, named by its endpoints and type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamedRelationshipRef {
    pub predecessor: String,
    pub successor: String,
    pub relation: String,
}

/// Entities to delete for one removal instruction.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RemovalSet {
    #[serde(default)]
    pub activities: Vec<String>,
    #[serde(default)]
    pub relationships: Vec<NamedRelationshipRef>,
}
