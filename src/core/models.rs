use crate::core::types::RelationType;
use crate::errors::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// A schedule activity: the unit of work the critical path is computed over.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    /// Duration in working days.
    pub duration: f64,
}

impl Activity {
    pub fn new(name: impl Into<String>, description: impl Into<String>, duration: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            description: description.into(),
            duration: duration.max(0.0),
        }
    }

    /// Text that gets embedded for semantic lookup.
    pub fn embedding_text(&self) -> String {
        format!("{}. {} ({} days)", self.name, self.description, self.duration)
    }
}

impl fmt::Display for Activity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Activity(id={}, name='{}', duration={} days)",
            self.id, self.name, self.duration
        )
    }
}

/// A typed, lagged precedence relationship between two activities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    pub id: Uuid,
    pub predecessor: Uuid,
    pub successor: Uuid,
    pub relation: RelationType,
    /// Lag in working days; negative values are leads.
    pub lag: f64,
}

impl Relationship {
    pub fn new(predecessor: Uuid, successor: Uuid, relation: RelationType, lag: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            predecessor,
            successor,
            relation,
            lag,
        }
    }

    /// Same endpoints and type as another relationship, ignoring id and lag.
    pub fn same_link(&self, other: &Relationship) -> bool {
        self.predecessor == other.predecessor
            && self.successor == other.successor
            && self.relation == other.relation
    }

    /// Text that gets embedded for semantic lookup. Activity names are passed
    /// in because the relationship itself only stores ids.
    pub fn embedding_text(&self, pred_name: &str, succ_name: &str) -> String {
        format!(
            "{} {} '{}' -> '{}' with lag {} days",
            self.relation,
            self.relation.help(),
            pred_name,
            succ_name,
            self.lag
        )
    }
}

impl fmt::Display for Relationship {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Relationship(id={}, {} {} -> {}, lag={})",
            self.id, self.relation, self.predecessor, self.successor, self.lag
        )
    }
}

// =====
// Drafts
// =====
//
// Serde-friendly shapes the LLM emits. Validation turns a draft into a
// full entity.

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityDraft {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub duration: f64,
}

impl ActivityDraft {
    pub fn validate(self) -> Result<Activity> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(Error::Parse("Activity name cannot be empty.".into()));
        }
        if !self.duration.is_finite() || self.duration < 0.0 {
            return Err(Error::Parse(format!(
                "Invalid duration for activity '{}': {}. Duration must be a non-negative number of days.",
                name, self.duration
            )));
        }
        Ok(Activity::new(name, self.description.trim(), self.duration))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelationshipDraft {
    pub predecessor: Uuid,
    pub successor: Uuid,
    pub relation: String,
    #[serde(default)]
    pub lag: f64,
}

impl RelationshipDraft {
    pub fn validate(self) -> Result<Relationship> {
        if self.predecessor == self.successor {
            return Err(Error::Parse(
                "An activity cannot have a relationship with itself.".into(),
            ));
        }
        if !self.lag.is_finite() {
            return Err(Error::Parse(format!("Invalid lag value: {}.", self.lag)));
        }
        let relation = RelationType::try_from(&self.relation)?;
        Ok(Relationship::new(
            self.predecessor,
            self.successor,
            relation,
            self.lag,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_activity_clamps_negative_duration() {
        let a = Activity::new("pour slab", "pour concrete slab", -3.0);
        assert_eq!(a.duration, 0.0);
    }

    #[test]
    fn activity_draft_rejects_empty_name() {
        let draft = ActivityDraft {
            name: "   ".into(),
            description: "x".into(),
            duration: 1.0,
        };
        assert!(draft.validate().is_err());
    }

    #[test]
    fn activity_draft_rejects_nan_duration() {
        let draft = ActivityDraft {
            name: "excavate".into(),
            description: String::new(),
            duration: f64::NAN,
        };
        assert!(draft.validate().is_err());
    }

    #[test]
    fn activity_draft_trims_fields() {
        let draft = ActivityDraft {
            name: "  excavate  ".into(),
            description: " dig out floor 1 ".into(),
            duration: 4.0,
        };
        let a = draft.validate().unwrap();
        assert_eq!(a.name, "excavate");
        assert_eq!(a.description, "dig out floor 1");
    }

    #[test]
    fn relationship_draft_rejects_self_link() {
        let id = Uuid::new_v4();
        let draft = RelationshipDraft {
            predecessor: id,
            successor: id,
            relation: "FS".into(),
            lag: 0.0,
        };
        assert!(draft.validate().is_err());
    }

    #[test]
    fn relationship_draft_parses_case_insensitive_type() {
        let draft = RelationshipDraft {
            predecessor: Uuid::new_v4(),
            successor: Uuid::new_v4(),
            relation: "ss".into(),
            lag: 2.0,
        };
        let r = draft.validate().unwrap();
        assert_eq!(r.relation, RelationType::SS);
        assert_eq!(r.lag, 2.0);
    }

    #[test]
    fn same_link_ignores_lag_and_id() {
        let p = Uuid::new_v4();
        let s = Uuid::new_v4();
        let a = Relationship::new(p, s, RelationType::FS, 0.0);
        let b = Relationship::new(p, s, RelationType::FS, 5.0);
        assert!(a.same_link(&b));
        let c = Relationship::new(p, s, RelationType::FF, 0.0);
        assert!(!a.same_link(&c));
    }
}
