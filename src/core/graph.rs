use crate::core::models::{Activity, Relationship};
use crate::core::types::RelationType;
use crate::errors::{Error, Result};
use std::collections::{HashMap, VecDeque};
use uuid::Uuid;

/// Tolerance for treating a float as zero when picking critical activities.
const FLOAT_EPSILON: f64 = 1e-9;

/// In-memory topology of the schedule, rebuilt from the graph store on
/// demand. All mutation validation (existence, duplicates, cycles) happens
/// here before any store write.
#[derive(Debug, Default, Clone)]
pub struct ScheduleGraph {
    activities: HashMap<Uuid, Activity>,
    relationships: HashMap<Uuid, Relationship>,
}

/// Early/late dates and float for one activity, in working days from
/// project start.
#[derive(Debug, Clone, PartialEq)]
pub struct ActivityTiming {
    pub id: Uuid,
    pub early_start: f64,
    pub early_finish: f64,
    pub late_start: f64,
    pub late_finish: f64,
    pub total_float: f64,
}

impl ActivityTiming {
    pub fn is_critical(&self) -> bool {
        self.total_float.abs() < FLOAT_EPSILON
    }
}

/// Result of a critical-path pass over the whole graph.
#[derive(Debug, Clone, Default)]
pub struct CriticalPath {
    /// Project duration in working days.
    pub duration: f64,
    /// Zero-float activities in topological order.
    pub activities: Vec<Uuid>,
    /// Timing for every activity, in topological order.
    pub timings: Vec<ActivityTiming>,
}

impl ScheduleGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.activities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.activities.is_empty()
    }

    pub fn activity(&self, id: Uuid) -> Result<&Activity> {
        self.activities
            .get(&id)
            .ok_or_else(|| Error::ActivityNotFound(id.to_string()))
    }

    pub fn relationship(&self, id: Uuid) -> Result<&Relationship> {
        self.relationships
            .get(&id)
            .ok_or_else(|| Error::RelationshipNotFound(id.to_string()))
    }

    pub fn activities(&self) -> Vec<&Activity> {
        let mut v: Vec<&Activity> = self.activities.values().collect();
        v.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        v
    }

    pub fn relationships(&self) -> Vec<&Relationship> {
        let mut v: Vec<&Relationship> = self.relationships.values().collect();
        v.sort_by_key(|r| r.id);
        v
    }

    pub fn find_activity_by_name(&self, name: &str) -> Option<&Activity> {
        self.activities
            .values()
            .find(|a| a.name.eq_ignore_ascii_case(name.trim()))
    }

    pub fn incoming(&self, id: Uuid) -> Vec<&Relationship> {
        self.relationships
            .values()
            .filter(|r| r.successor == id)
            .collect()
    }

    pub fn outgoing(&self, id: Uuid) -> Vec<&Relationship> {
        self.relationships
            .values()
            .filter(|r| r.predecessor == id)
            .collect()
    }

    pub fn insert_activity(&mut self, activity: Activity) -> Result<()> {
        if self.activities.contains_key(&activity.id) {
            return Err(Error::Parse(format!(
                "Activity with id {} already exists.",
                activity.id
            )));
        }
        self.activities.insert(activity.id, activity);
        Ok(())
    }

    /// Remove an activity and all relationships touching it. Returns the
    /// activity plus the removed relationships so callers can persist or
    /// invert the change.
    pub fn remove_activity(&mut self, id: Uuid) -> Result<(Activity, Vec<Relationship>)> {
        let activity = self
            .activities
            .remove(&id)
            .ok_or_else(|| Error::ActivityNotFound(id.to_string()))?;
        let removed_ids: Vec<Uuid> = self
            .relationships
            .values()
            .filter(|r| r.predecessor == id || r.successor == id)
            .map(|r| r.id)
            .collect();
        let mut removed = Vec::with_capacity(removed_ids.len());
        for rid in removed_ids {
            if let Some(rel) = self.relationships.remove(&rid) {
                removed.push(rel);
            }
        }
        removed.sort_by_key(|r| r.id);
        Ok((activity, removed))
    }

    pub fn insert_relationship(&mut self, relationship: Relationship) -> Result<()> {
        let pred = self.activity(relationship.predecessor)?.name.clone();
        let succ = self.activity(relationship.successor)?.name.clone();
        if relationship.predecessor == relationship.successor {
            return Err(Error::Parse(
                "An activity cannot have a relationship with itself.".into(),
            ));
        }
        if self
            .relationships
            .values()
            .any(|r| r.same_link(&relationship))
        {
            return Err(Error::Parse(format!(
                "A {} relationship '{}' -> '{}' already exists.",
                relationship.relation, pred, succ
            )));
        }
        if self.path_exists(relationship.successor, relationship.predecessor) {
            return Err(Error::Cycle {
                predecessor: pred,
                successor: succ,
            });
        }
        self.relationships.insert(relationship.id, relationship);
        Ok(())
    }

    pub fn remove_relationship(&mut self, id: Uuid) -> Result<Relationship> {
        self.relationships
            .remove(&id)
            .ok_or_else(|| Error::RelationshipNotFound(id.to_string()))
    }

    /// Replace the whole topology, e.g. after reloading from the graph store.
    pub fn replace(&mut self, activities: Vec<Activity>, relationships: Vec<Relationship>) {
        self.activities = activities.into_iter().map(|a| (a.id, a)).collect();
        self.relationships = relationships.into_iter().map(|r| (r.id, r)).collect();
    }

    /// BFS reachability along relationship direction.
    fn path_exists(&self, from: Uuid, to: Uuid) -> bool {
        if from == to {
            return true;
        }
        let mut seen = std::collections::HashSet::new();
        let mut queue = VecDeque::from([from]);
        while let Some(node) = queue.pop_front() {
            for rel in self.relationships.values().filter(|r| r.predecessor == node) {
                if rel.successor == to {
                    return true;
                }
                if seen.insert(rel.successor) {
                    queue.push_back(rel.successor);
                }
            }
        }
        false
    }

    /// Kahn's algorithm. Errors if the stored topology contains a cycle,
    /// which can only happen when the backing store was modified externally.
    pub fn topological_order(&self) -> Result<Vec<Uuid>> {
        let mut in_degree: HashMap<Uuid, usize> =
            self.activities.keys().map(|id| (*id, 0)).collect();
        for rel in self.relationships.values() {
            if let Some(d) = in_degree.get_mut(&rel.successor) {
                *d += 1;
            }
        }

        // Deterministic tie-breaking: ready nodes sorted by name.
        let mut ready: Vec<Uuid> = in_degree
            .iter()
            .filter(|(_, d)| **d == 0)
            .map(|(id, _)| *id)
            .collect();
        self.sort_by_name(&mut ready);

        let mut order = Vec::with_capacity(self.activities.len());
        while let Some(node) = ready.pop() {
            order.push(node);
            let mut released = Vec::new();
            for rel in self.relationships.values().filter(|r| r.predecessor == node) {
                if let Some(d) = in_degree.get_mut(&rel.successor) {
                    *d -= 1;
                    if *d == 0 {
                        released.push(rel.successor);
                    }
                }
            }
            self.sort_by_name(&mut released);
            ready.extend(released);
            self.sort_by_name(&mut ready);
        }

        if order.len() != self.activities.len() {
            return Err(Error::Store(
                "Stored schedule topology contains a cycle; refusing to compute order.".into(),
            ));
        }
        Ok(order)
    }

    fn sort_by_name(&self, ids: &mut [Uuid]) {
        ids.sort_by(|a, b| {
            let an = self.activities.get(a).map(|x| x.name.as_str()).unwrap_or("");
            let bn = self.activities.get(b).map(|x| x.name.as_str()).unwrap_or("");
            // Reverse so Vec::pop yields the alphabetically first node.
            bn.cmp(an).then(b.cmp(a))
        });
    }

    /// Precedence-diagramming critical path: forward pass for early dates,
    /// backward pass for late dates, zero-float chain in topological order.
    pub fn critical_path(&self) -> Result<CriticalPath> {
        if self.activities.is_empty() {
            return Ok(CriticalPath::default());
        }

        let order = self.topological_order()?;

        let mut early_start: HashMap<Uuid, f64> = HashMap::new();
        let mut early_finish: HashMap<Uuid, f64> = HashMap::new();

        for id in &order {
            let duration = self.activities[id].duration;
            let mut es: f64 = 0.0;
            for rel in self.incoming(*id) {
                let pes = early_start[&rel.predecessor];
                let pef = early_finish[&rel.predecessor];
                let bound = match rel.relation {
                    RelationType::FS => pef + rel.lag,
                    RelationType::SS => pes + rel.lag,
                    RelationType::FF => pef + rel.lag - duration,
                    RelationType::SF => pes + rel.lag - duration,
                };
                es = es.max(bound);
            }
            early_start.insert(*id, es);
            early_finish.insert(*id, es + duration);
        }

        let project_finish = early_finish
            .values()
            .fold(0.0_f64, |acc, v| acc.max(*v));

        let mut late_start: HashMap<Uuid, f64> = HashMap::new();
        let mut late_finish: HashMap<Uuid, f64> = HashMap::new();

        for id in order.iter().rev() {
            let duration = self.activities[id].duration;
            let mut lf = project_finish;
            for rel in self.outgoing(*id) {
                let sls = late_start[&rel.successor];
                let slf = late_finish[&rel.successor];
                let bound = match rel.relation {
                    RelationType::FS => sls - rel.lag,
                    RelationType::SS => sls - rel.lag + duration,
                    RelationType::FF => slf - rel.lag,
                    RelationType::SF => slf - rel.lag + duration,
                };
                lf = lf.min(bound);
            }
            late_finish.insert(*id, lf);
            late_start.insert(*id, lf - duration);
        }

        let timings: Vec<ActivityTiming> = order
            .iter()
            .map(|id| ActivityTiming {
                id: *id,
                early_start: early_start[id],
                early_finish: early_finish[id],
                late_start: late_start[id],
                late_finish: late_finish[id],
                total_float: late_start[id] - early_start[id],
            })
            .collect();

        let activities = timings
            .iter()
            .filter(|t| t.is_critical())
            .map(|t| t.id)
            .collect();

        Ok(CriticalPath {
            duration: project_finish,
            activities,
            timings,
        })
    }
}
