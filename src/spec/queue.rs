//! Queue declarations and the validated registry built from them.
//!
//! JSON shape of one entry in the init document:
//! { "capacity": 100, "inst": "hardware_commands", "kind": "StdDeQueue" }
//!
//! Queues are keyed by `inst`. The registry keeps them in a BTreeMap, so
//! iteration (and therefore serialization) is always sorted by name.

use crate::error::{BuildResult, ConfgenError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueSpec {
    pub inst: String,
    /// Queue implementation tag, passed through untouched (e.g. "FollySPSCQueue").
    pub kind: String,
    pub capacity: u64,
}

impl QueueSpec {
    pub fn new(inst: impl Into<String>, kind: impl Into<String>, capacity: u64) -> Self {
        Self {
            inst: inst.into(),
            kind: kind.into(),
            capacity,
        }
    }
}

impl fmt::Display for QueueSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({}, capacity={})", self.inst, self.kind, self.capacity)
    }
}

/// What to do when the same queue name is declared more than once.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DuplicatePolicy {
    /// Identical redeclarations collapse into one entry; conflicting ones fail.
    #[default]
    MergeIdentical,
    /// Any redeclaration fails, even an identical one.
    Reject,
}

/// Frozen, name-ordered set of queues for one generation run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueueRegistry {
    queues: BTreeMap<String, QueueSpec>,
}

impl QueueRegistry {
    pub fn validate_and_build<I>(specs: I, policy: DuplicatePolicy) -> BuildResult<Self>
    where
        I: IntoIterator<Item = QueueSpec>,
    {
        let mut queues = BTreeMap::<String, QueueSpec>::new();
        for spec in specs {
            if let Some(existing) = queues.get(&spec.inst) {
                if policy == DuplicatePolicy::MergeIdentical && existing == &spec {
                    continue;
                }
                return Err(ConfgenError::DuplicateQueueDefinition {
                    inst: spec.inst.clone(),
                    existing: existing.to_string(),
                    incoming: spec.to_string(),
                });
            }
            queues.insert(spec.inst.clone(), spec);
        }
        Ok(Self { queues })
    }

    pub fn get(&self, inst: &str) -> Option<&QueueSpec> {
        self.queues.get(inst)
    }

    pub fn contains(&self, inst: &str) -> bool {
        self.queues.contains_key(inst)
    }

    /// Queues sorted by instance name.
    pub fn iter(&self) -> impl Iterator<Item = &QueueSpec> {
        self.queues.values()
    }

    pub fn len(&self) -> usize {
        self.queues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queues.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn identical_redeclaration_is_merged() {
        let registry = QueueRegistry::validate_and_build(
            [
                QueueSpec::new("hardware_commands", "StdDeQueue", 100),
                QueueSpec::new("hardware_commands", "StdDeQueue", 100),
            ],
            DuplicatePolicy::MergeIdentical,
        )
        .unwrap();
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn conflicting_capacity_is_rejected() {
        let err = QueueRegistry::validate_and_build(
            [
                QueueSpec::new("hardware_commands", "StdDeQueue", 100),
                QueueSpec::new("hardware_commands", "StdDeQueue", 200),
            ],
            DuplicatePolicy::MergeIdentical,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ConfgenError::DuplicateQueueDefinition { ref inst, .. } if inst == "hardware_commands"
        ));
    }

    #[test]
    fn conflicting_kind_is_rejected() {
        let err = QueueRegistry::validate_and_build(
            [
                QueueSpec::new("q", "FollySPSCQueue", 10),
                QueueSpec::new("q", "FollyMPMCQueue", 10),
            ],
            DuplicatePolicy::MergeIdentical,
        );
        assert!(err.is_err());
    }

    #[test]
    fn reject_policy_refuses_identical_duplicates() {
        let err = QueueRegistry::validate_and_build(
            [QueueSpec::new("q", "StdDeQueue", 1), QueueSpec::new("q", "StdDeQueue", 1)],
            DuplicatePolicy::Reject,
        );
        assert!(matches!(err, Err(ConfgenError::DuplicateQueueDefinition { .. })));
    }

    #[test]
    fn iteration_is_sorted_by_name() {
        let registry = QueueRegistry::validate_and_build(
            [
                QueueSpec::new("trigger_candidate_q", "FollySPSCQueue", 2000),
                QueueSpec::new("hsievent_q", "FollySPSCQueue", 2000),
                QueueSpec::new("a_q", "StdDeQueue", 1),
            ],
            DuplicatePolicy::default(),
        )
        .unwrap();
        let names: Vec<&str> = registry.iter().map(|q| q.inst.as_str()).collect();
        assert_eq!(names, vec!["a_q", "hsievent_q", "trigger_candidate_q"]);
    }
}
