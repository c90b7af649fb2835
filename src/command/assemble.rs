//! Expand (pattern, payload) pairs into per-instance addressed entries.

use crate::command::address::AddressPattern;
use crate::model::Topology;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One module's share of a command. `data` is null when the command carries
/// no payload for that module.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddressedEntry {
    #[serde(rename = "match")]
    pub inst: String,
    pub data: Option<Value>,
}

/// A pattern together with the payload every matched instance receives.
#[derive(Debug, Clone, PartialEq)]
pub struct AddressedPair {
    pub pattern: AddressPattern,
    pub payload: Option<Value>,
}

impl AddressedPair {
    pub fn new(pattern: impl Into<AddressPattern>, payload: Option<Value>) -> Self {
        Self {
            pattern: pattern.into(),
            payload,
        }
    }

    pub fn bare(pattern: impl Into<AddressPattern>) -> Self {
        Self::new(pattern, None)
    }

    pub fn with(pattern: impl Into<AddressPattern>, payload: Value) -> Self {
        Self::new(pattern, Some(payload))
    }
}

/// Entries follow pair order, then topology order within a pair. Nothing is
/// deduplicated: a module addressed by two pairs gets two entries, and the
/// later one is what an in-order consumer ends up applying.
pub fn assemble(topology: &Topology, pairs: &[AddressedPair]) -> Vec<AddressedEntry> {
    let mut out = Vec::new();
    for pair in pairs {
        for inst in pair.pattern.resolve(topology.instance_names()) {
            out.push(AddressedEntry {
                inst: inst.to_string(),
                data: pair.payload.clone(),
            });
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::{Inclusion, ModuleKind, QueueRegistry};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn topology(ids: Vec<u32>) -> Topology {
        Topology::build(
            QueueRegistry::default(),
            &[
                ModuleKind::new("thi", "TimingHardwareManagerPDI", Inclusion::Always),
                ModuleKind::new("tpc", "TimingPartitionController", Inclusion::PerId(ids)),
                ModuleKind::new("tmc0", "TimingMasterController", Inclusion::Always),
            ],
        )
        .unwrap()
    }

    fn targets(entries: &[AddressedEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.inst.as_str()).collect()
    }

    #[test]
    fn wildcard_follows_declaration_order() {
        let t = topology(vec![0, 1, 2]);
        let entries = assemble(&t, &[AddressedPair::bare("tpc.*")]);
        assert_eq!(targets(&entries), vec!["tpc0", "tpc1", "tpc2"]);
    }

    #[test]
    fn pair_order_wins_over_topology_order() {
        let t = topology(vec![0]);
        let entries = assemble(
            &t,
            &[AddressedPair::bare("tmc.*"), AddressedPair::bare("thi")],
        );
        assert_eq!(targets(&entries), vec!["tmc0", "thi"]);
    }

    #[test]
    fn unmatched_patterns_contribute_nothing() {
        let t = topology(vec![]);
        let entries = assemble(
            &t,
            &[
                AddressedPair::bare("tpc.*"),
                AddressedPair::bare("fdf"),
                AddressedPair::bare("thi"),
            ],
        );
        assert_eq!(targets(&entries), vec!["thi"]);
    }

    #[test]
    fn duplicate_addressing_is_kept_in_order() {
        let t = topology(vec![0]);
        let entries = assemble(
            &t,
            &[
                AddressedPair::with("", json!({"run": 1})),
                AddressedPair::with("tpc0", json!({"run": 2})),
            ],
        );
        assert_eq!(targets(&entries), vec!["thi", "tpc0", "tmc0", "tpc0"]);
        assert_eq!(entries.last().unwrap().data, Some(json!({"run": 2})));
    }

    #[test]
    fn entry_serializes_with_match_key() {
        let entry = AddressedEntry {
            inst: "thi".into(),
            data: None,
        };
        assert_eq!(
            serde_json::to_value(&entry).unwrap(),
            json!({"data": null, "match": "thi"})
        );
    }
}
