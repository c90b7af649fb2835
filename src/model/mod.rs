//! Topology model: module instances wired to the queue registry.
//!
//! The builder walks the module kind table in order and expands each kind into
//! zero or more instances. Enforces:
//! - every endpoint references a declared queue
//! - instance names are unique across the whole topology
//! - repeated-kind lists contain no malformed entries

use crate::error::{BuildResult, ConfgenError};
use crate::spec::{Inclusion, Member, ModuleKind, QueueEndpoint, QueueRegistry};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeSet;

/// Init data of a module: its queue connections plus plugin-specific params.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleInit {
    pub qinfos: Vec<QueueEndpoint>,
    #[serde(flatten)]
    pub params: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleInstance {
    pub inst: String,
    pub plugin: String,
    pub data: ModuleInit,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Topology {
    queues: QueueRegistry,
    modules: Vec<ModuleInstance>,
}

impl Topology {
    pub fn build(queues: QueueRegistry, kinds: &[ModuleKind]) -> BuildResult<Self> {
        let mut modules = Vec::new();
        let mut seen = BTreeSet::<String>::new();

        for kind in kinds {
            if kind.is_gated_off() {
                continue;
            }

            let members = expand(kind)?;
            let Some((first, _)) = members.first() else {
                continue;
            };

            for endpoint in &kind.endpoints {
                if !queues.contains(&endpoint.inst) {
                    // Reported against the first instance the kind would create.
                    return Err(ConfgenError::MissingQueueReference {
                        module: first.clone(),
                        endpoint: endpoint.name.clone(),
                        queue: endpoint.inst.clone(),
                    });
                }
            }

            for (inst, member) in members {
                if !seen.insert(inst.clone()) {
                    return Err(ConfgenError::invalid(format!(
                        "module instance '{}' would be declared twice",
                        inst
                    )));
                }

                let params = match kind.init_params(member) {
                    None | Some(Value::Null) => Map::new(),
                    Some(Value::Object(map)) => map,
                    Some(other) => {
                        return Err(ConfgenError::invalid(format!(
                            "init params for '{}' must be an object, got {}",
                            inst, other
                        )));
                    }
                };

                modules.push(ModuleInstance {
                    inst,
                    plugin: kind.plugin.clone(),
                    data: ModuleInit {
                        qinfos: kind.endpoints.clone(),
                        params,
                    },
                });
            }
        }

        Ok(Self { queues, modules })
    }

    pub fn queues(&self) -> &QueueRegistry {
        &self.queues
    }

    /// Instances in declaration order.
    pub fn modules(&self) -> &[ModuleInstance] {
        &self.modules
    }

    pub fn module(&self, inst: &str) -> Option<&ModuleInstance> {
        self.modules.iter().find(|m| m.inst == inst)
    }

    pub fn contains(&self, inst: &str) -> bool {
        self.module(inst).is_some()
    }

    pub fn instance_names(&self) -> impl Iterator<Item = &str> {
        self.modules.iter().map(|m| m.inst.as_str())
    }
}

/// Resolve a kind's inclusion rule into (instance name, member) pairs.
fn expand(kind: &ModuleKind) -> BuildResult<Vec<(String, Member<'_>)>> {
    let out = match &kind.inclusion {
        Inclusion::Always => vec![(kind.name.clone(), Member::Single)],
        Inclusion::IfNonEmpty(device) if device.is_empty() => vec![],
        Inclusion::IfNonEmpty(_) => vec![(kind.name.clone(), Member::Single)],
        Inclusion::PerIndex(values) => {
            let mut out = Vec::with_capacity(values.len());
            for (index, value) in values.iter().enumerate() {
                if value.trim().is_empty() {
                    return Err(ConfgenError::invalid(format!(
                        "{} list entry {} is empty",
                        kind.name, index
                    )));
                }
                out.push((
                    format!("{}{}", kind.name, index),
                    Member::Indexed { index, value },
                ));
            }
            out
        }
        Inclusion::PerId(ids) => {
            let mut unique = BTreeSet::new();
            for id in ids {
                if !unique.insert(*id) {
                    return Err(ConfgenError::invalid(format!(
                        "{} id {} listed more than once",
                        kind.name, id
                    )));
                }
            }
            ids.iter()
                .map(|id| (format!("{}{}", kind.name, id), Member::Id(*id)))
                .collect()
        }
    };
    Ok(out)
}
