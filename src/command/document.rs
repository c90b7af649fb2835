//! Command documents as they appear in the generated JSON.
//!
//! Run-control commands:
//! { "data": { "modules": [ {"data": ..., "match": "tpc0"} ] },
//!   "entry_state": "CONFIGURED", "exit_state": "RUNNING", "id": "start" }
//!
//! Plain commands drop the two state keys. The init command carries the
//! whole topology instead of addressed entries:
//! { "data": { "modules": [ModSpec...], "queues": [QueueSpec...] }, ... }

use crate::command::assemble::AddressedEntry;
use crate::model::{ModuleInstance, Topology};
use crate::spec::QueueSpec;
use serde::{Deserialize, Serialize};

/// Run-control state labels. Metadata only; transitions are not checked here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum State {
    #[serde(rename = "NONE")]
    Unset,
    #[serde(rename = "INITIAL")]
    Initial,
    #[serde(rename = "CONFIGURED")]
    Configured,
    #[serde(rename = "RUNNING")]
    Running,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InitData {
    pub modules: Vec<ModuleInstance>,
    pub queues: Vec<QueueSpec>,
}

impl From<&Topology> for InitData {
    fn from(topology: &Topology) -> Self {
        Self {
            modules: topology.modules().to_vec(),
            queues: topology.queues().iter().cloned().collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CommandObj {
    pub modules: Vec<AddressedEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CommandData {
    // Tried first on the way back in: only init data has a `queues` key.
    Init(InitData),
    Modules(CommandObj),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandDocument {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry_state: Option<State>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exit_state: Option<State>,
    pub data: CommandData,
}

impl CommandDocument {
    pub fn init(topology: &Topology) -> Self {
        Self {
            id: "init".to_string(),
            entry_state: Some(State::Unset),
            exit_state: Some(State::Initial),
            data: CommandData::Init(InitData::from(topology)),
        }
    }

    pub fn new(
        id: impl Into<String>,
        states: Option<(State, State)>,
        entries: Vec<AddressedEntry>,
    ) -> Self {
        Self {
            id: id.into(),
            entry_state: states.map(|(entry, _)| entry),
            exit_state: states.map(|(_, exit)| exit),
            data: CommandData::Modules(CommandObj { modules: entries }),
        }
    }

    /// Addressed entries; empty for the init document.
    pub fn entries(&self) -> &[AddressedEntry] {
        match &self.data {
            CommandData::Init(_) => &[],
            CommandData::Modules(obj) => &obj.modules,
        }
    }

    pub fn init_data(&self) -> Option<&InitData> {
        match &self.data {
            CommandData::Init(init) => Some(init),
            CommandData::Modules(_) => None,
        }
    }

    pub fn targets(&self) -> Vec<&str> {
        self.entries().iter().map(|e| e.inst.as_str()).collect()
    }
}
