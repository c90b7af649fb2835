//! Module kind descriptors.
//!
//! A `ModuleKind` is one row of the declarative table an application hands to
//! the topology builder: which plugin to instantiate, under which name, how
//! many times, and wired to which queues.
//!
//! Naming rules per inclusion:
//! - `Always` / `IfNonEmpty`: the instance is called exactly `name`.
//! - `PerIndex`: `name` + list index (fanout controllers: tfc0, tfc1, ...).
//! - `PerId`: `name` + element value (partition controllers: tpc0, tpc3, ...).

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Input,
    Output,
}

/// One named queue connection of a module (a "qinfo" in the init document).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueEndpoint {
    /// Logical name the plugin uses for this connection.
    pub name: String,
    /// Queue instance in the registry.
    pub inst: String,
    pub dir: Direction,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inclusion {
    Always,
    /// Included iff the governing device name is non-empty.
    IfNonEmpty(String),
    /// One instance per list element, suffixed by its position.
    PerIndex(Vec<String>),
    /// One instance per id, suffixed by the id itself.
    PerId(Vec<u32>),
}

/// The element a single instance was created for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Member<'a> {
    Single,
    Indexed { index: usize, value: &'a str },
    Id(u32),
}

type InitFn = Box<dyn Fn(Member<'_>) -> Value>;

pub struct ModuleKind {
    pub name: String,
    pub plugin: String,
    pub inclusion: Inclusion,
    /// Extra governing device: when set and empty, the kind is skipped entirely.
    pub requires: Option<String>,
    pub endpoints: Vec<QueueEndpoint>,
    init: Option<InitFn>,
}

impl ModuleKind {
    pub fn new(name: impl Into<String>, plugin: impl Into<String>, inclusion: Inclusion) -> Self {
        Self {
            name: name.into(),
            plugin: plugin.into(),
            inclusion,
            requires: None,
            endpoints: Vec::new(),
            init: None,
        }
    }

    pub fn input(self, name: &str, inst: &str) -> Self {
        self.endpoint(name, inst, Direction::Input)
    }

    pub fn output(self, name: &str, inst: &str) -> Self {
        self.endpoint(name, inst, Direction::Output)
    }

    pub fn endpoint(mut self, name: &str, inst: &str, dir: Direction) -> Self {
        self.endpoints.push(QueueEndpoint {
            name: name.to_string(),
            inst: inst.to_string(),
            dir,
        });
        self
    }

    pub fn requires(mut self, device: impl Into<String>) -> Self {
        self.requires = Some(device.into());
        self
    }

    /// Extra init parameters, merged next to `qinfos`. Must produce a JSON object.
    pub fn init_with<F>(mut self, f: F) -> Self
    where
        F: Fn(Member<'_>) -> Value + 'static,
    {
        self.init = Some(Box::new(f));
        self
    }

    pub fn init_params(&self, member: Member<'_>) -> Option<Value> {
        self.init.as_ref().map(|f| f(member))
    }

    pub(crate) fn is_gated_off(&self) -> bool {
        self.requires.as_deref().is_some_and(str::is_empty)
    }
}

impl fmt::Debug for ModuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleKind")
            .field("name", &self.name)
            .field("plugin", &self.plugin)
            .field("inclusion", &self.inclusion)
            .field("requires", &self.requires)
            .field("endpoints", &self.endpoints)
            .field("init", &self.init.is_some())
            .finish()
    }
}
