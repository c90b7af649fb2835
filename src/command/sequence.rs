//! Command catalogue evaluation.
//!
//! An application lists its commands in output order. Each one carries a gate
//! deciding whether it shows up at all; lifecycle commands use `Gate::Always`
//! and are emitted even when none of their patterns match.

use crate::command::address::AddressPattern;
use crate::command::assemble::{AddressedPair, assemble};
use crate::command::document::{CommandDocument, State};
use crate::model::Topology;

#[derive(Debug, Clone, PartialEq)]
pub enum Gate {
    Always,
    /// Fixed by a parameter flag.
    Flag(bool),
    /// Emitted only if the pattern matches at least one live instance.
    Requires(AddressPattern),
}

#[derive(Debug, Clone, PartialEq)]
pub struct CommandSpec {
    pub id: String,
    pub states: Option<(State, State)>,
    pub pairs: Vec<AddressedPair>,
    pub gate: Gate,
}

impl CommandSpec {
    pub fn plain(id: impl Into<String>, pairs: Vec<AddressedPair>) -> Self {
        Self {
            id: id.into(),
            states: None,
            pairs,
            gate: Gate::Always,
        }
    }

    pub fn conf(pairs: Vec<AddressedPair>) -> Self {
        Self::plain("conf", pairs).with_states(State::Initial, State::Configured)
    }

    pub fn start(pairs: Vec<AddressedPair>) -> Self {
        Self::plain("start", pairs).with_states(State::Configured, State::Running)
    }

    pub fn stop(pairs: Vec<AddressedPair>) -> Self {
        Self::plain("stop", pairs).with_states(State::Running, State::Configured)
    }

    pub fn scrap(pairs: Vec<AddressedPair>) -> Self {
        Self::plain("scrap", pairs)
    }

    pub fn with_states(mut self, entry: State, exit: State) -> Self {
        self.states = Some((entry, exit));
        self
    }

    pub fn gated(mut self, gate: Gate) -> Self {
        self.gate = gate;
        self
    }

    pub fn requires(self, pattern: &str) -> Self {
        self.gated(Gate::Requires(AddressPattern::parse(pattern)))
    }

    pub fn is_enabled(&self, topology: &Topology) -> bool {
        match &self.gate {
            Gate::Always => true,
            Gate::Flag(on) => *on,
            Gate::Requires(pattern) => topology.instance_names().any(|n| pattern.matches(n)),
        }
    }

    pub fn build(&self, topology: &Topology) -> CommandDocument {
        CommandDocument::new(self.id.clone(), self.states, assemble(topology, &self.pairs))
    }
}

/// Init document first, then every enabled catalogue entry in catalogue order.
pub fn generate_sequence(topology: &Topology, catalogue: &[CommandSpec]) -> Vec<CommandDocument> {
    let mut docs = Vec::with_capacity(catalogue.len() + 1);
    docs.push(CommandDocument::init(topology));
    docs.extend(
        catalogue
            .iter()
            .filter(|spec| spec.is_enabled(topology))
            .map(|spec| spec.build(topology)),
    );
    docs
}
