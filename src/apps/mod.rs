//! Application generators.
//!
//! Each application declares three tables (queues, module kinds, command
//! catalogue) from its parameters; `generate` runs them through the registry,
//! the topology builder and the sequence generator.

pub mod fake_hsi;
pub mod hsi_readout;
pub mod network;
pub mod payload;
pub mod timing;
pub mod trigger;

pub use fake_hsi::FakeHsiApp;
pub use hsi_readout::HsiReadoutApp;
pub use network::NetworkEndpoints;
pub use timing::TimingApp;
pub use trigger::TriggerApp;

use crate::command::{CommandDocument, CommandSpec, generate_sequence};
use crate::error::BuildResult;
use crate::model::Topology;
use crate::spec::{DuplicatePolicy, ModuleKind, QueueRegistry, QueueSpec};
use tracing::{debug, info, info_span};

pub trait AppGenerator {
    /// Short name used in logs and default file names.
    fn name(&self) -> &'static str;

    fn queues(&self) -> Vec<QueueSpec>;

    fn module_kinds(&self) -> Vec<ModuleKind>;

    fn commands(&self) -> Vec<CommandSpec>;

    /// Parameter checks that do not depend on the topology.
    fn validate(&self) -> BuildResult<()> {
        Ok(())
    }

    fn duplicate_policy(&self) -> DuplicatePolicy {
        DuplicatePolicy::default()
    }
}

pub fn build_topology<A: AppGenerator + ?Sized>(app: &A) -> BuildResult<Topology> {
    app.validate()?;
    let queues = QueueRegistry::validate_and_build(app.queues(), app.duplicate_policy())?;
    Topology::build(queues, &app.module_kinds())
}

/// Build the full document sequence. Either everything succeeds or nothing
/// is produced.
pub fn generate<A: AppGenerator + ?Sized>(app: &A) -> BuildResult<Vec<CommandDocument>> {
    let span = info_span!("generate", app = app.name());
    let _enter = span.enter();

    let topology = build_topology(app)?;
    let docs = generate_sequence(&topology, &app.commands());

    for doc in &docs {
        debug!(command = %doc.id, entries = doc.entries().len(), "assembled command");
    }
    info!(
        queues = topology.queues().len(),
        modules = topology.modules().len(),
        commands = docs.len(),
        "generation complete"
    );
    Ok(docs)
}
