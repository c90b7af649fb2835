//! Spec layer: declarations an application makes before anything is built.
//!
//! It owns:
//! - queue declarations and the registry that validates them
//! - module kind descriptors (plugin, naming, inclusion, endpoint template)

pub mod module;
pub mod queue;

pub use module::{Direction, Inclusion, Member, ModuleKind, QueueEndpoint};
pub use queue::{DuplicatePolicy, QueueRegistry, QueueSpec};
