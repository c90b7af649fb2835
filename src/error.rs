//! Build-time errors for queue registries and topologies.
//!
//! Every variant is raised before command assembly starts; the generator has
//! no partial mode, so any of these aborts the whole run.

use thiserror::Error;

/// Convenience alias for results produced while building a topology.
pub type BuildResult<T> = std::result::Result<T, ConfgenError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfgenError {
    #[error("duplicate queue definition '{inst}': {existing} conflicts with {incoming}")]
    DuplicateQueueDefinition {
        inst: String,
        existing: String,
        incoming: String,
    },

    #[error("module '{module}' endpoint '{endpoint}' references undeclared queue '{queue}'")]
    MissingQueueReference {
        module: String,
        endpoint: String,
        queue: String,
    },

    #[error("invalid parameter combination: {0}")]
    InvalidParameterCombination(String),
}

impl ConfgenError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidParameterCombination(msg.into())
    }
}
