pub mod apps;
pub mod command;
pub mod config;
pub mod error;
pub mod logging;
pub mod model;
pub mod render;
pub mod spec;

pub type Result<T> = anyhow::Result<T>;

pub use apps::{AppGenerator, generate};
pub use error::{BuildResult, ConfgenError};
