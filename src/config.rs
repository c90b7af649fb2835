//! Parameter loading.
//!
//! Parameters for an application are layered, later sources winning:
//! 1. the application's `Default`
//! 2. an optional TOML file
//! 3. environment variables prefixed with `CONFGEN_` (e.g. CONFGEN_MASTER_DEVICE_NAME)
//! 4. command line overrides (only the flags that were actually given)
//!
//! Environment values are parsed as figment values, so list parameters take
//! the bracketed form: `CONFGEN_PARTITION_IDS=[0,1]`. A bare `0,1` is a string
//! and fails to load.

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Serialize, de::DeserializeOwned};
use std::path::Path;

pub const ENV_PREFIX: &str = "CONFGEN_";

pub fn figment<P, O>(file: Option<&Path>, overrides: &O) -> Result<Figment, figment::Error>
where
    P: Default + Serialize,
    O: Serialize,
{
    let mut figment = Figment::from(Serialized::defaults(P::default()));
    if let Some(path) = file {
        // Toml::file quietly skips missing files; an explicit path must exist.
        if !path.is_file() {
            return Err(format!("config file {} not found", path.display()).into());
        }
        figment = figment.merge(Toml::file(path));
    }
    Ok(figment
        .merge(Env::prefixed(ENV_PREFIX))
        .merge(Serialized::defaults(overrides)))
}

pub fn load<P, O>(file: Option<&Path>, overrides: &O) -> Result<P, figment::Error>
where
    P: Default + Serialize + DeserializeOwned,
    O: Serialize,
{
    figment::<P, O>(file, overrides)?.extract()
}
