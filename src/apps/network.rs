//! Named network endpoints used by the network queue adapters.

use crate::error::{BuildResult, ConfgenError};
use regex::Regex;
use std::collections::BTreeMap;

pub type NetworkEndpoints = BTreeMap<String, String>;

const ADDRESS_RE: &str = r"^(tcp|ipc|inproc)://\S+$";

/// Check that every `required` endpoint is present and every address is a
/// ZMQ-style URI.
pub fn validate_endpoints(endpoints: &NetworkEndpoints, required: &[&str]) -> BuildResult<()> {
    let missing: Vec<&str> = required
        .iter()
        .copied()
        .filter(|name| !endpoints.contains_key(*name))
        .collect();
    if !missing.is_empty() {
        let known: Vec<&str> = endpoints.keys().map(String::as_str).collect();
        return Err(ConfgenError::invalid(format!(
            "missing required network endpoints ({}) in [{}]",
            missing.join(", "),
            known.join(", ")
        )));
    }

    let re = Regex::new(ADDRESS_RE).map_err(|e| ConfgenError::invalid(e.to_string()))?;
    for (name, address) in endpoints {
        if !re.is_match(address) {
            return Err(ConfgenError::invalid(format!(
                "network endpoint '{}' has malformed address {:?}",
                name, address
            )));
        }
    }
    Ok(())
}

/// Parse a `name=address` CLI argument.
pub fn parse_endpoint_arg(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((name, address)) if !name.is_empty() && !address.is_empty() => {
            Ok((name.to_string(), address.to_string()))
        }
        _ => Err(format!("expected name=address, got {:?}", s)),
    }
}
