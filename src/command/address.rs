//! Address patterns selecting module instances.
//!
//! Three forms only:
//!   ""          => every instance
//!   "tpc.*"     => every instance whose name starts with "tpc"
//!   "tpc0"      => exactly that instance

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AddressPattern {
    All,
    Exact(String),
    Prefix(String),
}

impl AddressPattern {
    pub fn parse(s: &str) -> Self {
        if s.is_empty() {
            Self::All
        } else if let Some(prefix) = s.strip_suffix(".*") {
            Self::Prefix(prefix.to_string())
        } else {
            Self::Exact(s.to_string())
        }
    }

    pub fn matches(&self, inst: &str) -> bool {
        match self {
            Self::All => true,
            Self::Exact(name) => name == inst,
            Self::Prefix(prefix) => inst.starts_with(prefix.as_str()),
        }
    }

    /// Filter `names` down to the matching ones, keeping their order.
    pub fn resolve<'a, I>(&self, names: I) -> Vec<&'a str>
    where
        I: IntoIterator<Item = &'a str>,
    {
        names.into_iter().filter(|n| self.matches(n)).collect()
    }
}

impl From<&str> for AddressPattern {
    fn from(s: &str) -> Self {
        Self::parse(s)
    }
}

impl fmt::Display for AddressPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => Ok(()),
            Self::Exact(name) => f.write_str(name),
            Self::Prefix(prefix) => write!(f, "{}.*", prefix),
        }
    }
}
