//! Strongly-typed identifiers.

use std::fmt;

/// Identifies an agent within a simulation run.
///
/// Agents are created at run construction and assigned sequential IDs.
/// `AgentId(n)` corresponds to the n-th agent in the crew; IDs are
/// stable for the lifetime of the run (agents are relocated, never
/// removed).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AgentId(pub u32);

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for AgentId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_and_from() {
        assert_eq!(AgentId::from(7).to_string(), "7");
        assert_eq!(AgentId(3), AgentId::from(3));
    }
}
