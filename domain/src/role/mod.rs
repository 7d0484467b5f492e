//! Role table: abstract responsibilities assigned to agents per task

pub mod assigner;

use crate::agent::capability::Capability;
use crate::core::error::DomainError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Broad classification used only by the two-agent split heuristic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoleClass {
    /// Produces artifacts (code, fixes, tests)
    Doer,
    /// Evaluates and plans
    Thinker,
}

/// An abstract responsibility matched to a concrete agent per task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Planner,
    Architect,
    Implementer,
    Critic,
    Debugger,
    Tester,
    Verifier,
}

impl Role {
    pub const ALL: [Role; 7] = [
        Role::Planner,
        Role::Architect,
        Role::Implementer,
        Role::Critic,
        Role::Debugger,
        Role::Tester,
        Role::Verifier,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Planner => "planner",
            Role::Architect => "architect",
            Role::Implementer => "implementer",
            Role::Critic => "critic",
            Role::Debugger => "debugger",
            Role::Tester => "tester",
            Role::Verifier => "verifier",
        }
    }

    /// The capability an agent needs to fill this role
    pub fn required_capability(&self) -> Capability {
        match self {
            Role::Planner | Role::Architect => Capability::Plan,
            Role::Implementer => Capability::Code,
            Role::Critic | Role::Verifier => Capability::Review,
            Role::Debugger => Capability::Debug,
            Role::Tester => Capability::Test,
        }
    }

    /// Doer/thinker classification for the two-agent split
    pub fn class(&self) -> RoleClass {
        match self {
            Role::Implementer | Role::Debugger | Role::Tester => RoleClass::Doer,
            Role::Planner | Role::Architect | Role::Critic | Role::Verifier => RoleClass::Thinker,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "planner" => Ok(Role::Planner),
            "architect" => Ok(Role::Architect),
            "implementer" => Ok(Role::Implementer),
            "critic" => Ok(Role::Critic),
            "debugger" => Ok(Role::Debugger),
            "tester" => Ok(Role::Tester),
            "verifier" => Ok(Role::Verifier),
            other => Err(DomainError::UnknownRole(other.to_string())),
        }
    }
}

impl Serialize for Role {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Role {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
