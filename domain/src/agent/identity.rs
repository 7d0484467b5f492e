//! Agent identity value object
//!
//! The set of known external coding agents is closed: adding a new agent
//! means adding a variant here, an entry in the capability table, and an
//! argv builder in the infrastructure invoker. String names appear only at
//! the serialization boundary.

use crate::core::error::DomainError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// The known external coding agents (Value Object)
///
/// Each variant corresponds to a CLI binary of the same name that can be
/// invoked as a subprocess.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AgentId {
    Claude,
    Codex,
    Gemini,
    Ollama,
}

impl AgentId {
    /// All known agents, in the fixed priority order used for "best" lookups:
    /// claude > codex > gemini > ollama.
    pub const ALL: [AgentId; 4] = [
        AgentId::Claude,
        AgentId::Codex,
        AgentId::Gemini,
        AgentId::Ollama,
    ];

    /// Get the string identifier for this agent
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentId::Claude => "claude",
            AgentId::Codex => "codex",
            AgentId::Gemini => "gemini",
            AgentId::Ollama => "ollama",
        }
    }

    /// Name of the CLI binary probed on `$PATH` during discovery.
    ///
    /// Identical to [`as_str`](Self::as_str) for every current agent, but
    /// kept separate so the wire name and the binary name can diverge.
    pub fn binary(&self) -> &'static str {
        self.as_str()
    }
}

impl std::fmt::Display for AgentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for AgentId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "claude" => Ok(AgentId::Claude),
            "codex" => Ok(AgentId::Codex),
            "gemini" => Ok(AgentId::Gemini),
            "ollama" => Ok(AgentId::Ollama),
            other => Err(DomainError::UnknownAgent(other.to_string())),
        }
    }
}

impl Serialize for AgentId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for AgentId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_agent_roundtrip() {
        for agent in AgentId::ALL {
            let s = agent.to_string();
            let parsed: AgentId = s.parse().unwrap();
            assert_eq!(agent, parsed);
        }
    }

    #[test]
    fn test_unknown_agent_rejected() {
        let result: Result<AgentId, _> = "copilot".parse();
        assert!(result.is_err());
    }

    #[test]
    fn test_priority_order() {
        assert_eq!(
            AgentId::ALL,
            [
                AgentId::Claude,
                AgentId::Codex,
                AgentId::Gemini,
                AgentId::Ollama
            ]
        );
    }

    #[test]
    fn test_serde_string_form() {
        let json = serde_json::to_string(&AgentId::Gemini).unwrap();
        assert_eq!(json, "\"gemini\"");
        let back: AgentId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, AgentId::Gemini);
    }
}
