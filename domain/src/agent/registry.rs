//! Agent registry: which agents are installed, and what each can do
//!
//! The registry is plain data. Probing binaries on `$PATH` happens in the
//! infrastructure layer; the result is handed in here once at process start
//! and is immutable for the rest of the run.

use super::capability::Capability;
use super::identity::AgentId;
use serde::{Deserialize, Serialize};

/// An agent found on the system during startup discovery
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveredAgent {
    pub id: AgentId,
    /// Reported version string, or `"available"` when the binary exists but
    /// did not answer a version probe
    pub version: String,
}

impl DiscoveredAgent {
    pub fn new(id: AgentId, version: impl Into<String>) -> Self {
        Self {
            id,
            version: version.into(),
        }
    }
}

/// Availability snapshot of the known agents
///
/// Holds the agents in discovery order and answers "which agents exist" and
/// "which agent is best for capability X".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgentRegistry {
    agents: Vec<DiscoveredAgent>,
}

impl AgentRegistry {
    /// Build a registry from discovery results, preserving discovery order
    pub fn new(agents: Vec<DiscoveredAgent>) -> Self {
        Self { agents }
    }

    /// All available agents, in discovery order
    pub fn discovered(&self) -> &[DiscoveredAgent] {
        &self.agents
    }

    /// Available agent ids, in discovery order
    pub fn available(&self) -> impl Iterator<Item = AgentId> + '_ {
        self.agents.iter().map(|a| a.id)
    }

    pub fn available_count(&self) -> usize {
        self.agents.len()
    }

    pub fn is_available(&self, id: AgentId) -> bool {
        self.agents.iter().any(|a| a.id == id)
    }

    /// Version string recorded for an available agent
    pub fn version(&self, id: AgentId) -> Option<&str> {
        self.agents
            .iter()
            .find(|a| a.id == id)
            .map(|a| a.version.as_str())
    }

    /// First available agent in discovery order
    pub fn first_available(&self) -> Option<AgentId> {
        self.agents.first().map(|a| a.id)
    }

    /// Availability and capability combined
    pub fn has_capability(&self, id: AgentId, capability: Capability) -> bool {
        self.is_available(id) && id.has_capability(capability)
    }

    /// Best available agent for a capability.
    ///
    /// Scans the fixed priority order (claude > codex > gemini > ollama) for
    /// the first available agent with the capability. If none match, any
    /// available agent (again in priority order) is returned. `None` means
    /// no agent is installed at all; callers must treat that as fatal for
    /// the current task, not for the process.
    pub fn best_agent_for(&self, capability: Capability) -> Option<AgentId> {
        AgentId::ALL
            .into_iter()
            .find(|id| self.has_capability(*id, capability))
            .or_else(|| AgentId::ALL.into_iter().find(|id| self.is_available(*id)))
    }
}
