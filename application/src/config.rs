//! Application-level orchestration settings
//!
//! Built by the infrastructure config loader from file config plus CLI
//! overrides, then handed into the use cases as plain data.

use ensemble_domain::{AgentId, Role};
use std::collections::HashMap;

/// Per-agent invocation overrides from configuration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AgentOverride {
    /// Model the agent CLI should use instead of its default
    pub model: Option<String>,
    /// Text prepended to every user prompt sent to this agent
    pub prompt_prefix: Option<String>,
}

/// Settings consumed by the orchestration use cases
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrchestratorSettings {
    /// User-pinned role assignments
    pub pins: HashMap<Role, AgentId>,
    /// Per-agent invocation overrides
    pub overrides: HashMap<AgentId, AgentOverride>,
    /// Maximum critic iterations in the consensus loop
    pub max_iterations: usize,
    /// Harvest minor-severity issues as learned patterns on accept
    pub harvest_patterns: bool,
    /// Run the consensus loop at all (`--no-review` disables it)
    pub enable_review: bool,
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self {
            pins: HashMap::new(),
            overrides: HashMap::new(),
            max_iterations: 3,
            harvest_patterns: true,
            enable_review: true,
        }
    }
}

impl OrchestratorSettings {
    /// Pinned agent for a role, if any
    pub fn pinned_agent_for(&self, role: Role) -> Option<AgentId> {
        self.pins.get(&role).copied()
    }

    /// Custom prompt prefix for an agent, if any
    pub fn custom_prompt_for(&self, agent: AgentId) -> Option<&str> {
        self.overrides
            .get(&agent)
            .and_then(|o| o.prompt_prefix.as_deref())
    }
}
