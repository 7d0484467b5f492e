//! Capability model for the known agents
//!
//! Capability sets and scan orders are configuration data, fixed at compile
//! time. Nothing here is computed from observed agent behavior.

use super::identity::AgentId;
use serde::{Deserialize, Serialize};

/// What a role may require an agent to be able to do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Capability {
    Code,
    Review,
    Plan,
    Test,
    Debug,
    General,
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Capability::Code => "code",
            Capability::Review => "review",
            Capability::Plan => "plan",
            Capability::Test => "test",
            Capability::Debug => "debug",
            Capability::General => "general",
        };
        write!(f, "{s}")
    }
}

impl AgentId {
    /// The fixed capability set for this agent.
    ///
    /// `gemini` is deliberately declared without `code`: in the ensemble it
    /// serves as a reviewer/planner, which is what makes the two-agent
    /// doer/thinker split meaningful. `ollama` is the local fallback and
    /// claims only `general`.
    pub fn capabilities(&self) -> &'static [Capability] {
        use Capability::*;
        match self {
            AgentId::Claude => &[Code, Review, Plan, Test, Debug, General],
            AgentId::Codex => &[Code, Review, Plan, Test, Debug, General],
            AgentId::Gemini => &[Review, Plan, General],
            AgentId::Ollama => &[General],
        }
    }

    /// Membership test against the fixed capability set
    pub fn has_capability(&self, capability: Capability) -> bool {
        self.capabilities().contains(&capability)
    }
}

/// Scan order for assigning the planner in the 3+-agent distribution.
///
/// A third order, distinct from both the forward priority order and the
/// reversed one the critic uses, so that with three capable agents the
/// planner lands on yet another agent. Plan-specialist agents come first.
pub const PLANNER_SCAN_ORDER: [AgentId; 4] = [
    AgentId::Gemini,
    AgentId::Claude,
    AgentId::Codex,
    AgentId::Ollama,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capability_membership() {
        assert!(AgentId::Claude.has_capability(Capability::Code));
        assert!(AgentId::Codex.has_capability(Capability::Debug));
        assert!(AgentId::Gemini.has_capability(Capability::Review));
        assert!(!AgentId::Gemini.has_capability(Capability::Code));
        assert!(!AgentId::Ollama.has_capability(Capability::Test));
    }

    #[test]
    fn test_every_agent_is_general() {
        for agent in AgentId::ALL {
            assert!(agent.has_capability(Capability::General));
        }
    }

    #[test]
    fn test_planner_order_is_a_permutation() {
        let mut sorted = PLANNER_SCAN_ORDER;
        sorted.sort();
        let mut all = AgentId::ALL;
        all.sort();
        assert_eq!(sorted, all);
        // Distinct from both the forward and the reversed priority order
        assert_ne!(PLANNER_SCAN_ORDER, AgentId::ALL);
        let mut reversed = AgentId::ALL;
        reversed.reverse();
        assert_ne!(PLANNER_SCAN_ORDER, reversed);
    }

    #[test]
    fn test_capability_serde_lowercase() {
        let json = serde_json::to_string(&Capability::Review).unwrap();
        assert_eq!(json, "\"review\"");
    }
}
