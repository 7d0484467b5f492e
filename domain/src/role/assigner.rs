//! Role assignment policy
//!
//! Maps a role to a concrete agent for the current run. The strategy depends
//! on how many agents discovery found:
//!
//! - **1 agent**: it handles every role.
//! - **2 agents**: a doer/thinker split, computed once per run. The
//!   code-capable agent does, the other thinks.
//! - **3+ agents**: a diversity distribution, computed once per run, that
//!   puts different agents on implementer, critic, and planner. The critic
//!   is scanned in *reverse* priority order so that review duty lands on
//!   otherwise-idle agents while the strongest agents stay reserved for
//!   implementation.
//!
//! User pins always win when the pinned agent is available; an unavailable
//! pin falls back to the dynamic strategy instead of failing.

use crate::agent::capability::{Capability, PLANNER_SCAN_ORDER};
use crate::agent::identity::AgentId;
use crate::agent::registry::AgentRegistry;
use super::{Role, RoleClass};
use std::collections::HashMap;
use std::sync::OnceLock;
use tracing::{debug, warn};

/// Memoized result of the two-agent split
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PairSplit {
    doer: AgentId,
    thinker: AgentId,
}

/// Memoized result of the 3+-agent diversity distribution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Distribution {
    implementer: Option<AgentId>,
    critic: Option<AgentId>,
    planner: Option<AgentId>,
}

/// Per-run role assignment context
///
/// Owns the availability snapshot, the user's pinned assignments, and the
/// memo cells for the split/distribution results. Build one per run; there
/// are no process-wide globals.
pub struct RoleAssigner {
    registry: AgentRegistry,
    pins: HashMap<Role, AgentId>,
    pair_split: OnceLock<Option<PairSplit>>,
    distribution: OnceLock<Distribution>,
}

impl RoleAssigner {
    pub fn new(registry: AgentRegistry, pins: HashMap<Role, AgentId>) -> Self {
        Self {
            registry,
            pins,
            pair_split: OnceLock::new(),
            distribution: OnceLock::new(),
        }
    }

    /// The availability snapshot this assigner works from
    pub fn registry(&self) -> &AgentRegistry {
        &self.registry
    }

    /// Pick an agent for a role.
    ///
    /// Returns `None` only when no agent is installed at all; callers must
    /// abort the current task, not the process.
    pub fn assign(&self, role: Role) -> Option<AgentId> {
        if let Some(pinned) = self.pins.get(&role).copied() {
            if self.registry.is_available(pinned) {
                debug!("Role {role} pinned to {pinned}");
                return Some(pinned);
            }
            warn!("Role {role} is pinned to {pinned}, which is not available; assigning dynamically");
        }

        match self.registry.available_count() {
            0 => None,
            1 => self.registry.best_agent_for(Capability::General),
            2 => {
                let split = self.pair_split()?;
                Some(match role.class() {
                    RoleClass::Doer => split.doer,
                    RoleClass::Thinker => split.thinker,
                })
            }
            _ => {
                let dist = self.distribution();
                match role {
                    Role::Implementer => dist.implementer,
                    Role::Critic => dist.critic,
                    Role::Planner => dist.planner,
                    // Secondary roles never join the diversity distribution
                    other => self.registry.best_agent_for(other.required_capability()),
                }
            }
        }
    }

    /// Doer/thinker split for exactly two available agents, computed once.
    ///
    /// The first code-capable agent (priority order) becomes the doer. When
    /// neither agent has the code capability, the first agent in discovery
    /// order does. `None` only with fewer than two agents in the registry.
    fn pair_split(&self) -> Option<PairSplit> {
        *self.pair_split.get_or_init(|| {
            let doer = AgentId::ALL
                .into_iter()
                .find(|id| self.registry.has_capability(*id, Capability::Code))
                .or_else(|| self.registry.first_available())?;
            let thinker = self.registry.available().find(|id| *id != doer)?;

            debug!("Two-agent split: doer={doer}, thinker={thinker}");
            Some(PairSplit { doer, thinker })
        })
    }

    /// Diversity distribution for three or more agents, computed once.
    ///
    /// Implementer is scanned in forward priority order, critic in reverse,
    /// planner in a third order. Each pick excludes agents already used, so
    /// the three high-value roles land on distinct agents whenever enough
    /// agents qualify. A slot no unused agent can fill falls back to
    /// `best_agent_for`, which may double-assign.
    fn distribution(&self) -> Distribution {
        *self.distribution.get_or_init(|| {
            let mut used: Vec<AgentId> = Vec::new();

            let implementer = AgentId::ALL.into_iter().find(|id| {
                self.registry.has_capability(*id, Capability::Code) && !used.contains(id)
            });
            used.extend(implementer);

            let critic = AgentId::ALL.into_iter().rev().find(|id| {
                self.registry.has_capability(*id, Capability::Review) && !used.contains(id)
            });
            used.extend(critic);

            let planner = PLANNER_SCAN_ORDER.into_iter().find(|id| {
                self.registry.has_capability(*id, Capability::Plan) && !used.contains(id)
            });

            let dist = Distribution {
                implementer: implementer
                    .or_else(|| self.registry.best_agent_for(Capability::Code)),
                critic: critic.or_else(|| self.registry.best_agent_for(Capability::Review)),
                planner: planner.or_else(|| self.registry.best_agent_for(Capability::Plan)),
            };
            debug!(
                "Distribution: implementer={:?}, critic={:?}, planner={:?}",
                dist.implementer, dist.critic, dist.planner
            );
            dist
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::registry::DiscoveredAgent;

    fn assigner_of(ids: &[AgentId]) -> RoleAssigner {
        let registry = AgentRegistry::new(
            ids.iter()
                .map(|id| DiscoveredAgent::new(*id, "available"))
                .collect(),
        );
        RoleAssigner::new(registry, HashMap::new())
    }

    fn assigner_with_pins(ids: &[AgentId], pins: &[(Role, AgentId)]) -> RoleAssigner {
        let registry = AgentRegistry::new(
            ids.iter()
                .map(|id| DiscoveredAgent::new(*id, "available"))
                .collect(),
        );
        RoleAssigner::new(registry, pins.iter().copied().collect())
    }

    #[test]
    fn test_no_agents_means_no_assignment() {
        let assigner = assigner_of(&[]);
        for role in Role::ALL {
            assert_eq!(assigner.assign(role), None);
        }
    }

    #[test]
    fn test_single_agent_handles_every_role() {
        let assigner = assigner_of(&[AgentId::Ollama]);
        for role in Role::ALL {
            assert_eq!(assigner.assign(role), Some(AgentId::Ollama));
        }
    }

    #[test]
    fn test_two_agent_split_respects_code_capability() {
        let assigner = assigner_of(&[AgentId::Gemini, AgentId::Claude]);
        // claude has code, gemini does not
        assert_eq!(assigner.assign(Role::Implementer), Some(AgentId::Claude));
        assert_eq!(assigner.assign(Role::Tester), Some(AgentId::Claude));
        assert_eq!(assigner.assign(Role::Critic), Some(AgentId::Gemini));
        assert_eq!(assigner.assign(Role::Planner), Some(AgentId::Gemini));
    }

    #[test]
    fn test_two_agent_split_without_coder_uses_discovery_order() {
        let assigner = assigner_of(&[AgentId::Ollama, AgentId::Gemini]);
        // Neither has code; first discovered becomes the doer
        assert_eq!(assigner.assign(Role::Implementer), Some(AgentId::Ollama));
        assert_eq!(assigner.assign(Role::Critic), Some(AgentId::Gemini));
    }

    #[test]
    fn test_three_agents_get_distinct_high_value_roles() {
        let assigner = assigner_of(&[AgentId::Claude, AgentId::Codex, AgentId::Gemini]);
        let implementer = assigner.assign(Role::Implementer).unwrap();
        let critic = assigner.assign(Role::Critic).unwrap();
        let planner = assigner.assign(Role::Planner).unwrap();

        assert_eq!(implementer, AgentId::Claude);
        // Reverse scan favors the otherwise-idle reviewer
        assert_eq!(critic, AgentId::Gemini);
        assert_eq!(planner, AgentId::Codex);
        assert_ne!(implementer, critic);
        assert_ne!(implementer, planner);
        assert_ne!(critic, planner);
    }

    #[test]
    fn test_four_agents_distribution() {
        let assigner = assigner_of(&[
            AgentId::Claude,
            AgentId::Codex,
            AgentId::Gemini,
            AgentId::Ollama,
        ]);
        assert_eq!(assigner.assign(Role::Implementer), Some(AgentId::Claude));
        // ollama has no review capability, so the reverse scan settles on gemini
        assert_eq!(assigner.assign(Role::Critic), Some(AgentId::Gemini));
        assert_eq!(assigner.assign(Role::Planner), Some(AgentId::Codex));
    }

    #[test]
    fn test_secondary_roles_fall_back_to_best_agent() {
        let assigner = assigner_of(&[AgentId::Claude, AgentId::Codex, AgentId::Gemini]);
        // Debugger is not part of the distribution; best debug-capable agent wins
        assert_eq!(assigner.assign(Role::Debugger), Some(AgentId::Claude));
        assert_eq!(assigner.assign(Role::Tester), Some(AgentId::Claude));
        assert_eq!(assigner.assign(Role::Verifier), Some(AgentId::Claude));
    }

    #[test]
    fn test_distribution_double_assigns_when_short_on_capability() {
        // gemini and ollama cannot implement; claude must double up
        let assigner = assigner_of(&[AgentId::Claude, AgentId::Gemini, AgentId::Ollama]);
        assert_eq!(assigner.assign(Role::Implementer), Some(AgentId::Claude));
        assert_eq!(assigner.assign(Role::Critic), Some(AgentId::Gemini));
        // No unused plan-capable agent remains; falls back to the best one
        assert_eq!(assigner.assign(Role::Planner), Some(AgentId::Claude));
    }

    #[test]
    fn test_pin_to_available_agent_wins() {
        let assigner = assigner_with_pins(
            &[AgentId::Claude, AgentId::Codex, AgentId::Gemini],
            &[(Role::Critic, AgentId::Claude)],
        );
        assert_eq!(assigner.assign(Role::Critic), Some(AgentId::Claude));
    }

    #[test]
    fn test_pin_to_unavailable_agent_falls_back() {
        let assigner = assigner_with_pins(
            &[AgentId::Claude, AgentId::Gemini],
            &[(Role::Implementer, AgentId::Codex)],
        );
        // codex is not installed; the two-agent split takes over
        assert_eq!(assigner.assign(Role::Implementer), Some(AgentId::Claude));
    }

    #[test]
    fn test_assignments_never_return_unavailable_agents() {
        let combos: [&[AgentId]; 5] = [
            &[AgentId::Claude],
            &[AgentId::Gemini, AgentId::Ollama],
            &[AgentId::Claude, AgentId::Codex],
            &[AgentId::Codex, AgentId::Gemini, AgentId::Ollama],
            &[
                AgentId::Claude,
                AgentId::Codex,
                AgentId::Gemini,
                AgentId::Ollama,
            ],
        ];
        for ids in combos {
            let assigner = assigner_of(ids);
            for role in Role::ALL {
                let agent = assigner.assign(role).unwrap();
                assert!(
                    ids.contains(&agent),
                    "role {role} assigned to uninstalled agent {agent}"
                );
            }
        }
    }

    #[test]
    fn test_split_is_memoized_per_run() {
        let assigner = assigner_of(&[AgentId::Gemini, AgentId::Claude]);
        let first = assigner.assign(Role::Implementer);
        for _ in 0..3 {
            assert_eq!(assigner.assign(Role::Implementer), first);
        }
    }
}
