//! Configuration file format (`ensemble.toml`)
//!
//! Example configuration:
//!
//! ```toml
//! [roles]
//! critic = "gemini"
//! implementer = "claude"
//!
//! [agents.claude]
//! model = "claude-sonnet-4-5"
//! prompt_prefix = "Follow the project style guide."
//!
//! [agents.ollama]
//! enabled = false
//!
//! [review]
//! max_iterations = 3
//! harvest_patterns = true
//! ```
//!
//! Unknown role or agent names in `[roles]` are warned about and skipped
//! rather than failing the load; configuration problems must not take the
//! process down once a run is underway.

use ensemble_application::config::{AgentOverride, OrchestratorSettings};
use ensemble_domain::{AgentId, Role};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::warn;

/// Root of the TOML configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Role pins: role name -> agent name
    pub roles: HashMap<String, String>,
    /// Per-agent settings, keyed by agent name
    pub agents: HashMap<String, FileAgentConfig>,
    /// Consensus loop settings
    pub review: FileReviewConfig,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            roles: HashMap::new(),
            agents: HashMap::new(),
            review: FileReviewConfig::default(),
        }
    }
}

/// Per-agent configuration (`[agents.<name>]` section)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileAgentConfig {
    /// Exclude this agent from discovery entirely
    pub enabled: bool,
    /// Model override passed to the agent CLI
    pub model: Option<String>,
    /// Text prepended to every prompt sent to this agent
    pub prompt_prefix: Option<String>,
}

impl Default for FileAgentConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            model: None,
            prompt_prefix: None,
        }
    }
}

/// Consensus loop configuration (`[review]` section)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileReviewConfig {
    /// Maximum critic iterations before force-accepting
    pub max_iterations: usize,
    /// Record minor-severity issues as learned patterns on accept
    pub harvest_patterns: bool,
}

impl Default for FileReviewConfig {
    fn default() -> Self {
        Self {
            max_iterations: 3,
            harvest_patterns: true,
        }
    }
}

impl FileConfig {
    /// Agents the configuration switched off
    pub fn disabled_agents(&self) -> Vec<AgentId> {
        self.agents
            .iter()
            .filter(|(_, cfg)| !cfg.enabled)
            .filter_map(|(name, _)| match name.parse() {
                Ok(id) => Some(id),
                Err(_) => {
                    warn!("Ignoring [agents.{name}]: unknown agent");
                    None
                }
            })
            .collect()
    }

    /// Convert the file form into application-layer settings.
    ///
    /// Unknown role or agent names are warned about and dropped.
    pub fn to_settings(&self) -> OrchestratorSettings {
        let mut pins = HashMap::new();
        for (role_name, agent_name) in &self.roles {
            let role: Role = match role_name.parse() {
                Ok(r) => r,
                Err(_) => {
                    warn!("Ignoring pin for unknown role {role_name}");
                    continue;
                }
            };
            let agent: AgentId = match agent_name.parse() {
                Ok(a) => a,
                Err(_) => {
                    warn!("Ignoring pin of {role_name} to unknown agent {agent_name}");
                    continue;
                }
            };
            pins.insert(role, agent);
        }

        let mut overrides = HashMap::new();
        for (name, cfg) in &self.agents {
            let Ok(agent) = name.parse::<AgentId>() else {
                continue; // already warned in disabled_agents
            };
            if cfg.model.is_some() || cfg.prompt_prefix.is_some() {
                overrides.insert(
                    agent,
                    AgentOverride {
                        model: cfg.model.clone(),
                        prompt_prefix: cfg.prompt_prefix.clone(),
                    },
                );
            }
        }

        OrchestratorSettings {
            pins,
            overrides,
            max_iterations: self.review.max_iterations,
            harvest_patterns: self.review.harvest_patterns,
            enable_review: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = FileConfig::default();
        assert!(config.roles.is_empty());
        assert_eq!(config.review.max_iterations, 3);
        assert!(config.review.harvest_patterns);
    }

    #[test]
    fn test_parse_full_config() {
        let config: FileConfig = toml::from_str(
            r#"
            [roles]
            critic = "gemini"

            [agents.claude]
            model = "claude-sonnet-4-5"
            prompt_prefix = "Be brief."

            [agents.ollama]
            enabled = false

            [review]
            max_iterations = 5
            "#,
        )
        .unwrap();

        assert_eq!(config.review.max_iterations, 5);
        assert_eq!(config.disabled_agents(), vec![AgentId::Ollama]);

        let settings = config.to_settings();
        assert_eq!(settings.pinned_agent_for(Role::Critic), Some(AgentId::Gemini));
        assert_eq!(settings.max_iterations, 5);
        assert_eq!(
            settings.custom_prompt_for(AgentId::Claude),
            Some("Be brief.")
        );
        assert_eq!(
            settings.overrides[&AgentId::Claude].model.as_deref(),
            Some("claude-sonnet-4-5")
        );
    }

    #[test]
    fn test_unknown_names_are_dropped_not_fatal() {
        let config: FileConfig = toml::from_str(
            r#"
            [roles]
            janitor = "claude"
            critic = "copilot"

            [agents.copilot]
            model = "gpt-5"
            "#,
        )
        .unwrap();

        let settings = config.to_settings();
        assert!(settings.pins.is_empty());
        assert!(settings.overrides.is_empty());
        assert!(config.disabled_agents().is_empty());
    }
}
