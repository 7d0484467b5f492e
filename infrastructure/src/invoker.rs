//! Subprocess adapter for the [`AgentInvoker`] port
//!
//! Builds the per-agent command line, runs it to completion, and returns
//! trimmed stdout. Invocation is blocking from the orchestrator's point of
//! view: the call does not return until the subprocess exits.

use ensemble_application::config::AgentOverride;
use ensemble_application::ports::agent_invoker::{AgentInvoker, InvokerError};
use async_trait::async_trait;
use ensemble_domain::AgentId;
use std::collections::HashMap;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, warn};

/// Default model for `ollama run` when no override is configured
const OLLAMA_DEFAULT_MODEL: &str = "qwen2.5-coder";

/// Invoker that shells out to the agent CLI binaries
pub struct CliAgentInvoker {
    overrides: HashMap<AgentId, AgentOverride>,
}

impl CliAgentInvoker {
    pub fn new(overrides: HashMap<AgentId, AgentOverride>) -> Self {
        Self { overrides }
    }

    /// Apply the configured prompt prefix, if any
    fn effective_prompt(&self, agent: AgentId, user_prompt: &str) -> String {
        match self
            .overrides
            .get(&agent)
            .and_then(|o| o.prompt_prefix.as_deref())
        {
            Some(prefix) => format!("{prefix}\n\n{user_prompt}"),
            None => user_prompt.to_string(),
        }
    }

    fn model_for(&self, agent: AgentId) -> Option<&str> {
        self.overrides.get(&agent).and_then(|o| o.model.as_deref())
    }

    /// Build the argv for one agent invocation.
    ///
    /// `claude` takes the system prompt through a dedicated flag; the other
    /// CLIs have no such channel, so the system prompt is folded above the
    /// user prompt.
    fn build_command(&self, agent: AgentId, system_prompt: &str, user_prompt: &str) -> Command {
        let prompt = self.effective_prompt(agent, user_prompt);
        let mut cmd = Command::new(agent.binary());

        match agent {
            AgentId::Claude => {
                cmd.arg("-p");
                if !system_prompt.is_empty() {
                    cmd.args(["--append-system-prompt", system_prompt]);
                }
                if let Some(model) = self.model_for(agent) {
                    cmd.args(["--model", model]);
                }
                cmd.arg(&prompt);
            }
            AgentId::Codex => {
                cmd.arg("exec");
                if let Some(model) = self.model_for(agent) {
                    cmd.args(["--model", model]);
                }
                cmd.arg(fold_system_prompt(system_prompt, &prompt));
            }
            AgentId::Gemini => {
                if let Some(model) = self.model_for(agent) {
                    cmd.args(["-m", model]);
                }
                cmd.args(["-p", &fold_system_prompt(system_prompt, &prompt)]);
            }
            AgentId::Ollama => {
                let model = self.model_for(agent).unwrap_or(OLLAMA_DEFAULT_MODEL);
                cmd.args(["run", model]);
                cmd.arg(fold_system_prompt(system_prompt, &prompt));
            }
        }

        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        cmd
    }
}

/// Prepend the system prompt for CLIs without a system-prompt flag
fn fold_system_prompt(system_prompt: &str, prompt: &str) -> String {
    if system_prompt.is_empty() {
        prompt.to_string()
    } else {
        format!("{system_prompt}\n\n{prompt}")
    }
}

#[async_trait]
impl AgentInvoker for CliAgentInvoker {
    async fn execute(
        &self,
        agent: AgentId,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<String, InvokerError> {
        let mut cmd = self.build_command(agent, system_prompt, user_prompt);
        debug!("Invoking agent {agent}");

        let output = cmd.output().await.map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                InvokerError::NotInstalled(agent)
            } else {
                InvokerError::Spawn { agent, source }
            }
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            warn!(
                "Agent {agent} exited with {}: {}",
                output.status,
                stderr.trim()
            );
            return Err(InvokerError::Failed {
                agent,
                status: output.status.to_string(),
            });
        }

        let text = String::from_utf8(output.stdout)
            .map_err(|_| InvokerError::InvalidOutput { agent })?;
        Ok(text.trim().to_string())
    }
}
