//! Agent invoker port
//!
//! Defines the interface for invoking an external coding agent as a
//! blocking subprocess call. One invocation is outstanding at a time;
//! there is no cancellation.

use async_trait::async_trait;
use ensemble_domain::AgentId;
use thiserror::Error;

/// Errors that can occur while invoking an agent
///
/// Consensus-loop callers fold every error into the empty-response degrade
/// path, so from the core's point of view empty output remains the only
/// failure signal an agent can emit.
#[derive(Error, Debug)]
pub enum InvokerError {
    #[error("Agent {0} is not installed")]
    NotInstalled(AgentId),

    #[error("Failed to spawn {agent}: {source}")]
    Spawn {
        agent: AgentId,
        source: std::io::Error,
    },

    #[error("Agent {agent} exited with {status}")]
    Failed { agent: AgentId, status: String },

    #[error("Agent {agent} produced non-UTF8 output")]
    InvalidOutput { agent: AgentId },
}

/// Gateway for agent subprocess invocation
///
/// The application layer calls this port; the adapter in the
/// infrastructure layer builds the per-agent command line.
#[async_trait]
pub trait AgentInvoker: Send + Sync {
    /// Invoke an agent with a system prompt and a user prompt, blocking
    /// until the subprocess completes, and return its text output.
    async fn execute(
        &self,
        agent: AgentId,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<String, InvokerError>;
}
