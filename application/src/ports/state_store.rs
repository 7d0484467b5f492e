//! Persistence port
//!
//! Key-value run state, the append-only session log, learned patterns, and
//! per-agent statistics. Everything here is fire-and-forget: adapters log
//! and swallow their own failures, and nothing ever blocks or fails the
//! core logic.

use ensemble_domain::{AgentId, Role, Verdict};

/// One entry in the append-only session log
#[derive(Debug, Clone)]
pub struct SessionEvent {
    /// Event type tag, e.g. `"task_started"`, `"verdict"`
    pub event_type: String,
    /// Event payload, merged into the logged record
    pub payload: serde_json::Value,
}

impl SessionEvent {
    pub fn new(event_type: impl Into<String>, payload: serde_json::Value) -> Self {
        Self {
            event_type: event_type.into(),
            payload,
        }
    }
}

/// Best-effort persistence for run state and session history
pub trait StateStore: Send + Sync {
    /// Set a key in the persistent run state
    fn set_state(&self, key: &str, value: &str);

    /// Read a key from the persistent run state
    fn get_state(&self, key: &str) -> Option<String>;

    /// Record a learned pattern for future runs
    fn record_pattern(&self, pattern: &str);

    /// Bump the (agent, role, verdict) counter
    fn update_agent_stats(&self, agent: AgentId, role: Role, verdict: Verdict);

    /// Append an event to the session log
    fn log_event(&self, event: SessionEvent);
}

/// No-op store for tests and `--no-state` style callers
pub struct NoStateStore;

impl StateStore for NoStateStore {
    fn set_state(&self, _key: &str, _value: &str) {}

    fn get_state(&self, _key: &str) -> Option<String> {
        None
    }

    fn record_pattern(&self, _pattern: &str) {}

    fn update_agent_stats(&self, _agent: AgentId, _role: Role, _verdict: Verdict) {}

    fn log_event(&self, _event: SessionEvent) {}
}
