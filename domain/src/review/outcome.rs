//! Final outcome of one consensus cycle

use super::verdict::{Issue, Verdict};
use crate::agent::identity::AgentId;
use serde::{Deserialize, Serialize};

/// Result of a full critique/revision cycle
///
/// Always carries the last candidate output, even on rejection; the caller
/// decides whether to keep it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewOutcome {
    /// Final verdict
    pub verdict: Verdict,
    /// Number of critic invocations performed (0 when review was skipped)
    pub iterations: usize,
    /// Issues reported in the terminal iteration
    pub issues: Vec<Issue>,
    /// Agent that served as critic, if any
    pub critic: Option<AgentId>,
    /// Agent that served as implementer during revisions, if any
    pub implementer: Option<AgentId>,
    /// The last candidate output
    pub output: String,
    /// True when the cycle ended by hitting the iteration cap mid-revise
    pub forced: bool,
}

impl ReviewOutcome {
    /// Outcome for the no-critic short-circuit: accept unchanged, unreviewed
    pub fn skipped(output: impl Into<String>) -> Self {
        Self {
            verdict: Verdict::Accept,
            iterations: 0,
            issues: Vec::new(),
            critic: None,
            implementer: None,
            output: output.into(),
            forced: false,
        }
    }

    pub fn is_accepted(&self) -> bool {
        self.verdict.is_accept()
    }

    pub fn is_rejected(&self) -> bool {
        self.verdict.is_reject()
    }

    /// Whether any review actually happened
    pub fn was_reviewed(&self) -> bool {
        self.iterations > 0
    }
}
