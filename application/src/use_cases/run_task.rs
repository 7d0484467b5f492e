//! Orchestration driver use case
//!
//! Sequences decompose -> implement -> consensus -> present for one user
//! task. Strictly sequential: one agent subprocess is outstanding at a
//! time. Role assignment failures abort the current task only; the process
//! stays up for the caller to report and move on.

use crate::config::OrchestratorSettings;
use crate::ports::agent_invoker::AgentInvoker;
use crate::ports::state_store::{SessionEvent, StateStore};
use crate::use_cases::review_cycle::{ReviewCycleInput, ReviewCycleUseCase};
use ensemble_domain::{AgentId, PromptTemplate, ReviewOutcome, Role, RoleAssigner};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

/// Errors that abort the current task
#[derive(Error, Debug)]
pub enum RunTaskError {
    #[error("No agent available for the {0} role")]
    NoAgentAvailable(Role),

    #[error("The {role} agent {agent} produced no output")]
    EmptyResponse { role: Role, agent: AgentId },
}

/// Input for the RunTask use case
#[derive(Debug, Clone)]
pub struct RunTaskInput {
    /// The user's task description
    pub task: String,
}

impl RunTaskInput {
    pub fn new(task: impl Into<String>) -> Self {
        Self { task: task.into() }
    }
}

/// Result of a full orchestration run
#[derive(Debug, Clone)]
pub struct RunTaskOutput {
    /// The planner's decomposition, when a planner was available
    pub plan: Option<String>,
    /// Agents that filled each role this run
    pub assignments: Vec<(Role, AgentId)>,
    /// Outcome of the consensus cycle (skipped-accept when review is off)
    pub outcome: ReviewOutcome,
}

/// Use case for running one task end to end
pub struct RunTaskUseCase<I: AgentInvoker + 'static> {
    invoker: Arc<I>,
    store: Arc<dyn StateStore>,
}

impl<I: AgentInvoker + 'static> RunTaskUseCase<I> {
    pub fn new(invoker: Arc<I>, store: Arc<dyn StateStore>) -> Self {
        Self { invoker, store }
    }

    pub async fn execute(
        &self,
        input: RunTaskInput,
        assigner: &RoleAssigner,
        settings: &OrchestratorSettings,
    ) -> Result<RunTaskOutput, RunTaskError> {
        info!(
            "Starting task with {} agent(s) available",
            assigner.registry().available_count()
        );
        self.store.log_event(SessionEvent::new(
            "task_started",
            serde_json::json!({ "task": input.task }),
        ));

        let mut assignments = Vec::new();

        // Phase 1: Decompose. A missing planner degrades to an unplanned
        // implementation pass rather than aborting.
        let plan = match assigner.assign(Role::Planner) {
            Some(planner) => {
                assignments.push((Role::Planner, planner));
                self.decompose(&input.task, planner).await
            }
            None => {
                warn!("No agent available for the planner role; skipping decomposition");
                None
            }
        };

        // Phase 2: Implement. Without an implementer there is nothing to
        // review or present, so this one is fatal for the task.
        let implementer = assigner
            .assign(Role::Implementer)
            .ok_or(RunTaskError::NoAgentAvailable(Role::Implementer))?;
        assignments.push((Role::Implementer, implementer));
        let candidate = self
            .implement(&input.task, plan.as_deref(), implementer)
            .await?;

        // Phase 3: Consensus
        let outcome = if settings.enable_review {
            let review = ReviewCycleUseCase::new(Arc::clone(&self.invoker), Arc::clone(&self.store));
            let outcome = review
                .execute(
                    ReviewCycleInput::new(input.task.clone(), candidate),
                    assigner,
                    settings,
                )
                .await;
            if let Some(critic) = outcome.critic {
                assignments.push((Role::Critic, critic));
            }
            outcome
        } else {
            info!("Review disabled; accepting implementation as-is");
            ReviewOutcome::skipped(candidate)
        };

        // Phase 4: Present
        self.store.log_event(SessionEvent::new(
            "task_complete",
            serde_json::json!({
                "verdict": outcome.verdict,
                "iterations": outcome.iterations,
                "assignments": assignments
                    .iter()
                    .map(|(role, agent)| serde_json::json!({ "role": role, "agent": agent }))
                    .collect::<Vec<_>>(),
            }),
        ));

        Ok(RunTaskOutput {
            plan,
            assignments,
            outcome,
        })
    }

    /// Ask the planner to decompose the task. Planner failures degrade to
    /// an absent plan.
    async fn decompose(&self, task: &str, planner: AgentId) -> Option<String> {
        info!("Phase 1: Decompose (planner {planner})");
        let prompt = PromptTemplate::decompose_request(task);
        let plan = match self
            .invoker
            .execute(planner, PromptTemplate::system_for(Role::Planner), &prompt)
            .await
        {
            Ok(text) => text,
            Err(e) => {
                warn!("Planner {planner} invocation failed: {e}");
                String::new()
            }
        };

        if plan.trim().is_empty() {
            warn!("Planner {planner} produced no plan; continuing without one");
            return None;
        }
        self.store.log_event(SessionEvent::new(
            "plan_created",
            serde_json::json!({ "planner": planner, "plan": plan }),
        ));
        Some(plan)
    }

    /// Ask the implementer for the initial candidate
    async fn implement(
        &self,
        task: &str,
        plan: Option<&str>,
        implementer: AgentId,
    ) -> Result<String, RunTaskError> {
        info!("Phase 2: Implement (implementer {implementer})");
        let prompt = PromptTemplate::implement_request(task, plan);
        let candidate = self
            .invoker
            .execute(
                implementer,
                PromptTemplate::system_for(Role::Implementer),
                &prompt,
            )
            .await
            .unwrap_or_else(|e| {
                warn!("Implementer {implementer} invocation failed: {e}");
                String::new()
            });

        if candidate.trim().is_empty() {
            return Err(RunTaskError::EmptyResponse {
                role: Role::Implementer,
                agent: implementer,
            });
        }
        self.store.log_event(SessionEvent::new(
            "implementation_created",
            serde_json::json!({ "implementer": implementer }),
        ));
        Ok(candidate)
    }
}
