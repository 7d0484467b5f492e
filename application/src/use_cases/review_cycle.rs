//! Consensus loop use case
//!
//! Drives the bounded critique/revision cycle between a critic verdict and
//! an implementer revision:
//!
//! ```text
//! reviewing -> accept              (terminal)
//!           -> reject              (terminal)
//!           -> revise -> reviewing (bounded by max_iterations)
//! ```
//!
//! The loop is built to terminate within a hard budget of external calls
//! and to never block on a misbehaving agent: an empty critic response is
//! an implicit accept, a malformed verdict normalizes to accept, and a
//! revise verdict on the final iteration force-accepts. Nothing in this
//! cycle raises a fatal condition.

use crate::config::OrchestratorSettings;
use crate::ports::agent_invoker::AgentInvoker;
use crate::ports::state_store::{SessionEvent, StateStore};
use ensemble_domain::{
    AgentId, CritiqueReport, PromptTemplate, ReviewOutcome, Role, RoleAssigner, Verdict,
    parse_critique,
};
use std::sync::Arc;
use tracing::{info, warn};

/// Input for one consensus cycle
#[derive(Debug, Clone)]
pub struct ReviewCycleInput {
    /// The original task, embedded verbatim in every critique/revision prompt
    pub task: String,
    /// The candidate output under review
    pub candidate: String,
}

impl ReviewCycleInput {
    pub fn new(task: impl Into<String>, candidate: impl Into<String>) -> Self {
        Self {
            task: task.into(),
            candidate: candidate.into(),
        }
    }
}

/// Use case driving the critique/revision cycle
pub struct ReviewCycleUseCase<I: AgentInvoker + 'static> {
    invoker: Arc<I>,
    store: Arc<dyn StateStore>,
}

impl<I: AgentInvoker + 'static> ReviewCycleUseCase<I> {
    pub fn new(invoker: Arc<I>, store: Arc<dyn StateStore>) -> Self {
        Self { invoker, store }
    }

    /// Run the cycle to a terminal verdict.
    ///
    /// Performs at most `max_iterations` critic invocations and at most
    /// `max_iterations - 1` implementer invocations. Rejection is reported
    /// through the outcome's verdict, not as an error; the last candidate
    /// output is always returned.
    pub async fn execute(
        &self,
        input: ReviewCycleInput,
        assigner: &RoleAssigner,
        settings: &OrchestratorSettings,
    ) -> ReviewOutcome {
        let Some(critic) = assigner.assign(Role::Critic) else {
            // Degrade gracefully: with nobody to review, accept unchanged
            warn!("No agent available for the critic role; accepting output unreviewed");
            self.store.set_state("consensus.verdict", Verdict::Accept.as_str());
            self.store.log_event(SessionEvent::new(
                "review_skipped",
                serde_json::json!({ "reason": "no_critic" }),
            ));
            return ReviewOutcome::skipped(input.candidate);
        };

        self.store.set_state("consensus.critic", critic.as_str());
        let max_iterations = settings.max_iterations.max(1);
        let mut candidate = input.candidate;
        let mut implementer_used: Option<AgentId> = None;

        for iteration in 1..=max_iterations {
            info!("Consensus iteration {iteration}/{max_iterations}: critic {critic}");

            let prompt = PromptTemplate::critique_request(&input.task, &candidate);
            let response = match self
                .invoker
                .execute(critic, PromptTemplate::system_for(Role::Critic), &prompt)
                .await
            {
                Ok(text) => text,
                Err(e) => {
                    warn!("Critic {critic} invocation failed: {e}");
                    String::new()
                }
            };

            if response.trim().is_empty() {
                // Escape valve: never deadlock on a misbehaving agent
                warn!("Critic {critic} returned no output; treating as implicit accept");
                return self.finish(
                    Verdict::Accept,
                    iteration,
                    CritiqueReport::default(),
                    critic,
                    implementer_used,
                    candidate,
                    false,
                    settings,
                );
            }

            let report = parse_critique(&response);
            info!(
                "Critic {critic} verdict: {} ({} issues)",
                report.verdict,
                report.issues.len()
            );
            self.store.log_event(SessionEvent::new(
                "verdict",
                serde_json::json!({
                    "iteration": iteration,
                    "critic": critic,
                    "verdict": report.verdict,
                    "issues": report.issues,
                }),
            ));

            match report.verdict {
                Verdict::Accept => {
                    return self.finish(
                        Verdict::Accept,
                        iteration,
                        report,
                        critic,
                        implementer_used,
                        candidate,
                        false,
                        settings,
                    );
                }
                Verdict::Reject => {
                    return self.finish(
                        Verdict::Reject,
                        iteration,
                        report,
                        critic,
                        implementer_used,
                        candidate,
                        false,
                        settings,
                    );
                }
                Verdict::Revise => {
                    if iteration == max_iterations {
                        warn!(
                            "Iteration budget exhausted after {iteration} rounds; force-accepting"
                        );
                        return self.finish(
                            Verdict::Accept,
                            iteration,
                            report,
                            critic,
                            implementer_used,
                            candidate,
                            true,
                            settings,
                        );
                    }

                    let Some(implementer) = assigner.assign(Role::Implementer) else {
                        // Same degrade policy as a missing critic
                        warn!("No agent available to revise; accepting current candidate");
                        return self.finish(
                            Verdict::Accept,
                            iteration,
                            report,
                            critic,
                            implementer_used,
                            candidate,
                            true,
                            settings,
                        );
                    };
                    implementer_used = Some(implementer);
                    self.store
                        .set_state("consensus.implementer", implementer.as_str());

                    info!("Revision round {iteration}: implementer {implementer}");
                    // Feedback goes in verbatim: the implementer sees the raw
                    // critic response, not the normalized report
                    let revision_prompt =
                        PromptTemplate::revision_request(&input.task, &candidate, &response);
                    let revised = self
                        .invoker
                        .execute(
                            implementer,
                            PromptTemplate::system_for(Role::Implementer),
                            &revision_prompt,
                        )
                        .await
                        .unwrap_or_else(|e| {
                            warn!("Implementer {implementer} invocation failed: {e}");
                            String::new()
                        });

                    if revised.trim().is_empty() {
                        warn!("Empty revision from {implementer}; keeping previous candidate");
                    } else {
                        candidate = revised;
                    }
                    self.store
                        .update_agent_stats(implementer, Role::Implementer, Verdict::Revise);
                }
            }
        }

        // All iterations exhausted without an explicit terminal verdict;
        // default to accept (the revise arm normally force-accepts first)
        self.finish(
            Verdict::Accept,
            max_iterations,
            CritiqueReport::default(),
            critic,
            implementer_used,
            candidate,
            true,
            settings,
        )
    }

    /// Persist the terminal state and build the outcome
    #[allow(clippy::too_many_arguments)]
    fn finish(
        &self,
        verdict: Verdict,
        iterations: usize,
        report: CritiqueReport,
        critic: AgentId,
        implementer: Option<AgentId>,
        output: String,
        forced: bool,
        settings: &OrchestratorSettings,
    ) -> ReviewOutcome {
        self.store.set_state("consensus.verdict", verdict.as_str());
        self.store
            .set_state("consensus.iterations", &iterations.to_string());
        if let Ok(issues_json) = serde_json::to_string(&report.issues) {
            self.store.set_state("consensus.issues", &issues_json);
        }
        self.store.update_agent_stats(critic, Role::Critic, verdict);

        if verdict.is_accept() && settings.harvest_patterns {
            for issue in report.minor_issues() {
                self.store.record_pattern(&issue.description);
            }
        }

        self.store.log_event(SessionEvent::new(
            "review_complete",
            serde_json::json!({
                "verdict": verdict,
                "iterations": iterations,
                "forced": forced,
            }),
        ));

        ReviewOutcome {
            verdict,
            iterations,
            issues: report.issues,
            critic: Some(critic),
            implementer,
            output,
            forced,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::agent_invoker::InvokerError;
    use async_trait::async_trait;
    use ensemble_domain::{AgentRegistry, DiscoveredAgent, IssueSeverity};
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Scripted invoker: hands out canned critic responses in order and a
    /// fixed revision text, recording every call it sees.
    struct ScriptedInvoker {
        critic_responses: Mutex<Vec<String>>,
        revision: String,
        calls: Mutex<Vec<(AgentId, String)>>,
    }

    impl ScriptedInvoker {
        fn new(critic_responses: &[&str], revision: &str) -> Self {
            Self {
                critic_responses: Mutex::new(
                    critic_responses.iter().rev().map(|s| s.to_string()).collect(),
                ),
                revision: revision.to_string(),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls_for(&self, agent: AgentId) -> usize {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .filter(|(a, _)| *a == agent)
                .count()
        }
    }

    #[async_trait]
    impl AgentInvoker for ScriptedInvoker {
        async fn execute(
            &self,
            agent: AgentId,
            _system_prompt: &str,
            user_prompt: &str,
        ) -> Result<String, InvokerError> {
            self.calls
                .lock()
                .unwrap()
                .push((agent, user_prompt.to_string()));
            if user_prompt.contains("Reviewer feedback") {
                Ok(self.revision.clone())
            } else {
                Ok(self
                    .critic_responses
                    .lock()
                    .unwrap()
                    .pop()
                    .unwrap_or_default())
            }
        }
    }

    /// In-memory store capturing everything the cycle persists
    #[derive(Default)]
    struct MemoryStore {
        state: Mutex<HashMap<String, String>>,
        patterns: Mutex<Vec<String>>,
        events: Mutex<Vec<SessionEvent>>,
    }

    impl StateStore for MemoryStore {
        fn set_state(&self, key: &str, value: &str) {
            self.state
                .lock()
                .unwrap()
                .insert(key.to_string(), value.to_string());
        }

        fn get_state(&self, key: &str) -> Option<String> {
            self.state.lock().unwrap().get(key).cloned()
        }

        fn record_pattern(&self, pattern: &str) {
            self.patterns.lock().unwrap().push(pattern.to_string());
        }

        fn update_agent_stats(&self, _agent: AgentId, _role: Role, _verdict: Verdict) {}

        fn log_event(&self, event: SessionEvent) {
            self.events.lock().unwrap().push(event);
        }
    }

    fn assigner_of(ids: &[AgentId]) -> RoleAssigner {
        let registry = AgentRegistry::new(
            ids.iter()
                .map(|id| DiscoveredAgent::new(*id, "available"))
                .collect(),
        );
        RoleAssigner::new(registry, HashMap::new())
    }

    fn cycle(invoker: Arc<ScriptedInvoker>, store: Arc<MemoryStore>) -> ReviewCycleUseCase<ScriptedInvoker> {
        ReviewCycleUseCase::new(invoker, store)
    }

    #[tokio::test]
    async fn test_first_iteration_accept_keeps_output_unchanged() {
        let invoker = Arc::new(ScriptedInvoker::new(
            &[r#"{"verdict":"accept","issues":[]}"#],
            "revised",
        ));
        let store = Arc::new(MemoryStore::default());
        let assigner = assigner_of(&[AgentId::Claude, AgentId::Codex, AgentId::Gemini]);

        let outcome = cycle(Arc::clone(&invoker), Arc::clone(&store))
            .execute(
                ReviewCycleInput::new("task", "original output"),
                &assigner,
                &OrchestratorSettings::default(),
            )
            .await;

        assert!(outcome.is_accepted());
        assert_eq!(outcome.iterations, 1);
        assert_eq!(outcome.output, "original output");
        assert!(!outcome.forced);
        assert_eq!(store.get_state("consensus.verdict").as_deref(), Some("accept"));
        let events = store.events.lock().unwrap();
        assert!(events.iter().any(|e| e.event_type == "verdict"));
        assert!(events.iter().any(|e| e.event_type == "review_complete"));
    }

    #[tokio::test]
    async fn test_revise_every_iteration_force_accepts_at_cap() {
        let invoker = Arc::new(ScriptedInvoker::new(
            &[
                r#"{"verdict":"revise","issues":[]}"#,
                r#"{"verdict":"revise","issues":[]}"#,
                r#"{"verdict":"revise","issues":[]}"#,
            ],
            "revised output",
        ));
        let store = Arc::new(MemoryStore::default());
        let assigner = assigner_of(&[AgentId::Claude, AgentId::Codex, AgentId::Gemini]);

        let outcome = cycle(Arc::clone(&invoker), Arc::clone(&store))
            .execute(
                ReviewCycleInput::new("task", "v1"),
                &assigner,
                &OrchestratorSettings::default(),
            )
            .await;

        assert!(outcome.is_accepted());
        assert!(outcome.forced);
        assert_eq!(outcome.iterations, 3);
        // 3 critic calls, 2 implementer calls: the cap bounds both
        assert_eq!(invoker.calls_for(AgentId::Gemini), 3);
        assert_eq!(invoker.calls_for(AgentId::Claude), 2);
        assert_eq!(outcome.output, "revised output");
    }

    #[tokio::test]
    async fn test_reject_returns_failure_with_issues_persisted() {
        let invoker = Arc::new(ScriptedInvoker::new(
            &[r#"{"verdict":"reject","issues":[{"severity":"critical","description":"x"}]}"#],
            "revised",
        ));
        let store = Arc::new(MemoryStore::default());
        let assigner = assigner_of(&[AgentId::Claude, AgentId::Codex, AgentId::Gemini]);

        let outcome = cycle(Arc::clone(&invoker), Arc::clone(&store))
            .execute(
                ReviewCycleInput::new("task", "bad candidate"),
                &assigner,
                &OrchestratorSettings::default(),
            )
            .await;

        assert!(outcome.is_rejected());
        // The last candidate is still returned; the caller decides
        assert_eq!(outcome.output, "bad candidate");
        assert_eq!(outcome.issues.len(), 1);
        assert_eq!(outcome.issues[0].severity, IssueSeverity::Critical);
        let persisted = store.get_state("consensus.issues").unwrap();
        assert!(persisted.contains("\"critical\""));
        assert!(persisted.contains("x"));
    }

    #[tokio::test]
    async fn test_empty_critic_response_is_implicit_accept() {
        let invoker = Arc::new(ScriptedInvoker::new(&["   \n"], "revised"));
        let store = Arc::new(MemoryStore::default());
        let assigner = assigner_of(&[AgentId::Claude, AgentId::Codex, AgentId::Gemini]);

        let outcome = cycle(Arc::clone(&invoker), Arc::clone(&store))
            .execute(
                ReviewCycleInput::new("task", "candidate"),
                &assigner,
                &OrchestratorSettings::default(),
            )
            .await;

        assert!(outcome.is_accepted());
        assert_eq!(outcome.iterations, 1);
        // Implementer never invoked after the escape valve fires
        assert_eq!(invoker.calls_for(AgentId::Claude), 0);
    }

    #[tokio::test]
    async fn test_no_critic_short_circuits_without_any_invocation() {
        let invoker = Arc::new(ScriptedInvoker::new(&[], "revised"));
        let store = Arc::new(MemoryStore::default());
        let assigner = assigner_of(&[]);

        let outcome = cycle(Arc::clone(&invoker), Arc::clone(&store))
            .execute(
                ReviewCycleInput::new("task", "candidate"),
                &assigner,
                &OrchestratorSettings::default(),
            )
            .await;

        assert!(outcome.is_accepted());
        assert!(!outcome.was_reviewed());
        assert_eq!(outcome.output, "candidate");
        assert!(invoker.calls.lock().unwrap().is_empty());
        assert_eq!(store.get_state("consensus.verdict").as_deref(), Some("accept"));
    }

    #[tokio::test]
    async fn test_free_text_critique_degrades_to_accept() {
        let invoker = Arc::new(ScriptedInvoker::new(
            &["Looks good! No JSON for you today."],
            "revised",
        ));
        let store = Arc::new(MemoryStore::default());
        let assigner = assigner_of(&[AgentId::Claude, AgentId::Codex, AgentId::Gemini]);

        let outcome = cycle(invoker, store)
            .execute(
                ReviewCycleInput::new("task", "candidate"),
                &assigner,
                &OrchestratorSettings::default(),
            )
            .await;

        assert!(outcome.is_accepted());
        assert_eq!(outcome.iterations, 1);
    }

    #[tokio::test]
    async fn test_minor_issues_harvested_as_patterns_on_accept() {
        let invoker = Arc::new(ScriptedInvoker::new(
            &[r#"{"verdict":"accept","issues":[
                {"severity":"minor","description":"prefer iterators over index loops"},
                {"severity":"major","description":"missing timeout"}
            ]}"#],
            "revised",
        ));
        let store = Arc::new(MemoryStore::default());
        let assigner = assigner_of(&[AgentId::Claude, AgentId::Codex, AgentId::Gemini]);

        cycle(Arc::clone(&invoker), Arc::clone(&store))
            .execute(
                ReviewCycleInput::new("task", "candidate"),
                &assigner,
                &OrchestratorSettings::default(),
            )
            .await;

        let patterns = store.patterns.lock().unwrap();
        assert_eq!(patterns.as_slice(), ["prefer iterators over index loops"]);
    }

    #[tokio::test]
    async fn test_empty_revision_keeps_previous_candidate() {
        let invoker = Arc::new(ScriptedInvoker::new(
            &[
                r#"{"verdict":"revise","issues":[]}"#,
                r#"{"verdict":"accept","issues":[]}"#,
            ],
            "", // implementer produces nothing
        ));
        let store = Arc::new(MemoryStore::default());
        let assigner = assigner_of(&[AgentId::Claude, AgentId::Codex, AgentId::Gemini]);

        let outcome = cycle(invoker, store)
            .execute(
                ReviewCycleInput::new("task", "v1"),
                &assigner,
                &OrchestratorSettings::default(),
            )
            .await;

        assert!(outcome.is_accepted());
        assert_eq!(outcome.iterations, 2);
        assert_eq!(outcome.output, "v1");
    }

    #[tokio::test]
    async fn test_revision_prompt_carries_feedback_verbatim() {
        let critique = r#"Needs work. {"verdict":"revise","issues":[{"severity":"major","description":"no tests"}]}"#;
        let invoker = Arc::new(ScriptedInvoker::new(
            &[critique, r#"{"verdict":"accept","issues":[]}"#],
            "v2",
        ));
        let store = Arc::new(MemoryStore::default());
        let assigner = assigner_of(&[AgentId::Claude, AgentId::Codex, AgentId::Gemini]);

        let outcome = cycle(Arc::clone(&invoker), store)
            .execute(
                ReviewCycleInput::new("task", "v1"),
                &assigner,
                &OrchestratorSettings::default(),
            )
            .await;

        assert_eq!(outcome.output, "v2");
        let calls = invoker.calls.lock().unwrap();
        let revision_call = calls
            .iter()
            .find(|(agent, _)| *agent == AgentId::Claude)
            .unwrap();
        assert!(revision_call.1.contains(critique));
    }

    #[tokio::test]
    async fn test_max_iterations_one_never_revises() {
        let invoker = Arc::new(ScriptedInvoker::new(
            &[r#"{"verdict":"revise","issues":[]}"#],
            "revised",
        ));
        let store = Arc::new(MemoryStore::default());
        let assigner = assigner_of(&[AgentId::Claude, AgentId::Codex, AgentId::Gemini]);
        let settings = OrchestratorSettings {
            max_iterations: 1,
            ..Default::default()
        };

        let outcome = cycle(Arc::clone(&invoker), store)
            .execute(ReviewCycleInput::new("task", "v1"), &assigner, &settings)
            .await;

        assert!(outcome.is_accepted());
        assert!(outcome.forced);
        assert_eq!(invoker.calls_for(AgentId::Claude), 0);
    }
}
