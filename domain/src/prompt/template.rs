//! Prompt templates for the orchestration flow

use crate::role::Role;

/// Templates for generating prompts at each stage
pub struct PromptTemplate;

impl PromptTemplate {
    /// Fixed system prompt for a role
    pub fn system_for(role: Role) -> &'static str {
        match role {
            Role::Planner => {
                r#"You are a software planner. Break the given task into a short,
ordered list of concrete implementation steps. Keep the plan focused and
actionable; do not write code."#
            }
            Role::Architect => {
                r#"You are a software architect. Describe the structure a solution
to the given task should have: components, boundaries, and data flow.
Keep it brief and concrete; do not write code."#
            }
            Role::Implementer => {
                r#"You are a software implementer. Produce a complete, working
implementation for the given task. Output only the implementation:
code and the minimal prose needed to apply it."#
            }
            Role::Critic => {
                r#"You are a code critic reviewing a candidate implementation.
Judge whether it fulfills the task. End your response with a fenced JSON block:

```json
{"verdict": "accept" | "revise" | "reject",
 "issues": [{"severity": "critical" | "major" | "minor", "description": "..."}]}
```

Use "accept" when the implementation is good enough to ship, "revise" when
specific fixable issues remain, and "reject" only when the approach itself
is wrong."#
            }
            Role::Debugger => {
                r#"You are a debugger. Locate the root cause of the described
failure and propose the smallest fix that resolves it."#
            }
            Role::Tester => {
                r#"You are a test author. Write focused tests that exercise the
described behavior, including its edge cases."#
            }
            Role::Verifier => {
                r#"You are a verifier performing a final check. Confirm the result
matches the original task and report anything that does not."#
            }
        }
    }

    /// User prompt asking the planner to decompose a task
    pub fn decompose_request(task: &str) -> String {
        format!(
            r#"Task:

{task}

Break this task into a numbered list of implementation steps."#
        )
    }

    /// User prompt asking the implementer for an initial implementation
    pub fn implement_request(task: &str, plan: Option<&str>) -> String {
        match plan {
            Some(plan) => format!(
                r#"Task:

{task}

Plan to follow:

{plan}

Implement the task according to the plan."#
            ),
            None => format!(
                r#"Task:

{task}

Implement the task."#
            ),
        }
    }

    /// User prompt asking the critic to judge a candidate output
    pub fn critique_request(task: &str, candidate: &str) -> String {
        format!(
            r#"Original task:

{task}

Candidate implementation:

{candidate}

Review the candidate against the task and give your verdict."#
        )
    }

    /// User prompt asking the implementer to revise a candidate.
    ///
    /// The critique feedback is embedded verbatim so the implementer sees
    /// exactly what the critic said.
    pub fn revision_request(task: &str, previous: &str, feedback: &str) -> String {
        format!(
            r#"Original task:

{task}

Previous implementation:

{previous}

Reviewer feedback:

{feedback}

Produce a revised implementation that addresses the feedback."#
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_role_has_a_system_prompt() {
        for role in Role::ALL {
            assert!(!PromptTemplate::system_for(role).is_empty());
        }
    }

    #[test]
    fn test_critic_system_prompt_documents_the_payload() {
        let prompt = PromptTemplate::system_for(Role::Critic);
        assert!(prompt.contains("```json"));
        assert!(prompt.contains("verdict"));
        assert!(prompt.contains("issues"));
    }

    #[test]
    fn test_critique_request_embeds_task_and_candidate() {
        let prompt = PromptTemplate::critique_request("add a CLI flag", "fn main() {}");
        assert!(prompt.contains("add a CLI flag"));
        assert!(prompt.contains("fn main() {}"));
    }

    #[test]
    fn test_revision_request_embeds_feedback_verbatim() {
        let feedback = "REJECTED!! {\"verdict\":\"revise\"} please fix the error path";
        let prompt = PromptTemplate::revision_request("task", "old code", feedback);
        assert!(prompt.contains(feedback));
        assert!(prompt.contains("old code"));
    }

    #[test]
    fn test_implement_request_with_and_without_plan() {
        let with = PromptTemplate::implement_request("task", Some("1. do it"));
        assert!(with.contains("1. do it"));
        let without = PromptTemplate::implement_request("task", None);
        assert!(!without.contains("Plan to follow"));
    }
}
