//! Domain layer for agent-ensemble
//!
//! This crate contains the core business logic: agent identities and their
//! capability model, the role table, the role assigner, and the consensus
//! (critique/revision) types. It has no dependencies on infrastructure or
//! presentation concerns: no subprocess handling, no file I/O.
//!
//! # Core Concepts
//!
//! ## Agents and Capabilities
//!
//! The set of known agents is closed: `claude`, `codex`, `gemini`, `ollama`.
//! Each carries a fixed capability set (code/review/plan/test/debug/general)
//! declared in a static table, not discovered at runtime. Only availability
//! is discovered at startup.
//!
//! ## Roles
//!
//! A role (planner, implementer, critic, ...) is an abstract responsibility
//! matched to a concrete agent per task by the [`RoleAssigner`].
//!
//! ## Consensus
//!
//! The critic's judgment of an implementation is a [`Verdict`]:
//! accept, revise, or reject. The bounded critique/revision cycle itself
//! lives in the application layer; its vocabulary lives here.

pub mod agent;
pub mod core;
pub mod prompt;
pub mod review;
pub mod role;

// Re-export commonly used types
pub use agent::{
    capability::Capability,
    identity::AgentId,
    registry::{AgentRegistry, DiscoveredAgent},
};
pub use core::error::DomainError;
pub use prompt::PromptTemplate;
pub use review::{
    outcome::ReviewOutcome,
    parsing::parse_critique,
    verdict::{CritiqueReport, Issue, IssueSeverity, Verdict},
};
pub use role::{Role, RoleClass, assigner::RoleAssigner};
