//! Application layer for agent-ensemble
//!
//! This crate contains use cases, port definitions, and application
//! configuration. It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::{AgentOverride, OrchestratorSettings};
pub use ports::{
    agent_invoker::{AgentInvoker, InvokerError},
    state_store::{NoStateStore, SessionEvent, StateStore},
};
pub use use_cases::review_cycle::{ReviewCycleInput, ReviewCycleUseCase};
pub use use_cases::run_task::{RunTaskError, RunTaskInput, RunTaskOutput, RunTaskUseCase};
