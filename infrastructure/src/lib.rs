//! Infrastructure layer for agent-ensemble
//!
//! Adapters for the application-layer ports: agent discovery on `$PATH`,
//! subprocess invocation of the agent CLIs, TOML configuration loading,
//! and the file-backed state store with its JSONL session log.

pub mod config;
pub mod discovery;
pub mod invoker;
pub mod state;

pub use config::{ConfigLoader, FileConfig};
pub use discovery::discover_agents;
pub use invoker::CliAgentInvoker;
pub use state::{FileStateStore, VerdictTotals};
