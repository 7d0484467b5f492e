//! Port definitions: interfaces the application layer expects
//! infrastructure adapters to implement

pub mod agent_invoker;
pub mod state_store;
