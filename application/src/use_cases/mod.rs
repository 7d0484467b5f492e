//! Use cases: the consensus loop and the orchestration driver

pub mod review_cycle;
pub mod run_task;
