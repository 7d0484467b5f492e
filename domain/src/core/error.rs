//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Unknown agent: {0}")]
    UnknownAgent(String),

    #[error("Unknown role: {0}")]
    UnknownRole(String),
}
