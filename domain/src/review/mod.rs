//! Consensus (critique/revision) vocabulary
//!
//! The bounded critique/revision cycle itself lives in the application
//! layer. This module defines what it speaks: verdicts, issues, the parsed
//! critique report, and the final outcome of a cycle.

pub mod outcome;
pub mod parsing;
pub mod verdict;
