//! Configuration loading and file-format types

mod file_config;
mod loader;

pub use file_config::{FileAgentConfig, FileConfig, FileReviewConfig};
pub use loader::ConfigLoader;
