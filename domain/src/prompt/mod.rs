//! Prompt construction for agent invocations

mod template;

pub use template::PromptTemplate;
