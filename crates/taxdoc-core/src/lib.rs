pub mod config;
pub mod prompt;

pub use config::Config;
pub use prompt::{RAG_PROMPT_TEMPLATE, build_prompt, format_context};

/// Number of chunks retrieved as context for each question.
pub const TOP_K: usize = 3;

/// Sampling temperature for answer generation.
pub const TEMPERATURE: f32 = 0.1;
