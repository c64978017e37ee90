pub mod client;
pub mod error;
pub mod types;

pub use client::{CHAT_MODEL, EMBED_MODEL, GeminiClient};
pub use error::GeminiError;
