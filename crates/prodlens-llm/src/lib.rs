//! Language-model collaborator for product questions and comparison
//! summaries.

mod assistant;
mod client;
mod error;
pub mod prompt;
mod retry;
mod types;

pub use client::{GeminiClient, DEFAULT_BASE_URL};
pub use error::LlmError;
