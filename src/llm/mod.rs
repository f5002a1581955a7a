//! Language model access for document summarization.

mod client;
mod config;
mod prompts;

pub use client::{truncate_content, LlmClient, LlmError, TextGenerator};
pub use config::{LlmConfig, LlmProvider};
pub use prompts::COMPLIANCE_SUMMARY_PROMPT;
