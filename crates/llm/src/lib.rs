//! LLM integration for notewatch: chat completion client and comment generation.

mod ai_types;
pub mod client;
mod comment;
pub mod error;


pub use client::LlmClient;
pub use comment::{CommentGenerator, MAX_BODY_LEN, TextGenerator};
pub use error::LlmError;
