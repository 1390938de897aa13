//! Core question-answering and blog-generation logic for docbrief.
//!
//! Ties prompt composition, model invocation, and conversation history
//! together behind a caller-owned [`session::Session`].

pub mod conversation;
pub mod invoker;
pub mod pipeline;
pub mod prompt;
pub mod session;

pub use invoker::{GeminiInvoker, LlmInvoker};
pub use pipeline::{PipelineProgress, SilentProgress, run_blog_pipeline};
pub use session::Session;
