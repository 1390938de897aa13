//! Shared types, error model, and configuration for docbrief.
//!
//! This crate is the foundation depended on by all other docbrief crates.
//! It provides:
//! - [`DocBriefError`] and [`InvocationError`], the error model
//! - Domain types ([`Turn`], [`Role`], [`Stage`], [`BlogArtifacts`], [`SessionId`])
//! - Configuration ([`AppConfig`], config loading, credential lookup)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, ChatConfig, GeminiConfig, UploadsConfig, config_dir, config_file_path, init_config,
    load_config, load_config_from, validate_api_key,
};
pub use error::{DocBriefError, InvocationError, Result};
pub use types::{BlogArtifacts, Role, SessionId, Stage, Turn};
