//! LLM auditors.
//!
//! This module provides the chat-completions client and the repository
//! and profile auditors built on top of it.

pub mod client;
pub mod profile_auditor;
pub mod prompts;
pub mod repo_auditor;
pub mod response;

pub use client::{ChatClient, ChatConfig, LlmError};
pub use profile_auditor::{ProfileAuditor, PROFILE_AUDIT_TEMPERATURE};
pub use repo_auditor::{RepoAuditor, REPO_AUDIT_TEMPERATURE};
