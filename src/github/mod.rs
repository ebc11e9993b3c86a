//! GitHub REST API access.
//!
//! Fetches the user profile, the repository listing, and per-repository
//! README and file tree used as audit evidence.

pub mod client;
pub mod error;

pub use client::{GithubClient, GithubSettings, RepoDetails};
pub use error::GithubError;
