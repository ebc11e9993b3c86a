//! Per-repository forensic audit.

use crate::agent::client::{ChatClient, LlmError};
use crate::agent::prompts::{build_repo_prompt, REPO_SYSTEM_PROMPT};
use crate::agent::response::parse_repo_audit;
use crate::github::GithubClient;
use crate::models::{RepoAudit, RepositorySnapshot};
use crate::orchestrator::RepoScorer;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Low temperature keeps grading strict and repeatable.
pub const REPO_AUDIT_TEMPERATURE: f32 = 0.2;

/// Audits one repository: gathers README and file tree, asks the model
/// for a verdict, and parses it.
pub struct RepoAuditor {
    github: Arc<GithubClient>,
    chat: ChatClient,
    temperature: f32,
}

impl RepoAuditor {
    pub fn new(github: Arc<GithubClient>, chat: ChatClient, temperature: f32) -> Self {
        Self {
            github,
            chat,
            temperature,
        }
    }

    /// Audit `repo` owned by `username`.
    ///
    /// A reply the provider rejects as invalid JSON yields the unstructured
    /// fallback verdict instead of an error.
    pub async fn audit(
        &self,
        username: &str,
        repo: &RepositorySnapshot,
    ) -> Result<RepoAudit, LlmError> {
        let details = self.github.fetch_repo_details(username, &repo.name).await;
        debug!(
            "Evidence for {}: {} README chars, {} tree lines",
            repo.name,
            details.readme.len(),
            details.file_tree.lines().count()
        );

        let prompt = build_repo_prompt(username, repo, &details);

        match self
            .chat
            .complete_json(REPO_SYSTEM_PROMPT, &prompt, self.temperature)
            .await
        {
            Ok(json) => {
                let audit = parse_repo_audit(&json).ok_or_else(|| {
                    LlmError::Parse(format!("reply for {} has no usable score", repo.name))
                })?;
                info!("Audited {}: score {} ({})", repo.name, audit.score, audit.tier);
                Ok(audit)
            }
            Err(LlmError::InvalidJson(body)) => {
                warn!(
                    "Model could not structure an audit for {}; using fallback ({} byte error body)",
                    repo.name,
                    body.len()
                );
                Ok(RepoAudit::unstructured_fallback())
            }
            Err(e) => Err(e),
        }
    }
}

#[async_trait]
impl RepoScorer for RepoAuditor {
    async fn score_repo(
        &self,
        username: &str,
        repo: &RepositorySnapshot,
    ) -> Result<RepoAudit, LlmError> {
        self.audit(username, repo).await
    }
}
