//! Profile audit orchestration.
//!
//! Scores every repository through a [`RepoScorer`], then hands the
//! successful scores to the profile score aggregator.

use crate::agent::LlmError;
use crate::analysis::{
    calculate_profile_score_at, classify_repo_tier, flagship_signals, noise_reasons, Clock,
    ScoringPolicy,
};
use crate::models::{
    AuditedRepo, FailedRepo, ProfileScoreResult, RepoAudit, RepositorySnapshot, ScoredRepository,
};
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Produces an AI verdict for one repository.
#[async_trait]
pub trait RepoScorer: Send + Sync {
    async fn score_repo(
        &self,
        username: &str,
        repo: &RepositorySnapshot,
    ) -> Result<RepoAudit, LlmError>;
}

/// Orchestration settings.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Repositories audited at once.
    pub concurrency: usize,
    /// Minimum gap between two scorer calls.
    pub request_delay: Duration,
    /// Wait before the single retry after a provider rate limit.
    pub rate_limit_pause: Duration,
    pub show_progress: bool,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            concurrency: 2,
            request_delay: Duration::from_secs(10),
            rate_limit_pause: Duration::from_secs(60),
            show_progress: true,
        }
    }
}

/// Spaces scorer calls at least `delay` apart across all in-flight audits.
struct Pacer {
    delay: Duration,
    next_slot: Mutex<Option<Instant>>,
}

impl Pacer {
    fn new(delay: Duration) -> Self {
        Self {
            delay,
            next_slot: Mutex::new(None),
        }
    }

    /// Wait for the next free dispatch slot and reserve it.
    async fn wait(&self) {
        if self.delay.is_zero() {
            return;
        }

        let slot = {
            let mut next = self
                .next_slot
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            let now = Instant::now();
            let slot = match *next {
                Some(reserved) if reserved > now => reserved,
                _ => now,
            };
            *next = Some(slot + self.delay);
            slot
        };

        if slot > Instant::now() {
            debug!("Pacing LLM request for {:?}", slot - Instant::now());
        }
        tokio::time::sleep_until(slot).await;
    }
}

/// Everything a profile audit produced.
#[derive(Debug, Clone)]
pub struct ProfileAuditOutcome {
    pub result: ProfileScoreResult,
    /// Successfully audited repositories, in input order.
    pub repos: Vec<AuditedRepo>,
    pub failed: Vec<FailedRepo>,
}

/// Runs repository audits and aggregates them into a profile score.
pub struct AuditOrchestrator<S: RepoScorer> {
    scorer: S,
    clock: Arc<dyn Clock>,
    policy: ScoringPolicy,
    config: OrchestratorConfig,
    pacer: Pacer,
}

impl<S: RepoScorer> AuditOrchestrator<S> {
    pub fn new(
        scorer: S,
        clock: Arc<dyn Clock>,
        policy: ScoringPolicy,
        config: OrchestratorConfig,
    ) -> Self {
        let pacer = Pacer::new(config.request_delay);
        Self {
            scorer,
            clock,
            policy,
            config,
            pacer,
        }
    }

    /// Audit `repos` and compute the profile score.
    pub async fn run(&self, username: &str, repos: &[RepositorySnapshot]) -> ProfileAuditOutcome {
        info!(
            "Auditing {} repositories for {} (concurrency {}, {}s between requests)",
            repos.len(),
            username,
            self.config.concurrency,
            self.config.request_delay.as_secs()
        );

        let progress = self.progress_bar(repos.len());

        let verdicts: Vec<(&RepositorySnapshot, Result<RepoAudit, LlmError>)> =
            stream::iter(repos)
                .map(|repo| {
                    let progress = progress.clone();
                    async move {
                        progress.set_message(repo.name.clone());
                        let verdict = self.score_with_retry(username, repo).await;
                        progress.inc(1);
                        (repo, verdict)
                    }
                })
                .buffered(self.config.concurrency.max(1))
                .collect()
                .await;

        progress.finish_with_message("done");

        let mut audited: Vec<(RepositorySnapshot, RepoAudit)> = Vec::new();
        let mut failed = Vec::new();

        for (repo, verdict) in verdicts {
            match verdict {
                Ok(audit) => audited.push((repo.clone(), audit)),
                Err(e) => {
                    warn!("Audit of {} failed: {}", repo.name, e);
                    failed.push(FailedRepo {
                        name: repo.name.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }

        let scored: Vec<ScoredRepository> = audited
            .iter()
            .map(|(repo, audit)| ScoredRepository::new(repo.clone(), audit.score))
            .collect();

        // One instant for both the aggregate and the per-repo tiers.
        let now = self.clock.now();
        let result = calculate_profile_score_at(&scored, now, &self.policy);

        let repos = audited
            .into_iter()
            .map(|(repo, audit)| {
                let tier = classify_repo_tier(&repo, audit.score, now, &self.policy);
                let signals = flagship_signals(&repo, audit.score, now, &self.policy);
                let reasons = noise_reasons(&repo, audit.score, now, &self.policy);
                AuditedRepo {
                    repo,
                    audit,
                    tier,
                    signals,
                    noise_reasons: reasons,
                }
            })
            .collect();

        info!(
            "Profile score {} ({} audited, {} failed)",
            result.profile_score,
            scored.len(),
            failed.len()
        );

        ProfileAuditOutcome {
            result,
            repos,
            failed,
        }
    }

    /// Score one repository, pausing and retrying once on a rate limit.
    ///
    /// Every call, the retry included, waits for its pacing slot.
    async fn score_with_retry(
        &self,
        username: &str,
        repo: &RepositorySnapshot,
    ) -> Result<RepoAudit, LlmError> {
        self.pacer.wait().await;
        match self.scorer.score_repo(username, repo).await {
            Err(LlmError::RateLimited) => {
                warn!(
                    "Rate limit hit on {}. Pausing for {}s...",
                    repo.name,
                    self.config.rate_limit_pause.as_secs()
                );
                tokio::time::sleep(self.config.rate_limit_pause).await;
                self.pacer.wait().await;
                self.scorer.score_repo(username, repo).await
            }
            other => other,
        }
    }

    fn progress_bar(&self, len: usize) -> ProgressBar {
        if !self.config.show_progress {
            return ProgressBar::hidden();
        }

        let pb = ProgressBar::new(len as u64);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        {
            pb.set_style(style.progress_chars("#>-"));
        }
        pb
    }
}
