//! Repository tier classification.
//!
//! Rules are evaluated in order and the first match wins:
//! noise filter, flagship majority vote, supporting threshold, neutral.

use crate::analysis::policy::{clamp_score, ScoringPolicy};
use crate::models::{RepositorySnapshot, Tier};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The five independent flagship signals of one repository.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlagshipSignals {
    /// Homepage set or GitHub Pages enabled.
    pub has_deployment: bool,
    /// Original work, or a fork scored high enough to count as one.
    pub fork_ok: bool,
    pub is_recent: bool,
    pub high_score: bool,
    /// Primary language is not a static-site language.
    pub not_static_site: bool,
}

impl FlagshipSignals {
    /// Number of signals that hold.
    pub fn count(&self) -> usize {
        self.labeled().into_iter().filter(|(_, held)| *held).count()
    }

    /// Each signal with a short human label, in evaluation order.
    pub fn labeled(&self) -> [(&'static str, bool); 5] {
        [
            ("deployed", self.has_deployment),
            ("original or strong fork", self.fork_ok),
            ("recently pushed", self.is_recent),
            ("high AI score", self.high_score),
            ("not a static site", self.not_static_site),
        ]
    }
}

/// Whether the last push falls inside the recency window ending at `now`.
///
/// A missing push timestamp is never recent.
pub fn is_recent(repo: &RepositorySnapshot, now: DateTime<Utc>, policy: &ScoringPolicy) -> bool {
    match repo.pushed_at {
        Some(pushed_at) => now - pushed_at < policy.recency_window(),
        None => false,
    }
}

/// Evaluate the flagship signals for `repo` with the given score.
pub fn flagship_signals(
    repo: &RepositorySnapshot,
    score: i32,
    now: DateTime<Utc>,
    policy: &ScoringPolicy,
) -> FlagshipSignals {
    let score = clamp_score(score);

    FlagshipSignals {
        has_deployment: repo.has_deployment(),
        fork_ok: !repo.fork || score >= policy.fork_flagship_min,
        is_recent: is_recent(repo, now, policy),
        high_score: score >= policy.flagship_score_min,
        not_static_site: !policy.is_static_site_language(repo.language.as_deref()),
    }
}

/// Which noise rules fire for `repo`, in rule order. Empty means the
/// repository survives the noise filter.
pub fn noise_reasons(
    repo: &RepositorySnapshot,
    score: i32,
    now: DateTime<Utc>,
    policy: &ScoringPolicy,
) -> Vec<String> {
    let score = clamp_score(score);
    let mut reasons = Vec::new();

    if repo.archived {
        reasons.push("archived".to_string());
    }
    if score < policy.noise_below {
        reasons.push(format!("AI score below {}", policy.noise_below));
    }
    if repo.fork && !is_recent(repo, now, policy) {
        reasons.push("stale fork".to_string());
    }

    reasons
}

/// Classify a repository into a career-value tier.
///
/// Out-of-range scores are clamped to 0-100 first. Total and pure apart
/// from `now`, which the caller supplies.
pub fn classify_repo_tier(
    repo: &RepositorySnapshot,
    score: i32,
    now: DateTime<Utc>,
    policy: &ScoringPolicy,
) -> Tier {
    let score = clamp_score(score);

    if !noise_reasons(repo, score, now, policy).is_empty() {
        return Tier::Noise;
    }

    if flagship_signals(repo, score, now, policy).count() >= policy.flagship_min_signals {
        return Tier::Flagship;
    }

    // Survivors of the noise filter are unarchived and not stale forks.
    if score >= policy.supporting_min {
        return Tier::Supporting;
    }

    Tier::Neutral
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    fn repo_pushed_days_ago(days: i64) -> RepositorySnapshot {
        let mut repo = RepositorySnapshot::named("project");
        repo.pushed_at = Some(now() - Duration::days(days));
        repo
    }

    fn showcase_repo() -> RepositorySnapshot {
        let mut repo = repo_pushed_days_ago(3);
        repo.has_pages = true;
        repo.language = Some("TypeScript".to_string());
        repo
    }

    #[test]
    fn test_low_scores_are_always_noise() {
        let policy = ScoringPolicy::default();
        let repo = showcase_repo();
        for score in -20..40 {
            assert_eq!(
                classify_repo_tier(&repo, score, now(), &policy),
                Tier::Noise,
                "score {score}"
            );
        }
    }

    #[test]
    fn test_archived_is_always_noise() {
        let policy = ScoringPolicy::default();
        let mut repo = showcase_repo();
        repo.archived = true;
        for score in [0, 39, 40, 60, 75, 99, 100, 180] {
            assert_eq!(classify_repo_tier(&repo, score, now(), &policy), Tier::Noise);
        }
    }

    #[test]
    fn test_deployed_recent_original_is_flagship() {
        let policy = ScoringPolicy::default();
        let repo = showcase_repo();

        let signals = flagship_signals(&repo, 76, now(), &policy);
        assert_eq!(signals.count(), 5);
        assert_eq!(classify_repo_tier(&repo, 76, now(), &policy), Tier::Flagship);
    }

    #[test]
    fn test_stale_fork_is_noise_despite_high_score() {
        let policy = ScoringPolicy::default();
        let mut repo = repo_pushed_days_ago(400);
        repo.fork = true;
        assert_eq!(classify_repo_tier(&repo, 85, now(), &policy), Tier::Noise);
    }

    #[test]
    fn test_single_signal_falls_through_to_supporting() {
        let policy = ScoringPolicy::default();
        let mut repo = repo_pushed_days_ago(200);
        repo.language = Some("HTML".to_string());

        let signals = flagship_signals(&repo, 65, now(), &policy);
        assert_eq!(
            signals,
            FlagshipSignals {
                has_deployment: false,
                fork_ok: true,
                is_recent: false,
                high_score: false,
                not_static_site: false,
            }
        );
        assert_eq!(signals.count(), 1);
        assert_eq!(classify_repo_tier(&repo, 65, now(), &policy), Tier::Supporting);
    }

    #[test]
    fn test_mid_score_without_signals_is_neutral() {
        let policy = ScoringPolicy::default();
        let mut repo = repo_pushed_days_ago(300);
        repo.language = Some("CSS".to_string());
        assert_eq!(classify_repo_tier(&repo, 50, now(), &policy), Tier::Neutral);
        assert_eq!(classify_repo_tier(&repo, 59, now(), &policy), Tier::Neutral);
        assert_eq!(classify_repo_tier(&repo, 60, now(), &policy), Tier::Supporting);
    }

    #[test]
    fn test_majority_of_signals_beats_mid_score() {
        // Original, recent, not HTML/CSS: three signals at score 45.
        let policy = ScoringPolicy::default();
        let mut repo = repo_pushed_days_ago(10);
        repo.language = Some("Rust".to_string());
        assert_eq!(classify_repo_tier(&repo, 45, now(), &policy), Tier::Flagship);
    }

    #[test]
    fn test_recent_fork_needs_high_score_for_fork_signal() {
        let policy = ScoringPolicy::default();
        let mut repo = repo_pushed_days_ago(10);
        repo.fork = true;
        repo.language = Some("HTML".to_string());

        // recent only
        assert_eq!(flagship_signals(&repo, 70, now(), &policy).count(), 1);
        assert_eq!(classify_repo_tier(&repo, 70, now(), &policy), Tier::Supporting);

        // recent, fork_ok, high_score
        assert_eq!(flagship_signals(&repo, 80, now(), &policy).count(), 3);
        assert_eq!(classify_repo_tier(&repo, 80, now(), &policy), Tier::Flagship);
    }

    #[test]
    fn test_recency_window_is_strict() {
        let policy = ScoringPolicy::default();
        assert!(is_recent(&repo_pushed_days_ago(179), now(), &policy));
        assert!(!is_recent(&repo_pushed_days_ago(180), now(), &policy));

        let mut repo = RepositorySnapshot::named("future");
        repo.pushed_at = Some(now() + Duration::days(2));
        assert!(is_recent(&repo, now(), &policy));
    }

    #[test]
    fn test_missing_push_date_is_not_recent() {
        let policy = ScoringPolicy::default();
        let mut repo = RepositorySnapshot::named("empty");
        assert!(!is_recent(&repo, now(), &policy));

        repo.fork = true;
        assert_eq!(classify_repo_tier(&repo, 95, now(), &policy), Tier::Noise);
    }

    #[test]
    fn test_out_of_range_scores_clamp_to_boundaries() {
        let policy = ScoringPolicy::default();
        let mut repo = repo_pushed_days_ago(400);
        repo.language = Some("HTML".to_string());

        assert_eq!(
            classify_repo_tier(&repo, 250, now(), &policy),
            classify_repo_tier(&repo, 100, now(), &policy)
        );
        assert_eq!(
            classify_repo_tier(&repo, -7, now(), &policy),
            classify_repo_tier(&repo, 0, now(), &policy)
        );
    }

    #[test]
    fn test_custom_policy_thresholds() {
        let policy = ScoringPolicy {
            flagship_min_signals: 5,
            ..ScoringPolicy::default()
        };
        let mut repo = showcase_repo();
        repo.has_pages = false;
        assert_eq!(classify_repo_tier(&repo, 90, now(), &policy), Tier::Supporting);
    }

    #[test]
    fn test_noise_reasons_name_the_rule_that_fired() {
        let policy = ScoringPolicy::default();

        let mut fresh_fork = repo_pushed_days_ago(0);
        fresh_fork.fork = true;
        assert_eq!(
            noise_reasons(&fresh_fork, 20, now(), &policy),
            vec!["AI score below 40".to_string()]
        );
        assert!(noise_reasons(&fresh_fork, 70, now(), &policy).is_empty());

        let mut old_fork = repo_pushed_days_ago(365);
        old_fork.fork = true;
        old_fork.archived = true;
        assert_eq!(
            noise_reasons(&old_fork, 90, now(), &policy),
            vec!["archived".to_string(), "stale fork".to_string()]
        );
    }

    #[test]
    fn test_labeled_signals_follow_fields() {
        let policy = ScoringPolicy::default();
        let signals = flagship_signals(&showcase_repo(), 50, now(), &policy);
        let labeled = signals.labeled();
        assert_eq!(labeled[0], ("deployed", true));
        assert_eq!(labeled[3], ("high AI score", false));
        assert_eq!(signals.count(), 4);
    }
}
