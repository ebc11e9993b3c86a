//! Profile score aggregation and repository statistics.
//!
//! This module turns a set of AI-scored repositories into a single
//! 0-100 profile score, and provides helpers the report uses to
//! summarize the audited repositories.

use crate::analysis::clock::Clock;
use crate::analysis::policy::ScoringPolicy;
use crate::analysis::tier::classify_repo_tier;
use crate::models::{AuditedRepo, ProfileScoreResult, ScoredRepository, Tier, TierBreakdown};
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// Scored repositories grouped by tier, input order preserved in each group.
#[derive(Debug, Clone, Default)]
pub struct TierBuckets {
    pub flagship: Vec<ScoredRepository>,
    pub supporting: Vec<ScoredRepository>,
    pub neutral: Vec<ScoredRepository>,
    pub noise: Vec<ScoredRepository>,
}

impl TierBuckets {
    fn push(&mut self, tier: Tier, item: ScoredRepository) {
        match tier {
            Tier::Flagship => self.flagship.push(item),
            Tier::Supporting => self.supporting.push(item),
            Tier::Neutral => self.neutral.push(item),
            Tier::Noise => self.noise.push(item),
        }
    }

    pub fn breakdown(&self) -> TierBreakdown {
        TierBreakdown {
            flagship: self.flagship.len(),
            supporting: self.supporting.len(),
            neutral: self.neutral.len(),
            noise: self.noise.len(),
        }
    }
}

/// Classify every repository against `now` and bucket it by tier.
pub fn bucket_by_tier(
    scored_repos: &[ScoredRepository],
    now: DateTime<Utc>,
    policy: &ScoringPolicy,
) -> TierBuckets {
    let mut buckets = TierBuckets::default();

    for item in scored_repos {
        let tier = classify_repo_tier(&item.repo, item.score, now, policy);
        buckets.push(tier, item.clone());
    }

    buckets
}

/// Weighted sum of tier counts, with flagships past the cap weighted as overflow.
pub fn weighted_sum(breakdown: &TierBreakdown, policy: &ScoringPolicy) -> f64 {
    let w = &policy.weights;
    let effective_flagships = breakdown.flagship.min(policy.flagship_cap);
    let overflow_flagships = breakdown.flagship.saturating_sub(policy.flagship_cap);

    effective_flagships as f64 * w.flagship
        + overflow_flagships as f64 * w.flagship_overflow
        + breakdown.supporting as f64 * w.supporting
        + breakdown.neutral as f64 * w.neutral
        + breakdown.noise as f64 * w.noise
}

/// Normalize a weighted sum against its ceiling into an integer 0-100.
fn normalize(weighted: f64, max_possible: f64) -> u8 {
    if max_possible <= 0.0 {
        return 0;
    }

    (weighted / max_possible * 100.0).clamp(0.0, 100.0).round() as u8
}

/// Compute the profile score, reading the clock once for the whole batch.
pub fn calculate_profile_score(
    scored_repos: &[ScoredRepository],
    clock: &dyn Clock,
    policy: &ScoringPolicy,
) -> ProfileScoreResult {
    calculate_profile_score_at(scored_repos, clock.now(), policy)
}

/// Compute the profile score with recency evaluated at `now`.
pub fn calculate_profile_score_at(
    scored_repos: &[ScoredRepository],
    now: DateTime<Utc>,
    policy: &ScoringPolicy,
) -> ProfileScoreResult {
    let buckets = bucket_by_tier(scored_repos, now, policy);
    let tier_breakdown = buckets.breakdown();

    let weighted = weighted_sum(&tier_breakdown, policy);
    let max_possible = policy.max_possible(scored_repos.len());

    ProfileScoreResult {
        profile_score: normalize(weighted, max_possible),
        flagship_repos: buckets.flagship,
        noise_repos: buckets.noise,
        tier_breakdown,
    }
}

/// Sort audited repositories by tier, then AI score (best first).
pub fn rank_repos(repos: &mut [AuditedRepo]) {
    repos.sort_by(|a, b| {
        b.tier
            .cmp(&a.tier)
            .then_with(|| b.audit.score.cmp(&a.audit.score))
            .then_with(|| a.repo.name.cmp(&b.repo.name))
    });
}

/// Count audited repositories per primary language.
pub fn language_distribution(repos: &[AuditedRepo]) -> HashMap<String, usize> {
    let mut dist: HashMap<String, usize> = HashMap::new();

    for entry in repos {
        let lang = entry
            .repo
            .language
            .clone()
            .unwrap_or_else(|| "Unknown".to_string());
        *dist.entry(lang).or_default() += 1;
    }

    dist
}

/// Mean AI score of the audited repositories, if any.
pub fn average_ai_score(repos: &[AuditedRepo]) -> Option<f64> {
    if repos.is_empty() {
        return None;
    }

    let total: i64 = repos.iter().map(|r| r.audit.score as i64).sum();
    Some(total as f64 / repos.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::clock::FixedClock;
    use crate::models::{AiTier, HireSignal, RepoAudit, RepositorySnapshot};
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    fn flagship(name: &str) -> ScoredRepository {
        let mut repo = RepositorySnapshot::named(name);
        repo.pushed_at = Some(now() - Duration::days(5));
        repo.has_pages = true;
        repo.language = Some("TypeScript".to_string());
        ScoredRepository::new(repo, 90)
    }

    fn stale_html(name: &str, score: i32) -> ScoredRepository {
        let mut repo = RepositorySnapshot::named(name);
        repo.pushed_at = Some(now() - Duration::days(365));
        repo.language = Some("HTML".to_string());
        ScoredRepository::new(repo, score)
    }

    fn supporting(name: &str) -> ScoredRepository {
        stale_html(name, 70)
    }

    fn neutral(name: &str) -> ScoredRepository {
        stale_html(name, 50)
    }

    fn noise(name: &str) -> ScoredRepository {
        let mut item = flagship(name);
        item.repo.archived = true;
        item
    }

    fn names(items: &[ScoredRepository]) -> Vec<&str> {
        items.iter().map(|i| i.repo.name.as_str()).collect()
    }

    #[test]
    fn test_empty_input_scores_zero() {
        let result = calculate_profile_score_at(&[], now(), &ScoringPolicy::default());
        assert_eq!(result.profile_score, 0);
        assert_eq!(result.tier_breakdown, TierBreakdown::default());
        assert!(result.flagship_repos.is_empty());
        assert!(result.noise_repos.is_empty());
    }

    #[test]
    fn test_flagship_overflow_still_reaches_full_score() {
        let repos: Vec<_> = (0..6).map(|i| flagship(&format!("app-{i}"))).collect();
        let policy = ScoringPolicy::default();

        let buckets = bucket_by_tier(&repos, now(), &policy);
        assert_eq!(weighted_sum(&buckets.breakdown(), &policy), 15.0);
        assert_eq!(policy.max_possible(repos.len()), 15.0);

        let result = calculate_profile_score_at(&repos, now(), &policy);
        assert_eq!(result.profile_score, 100);
        assert_eq!(result.tier_breakdown.flagship, 6);
        assert_eq!(result.flagship_repos.len(), 6);
    }

    #[test]
    fn test_one_of_each_tier() {
        let repos = vec![flagship("a"), supporting("b"), neutral("c"), noise("d")];
        let result = calculate_profile_score_at(&repos, now(), &ScoringPolicy::default());

        // (3.0 + 1.5 + 0.5 - 1.0) / 12.0
        assert_eq!(result.profile_score, 33);
        assert_eq!(
            result.tier_breakdown,
            TierBreakdown {
                flagship: 1,
                supporting: 1,
                neutral: 1,
                noise: 1,
            }
        );
    }

    #[test]
    fn test_all_noise_clamps_to_zero() {
        let repos = vec![noise("a"), noise("b"), stale_html("c", 10)];
        let result = calculate_profile_score_at(&repos, now(), &ScoringPolicy::default());
        assert_eq!(result.profile_score, 0);
        assert_eq!(result.tier_breakdown.noise, 3);
    }

    #[test]
    fn test_single_excellent_repo_reaches_full_score() {
        let result =
            calculate_profile_score_at(&[flagship("only")], now(), &ScoringPolicy::default());
        assert_eq!(result.profile_score, 100);
    }

    #[test]
    fn test_supporting_and_neutral_ratios() {
        let policy = ScoringPolicy::default();

        let two_supporting = vec![supporting("a"), supporting("b")];
        assert_eq!(
            calculate_profile_score_at(&two_supporting, now(), &policy).profile_score,
            50
        );

        // 1.5 / 9.0 = 16.67
        let three_neutral = vec![neutral("a"), neutral("b"), neutral("c")];
        assert_eq!(
            calculate_profile_score_at(&three_neutral, now(), &policy).profile_score,
            17
        );
    }

    #[test]
    fn test_more_flagships_never_score_lower() {
        let policy = ScoringPolicy::default();
        let mut previous = 0;
        for flagships in 0..=8 {
            let mut repos: Vec<_> = (0..flagships).map(|i| flagship(&format!("f{i}"))).collect();
            repos.extend((0..4).map(|i| neutral(&format!("n{i}"))));
            let score = calculate_profile_score_at(&repos, now(), &policy).profile_score;
            assert!(score >= previous, "{flagships} flagships scored {score} < {previous}");
            previous = score;
        }
    }

    #[test]
    fn test_buckets_preserve_input_order() {
        let repos = vec![
            flagship("first"),
            noise("n1"),
            supporting("s"),
            flagship("second"),
            noise("n2"),
            flagship("third"),
        ];
        let result = calculate_profile_score_at(&repos, now(), &ScoringPolicy::default());

        assert_eq!(names(&result.flagship_repos), vec!["first", "second", "third"]);
        assert_eq!(names(&result.noise_repos), vec!["n1", "n2"]);
    }

    #[test]
    fn test_same_clock_same_result() {
        let repos = vec![flagship("a"), supporting("b"), noise("c"), neutral("d")];
        let clock = FixedClock(now());
        let policy = ScoringPolicy::default();

        let first = calculate_profile_score(&repos, &clock, &policy);
        let second = calculate_profile_score(&repos, &clock, &policy);
        assert_eq!(first, second);
    }

    #[test]
    fn test_clock_drives_recency() {
        let repos = vec![flagship("a")];
        let policy = ScoringPolicy::default();
        let later = FixedClock(now() + Duration::days(400));

        // Stale, but pages, original, high score and TypeScript still hold.
        let result = calculate_profile_score(&repos, &later, &policy);
        assert_eq!(result.tier_breakdown.flagship, 1);

        let mut forked = flagship("fork");
        forked.repo.fork = true;
        let result = calculate_profile_score(&[forked], &later, &policy);
        assert_eq!(result.tier_breakdown.noise, 1);
        assert_eq!(result.profile_score, 0);
    }

    #[test]
    fn test_score_always_within_bounds() {
        let policy = ScoringPolicy::default();
        let makers: [fn(&str) -> ScoredRepository; 4] = [flagship, supporting, neutral, noise];

        for mask in 1u32..256 {
            let repos: Vec<_> = (0..8)
                .filter(|bit| mask & (1 << bit) != 0)
                .map(|bit| makers[(bit % 4) as usize](&format!("r{bit}")))
                .collect();
            let result = calculate_profile_score_at(&repos, now(), &policy);
            assert!(result.profile_score <= 100);
            assert_eq!(result.tier_breakdown.total(), repos.len());
        }
    }

    #[test]
    fn test_rank_repos_orders_by_tier_then_score() {
        let audit = |score: i32| RepoAudit {
            score,
            tier: AiTier::Solid,
            hire_signal: HireSignal::Yes,
            explanation: String::new(),
            red_flags: Vec::new(),
            suggested_actions: Vec::new(),
        };
        let mut repos = vec![
            AuditedRepo {
                repo: RepositorySnapshot::named("noise"),
                audit: audit(95),
                tier: Tier::Noise,
                signals: Default::default(),
                noise_reasons: Vec::new(),
            },
            AuditedRepo {
                repo: RepositorySnapshot::named("low-flagship"),
                audit: audit(70),
                tier: Tier::Flagship,
                signals: Default::default(),
                noise_reasons: Vec::new(),
            },
            AuditedRepo {
                repo: RepositorySnapshot::named("high-flagship"),
                audit: audit(92),
                tier: Tier::Flagship,
                signals: Default::default(),
                noise_reasons: Vec::new(),
            },
        ];

        rank_repos(&mut repos);
        let order: Vec<_> = repos.iter().map(|r| r.repo.name.as_str()).collect();
        assert_eq!(order, vec!["high-flagship", "low-flagship", "noise"]);
        assert_eq!(average_ai_score(&repos), Some(257.0 / 3.0));

        let langs = language_distribution(&repos);
        assert_eq!(langs.get("Unknown"), Some(&3));
    }
}
