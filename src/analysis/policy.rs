//! Tunable thresholds and weights of the tiering heuristic.
//!
//! Defaults reproduce the production heuristic exactly. The whole table
//! can be overridden from the `[scoring]` section of `.hireaudit.toml`.

use anyhow::{bail, Result};
use chrono::Duration;
use serde::{Deserialize, Serialize};

/// Lowest score an auditor can award.
pub const MIN_SCORE: i32 = 0;
/// Highest score an auditor can award.
pub const MAX_SCORE: i32 = 100;

/// Number of independent flagship signals evaluated per repository.
pub const FLAGSHIP_SIGNAL_COUNT: usize = 5;

/// Clamp an auditor score into `[MIN_SCORE, MAX_SCORE]`.
pub fn clamp_score(score: i32) -> i32 {
    score.clamp(MIN_SCORE, MAX_SCORE)
}

/// Thresholds, cap and weights used by the classifier and aggregator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringPolicy {
    /// Scores strictly below this are noise.
    #[serde(default = "default_noise_below")]
    pub noise_below: i32,

    /// Minimum score for the supporting tier.
    #[serde(default = "default_supporting_min")]
    pub supporting_min: i32,

    /// Score that counts as a flagship signal on its own.
    #[serde(default = "default_flagship_score_min")]
    pub flagship_score_min: i32,

    /// Score a fork needs before it can count as original work.
    #[serde(default = "default_fork_flagship_min")]
    pub fork_flagship_min: i32,

    /// Signals (out of five) required for flagship.
    #[serde(default = "default_flagship_min_signals")]
    pub flagship_min_signals: usize,

    /// Pushes younger than this many days are recent. 30-day months, not calendar.
    #[serde(default = "default_recency_window_days")]
    pub recency_window_days: i64,

    /// Flagships beyond this count are weighted as supporting.
    #[serde(default = "default_flagship_cap")]
    pub flagship_cap: usize,

    /// Languages that mark a repository as a single static page.
    #[serde(default = "default_static_site_languages")]
    pub static_site_languages: Vec<String>,

    #[serde(default)]
    pub weights: TierWeights,
}

/// Contribution of one repository per tier to the weighted sum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierWeights {
    #[serde(default = "default_flagship_weight")]
    pub flagship: f64,
    #[serde(default = "default_flagship_overflow_weight")]
    pub flagship_overflow: f64,
    #[serde(default = "default_supporting_weight")]
    pub supporting: f64,
    #[serde(default = "default_neutral_weight")]
    pub neutral: f64,
    #[serde(default = "default_noise_weight")]
    pub noise: f64,
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self {
            noise_below: default_noise_below(),
            supporting_min: default_supporting_min(),
            flagship_score_min: default_flagship_score_min(),
            fork_flagship_min: default_fork_flagship_min(),
            flagship_min_signals: default_flagship_min_signals(),
            recency_window_days: default_recency_window_days(),
            flagship_cap: default_flagship_cap(),
            static_site_languages: default_static_site_languages(),
            weights: TierWeights::default(),
        }
    }
}

impl Default for TierWeights {
    fn default() -> Self {
        Self {
            flagship: default_flagship_weight(),
            flagship_overflow: default_flagship_overflow_weight(),
            supporting: default_supporting_weight(),
            neutral: default_neutral_weight(),
            noise: default_noise_weight(),
        }
    }
}

fn default_noise_below() -> i32 {
    40
}

fn default_supporting_min() -> i32 {
    60
}

fn default_flagship_score_min() -> i32 {
    75
}

fn default_fork_flagship_min() -> i32 {
    80
}

fn default_flagship_min_signals() -> usize {
    3
}

fn default_recency_window_days() -> i64 {
    6 * 30
}

fn default_flagship_cap() -> usize {
    4
}

fn default_static_site_languages() -> Vec<String> {
    vec!["HTML".to_string(), "CSS".to_string()]
}

fn default_flagship_weight() -> f64 {
    3.0
}

fn default_flagship_overflow_weight() -> f64 {
    1.5
}

fn default_supporting_weight() -> f64 {
    1.5
}

fn default_neutral_weight() -> f64 {
    0.5
}

fn default_noise_weight() -> f64 {
    -1.0
}

impl ScoringPolicy {
    /// Recency window as a duration.
    pub fn recency_window(&self) -> Duration {
        Duration::days(self.recency_window_days)
    }

    /// Whether `language` is one of the static-site languages (exact, case-sensitive).
    pub fn is_static_site_language(&self, language: Option<&str>) -> bool {
        language.is_some_and(|lang| self.static_site_languages.iter().any(|s| s == lang))
    }

    /// Ceiling of the weighted sum for `total` repositories: the first
    /// `flagship_cap` at flagship weight, the rest topping out at supporting weight.
    pub fn max_possible(&self, total: usize) -> f64 {
        let capped = total.min(self.flagship_cap);
        let rest = total.saturating_sub(self.flagship_cap);
        capped as f64 * self.weights.flagship + rest as f64 * self.weights.supporting
    }

    /// Reject tables that would make the heuristic incoherent.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("noise_below", self.noise_below),
            ("supporting_min", self.supporting_min),
            ("flagship_score_min", self.flagship_score_min),
            ("fork_flagship_min", self.fork_flagship_min),
        ] {
            if !(MIN_SCORE..=MAX_SCORE).contains(&value) {
                bail!(
                    "scoring.{} must be between {} and {} (got {})",
                    name,
                    MIN_SCORE,
                    MAX_SCORE,
                    value
                );
            }
        }

        if self.noise_below > self.supporting_min {
            bail!("scoring.noise_below must not exceed scoring.supporting_min");
        }

        if self.flagship_min_signals == 0 || self.flagship_min_signals > FLAGSHIP_SIGNAL_COUNT {
            bail!(
                "scoring.flagship_min_signals must be between 1 and {}",
                FLAGSHIP_SIGNAL_COUNT
            );
        }

        if self.recency_window_days <= 0 {
            bail!("scoring.recency_window_days must be positive");
        }

        let w = &self.weights;
        if [w.flagship, w.flagship_overflow, w.supporting, w.neutral, w.noise]
            .iter()
            .any(|v| !v.is_finite())
        {
            bail!("scoring.weights must be finite numbers");
        }

        if w.flagship <= 0.0 || w.flagship_overflow <= 0.0 {
            bail!("scoring.weights.flagship and flagship_overflow must be positive");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy_matches_heuristic() {
        let policy = ScoringPolicy::default();
        assert_eq!(policy.noise_below, 40);
        assert_eq!(policy.supporting_min, 60);
        assert_eq!(policy.flagship_score_min, 75);
        assert_eq!(policy.fork_flagship_min, 80);
        assert_eq!(policy.flagship_min_signals, 3);
        assert_eq!(policy.recency_window(), Duration::days(180));
        assert_eq!(policy.flagship_cap, 4);
        assert_eq!(policy.weights.noise, -1.0);
        assert!(policy.validate().is_ok());
    }

    #[test]
    fn test_clamp_score() {
        assert_eq!(clamp_score(-12), 0);
        assert_eq!(clamp_score(55), 55);
        assert_eq!(clamp_score(250), 100);
    }

    #[test]
    fn test_static_site_language_is_case_sensitive() {
        let policy = ScoringPolicy::default();
        assert!(policy.is_static_site_language(Some("HTML")));
        assert!(policy.is_static_site_language(Some("CSS")));
        assert!(!policy.is_static_site_language(Some("html")));
        assert!(!policy.is_static_site_language(Some("Rust")));
        assert!(!policy.is_static_site_language(None));
    }

    #[test]
    fn test_max_possible() {
        let policy = ScoringPolicy::default();
        assert_eq!(policy.max_possible(0), 0.0);
        assert_eq!(policy.max_possible(1), 3.0);
        assert_eq!(policy.max_possible(4), 12.0);
        assert_eq!(policy.max_possible(6), 15.0);
    }

    #[test]
    fn test_max_possible_uses_supporting_weight_past_cap() {
        let mut policy = ScoringPolicy::default();
        policy.weights.supporting = 2.0;
        policy.weights.flagship_overflow = 1.0;
        // 4 * 3.0 + 2 * 2.0
        assert_eq!(policy.max_possible(6), 16.0);
    }

    #[test]
    fn test_partial_policy_from_toml() {
        let policy: ScoringPolicy = toml::from_str(
            r#"
flagship_cap = 2

[weights]
noise = -2.0
"#,
        )
        .unwrap();

        assert_eq!(policy.flagship_cap, 2);
        assert_eq!(policy.weights.noise, -2.0);
        assert_eq!(policy.weights.flagship, 3.0);
        assert_eq!(policy.noise_below, 40);
    }

    #[test]
    fn test_validate_rejects_incoherent_tables() {
        let mut policy = ScoringPolicy::default();
        policy.flagship_min_signals = 6;
        assert!(policy.validate().is_err());

        let mut policy = ScoringPolicy::default();
        policy.recency_window_days = 0;
        assert!(policy.validate().is_err());

        let mut policy = ScoringPolicy::default();
        policy.noise_below = 70;
        assert!(policy.validate().is_err());

        let mut policy = ScoringPolicy::default();
        policy.weights.flagship_overflow = 0.0;
        assert!(policy.validate().is_err());
    }
}
