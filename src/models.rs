//! Data models for the profile auditor.
//!
//! This module contains the core data structures shared across the
//! application: repository snapshots fetched from GitHub, the two tier
//! vocabularies, LLM audit verdicts, and the final report.

use crate::analysis::FlagshipSignals;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Read-only metadata of one repository, as listed by the GitHub API.
///
/// Field names serialize in camelCase; the snake_case names used by the
/// GitHub REST API are accepted as aliases when deserializing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositorySnapshot {
    /// Repository name, unique within the owner's repositories.
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub fork: bool,
    #[serde(default)]
    pub archived: bool,
    #[serde(default, alias = "stargazers_count")]
    pub stargazers_count: u64,
    /// Primary language as reported by GitHub (e.g. "TypeScript").
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default, alias = "created_at", deserialize_with = "lenient_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, alias = "updated_at", deserialize_with = "lenient_timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
    /// Last push. `None` when GitHub reports null or the value can't be parsed.
    #[serde(default, alias = "pushed_at", deserialize_with = "lenient_timestamp")]
    pub pushed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub homepage: Option<String>,
    #[serde(default, alias = "has_pages")]
    pub has_pages: bool,
    #[serde(default, alias = "html_url")]
    pub html_url: String,
}

impl RepositorySnapshot {
    /// Creates a snapshot with only a name set; everything else defaulted.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            fork: false,
            archived: false,
            stargazers_count: 0,
            language: None,
            created_at: None,
            updated_at: None,
            pushed_at: None,
            homepage: None,
            has_pages: false,
            html_url: String::new(),
        }
    }

    /// Whether the repository advertises a live deployment.
    pub fn has_deployment(&self) -> bool {
        self.homepage.as_deref().is_some_and(|h| !h.is_empty()) || self.has_pages
    }

    /// Hours between creation and last push, if both are known.
    pub fn development_hours(&self) -> Option<f64> {
        let created = self.created_at?;
        let pushed = self.pushed_at?;
        Some((pushed - created).num_seconds() as f64 / 3600.0)
    }
}

/// Accepts RFC 3339 strings, null, or any other JSON value; anything that
/// is not a parseable string becomes `None`.
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<serde_json::Value> = Option::deserialize(deserializer)?;
    Ok(raw
        .as_ref()
        .and_then(serde_json::Value::as_str)
        .and_then(|s| DateTime::parse_from_rfc3339(s.trim()).ok())
        .map(|dt| dt.with_timezone(&Utc)))
}

/// A repository paired with the score its AI audit produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredRepository {
    pub repo: RepositorySnapshot,
    /// Nominally 0-100; classification clamps anything outside that range.
    pub score: i32,
}

impl ScoredRepository {
    pub fn new(repo: RepositorySnapshot, score: i32) -> Self {
        Self { repo, score }
    }
}

/// Deterministic career-value tier assigned by the scoring heuristic.
///
/// Ordering follows career value: `Noise < Neutral < Supporting < Flagship`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Tier {
    /// Actively hurts the profile
    Noise,
    /// Filler, no signal either way
    Neutral,
    /// Solid work that backs up the flagships
    Supporting,
    /// Showcase project
    Flagship,
}

impl Tier {
    /// All tiers, highest career value first.
    pub const ALL: [Tier; 4] = [Tier::Flagship, Tier::Supporting, Tier::Neutral, Tier::Noise];

    pub fn label(&self) -> &'static str {
        match self {
            Tier::Flagship => "FLAGSHIP",
            Tier::Supporting => "SUPPORTING",
            Tier::Neutral => "NEUTRAL",
            Tier::Noise => "NOISE",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            Tier::Flagship => "🚀",
            Tier::Supporting => "🧱",
            Tier::Neutral => "⚪",
            Tier::Noise => "🗑️",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Number of repositories per tier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub struct TierBreakdown {
    pub flagship: usize,
    pub supporting: usize,
    pub neutral: usize,
    pub noise: usize,
}

impl TierBreakdown {
    pub fn get(&self, tier: Tier) -> usize {
        match tier {
            Tier::Flagship => self.flagship,
            Tier::Supporting => self.supporting,
            Tier::Neutral => self.neutral,
            Tier::Noise => self.noise,
        }
    }

    pub fn total(&self) -> usize {
        self.flagship + self.supporting + self.neutral + self.noise
    }
}

/// Output of the profile score aggregation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileScoreResult {
    /// Normalized 0-100 portfolio score.
    pub profile_score: u8,
    /// Every flagship-classified repository, in input order (cap not applied).
    pub flagship_repos: Vec<ScoredRepository>,
    /// Every noise-classified repository, in input order.
    pub noise_repos: Vec<ScoredRepository>,
    pub tier_breakdown: TierBreakdown,
}

/// Tier vocabulary the LLM uses in its repository verdict.
///
/// Distinct from [`Tier`]: the two taxonomies are never converted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AiTier {
    Flagship,
    Solid,
    Neutral,
    Noise,
}

impl AiTier {
    /// Parses the label case-insensitively; unknown labels yield `None`.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "FLAGSHIP" => Some(AiTier::Flagship),
            "SOLID" => Some(AiTier::Solid),
            "NEUTRAL" => Some(AiTier::Neutral),
            "NOISE" => Some(AiTier::Noise),
            _ => None,
        }
    }
}

impl fmt::Display for AiTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AiTier::Flagship => write!(f, "FLAGSHIP"),
            AiTier::Solid => write!(f, "SOLID"),
            AiTier::Neutral => write!(f, "NEUTRAL"),
            AiTier::Noise => write!(f, "NOISE"),
        }
    }
}

/// Hiring-manager verdict attached to a repository audit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HireSignal {
    #[serde(rename = "Strong Yes")]
    StrongYes,
    Yes,
    Weak,
    No,
}

impl HireSignal {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "strong yes" | "strong_yes" | "strongyes" => Some(HireSignal::StrongYes),
            "yes" => Some(HireSignal::Yes),
            "weak" => Some(HireSignal::Weak),
            "no" => Some(HireSignal::No),
            _ => None,
        }
    }
}

impl fmt::Display for HireSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HireSignal::StrongYes => write!(f, "Strong Yes"),
            HireSignal::Yes => write!(f, "Yes"),
            HireSignal::Weak => write!(f, "Weak"),
            HireSignal::No => write!(f, "No"),
        }
    }
}

/// The LLM's forensic verdict on one repository.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepoAudit {
    /// Clamped to 0-100 when parsed.
    pub score: i32,
    pub tier: AiTier,
    pub hire_signal: HireSignal,
    pub explanation: String,
    pub red_flags: Vec<String>,
    pub suggested_actions: Vec<String>,
}

impl RepoAudit {
    /// Verdict used when the model cannot produce valid JSON for a repository.
    pub fn unstructured_fallback() -> Self {
        Self {
            score: 30,
            tier: AiTier::Noise,
            hire_signal: HireSignal::No,
            explanation: "Repository content was too unstructured or minimal to generate a valid engineering audit.".to_string(),
            red_flags: vec![
                "Unstructured content".to_string(),
                "Likely a simple script".to_string(),
            ],
            suggested_actions: vec![
                "Add a proper README".to_string(),
                "Structure code into modules".to_string(),
            ],
        }
    }
}

/// Recruiter first-impression audit of the profile page itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileAudit {
    pub score: i32,
    pub nickname: String,
    pub headline: String,
    pub summary: String,
    pub strengths: Vec<String>,
    pub missing_elements: Vec<String>,
}

impl ProfileAudit {
    /// Returned whenever the profile audit call fails.
    pub fn unavailable() -> Self {
        Self {
            score: 50,
            nickname: "The Unranked".to_string(),
            headline: "Profile Analysis Unavailable".to_string(),
            summary: "AI Service is currently overloaded. Please try again later.".to_string(),
            strengths: Vec::new(),
            missing_elements: Vec::new(),
        }
    }
}

/// Public profile metadata of a GitHub user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub login: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub blog: Option<String>,
    #[serde(default)]
    pub public_repos: u64,
    #[serde(default)]
    pub followers: u64,
    #[serde(default)]
    pub html_url: String,
}

impl UserProfile {
    /// Display name, falling back to the login.
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .filter(|n| !n.is_empty())
            .unwrap_or(&self.login)
    }
}

/// One audited repository as shown in the report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditedRepo {
    pub repo: RepositorySnapshot,
    pub audit: RepoAudit,
    /// Heuristic tier at the time of aggregation.
    pub tier: Tier,
    /// Flagship signals evaluated at the same instant as `tier`.
    #[serde(default)]
    pub signals: FlagshipSignals,
    /// Noise rules that fired; empty unless `tier` is NOISE.
    #[serde(default)]
    pub noise_reasons: Vec<String>,
}

/// A repository whose audit could not be completed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailedRepo {
    pub name: String,
    pub error: String,
}

/// Metadata about the audit report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// GitHub login that was audited.
    pub username: String,
    /// Date and time of the analysis.
    pub analysis_date: DateTime<Utc>,
    /// Name of the LLM model used.
    pub model_used: String,
    /// Repositories fetched from GitHub.
    pub repos_fetched: usize,
    /// Repositories that received an AI score.
    pub repos_audited: usize,
    /// Repositories whose audit failed.
    pub repos_failed: usize,
    /// Duration of the analysis in seconds.
    pub duration_seconds: f64,
}

/// The complete profile audit report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub metadata: ReportMetadata,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserProfile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_audit: Option<ProfileAudit>,
    pub profile: ProfileScoreResult,
    pub repos: Vec<AuditedRepo>,
    pub failed: Vec<FailedRepo>,
}
