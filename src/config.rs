//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.hireaudit.toml` files.

use crate::analysis::ScoringPolicy;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default configuration file name.
pub const CONFIG_FILE_NAME: &str = ".hireaudit.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// GitHub API settings.
    #[serde(default)]
    pub github: GithubConfig,

    /// Model settings.
    #[serde(default)]
    pub model: ModelConfig,

    /// File tree snapshot settings.
    #[serde(default)]
    pub tree: TreeConfig,

    /// Tiering heuristic thresholds and weights.
    #[serde(default)]
    pub scoring: ScoringPolicy,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Default output file path.
    #[serde(default = "default_output")]
    pub output: String,

    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,

    /// Number of repositories audited concurrently.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Maximum repositories to audit (most recently updated first).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_repos: Option<usize>,

    /// Leave forked repositories out of the audit entirely.
    #[serde(default)]
    pub skip_forks: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            output: default_output(),
            verbose: false,
            concurrency: default_concurrency(),
            max_repos: None,
            skip_forks: false,
        }
    }
}

fn default_output() -> String {
    "hireaudit_report.md".to_string()
}

fn default_concurrency() -> usize {
    2
}

/// GitHub API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GithubConfig {
    /// REST API base URL.
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Raw content base URL (profile README).
    #[serde(default = "default_raw_url")]
    pub raw_url: String,

    /// Personal access token. Prefer the GITHUB_TOKEN env var.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// Page size for repository listing (GitHub maximum is 100).
    #[serde(default = "default_per_page")]
    pub per_page: usize,

    /// Request timeout in seconds.
    #[serde(default = "default_github_timeout")]
    pub timeout_seconds: u64,
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            raw_url: default_raw_url(),
            token: None,
            per_page: default_per_page(),
            timeout_seconds: default_github_timeout(),
        }
    }
}

fn default_api_url() -> String {
    "https://api.github.com".to_string()
}

fn default_raw_url() -> String {
    "https://raw.githubusercontent.com".to_string()
}

fn default_per_page() -> usize {
    100
}

fn default_github_timeout() -> u64 {
    30
}

/// LLM model settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Model name.
    #[serde(default = "default_model")]
    pub name: String,

    /// OpenAI-compatible API base URL.
    #[serde(default = "default_llm_url")]
    pub api_url: String,

    /// API key. Prefer the GROQ_API_KEY env var.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Temperature for repository audits.
    #[serde(default = "default_repo_temperature")]
    pub repo_temperature: f32,

    /// Temperature for the profile audit.
    #[serde(default = "default_profile_temperature")]
    pub profile_temperature: f32,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Minimum gap between two repository audit requests.
    #[serde(default = "default_request_delay")]
    pub request_delay_seconds: u64,

    /// Pause before retrying a rate-limited repository audit.
    #[serde(default = "default_rate_limit_pause")]
    pub rate_limit_pause_seconds: u64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            name: default_model(),
            api_url: default_llm_url(),
            api_key: None,
            repo_temperature: default_repo_temperature(),
            profile_temperature: default_profile_temperature(),
            timeout_seconds: default_timeout(),
            request_delay_seconds: default_request_delay(),
            rate_limit_pause_seconds: default_rate_limit_pause(),
        }
    }
}

fn default_model() -> String {
    "llama-3.3-70b-versatile".to_string()
}

fn default_llm_url() -> String {
    "https://api.groq.com/openai/v1".to_string()
}

fn default_repo_temperature() -> f32 {
    crate::agent::REPO_AUDIT_TEMPERATURE
}

fn default_profile_temperature() -> f32 {
    crate::agent::PROFILE_AUDIT_TEMPERATURE
}

fn default_timeout() -> u64 {
    120
}

fn default_request_delay() -> u64 {
    10
}

fn default_rate_limit_pause() -> u64 {
    60
}

/// File tree snapshot settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeConfig {
    /// Path substrings to drop.
    #[serde(default = "default_tree_excludes")]
    pub excludes: Vec<String>,

    /// Maximum path depth kept.
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    /// Maximum number of paths kept.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_entries: Option<usize>,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            excludes: default_tree_excludes(),
            max_depth: default_max_depth(),
            max_entries: None,
        }
    }
}

fn default_tree_excludes() -> Vec<String> {
    vec!["node_modules", ".git"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_max_depth() -> usize {
    2
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        config
            .scoring
            .validate()
            .with_context(|| format!("Invalid [scoring] section in {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        Self::load_from_dir(Path::new("."))
    }

    /// Try to load `.hireaudit.toml` from a directory.
    pub fn load_from_dir(dir: &Path) -> Result<Option<Self>> {
        let config_path = dir.join(CONFIG_FILE_NAME);

        if config_path.exists() {
            Ok(Some(Self::load(&config_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    /// Only explicitly provided CLI values override the file.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref model) = args.model {
            self.model.name = model.clone();
        }
        if let Some(ref url) = args.llm_url {
            self.model.api_url = url.clone();
        }
        if let Some(ref key) = args.api_key {
            self.model.api_key = Some(key.clone());
        }
        if let Some(timeout) = args.timeout {
            self.model.timeout_seconds = timeout;
        }

        if let Some(ref token) = args.github_token {
            self.github.token = Some(token.clone());
        }

        if let Some(concurrency) = args.concurrency {
            self.general.concurrency = concurrency;
        }
        if let Some(max_repos) = args.max_repos {
            self.general.max_repos = Some(max_repos);
        }
        if let Some(ref output) = args.output {
            self.general.output = output.display().to_string();
        }

        // Flags always override
        if args.skip_forks {
            self.general.skip_forks = true;
        }
        if args.verbose {
            self.general.verbose = true;
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Args;
    use clap::Parser;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.model.name, "llama-3.3-70b-versatile");
        assert_eq!(config.model.repo_temperature, 0.2);
        assert_eq!(config.model.profile_temperature, 0.5);
        assert_eq!(config.model.request_delay_seconds, 10);
        assert_eq!(config.model.rate_limit_pause_seconds, 60);
        assert_eq!(config.github.per_page, 100);
        assert_eq!(config.tree.max_depth, 2);
        assert_eq!(config.scoring, ScoringPolicy::default());
    }

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
[general]
output = "custom_report.md"
verbose = true
max_repos = 12

[model]
name = "llama-3.1-8b-instant"
repo_temperature = 0.1
request_delay_seconds = 0

[scoring]
flagship_cap = 3

[scoring.weights]
neutral = 0.25
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert_eq!(config.general.output, "custom_report.md");
        assert!(config.general.verbose);
        assert_eq!(config.general.max_repos, Some(12));
        assert_eq!(config.model.name, "llama-3.1-8b-instant");
        assert_eq!(config.model.repo_temperature, 0.1);
        assert_eq!(config.model.request_delay_seconds, 0);
        assert_eq!(config.scoring.flagship_cap, 3);
        assert_eq!(config.scoring.weights.neutral, 0.25);
        assert_eq!(config.scoring.weights.flagship, 3.0);
    }

    #[test]
    fn test_default_toml_generation() {
        let toml_str = Config::default_toml();
        assert!(!toml_str.is_empty());
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[model]"));
        assert!(toml_str.contains("[scoring]"));
        assert!(!toml_str.contains("api_key"));

        let reparsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(reparsed.scoring, ScoringPolicy::default());
    }

    #[test]
    fn test_load_from_dir() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Config::load_from_dir(dir.path()).unwrap().is_none());

        std::fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            "[general]\nconcurrency = 5\n",
        )
        .unwrap();
        let config = Config::load_from_dir(dir.path()).unwrap().unwrap();
        assert_eq!(config.general.concurrency, 5);
    }

    #[test]
    fn test_load_rejects_invalid_scoring() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "[scoring]\nflagship_min_signals = 9\n").unwrap();
        assert!(Config::load(&path).is_err());
    }

    #[test]
    fn test_cli_overrides_only_when_given() {
        let mut config: Config = toml::from_str("[model]\nname = \"from-file\"\n").unwrap();

        let args = Args::parse_from(["hireaudit", "octocat"]);
        config.merge_with_args(&args);
        assert_eq!(config.model.name, "from-file");

        let args = Args::parse_from(["hireaudit", "octocat", "--model", "from-cli", "--skip-forks"]);
        config.merge_with_args(&args);
        assert_eq!(config.model.name, "from-cli");
        assert!(config.general.skip_forks);
    }
}
