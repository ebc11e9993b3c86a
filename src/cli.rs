//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::Parser;
use std::path::PathBuf;

/// HireAudit - employability audit for GitHub profiles
///
/// Scores every public repository of a GitHub user with an LLM, tiers
/// them with a deterministic heuristic, and rolls everything up into a
/// single 0-100 profile score. Markdown/JSON reports.
///
/// Examples:
///   hireaudit octocat
///   hireaudit octocat --max-repos 10 --format json -o octocat.json
///   hireaudit octocat --dry-run
///   hireaudit octocat --fail-under 60
///   hireaudit --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// GitHub username to audit
    #[arg(value_name = "USERNAME", required_unless_present = "init_config")]
    pub username: Option<String>,

    /// Model used for the audits
    ///
    /// Defaults to llama-3.3-70b-versatile, or the [model] section of .hireaudit.toml.
    #[arg(short, long, env = "HIREAUDIT_MODEL")]
    pub model: Option<String>,

    /// OpenAI-compatible API base URL
    #[arg(long, value_name = "URL", env = "HIREAUDIT_LLM_URL")]
    pub llm_url: Option<String>,

    /// API key for the LLM provider
    #[arg(long, value_name = "KEY", env = "GROQ_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// GitHub token (raises API rate limits)
    #[arg(long, value_name = "TOKEN", env = "GITHUB_TOKEN", hide_env_values = true)]
    pub github_token: Option<String>,

    /// Output file path for the report
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output format (markdown, json)
    #[arg(long, default_value = "markdown", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Maximum number of repositories to audit
    ///
    /// Repositories are taken most recently updated first.
    #[arg(long, value_name = "COUNT")]
    pub max_repos: Option<usize>,

    /// Number of repositories audited at once
    #[arg(long, value_name = "NUM")]
    pub concurrency: Option<usize>,

    /// LLM request timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .hireaudit.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Skip the recruiter first-impression audit of the profile page
    #[arg(long)]
    pub skip_profile_audit: bool,

    /// Leave forked repositories out of the audit
    #[arg(long)]
    pub skip_forks: bool,

    /// Fail if the profile score is below this value
    ///
    /// Useful for CI pipelines. Exit code 2 when the score is lower.
    #[arg(long, value_name = "SCORE")]
    pub fail_under: Option<u8>,

    /// Dry run: list the repositories that would be audited, no LLM calls
    #[arg(long)]
    pub dry_run: bool,

    /// Generate a default .hireaudit.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// The username to audit (empty if not set; validate first).
    pub fn username(&self) -> &str {
        self.username.as_deref().unwrap_or("")
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        if !is_valid_username(self.username()) {
            return Err(format!(
                "'{}' is not a valid GitHub username",
                self.username()
            ));
        }

        if let Some(ref url) = self.llm_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err("LLM URL must start with 'http://' or 'https://'".to_string());
            }
        }

        if self.concurrency == Some(0) {
            return Err("Concurrency must be at least 1".to_string());
        }

        if self.max_repos == Some(0) {
            return Err("Max repos must be at least 1".to_string());
        }

        if let Some(score) = self.fail_under {
            if score > 100 {
                return Err("--fail-under must be between 0 and 100".to_string());
            }
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if self.timeout == Some(0) {
            return Err("Timeout must be at least 1 second".to_string());
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self, config_verbose: bool) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose || config_verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}

/// GitHub logins: 1-39 alphanumerics or single hyphens, no leading/trailing hyphen.
pub fn is_valid_username(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= 39
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
        && !name.starts_with('-')
        && !name.ends_with('-')
        && !name.contains("--")
}
