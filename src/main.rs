//! HireAudit - employability audit for GitHub profiles
//!
//! A CLI tool that asks an LLM to audit every public repository of a
//! GitHub user, tiers the repositories with a deterministic heuristic,
//! and rolls them up into a single 0-100 profile score.
//!
//! Exit codes:
//!   0 - Success (score at or above --fail-under, or no --fail-under set)
//!   1 - Runtime error (unknown user, rate limit, config, I/O, etc.)
//!   2 - Profile score below the --fail-under threshold

mod agent;
mod analysis;
mod cli;
mod config;
mod github;
mod models;
mod orchestrator;
mod report;
mod scanner;

use anyhow::{Context, Result};
use chrono::Utc;
use cli::{Args, OutputFormat};
use config::{Config, CONFIG_FILE_NAME};
use github::GithubError;
use models::{ProfileAudit, Report, ReportMetadata, RepositorySnapshot, Tier, UserProfile};
use orchestrator::{AuditOrchestrator, OrchestratorConfig};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Load configuration first so `verbose = true` in the file applies
    let (mut config, config_source) = match load_config(&args) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    };
    config.merge_with_args(&args);

    // Initialize logging
    init_logging(&args, config.general.verbose);

    info!("HireAudit v{}", env!("CARGO_PKG_VERSION"));
    debug!("Configuration: {}", config_source);
    debug!("Arguments: {:?}", args);

    // Run the audit
    match run_audit(args, config).await {
        Ok(exit_code) => {
            std::process::exit(exit_code);
        }
        Err(e) => {
            error!("Audit failed: {:#}", e);
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .hireaudit.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(CONFIG_FILE_NAME);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            CONFIG_FILE_NAME
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", CONFIG_FILE_NAME))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE_NAME);
    println!("   Edit it to customize the model, tier thresholds, weights, and more.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args, config_verbose: bool) {
    let level = args.log_level(config_verbose);

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Run the complete audit workflow. Returns exit code (0 or 2).
async fn run_audit(args: Args, config: Config) -> Result<i32> {
    let start_time = Instant::now();
    let username = args.username().to_string();

    // Step 1: Profile and repositories
    let tree_filter = scanner::TreeFilter::new(scanner::TreeFilterConfig::from(&config.tree));
    let github_settings = github::GithubSettings {
        api_url: config.github.api_url.clone(),
        raw_url: config.github.raw_url.clone(),
        token: config.github.token.clone(),
        per_page: config.github.per_page,
        timeout_seconds: config.github.timeout_seconds,
        ..Default::default()
    };
    let github = Arc::new(github::GithubClient::new(github_settings, tree_filter)?);

    println!("📥 Fetching GitHub profile: {}", username);
    let user = github
        .fetch_user(&username)
        .await
        .map_err(GithubError::with_hint)
        .with_context(|| format!("Failed to fetch profile of {}", username))?;

    let mut repos = github
        .fetch_repositories(&username)
        .await
        .map_err(GithubError::with_hint)
        .with_context(|| format!("Failed to list repositories of {}", username))?;
    let repos_fetched = repos.len();

    if config.general.skip_forks {
        let before = repos.len();
        repos.retain(|r| !r.fork);
        info!("Skipped {} forked repositories", before - repos.len());
    }

    if let Some(max) = config.general.max_repos {
        if repos.len() > max {
            info!("Limiting audit to the {} most recently updated repositories", max);
            repos.truncate(max);
        }
    }

    // Handle --dry-run: list repositories and exit
    if args.dry_run {
        return handle_dry_run(&user, &repos);
    }

    // Step 2: Initialize the auditors
    let chat_config = agent::ChatConfig {
        base_url: config.model.api_url.clone(),
        api_key: config.model.api_key.clone(),
        model_name: config.model.name.clone(),
        timeout_seconds: config.model.timeout_seconds,
    };
    if chat_config.api_key.is_none() {
        warn!("No API key configured (GROQ_API_KEY); requests will likely be rejected");
    }
    let chat = agent::ChatClient::new(chat_config)?;

    println!("🤖 Initializing AI auditors...");
    println!("   Model: {}", chat.model_name());
    println!("   Endpoint: {}", config.model.api_url);
    println!("   Concurrency: {}", config.general.concurrency);
    println!(
        "   Request spacing: {}s",
        config.model.request_delay_seconds
    );
    println!("   Timeout: {}s", config.model.timeout_seconds);

    // Step 3: Profile first impression
    let profile_audit = if args.skip_profile_audit {
        info!("Profile audit skipped");
        None
    } else {
        println!("\n👀 Auditing profile first impression...");
        let readme = github.fetch_profile_readme(&username).await;
        let auditor = agent::ProfileAuditor::new(chat.clone(), config.model.profile_temperature);
        Some(auditor.audit(&user, &readme).await)
    };

    // Step 4: Repository audits and profile score
    println!("\n🔬 Auditing {} repositories...\n", repos.len());

    let scorer = agent::RepoAuditor::new(github.clone(), chat, config.model.repo_temperature);
    let orchestrator = AuditOrchestrator::new(
        scorer,
        Arc::new(analysis::SystemClock),
        config.scoring.clone(),
        OrchestratorConfig {
            concurrency: config.general.concurrency,
            request_delay: Duration::from_secs(config.model.request_delay_seconds),
            rate_limit_pause: Duration::from_secs(config.model.rate_limit_pause_seconds),
            show_progress: !args.quiet,
        },
    );

    let outcome = orchestrator.run(&username, &repos).await;

    let mut audited = outcome.repos;
    analysis::rank_repos(&mut audited);

    // Step 5: Build the report
    println!("\n📝 Generating report...");

    let duration = start_time.elapsed().as_secs_f64();

    let metadata = ReportMetadata {
        username: username.clone(),
        analysis_date: Utc::now(),
        model_used: config.model.name.clone(),
        repos_fetched,
        repos_audited: audited.len(),
        repos_failed: outcome.failed.len(),
        duration_seconds: duration,
    };

    let report = Report {
        metadata,
        user: Some(user),
        profile_audit,
        profile: outcome.result,
        repos: audited,
        failed: outcome.failed,
    };

    // Step 6: Generate and save the report
    let output_path = output_path(&args, &config);
    let output = match args.format {
        OutputFormat::Json => report::generate_json_report(&report)?,
        OutputFormat::Markdown => report::generate_markdown_report(&report),
    };

    std::fs::write(&output_path, &output)
        .with_context(|| format!("Failed to write report to {}", output_path.display()))?;

    print_summary(&report, report.profile_audit.as_ref());
    println!(
        "\n✅ Audit complete! Report saved to: {}",
        output_path.display()
    );

    // Check --fail-under threshold
    if let Some(threshold) = args.fail_under {
        if report.profile.profile_score < threshold {
            eprintln!(
                "\n⛔ Profile score {} is below {}. Failing (exit code 2).",
                report.profile.profile_score, threshold
            );
            return Ok(2);
        }
    }

    Ok(0)
}

/// Report path: explicit --output wins; otherwise the configured path,
/// switched to a `.json` extension for JSON output.
fn output_path(args: &Args, config: &Config) -> PathBuf {
    let mut path = PathBuf::from(&config.general.output);
    if args.output.is_none() && args.format == OutputFormat::Json {
        path.set_extension("json");
    }
    path
}

/// Print the console summary.
fn print_summary(report: &Report, profile_audit: Option<&ProfileAudit>) {
    let breakdown = &report.profile.tier_breakdown;

    println!("\n📊 Audit Summary:");
    println!("   Profile score: {}/100", report.profile.profile_score);
    if let Some(audit) = profile_audit {
        println!("   First impression: {} ({}/100)", audit.nickname, audit.score);
    }
    println!(
        "   - {} Flagship: {} | {} Supporting: {} | {} Neutral: {} | {} Noise: {}",
        Tier::Flagship.emoji(),
        breakdown.flagship,
        Tier::Supporting.emoji(),
        breakdown.supporting,
        Tier::Neutral.emoji(),
        breakdown.neutral,
        Tier::Noise.emoji(),
        breakdown.noise
    );
    if !report.failed.is_empty() {
        println!("   Failed audits: {}", report.failed.len());
    }
    println!("   Duration: {:.1}s", report.metadata.duration_seconds);
}

/// Handle --dry-run: print the repositories that would be audited, exit.
fn handle_dry_run(user: &UserProfile, repos: &[RepositorySnapshot]) -> Result<i32> {
    println!(
        "\n🔍 Dry run for {} ({} public repos, no LLM call)...\n",
        user.display_name(),
        user.public_repos
    );

    if repos.is_empty() {
        println!("   No repositories to audit.");
    } else {
        println!("   {} repositories would be audited:\n", repos.len());
        for repo in repos {
            let mut flags = Vec::new();
            if repo.fork {
                flags.push("fork");
            }
            if repo.archived {
                flags.push("archived");
            }
            if repo.has_deployment() {
                flags.push("deployed");
            }

            let pushed = repo
                .pushed_at
                .map(|t| t.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| "never".to_string());

            println!(
                "     📦 {} [{}] pushed {}{}",
                repo.name,
                repo.language.as_deref().unwrap_or("-"),
                pushed,
                if flags.is_empty() {
                    String::new()
                } else {
                    format!(" ({})", flags.join(", "))
                }
            );
        }
        println!("\n   Total: {} repositories", repos.len());
    }

    println!("\n✅ Dry run complete. No LLM calls were made.");
    Ok(0)
}

/// Load configuration from file or use defaults.
///
/// Returns the configuration and a description of where it came from.
fn load_config(args: &Args) -> Result<(Config, String)> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        let config = Config::load(config_path)?;
        return Ok((config, format!("loaded from {}", config_path.display())));
    }

    // Try default location
    match Config::load_default()? {
        Some(config) => Ok((config, format!("loaded default {}", CONFIG_FILE_NAME))),
        None => Ok((Config::default(), "no config file, using defaults".to_string())),
    }
}
