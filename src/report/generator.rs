//! Markdown report generation.
//!
//! This module renders the profile audit as a recruiter-facing Markdown
//! document, or as pretty-printed JSON.

use crate::analysis::{average_ai_score, language_distribution, FlagshipSignals};
use crate::models::{
    AuditedRepo, FailedRepo, ProfileAudit, ProfileScoreResult, Report, ReportMetadata, Tier,
    UserProfile,
};
use anyhow::Result;

/// Generate a complete Markdown report.
pub fn generate_markdown_report(report: &Report) -> String {
    let mut output = String::new();

    // Title
    output.push_str(&format!(
        "# HireAudit Report: {}\n\n",
        report.metadata.username
    ));

    // Metadata section
    output.push_str(&generate_metadata_section(&report.metadata));

    // First impression
    output.push_str(&generate_first_impression_section(
        report.user.as_ref(),
        report.profile_audit.as_ref(),
    ));

    // Profile score and tier breakdown
    output.push_str(&generate_score_section(&report.profile));

    // Flagships and their supporting cast
    output.push_str(&generate_flagship_section(&report.repos));
    output.push_str(&generate_supporting_section(&report.repos));

    // Every audited repository, ranked
    output.push_str(&generate_repos_table(&report.repos));

    // Noise to clean up
    output.push_str(&generate_noise_section(&report.repos));

    // Audits that did not complete
    output.push_str(&generate_failed_section(&report.failed));

    // Portfolio statistics
    output.push_str(&generate_stats_section(&report.repos));

    // Footer
    output.push_str(&generate_footer());

    output
}

/// Generate the metadata section.
fn generate_metadata_section(metadata: &ReportMetadata) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!(
        "- **Profile:** [{0}](https://github.com/{0})\n",
        metadata.username
    ));
    section.push_str(&format!(
        "- **Analysis Date:** {}\n",
        metadata.analysis_date.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!("- **Model Used:** `{}`\n", metadata.model_used));
    section.push_str(&format!(
        "- **Repositories Fetched:** {}\n",
        metadata.repos_fetched
    ));
    section.push_str(&format!(
        "- **Repositories Audited:** {}\n",
        metadata.repos_audited
    ));
    if metadata.repos_failed > 0 {
        section.push_str(&format!(
            "- **Repositories Failed:** {}\n",
            metadata.repos_failed
        ));
    }
    section.push_str(&format!(
        "- **Analysis Duration:** {:.1}s\n",
        metadata.duration_seconds
    ));
    section.push('\n');

    section
}

/// Generate the recruiter first-impression section.
fn generate_first_impression_section(
    user: Option<&UserProfile>,
    audit: Option<&ProfileAudit>,
) -> String {
    let Some(audit) = audit else {
        return String::new();
    };

    let mut section = String::new();

    section.push_str("## First Impression\n\n");
    if let Some(user) = user {
        section.push_str(&format!("**{}**", user.display_name()));
        if let Some(bio) = user.bio.as_deref().filter(|b| !b.is_empty()) {
            section.push_str(&format!(" - {}", bio));
        }
        section.push_str("\n\n");
    }

    section.push_str(&format!(
        "### {} ({}/100)\n\n",
        audit.nickname, audit.score
    ));
    if !audit.headline.is_empty() {
        section.push_str(&format!("*{}*\n\n", audit.headline));
    }
    if !audit.summary.is_empty() {
        section.push_str(&format!("{}\n\n", audit.summary));
    }

    if !audit.strengths.is_empty() {
        section.push_str("**Strengths:**\n\n");
        for strength in &audit.strengths {
            section.push_str(&format!("- ✅ {}\n", strength));
        }
        section.push('\n');
    }

    if !audit.missing_elements.is_empty() {
        section.push_str("**Missing:**\n\n");
        for missing in &audit.missing_elements {
            section.push_str(&format!("- ❌ {}\n", missing));
        }
        section.push('\n');
    }

    section
}

/// Generate the profile score section.
fn generate_score_section(profile: &ProfileScoreResult) -> String {
    let mut section = String::new();

    section.push_str("## Profile Score\n\n");
    section.push_str(&format!(
        "**{}/100** - {}\n\n",
        profile.profile_score,
        score_verdict(profile.profile_score)
    ));

    section.push_str("### Tier Breakdown\n\n");
    let header: Vec<String> = Tier::ALL
        .iter()
        .map(|t| format!("{} {}", t.emoji(), t.label()))
        .collect();
    section.push_str(&format!("| {} | **Total** |\n", header.join(" | ")));
    section.push_str("|:---:|:---:|:---:|:---:|:---:|\n");
    let counts: Vec<String> = Tier::ALL
        .iter()
        .map(|t| profile.tier_breakdown.get(*t).to_string())
        .collect();
    section.push_str(&format!(
        "| {} | **{}** |\n\n",
        counts.join(" | "),
        profile.tier_breakdown.total()
    ));

    section
}

/// One-line reading of a profile score.
fn score_verdict(score: u8) -> &'static str {
    if score >= 80 {
        "Interview-ready portfolio"
    } else if score >= 60 {
        "Solid, with room to sharpen"
    } else if score >= 40 {
        "Mixed signals"
    } else {
        "Portfolio needs work"
    }
}

/// Generate the flagship showcase section.
fn generate_flagship_section(repos: &[AuditedRepo]) -> String {
    let mut section = String::new();

    section.push_str("## Flagship Projects\n\n");

    let flagships: Vec<_> = repos.iter().filter(|r| r.tier == Tier::Flagship).collect();
    if flagships.is_empty() {
        section.push_str(
            "No repository qualifies as a flagship yet. Deploy your strongest project and keep it active.\n\n",
        );
        return section;
    }

    for entry in flagships {
        section.push_str(&generate_repo_block(entry));
    }

    section
}

/// Generate the supporting projects section.
fn generate_supporting_section(repos: &[AuditedRepo]) -> String {
    let supporting: Vec<_> = repos.iter().filter(|r| r.tier == Tier::Supporting).collect();
    if supporting.is_empty() {
        return String::new();
    }

    let mut section = String::new();

    section.push_str("## Supporting Projects\n\n");
    for entry in supporting {
        section.push_str(&generate_repo_block(entry));
    }

    section
}

/// Render the five flagship signals with a held/total count.
fn generate_signals_line(signals: &FlagshipSignals) -> String {
    let labeled = signals.labeled();
    let parts: Vec<String> = labeled
        .iter()
        .map(|(label, held)| format!("{} {}", if *held { "✅" } else { "❌" }, label))
        .collect();

    format!(
        "**Flagship signals ({}/{}):** {}\n\n",
        signals.count(),
        labeled.len(),
        parts.join(" · ")
    )
}

/// Generate the detail block for a single repository.
fn generate_repo_block(entry: &AuditedRepo) -> String {
    let mut block = String::new();
    let repo = &entry.repo;

    if repo.html_url.is_empty() {
        block.push_str(&format!("### {} {}\n\n", entry.tier.emoji(), repo.name));
    } else {
        block.push_str(&format!(
            "### {} [{}]({})\n\n",
            entry.tier.emoji(),
            repo.name,
            repo.html_url
        ));
    }

    block.push_str(&format!(
        "*Language: {} | AI Score: {} | AI Tier: {} | Hire Signal: {}*\n\n",
        repo.language.as_deref().unwrap_or("Unknown"),
        entry.audit.score,
        entry.audit.tier,
        entry.audit.hire_signal
    ));

    if let Some(homepage) = repo.homepage.as_deref().filter(|h| !h.is_empty()) {
        block.push_str(&format!("**Live:** {}\n\n", homepage));
    }

    block.push_str(&generate_signals_line(&entry.signals));

    if !entry.audit.explanation.is_empty() {
        block.push_str(&format!("{}\n\n", entry.audit.explanation));
    }

    if !entry.audit.suggested_actions.is_empty() {
        block.push_str("> 💡 **Next steps:**\n");
        for action in &entry.audit.suggested_actions {
            block.push_str(&format!("> - {}\n", action));
        }
        block.push('\n');
    }

    block.push_str("---\n\n");

    block
}

/// Generate the ranked table of every audited repository.
fn generate_repos_table(repos: &[AuditedRepo]) -> String {
    let mut section = String::new();

    section.push_str("## All Repositories\n\n");

    if repos.is_empty() {
        section.push_str("No repositories were audited.\n\n");
        return section;
    }

    section.push_str("| Repository | Tier | AI Score | AI Tier | Hire Signal | Language |\n");
    section.push_str("|:---|:---:|:---:|:---:|:---:|:---|\n");

    for entry in repos {
        section.push_str(&format!(
            "| {} | {} {} | {} | {} | {} | {} |\n",
            entry.repo.name,
            entry.tier.emoji(),
            entry.tier,
            entry.audit.score,
            entry.audit.tier,
            entry.audit.hire_signal,
            entry.repo.language.as_deref().unwrap_or("-")
        ));
    }
    section.push('\n');

    section
}

/// Generate the noise section with red flags per repository.
fn generate_noise_section(repos: &[AuditedRepo]) -> String {
    let noise: Vec<_> = repos.iter().filter(|r| r.tier == Tier::Noise).collect();
    if noise.is_empty() {
        return String::new();
    }

    let mut section = String::new();

    section.push_str("## Noise\n\n");
    section.push_str(
        "These repositories pull the profile score down. Archive them, make them private, or finish them.\n\n",
    );

    for entry in noise {
        let mut reasons = entry.noise_reasons.clone();
        reasons.extend(entry.audit.red_flags.iter().cloned());

        if reasons.is_empty() {
            section.push_str(&format!(
                "- **{}** (score {})\n",
                entry.repo.name, entry.audit.score
            ));
        } else {
            section.push_str(&format!(
                "- **{}** (score {}): {}\n",
                entry.repo.name,
                entry.audit.score,
                reasons.join("; ")
            ));
        }
    }
    section.push('\n');

    section
}

/// Generate the failed audits section.
fn generate_failed_section(failed: &[FailedRepo]) -> String {
    if failed.is_empty() {
        return String::new();
    }

    let mut section = String::new();

    section.push_str("## Failed Audits\n\n");
    section.push_str("Not included in the profile score.\n\n");
    for entry in failed {
        section.push_str(&format!("- `{}`: {}\n", entry.name, entry.error));
    }
    section.push('\n');

    section
}

/// Generate the language and average score statistics.
fn generate_stats_section(repos: &[AuditedRepo]) -> String {
    let lang_dist = language_distribution(repos);
    if lang_dist.is_empty() {
        return String::new();
    }

    let mut section = String::new();

    section.push_str("## Statistics\n\n");

    if let Some(avg) = average_ai_score(repos) {
        section.push_str(&format!("- **Average AI Score:** {:.1}\n\n", avg));
    }

    section.push_str("### Repositories by Language\n\n");
    section.push_str("| Language | Repositories |\n");
    section.push_str("|:---|:---:|\n");

    let mut langs: Vec<_> = lang_dist.iter().collect();
    langs.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));

    for (lang, count) in langs {
        section.push_str(&format!("| {} | {} |\n", lang, count));
    }
    section.push('\n');

    section
}

/// Generate the report footer.
fn generate_footer() -> String {
    let mut footer = String::new();

    footer.push_str("---\n\n");
    footer.push_str("*Report generated by HireAudit*\n");

    footer
}

/// Generate a JSON report.
pub fn generate_json_report(report: &Report) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}
