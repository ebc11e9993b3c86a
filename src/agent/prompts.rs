//! Prompt text for the repository and profile auditors.

use crate::github::RepoDetails;
use crate::models::{RepositorySnapshot, UserProfile};

/// README and profile README content is cut to this many characters.
pub const MAX_README_CHARS: usize = 5000;

/// Development spans shorter than this are flagged as one-day builds.
pub const ONE_DAY_BUILD_HOURS: f64 = 24.0;

/// System prompt for repository audits.
pub const REPO_SYSTEM_PROMPT: &str = r#"You are a skeptical, forensic senior technical hiring manager.
You do not trust READMEs. Verify every claim against the file structure and the depth of the code.

GOAL:
Place the repository in exactly one tier, based on evidence.

TIERS:
- FLAGSHIP (90-100): a real application with at least two non-trivial features (auth, tests, CI/CD, state management) containing custom logic beyond library defaults. A profile README repository is never FLAGSHIP.
- SOLID (70-89): clean, working code. Cap at 80 for a buzzword stack (MERN, Next.js) whose logic is CRUD only.
- NEUTRAL (40-69): configs, small scripts, profile READMEs, or mostly boilerplate.
- NOISE (0-39): forks without added logic, tutorials, empty or broken repositories.

FORENSIC RULES:
1. Feature folders (/auth, /tests) holding placeholder code count as absent.
2. More than 50% config/json/style files: max score 65. More than 70%: max score 50.
3. "Is One-Day Build: true": max score 60 unless it is a hackathon winner.
4. README claims ("AI", "scalable") unsupported by the code: downgrade one tier.

HIRE SIGNAL:
- "Strong Yes": would shortlist immediately.
- "Yes": meets the bar.
- "Weak": neutral filler.
- "No": a red flag that hurts the profile.

Respond with a single JSON object and nothing else:
{
  "score": number,
  "tier": "FLAGSHIP" | "SOLID" | "NEUTRAL" | "NOISE",
  "hire_signal": "Strong Yes" | "Yes" | "Weak" | "No",
  "explanation": string,
  "red_flags": string[],
  "suggested_actions": string[]
}"#;

/// System prompt for the profile first-impression audit.
pub const PROFILE_SYSTEM_PROMPT: &str = r#"You are a senior technical recruiter judging the first impression of a candidate's GitHub profile.

INPUT: bio, company, location, blog, public repository count, followers, and the profile README.

GOAL: decide whether this developer looks job ready from presentation alone.

SCORING (0-100, equal weight):
- Professionalism: clear bio, real name, location, links.
- Brand: the profile README explains who they are and what they do.
- Activity: public repositories and followers.
- Clarity: the tech stack is obvious within five seconds.

Respond with a single JSON object and nothing else:
{
  "score": number,
  "nickname": string,
  "headline": string,
  "summary": string,
  "strengths": string[],
  "missing_elements": string[]
}
"nickname" is an RPG-style class name for the developer (e.g. "The Deployment Warlord").
"summary" is two sentences on the recruiter's impression."#;

/// Truncate to at most `max` characters on a char boundary.
pub fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Whether the repository is the special `{user}/{user}` profile repository.
pub fn is_profile_repo(username: &str, repo: &RepositorySnapshot) -> bool {
    repo.name.eq_ignore_ascii_case(username)
}

/// Build the user message for a repository audit.
pub fn build_repo_prompt(
    username: &str,
    repo: &RepositorySnapshot,
    details: &RepoDetails,
) -> String {
    let timestamp = |t: Option<chrono::DateTime<chrono::Utc>>| {
        t.map(|t| t.to_rfc3339())
            .unwrap_or_else(|| "unknown".to_string())
    };

    let hours = repo.development_hours();
    let duration = hours
        .map(|h| format!("{:.1} hours", h))
        .unwrap_or_else(|| "unknown".to_string());
    let one_day = hours.is_some_and(|h| h < ONE_DAY_BUILD_HOURS);

    let readme = if details.readme.is_empty() {
        "No README"
    } else {
        truncate_chars(&details.readme, MAX_README_CHARS)
    };

    let file_tree = if details.file_tree.is_empty() {
        "(empty)"
    } else {
        details.file_tree.as_str()
    };

    let mut prompt = String::new();
    prompt.push_str("AUDIT TARGET:\n");
    prompt.push_str(&format!("- Repo Name: {}\n", repo.name));
    prompt.push_str(&format!("- User: {}\n", username));
    prompt.push_str(&format!("- Created: {}\n", timestamp(repo.created_at)));
    prompt.push_str(&format!("- Last Push: {}\n", timestamp(repo.pushed_at)));
    prompt.push_str(&format!("- Dev Duration: {}\n", duration));
    prompt.push_str(&format!("- Is One-Day Build: {}\n\n", one_day));
    prompt.push_str("CONTEXT:\n");
    prompt.push_str(&format!(
        "- Is Profile Repo: {}\n\n",
        is_profile_repo(username, repo)
    ));
    prompt.push_str("FILE TREE SNAPSHOT:\n");
    prompt.push_str(file_tree);
    prompt.push_str("\n\nREADME CONTENT:\n");
    prompt.push_str(readme);
    prompt.push('\n');

    prompt
}

/// Build the user message for the profile audit.
pub fn build_profile_prompt(user: &UserProfile, profile_readme: &str) -> String {
    let or = |value: &Option<String>, fallback: &'static str| {
        value
            .as_deref()
            .filter(|v| !v.is_empty())
            .unwrap_or(fallback)
            .to_string()
    };

    let readme = if profile_readme.is_empty() {
        "No Profile README found."
    } else {
        truncate_chars(profile_readme, MAX_README_CHARS)
    };

    let mut prompt = String::new();
    prompt.push_str("USER METADATA:\n");
    prompt.push_str(&format!("Name: {}\n", user.display_name()));
    prompt.push_str(&format!("Bio: {}\n", or(&user.bio, "No Bio")));
    prompt.push_str(&format!("Company: {}\n", or(&user.company, "No Company")));
    prompt.push_str(&format!("Location: {}\n", or(&user.location, "No Location")));
    prompt.push_str(&format!("Blog/Portfolio: {}\n", or(&user.blog, "No Link")));
    prompt.push_str(&format!("Public Repos: {}\n", user.public_repos));
    prompt.push_str(&format!("Followers: {}\n\n", user.followers));
    prompt.push_str("PROFILE README CONTENT:\n");
    prompt.push_str(readme);
    prompt.push('\n');

    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_truncate_chars_respects_boundaries() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("short", 50), "short");
        assert_eq!(truncate_chars("", 3), "");
    }

    #[test]
    fn test_profile_repo_detection() {
        let repo = RepositorySnapshot::named("OctoCat");
        assert!(is_profile_repo("octocat", &repo));
        assert!(!is_profile_repo("someone", &repo));
    }

    #[test]
    fn test_repo_prompt_flags_one_day_build() {
        let mut repo = RepositorySnapshot::named("hack");
        repo.created_at = Some(Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap());
        repo.pushed_at = Some(Utc.with_ymd_and_hms(2024, 5, 1, 20, 0, 0).unwrap());

        let details = RepoDetails {
            readme: String::new(),
            file_tree: "src\nsrc/main.rs".to_string(),
        };
        let prompt = build_repo_prompt("octo", &repo, &details);

        assert!(prompt.contains("- Repo Name: hack"));
        assert!(prompt.contains("- Dev Duration: 12.0 hours"));
        assert!(prompt.contains("- Is One-Day Build: true"));
        assert!(prompt.contains("- Is Profile Repo: false"));
        assert!(prompt.contains("src/main.rs"));
        assert!(prompt.contains("No README"));
    }

    #[test]
    fn test_repo_prompt_truncates_readme() {
        let repo = RepositorySnapshot::named("big");
        let details = RepoDetails {
            readme: "x".repeat(MAX_README_CHARS + 500),
            file_tree: String::new(),
        };
        let prompt = build_repo_prompt("octo", &repo, &details);
        assert!(prompt.contains(&"x".repeat(MAX_README_CHARS)));
        assert!(!prompt.contains(&"x".repeat(MAX_README_CHARS + 1)));
        assert!(prompt.contains("- Dev Duration: unknown"));
    }

    #[test]
    fn test_profile_prompt_placeholders() {
        let user = UserProfile {
            login: "octo".to_string(),
            public_repos: 8,
            followers: 3,
            ..Default::default()
        };
        let prompt = build_profile_prompt(&user, "");
        assert!(prompt.contains("Name: octo"));
        assert!(prompt.contains("Bio: No Bio"));
        assert!(prompt.contains("Public Repos: 8"));
        assert!(prompt.contains("No Profile README found."));
    }
}
