//! HTTP client for the GitHub REST API.
//!
//! Only the listing and profile calls surface errors. README, file tree
//! and profile README lookups degrade to an empty string, since a missing
//! piece of evidence should not abort a whole profile audit.

use crate::github::error::GithubError;
use crate::models::{RepositorySnapshot, UserProfile};
use crate::scanner::{TreeEntry, TreeFilter};
use anyhow::{Context, Result};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::{RequestBuilder, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, warn};

const GITHUB_ACCEPT: &str = "application/vnd.github.v3+json";

/// Connection settings for the GitHub client.
#[derive(Debug, Clone)]
pub struct GithubSettings {
    pub api_url: String,
    pub raw_url: String,
    pub token: Option<String>,
    pub user_agent: String,
    pub per_page: usize,
    pub timeout_seconds: u64,
}

impl Default for GithubSettings {
    fn default() -> Self {
        Self {
            api_url: "https://api.github.com".to_string(),
            raw_url: "https://raw.githubusercontent.com".to_string(),
            token: None,
            user_agent: "github-profile-audit-bot".to_string(),
            per_page: 100,
            timeout_seconds: 30,
        }
    }
}

/// README and shallow file tree of one repository.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RepoDetails {
    pub readme: String,
    pub file_tree: String,
}

#[derive(Debug, Deserialize)]
struct ReadmePayload {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TreePayload {
    #[serde(default)]
    tree: Option<Vec<TreeEntry>>,
}

/// The GitHub API client.
pub struct GithubClient {
    http: reqwest::Client,
    settings: GithubSettings,
    tree_filter: TreeFilter,
}

impl GithubClient {
    /// Create a new client.
    pub fn new(settings: GithubSettings, tree_filter: TreeFilter) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(settings.user_agent.clone())
            .timeout(Duration::from_secs(settings.timeout_seconds))
            .build()
            .context("Failed to create GitHub HTTP client")?;

        if settings.token.is_none() {
            debug!("No GitHub token configured; unauthenticated rate limits apply");
        }

        Ok(Self {
            http,
            settings,
            tree_filter,
        })
    }

    /// Build a GET request with the standard headers.
    fn get(&self, url: &str) -> RequestBuilder {
        let request = self.http.get(url).header(ACCEPT, GITHUB_ACCEPT);

        match self.settings.token.as_deref() {
            Some(token) if !token.is_empty() => {
                request.header(AUTHORIZATION, format!("token {}", token))
            }
            _ => request,
        }
    }

    /// Fetch the public profile of a user.
    pub async fn fetch_user(&self, username: &str) -> Result<UserProfile, GithubError> {
        let url = format!("{}/users/{}", self.settings.api_url, username);
        debug!("GET {}", url);

        let response = self.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(GithubError::from_status(
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown"),
                username,
            ));
        }

        Ok(response.json::<UserProfile>().await?)
    }

    /// Fetch the raw profile README (`{user}/{user}`), trying `main` then `master`.
    pub async fn fetch_profile_readme(&self, username: &str) -> String {
        for branch in ["main", "master"] {
            let url = format!(
                "{}/{}/{}/{}/README.md",
                self.settings.raw_url, username, username, branch
            );

            match self.get(&url).send().await {
                Ok(response) if response.status().is_success() => {
                    match response.text().await {
                        Ok(text) => return text,
                        Err(e) => warn!("Failed to read profile README body: {}", e),
                    }
                }
                Ok(response) => {
                    debug!("No profile README on {} ({})", branch, response.status());
                }
                Err(e) => {
                    warn!("Error fetching profile README for {}: {}", username, e);
                    break;
                }
            }
        }

        info!("No special profile README found for {}", username);
        String::new()
    }

    /// Fetch every public repository of a user, most recently updated first.
    pub async fn fetch_repositories(
        &self,
        username: &str,
    ) -> Result<Vec<RepositorySnapshot>, GithubError> {
        let per_page = self.settings.per_page.max(1);
        let mut repos = Vec::new();
        let mut page = 1;

        loop {
            let url = format!(
                "{}/users/{}/repos?per_page={}&page={}&sort=updated",
                self.settings.api_url, username, per_page, page
            );
            debug!("GET {}", url);

            let response = self.get(&url).send().await?;
            let status = response.status();
            if !status.is_success() {
                return Err(GithubError::from_status(
                    status.as_u16(),
                    status.canonical_reason().unwrap_or("Unknown"),
                    username,
                ));
            }

            let batch: Vec<RepositorySnapshot> = response.json().await?;
            let batch_len = batch.len();
            repos.extend(batch);

            if is_last_page(batch_len, per_page) {
                break;
            }
            page += 1;
        }

        info!("Fetched {} repositories for {}", repos.len(), username);
        Ok(repos)
    }

    /// Fetch and decode the README of a repository.
    pub async fn fetch_readme(&self, owner: &str, repo: &str) -> String {
        let url = format!("{}/repos/{}/{}/readme", self.settings.api_url, owner, repo);

        let response = match self.get(&url).send().await {
            Ok(r) => r,
            Err(e) => {
                warn!("Error fetching README for {}/{}: {}", owner, repo, e);
                return String::new();
            }
        };

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return String::new();
        }
        if !status.is_success() {
            warn!("Failed to fetch README for {}/{}: {}", owner, repo, status);
            return String::new();
        }

        match response.json::<ReadmePayload>().await {
            Ok(payload) => payload
                .content
                .as_deref()
                .and_then(decode_readme_content)
                .unwrap_or_default(),
            Err(e) => {
                warn!("Malformed README payload for {}/{}: {}", owner, repo, e);
                String::new()
            }
        }
    }

    /// Fetch the default branch tree and render it through the tree filter.
    pub async fn fetch_file_tree(&self, owner: &str, repo: &str) -> String {
        let url = format!(
            "{}/repos/{}/{}/git/trees/HEAD?recursive=1",
            self.settings.api_url, owner, repo
        );

        let response = match self.get(&url).send().await {
            Ok(r) => r,
            Err(e) => {
                warn!("Error fetching file tree for {}/{}: {}", owner, repo, e);
                return String::new();
            }
        };

        let status = response.status();
        // 409: repository is empty
        if status == StatusCode::NOT_FOUND || status == StatusCode::CONFLICT {
            return String::new();
        }
        if !status.is_success() {
            warn!("Failed to fetch tree for {}/{}: {}", owner, repo, status);
            return String::new();
        }

        match response.json::<TreePayload>().await {
            Ok(TreePayload { tree: Some(entries) }) => self.tree_filter.render(&entries),
            Ok(TreePayload { tree: None }) => String::new(),
            Err(e) => {
                warn!("Malformed tree payload for {}/{}: {}", owner, repo, e);
                String::new()
            }
        }
    }

    /// Fetch README and file tree concurrently.
    pub async fn fetch_repo_details(&self, owner: &str, repo: &str) -> RepoDetails {
        let (readme, file_tree) =
            tokio::join!(self.fetch_readme(owner, repo), self.fetch_file_tree(owner, repo));

        RepoDetails { readme, file_tree }
    }
}

/// A page shorter than `per_page` (or empty) ends pagination.
fn is_last_page(batch_len: usize, per_page: usize) -> bool {
    batch_len == 0 || batch_len < per_page
}

/// Decode GitHub's line-wrapped base64 README content.
fn decode_readme_content(content: &str) -> Option<String> {
    let compact: String = content.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.is_empty() {
        return None;
    }

    match BASE64.decode(compact.as_bytes()) {
        Ok(bytes) => Some(String::from_utf8_lossy(&bytes).into_owned()),
        Err(e) => {
            warn!("README content is not valid base64: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = GithubSettings::default();
        assert_eq!(settings.api_url, "https://api.github.com");
        assert_eq!(settings.user_agent, "github-profile-audit-bot");
        assert_eq!(settings.per_page, 100);
        assert!(settings.token.is_none());
    }

    #[test]
    fn test_is_last_page() {
        assert!(is_last_page(0, 100));
        assert!(is_last_page(42, 100));
        assert!(!is_last_page(100, 100));
    }

    #[test]
    fn test_decode_wrapped_base64() {
        // "# Hello\nWorld" split the way GitHub wraps content
        let content = "IyBIZWxs\nbwpXb3Js\nZA==\n";
        assert_eq!(
            decode_readme_content(content),
            Some("# Hello\nWorld".to_string())
        );
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert_eq!(decode_readme_content("not base64!!"), None);
        assert_eq!(decode_readme_content("\n"), None);
    }

    #[test]
    fn test_client_builds_without_token() {
        let client = GithubClient::new(GithubSettings::default(), TreeFilter::default());
        assert!(client.is_ok());
    }
}
