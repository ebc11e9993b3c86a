//! Errors raised by the GitHub client.

use thiserror::Error;

/// Failure talking to the GitHub REST API.
#[derive(Debug, Error)]
pub enum GithubError {
    #[error("User '{0}' not found")]
    UserNotFound(String),

    #[error("GitHub API rate limit exceeded")]
    RateLimited,

    #[error("GitHub API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Failed to reach GitHub: {0}")]
    Transport(#[from] reqwest::Error),
}

impl GithubError {
    /// Map a non-success status of a user-scoped request to an error.
    pub fn from_status(status: u16, reason: &str, username: &str) -> Self {
        match status {
            404 => GithubError::UserNotFound(username.to_string()),
            403 | 429 => GithubError::RateLimited,
            _ => GithubError::Api {
                status,
                message: reason.to_string(),
            },
        }
    }

    /// Convert to `anyhow`, attaching a hint to failures the user can act on.
    pub fn with_hint(self) -> anyhow::Error {
        let hint = match self {
            GithubError::RateLimited => {
                Some("GitHub rate limit hit; set GITHUB_TOKEN or pass --github-token")
            }
            GithubError::UserNotFound(_) => Some("Check the spelling of the username"),
            _ => None,
        };

        match hint {
            Some(hint) => anyhow::Error::new(self).context(hint),
            None => anyhow::Error::new(self),
        }
    }
}
