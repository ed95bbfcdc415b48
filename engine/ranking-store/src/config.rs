//! Configuration for the ranking store

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Which persistence backend holds the rankings document
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// GitHub when a repository and token are available, otherwise local
    #[default]
    Auto,
    Local,
    Github,
}

/// Configuration for the ranking store
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub backend: BackendKind,

    /// Rankings document on the local filesystem
    pub local_path: PathBuf,

    /// Remote repository settings
    pub github: GithubConfig,
}

/// GitHub contents API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GithubConfig {
    /// Repository as "owner/name"
    pub repo: Option<String>,

    /// Branch the document lives on
    pub branch: String,

    /// Path of the document inside the repository
    pub path: String,

    /// API root, overridable for GitHub Enterprise or tests
    pub api_url: String,

    /// Environment variable holding the access token
    pub token_env: String,

    /// Commit message used for every overwrite
    pub commit_message: String,

    /// Per-request timeout of the API client
    pub timeout_secs: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::Auto,
            local_path: PathBuf::from("user_rankings.json"),
            github: GithubConfig::default(),
        }
    }
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            repo: None,
            branch: "main".to_string(),
            path: "user_rankings.json".to_string(),
            api_url: "https://api.github.com".to_string(),
            token_env: "GITHUB_TOKEN".to_string(),
            commit_message: "Update user rankings".to_string(),
            timeout_secs: 30,
        }
    }
}

impl GithubConfig {
    /// Contents API URL of the rankings document
    pub fn contents_url(&self, repo: &str) -> String {
        format!(
            "{}/repos/{}/contents/{}",
            self.api_url.trim_end_matches('/'),
            repo,
            self.path.trim_start_matches('/')
        )
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        match &self.repo {
            Some(repo) if repo.split('/').filter(|part| !part.is_empty()).count() == 2 => {}
            Some(repo) => return Err(format!("GitHub repo '{repo}' must look like owner/name")),
            None => return Err("GitHub repo is not configured".to_string()),
        }

        if self.path.trim().is_empty() {
            return Err("GitHub path must not be empty".to_string());
        }

        if self.timeout_secs == 0 {
            return Err("GitHub timeout_secs must be greater than 0".to_string());
        }

        Ok(())
    }
}
