use player_registry::MatchTables;
use ranking_store::StoreConfig;
use serde::{Deserialize, Serialize};
use sleeper_fetcher::SleeperConfig;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::error::AppError;

/// Default configuration file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "draft-assistant.toml";

/// Prefix of environment overrides, e.g. `DRAFT_SLEEPER__DRAFT_ID`
pub const ENV_PREFIX: &str = "DRAFT";

/// A team member who keeps a personal ranking
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub key: String,
    pub label: String,
}

/// A ranking-board name and the directory spellings accepted for it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AliasRule {
    pub name: String,
    pub accepts: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchingConfig {
    /// Names always treated as drafted
    pub overrides: Vec<String>,

    /// Added on top of the built-in alias table
    pub aliases: Vec<AliasRule>,
}

/// Configuration for the draft assistant
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Ranking export read at startup
    pub rankings_csv: PathBuf,

    /// Team members, in sidebar order
    pub users: Vec<UserProfile>,

    pub sleeper: SleeperConfig,

    pub storage: StoreConfig,

    pub matching: MatchingConfig,

    /// Pause before each automatic refresh
    pub auto_refresh_secs: u64,

    /// Refreshes performed by one `auto` command
    pub auto_refresh_cycles: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        let users = [
            ("nathan", "🔥 Nathan"),
            ("nathaniel", "⚡ Nathaniel"),
            ("jack", "🚀 Jack"),
            ("kyle", "💎 Kyle"),
        ]
        .iter()
        .map(|(key, label)| UserProfile { key: key.to_string(), label: label.to_string() })
        .collect();

        Self {
            rankings_csv: PathBuf::from("FantasyPros_2025_Dynasty_ALL_Rankings.csv"),
            users,
            sleeper: SleeperConfig::default(),
            storage: StoreConfig::default(),
            matching: MatchingConfig::default(),
            auto_refresh_secs: 30,
            auto_refresh_cycles: 10,
        }
    }
}

impl AppConfig {
    /// Defaults, then the TOML file (if present), then `DRAFT_*` variables
    pub fn load(path: Option<&Path>) -> Result<Self, AppError> {
        Self::load_with_env(path, None)
    }

    /// `load` reading overrides from `env` instead of the process environment
    fn load_with_env(
        path: Option<&Path>,
        env: Option<config::Map<String, String>>,
    ) -> Result<Self, AppError> {
        let (file, required) = match path {
            Some(path) => (path.to_path_buf(), true),
            None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
        };

        let config: Self = config::Config::builder()
            .add_source(config::File::from(file.as_path()).required(required))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .source(env),
            )
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| AppError::Config(e.to_string()))?;

        config.validate().map_err(AppError::Config)?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.users.is_empty() {
            return Err("at least one user must be configured".to_string());
        }

        let mut seen = HashSet::new();
        for user in &self.users {
            if user.key.trim().is_empty() {
                return Err("user keys must not be empty".to_string());
            }
            if !seen.insert(user.key.as_str()) {
                return Err(format!("duplicate user key '{}'", user.key));
            }
        }

        if self.auto_refresh_secs == 0 {
            return Err("auto_refresh_secs must be greater than 0".to_string());
        }

        self.sleeper.validate()
    }

    pub fn user_keys(&self) -> Vec<String> {
        self.users.iter().map(|u| u.key.clone()).collect()
    }

    pub fn label_for<'a>(&'a self, key: &'a str) -> &'a str {
        self.users.iter().find(|u| u.key == key).map(|u| u.label.as_str()).unwrap_or(key)
    }

    /// Built-in aliases plus the configured overrides and aliases
    pub fn match_tables(&self) -> MatchTables {
        let mut tables = MatchTables::builtin();
        for name in &self.matching.overrides {
            tables = tables.with_override(name.as_str());
        }
        for rule in &self.matching.aliases {
            tables = tables.with_alias(rule.name.as_str(), rule.accepts.iter().cloned());
        }
        tables
    }
}
