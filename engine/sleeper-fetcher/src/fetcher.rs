use crate::config::SleeperConfig;
use crate::models::*;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use player_registry::{DirectoryEntry, DraftedIdSet};
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::info;

/// Everything one draft refresh pulls from Sleeper
#[derive(Debug, Clone)]
pub struct DraftSnapshot {
    /// Directory entries in ascending id order
    pub directory: Vec<DirectoryEntry>,

    /// Ids picked so far
    pub drafted: DraftedIdSet,

    /// Number of picks returned, including ones without a player
    pub pick_count: usize,

    pub fetched_at: DateTime<Utc>,
}

/// Sleeper API client
pub struct SleeperFetcher {
    config: SleeperConfig,
    client: Client,
}

impl SleeperFetcher {
    /// Create a new fetcher instance
    pub fn new(config: SleeperConfig) -> Result<Self> {
        config.validate().map_err(anyhow::Error::msg).context("Invalid Sleeper configuration")?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { config, client })
    }

    pub fn config(&self) -> &SleeperConfig {
        &self.config
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str, what: &str) -> Result<T> {
        info!("Fetching {} from: {}", what, url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("Failed to fetch {what}"))?;

        if !response.status().is_success() {
            anyhow::bail!("Failed to load {} (status {})", what, response.status());
        }

        response.json().await.with_context(|| format!("Failed to parse {what} JSON"))
    }

    /// Fetch the full player directory
    pub async fn fetch_directory(&self) -> Result<Vec<DirectoryEntry>> {
        let response: PlayerDirectoryResponse =
            self.get_json(&self.config.players_url(), "player directory").await?;
        let directory = into_directory(response);

        info!("Successfully fetched {} directory entries", directory.len());
        Ok(directory)
    }

    /// Fetch the current picks of the configured draft
    pub async fn fetch_picks(&self) -> Result<Vec<DraftPick>> {
        let picks: Vec<DraftPick> = self.get_json(&self.config.picks_url(), "draft picks").await?;

        info!("Successfully fetched {} draft picks", picks.len());
        Ok(picks)
    }

    /// Fetch directory then picks; either failing fails the whole refresh
    pub async fn fetch_snapshot(&self) -> Result<DraftSnapshot> {
        let directory = self.fetch_directory().await?;
        let picks = self.fetch_picks().await?;

        Ok(DraftSnapshot {
            directory,
            drafted: drafted_ids(&picks),
            pick_count: picks.len(),
            fetched_at: Utc::now(),
        })
    }
}
