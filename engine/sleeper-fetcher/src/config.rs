use serde::{Deserialize, Serialize};

/// Configuration for the Sleeper draft client
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SleeperConfig {
    /// API root, without trailing slash
    pub base_url: String,

    /// Draft whose picks mark players as taken
    pub draft_id: String,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for SleeperConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.sleeper.app/v1".to_string(),
            draft_id: "1255223076447072256".to_string(),
            timeout_secs: 30,
        }
    }
}

impl SleeperConfig {
    /// Full NFL player directory endpoint
    pub fn players_url(&self) -> String {
        format!("{}/players/nfl", self.base_url.trim_end_matches('/'))
    }

    /// Pick list endpoint for the configured draft
    pub fn picks_url(&self) -> String {
        format!("{}/draft/{}/picks", self.base_url.trim_end_matches('/'), self.draft_id)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.base_url.trim().is_empty() {
            return Err("Sleeper base_url must not be empty".to_string());
        }

        if self.draft_id.trim().is_empty() {
            return Err("Sleeper draft_id must not be empty".to_string());
        }

        if self.timeout_secs == 0 {
            return Err("Sleeper timeout_secs must be greater than 0".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_urls() {
        let config = SleeperConfig {
            base_url: "http://localhost:1234/".to_string(),
            draft_id: "42".to_string(),
            ..Default::default()
        };

        assert_eq!(config.players_url(), "http://localhost:1234/players/nfl");
        assert_eq!(config.picks_url(), "http://localhost:1234/draft/42/picks");
    }

    #[test]
    fn test_validate_rejects_empty_draft() {
        let config = SleeperConfig { draft_id: " ".to_string(), ..Default::default() };
        assert!(config.validate().is_err());
        assert!(SleeperConfig::default().validate().is_ok());
    }
}
