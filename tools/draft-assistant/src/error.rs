use player_registry::RegistryError;
use ranking_store::RankingError;
use thiserror::Error;

use crate::commands::ParseError;

/// Every failure a handler can hand back to the session loop
#[derive(Error, Debug)]
pub enum AppError {
    /// Ranking board could not be loaded; nothing else works without it
    #[error("could not load player data: {0}")]
    Source(#[from] RegistryError),

    /// Draft service unreachable or returned garbage; previous flags stay
    #[error("draft refresh failed: {0:#}")]
    Fetch(anyhow::Error),

    /// A list edit was rejected
    #[error(transparent)]
    Ranking(#[from] RankingError),

    /// Input did not name a known player
    #[error("no available player matches '{0}'")]
    UnknownPlayer(String),

    #[error(transparent)]
    Command(#[from] ParseError),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl AppError {
    /// Whether the session cannot continue
    pub fn is_fatal(&self) -> bool {
        matches!(self, AppError::Source(_) | AppError::Config(_))
    }
}
