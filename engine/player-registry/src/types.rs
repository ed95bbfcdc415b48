use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;
use thiserror::Error;

/// One row of the static ranking export
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedPlayer {
    /// Overall rank (1 = best), ties keep source order
    pub rank: u32,

    /// Tier bucket assigned by the ranking provider
    pub tier: u32,

    /// Display name as exported (e.g., "Marvin Harrison Jr.")
    pub name: String,

    /// Team abbreviation (e.g., "ARI")
    pub team: String,

    /// Position code, possibly with a positional rank (e.g., "WR12", "RB/WR")
    pub position: String,

    /// Age in years, absent for rookies without data
    pub age: Option<f64>,

    /// Best rank across contributing experts
    pub best: Option<f64>,

    /// Worst rank across contributing experts
    pub worst: Option<f64>,

    /// Average expert rank
    pub average: Option<f64>,

    /// Standard deviation of expert ranks
    pub std_dev: Option<f64>,

    /// Expert consensus rank minus average draft position
    pub ecr_vs_adp: Option<i32>,

    /// Set by reconciliation when the matched directory id has been picked
    #[serde(default)]
    pub drafted: bool,

    /// Draft-service id of the matched directory entry
    #[serde(default)]
    pub external_id: Option<String>,
}

impl RankedPlayer {
    /// Leading position letters of the position code ("WR12" -> "WR", "RB/WR" -> "RB")
    pub fn base_position(&self) -> &str {
        let end = self
            .position
            .char_indices()
            .find(|(_, c)| !c.is_ascii_uppercase())
            .map(|(i, _)| i)
            .unwrap_or(self.position.len());
        &self.position[..end]
    }

    /// Whether the player can still be picked
    pub fn is_available(&self) -> bool {
        !self.drafted
    }
}

/// A player record from the draft service's directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryEntry {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub team: Option<String>,
    pub position: Option<String>,
}

impl DirectoryEntry {
    /// "first last", trimmed so a missing half does not leave a stray space
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name).trim().to_string()
    }
}

/// Ids currently picked in the live draft
///
/// Rebuilt wholesale on each refresh, never merged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DraftedIdSet {
    ids: HashSet<String>,
}

impl DraftedIdSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from pick ids, ignoring empty ones
    pub fn from_ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let ids = ids.into_iter().map(Into::into).filter(|id: &String| !id.is_empty()).collect();
        Self { ids }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Errors that can occur while loading the ranking board
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("could not read ranking file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed ranking file: {0}")]
    Csv(#[from] csv::Error),

    #[error("ranking file is missing required column '{0}'")]
    MissingColumn(&'static str),

    #[error("ranking file contains no players")]
    Empty,
}
