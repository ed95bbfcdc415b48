use crate::matching::{MatchSummary, MatchTables, Reconciler};
use crate::types::{DirectoryEntry, DraftedIdSet, RankedPlayer, RegistryError};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::io::Read;
use std::path::Path;
use tracing::{info, warn};

/// Column headers the ranking export must carry
pub const REQUIRED_COLUMNS: [&str; 11] = [
    "RK",
    "TIERS",
    "PLAYER NAME",
    "TEAM",
    "POS",
    "AGE",
    "BEST",
    "WORST",
    "AVG.",
    "STD.DEV",
    "ECR VS. ADP",
];

/// Raw CSV row; extra provider columns are ignored
#[derive(Debug, Deserialize)]
struct RankingRow {
    #[serde(rename = "RK")]
    rank: u32,
    #[serde(rename = "TIERS")]
    tier: u32,
    #[serde(rename = "PLAYER NAME")]
    name: String,
    #[serde(rename = "TEAM")]
    team: String,
    #[serde(rename = "POS")]
    position: String,
    #[serde(rename = "AGE", deserialize_with = "csv::invalid_option")]
    age: Option<f64>,
    #[serde(rename = "BEST", deserialize_with = "csv::invalid_option")]
    best: Option<f64>,
    #[serde(rename = "WORST", deserialize_with = "csv::invalid_option")]
    worst: Option<f64>,
    #[serde(rename = "AVG.", deserialize_with = "csv::invalid_option")]
    average: Option<f64>,
    #[serde(rename = "STD.DEV", deserialize_with = "csv::invalid_option")]
    std_dev: Option<f64>,
    #[serde(rename = "ECR VS. ADP", deserialize_with = "csv::invalid_option")]
    ecr_vs_adp: Option<i32>,
}

impl From<RankingRow> for RankedPlayer {
    fn from(row: RankingRow) -> Self {
        Self {
            rank: row.rank,
            tier: row.tier,
            name: row.name,
            team: row.team,
            position: row.position,
            age: row.age,
            best: row.best,
            worst: row.worst,
            average: row.average,
            std_dev: row.std_dev,
            ecr_vs_adp: row.ecr_vs_adp,
            drafted: false,
            external_id: None,
        }
    }
}

/// Which board rows to show
#[derive(Debug, Clone, Default)]
pub struct BoardFilter {
    /// Drop drafted players
    pub hide_drafted: bool,

    /// Keep only this base position (e.g., "RB")
    pub position: Option<String>,

    /// Case-insensitive substring of the player name
    pub query: Option<String>,
}

impl BoardFilter {
    fn accepts(&self, player: &RankedPlayer) -> bool {
        if self.hide_drafted && player.drafted {
            return false;
        }
        if let Some(position) = &self.position {
            if !player.base_position().eq_ignore_ascii_case(position) {
                return false;
            }
        }
        if let Some(query) = &self.query {
            if !player.name.to_lowercase().contains(&query.to_lowercase()) {
                return false;
            }
        }
        true
    }
}

/// Counts shown above the board
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoardSummary {
    pub total: usize,
    pub available: usize,
    pub drafted: usize,
    pub by_position: BTreeMap<String, usize>,
}

impl BoardSummary {
    pub fn from_rows<'a>(rows: impl IntoIterator<Item = &'a RankedPlayer>) -> Self {
        let mut summary = Self::default();
        for player in rows {
            summary.total += 1;
            if player.drafted {
                summary.drafted += 1;
            } else {
                summary.available += 1;
            }
            *summary.by_position.entry(player.base_position().to_string()).or_insert(0) += 1;
        }
        summary
    }

    pub fn position_count(&self, position: &str) -> usize {
        self.by_position.get(position).copied().unwrap_or(0)
    }
}

/// The static ranking board for one session
///
/// Rows keep source order; only `drafted` and `external_id` change after load.
#[derive(Debug, Default)]
pub struct PlayerRegistry {
    players: Vec<RankedPlayer>,

    /// Display name to row index (first row wins on duplicates)
    by_name: HashMap<String, usize>,
}

impl PlayerRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from already parsed players
    pub fn from_players(players: Vec<RankedPlayer>) -> Self {
        let mut by_name = HashMap::with_capacity(players.len());
        for (index, player) in players.iter().enumerate() {
            if by_name.contains_key(&player.name) {
                warn!("Duplicate player name '{}' in ranking source", player.name);
                continue;
            }
            by_name.insert(player.name.clone(), index);
        }
        Self { players, by_name }
    }

    /// Load the ranking export from disk
    pub async fn load_from_csv<P: AsRef<Path>>(file_path: P) -> Result<Self, RegistryError> {
        let path = file_path.as_ref();
        info!("Loading ranking board from: {:?}", path);

        let content = tokio::fs::read(path)
            .await
            .map_err(|source| RegistryError::Io { path: path.to_path_buf(), source })?;

        let registry = Self::from_csv_reader(content.as_slice())?;
        info!("Loaded {} ranked players", registry.len());
        Ok(registry)
    }

    /// Parse a ranking export from any reader
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self, RegistryError> {
        let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

        let headers = reader.headers()?.clone();
        if let Some(missing) =
            REQUIRED_COLUMNS.iter().find(|column| !headers.iter().any(|h| h == **column))
        {
            return Err(RegistryError::MissingColumn(*missing));
        }

        let mut players = Vec::new();
        for row in reader.deserialize::<RankingRow>() {
            let row = row?;
            if row.name.is_empty() {
                continue;
            }
            players.push(RankedPlayer::from(row));
        }

        if players.is_empty() {
            return Err(RegistryError::Empty);
        }

        Ok(Self::from_players(players))
    }

    /// Mark drafted players from a freshly fetched directory and pick set
    pub fn apply_draft(
        &mut self,
        tables: &MatchTables,
        directory: &[DirectoryEntry],
        drafted: &DraftedIdSet,
    ) -> MatchSummary {
        Reconciler::new(tables, directory).reconcile(&mut self.players, drafted)
    }

    pub fn players(&self) -> &[RankedPlayer] {
        &self.players
    }

    pub fn get_by_name(&self, name: &str) -> Option<&RankedPlayer> {
        self.by_name.get(name).map(|index| &self.players[*index])
    }

    /// Known and not drafted
    pub fn is_available(&self, name: &str) -> bool {
        self.get_by_name(name).is_some_and(RankedPlayer::is_available)
    }

    /// Names of every player that can still be picked
    pub fn available_names(&self) -> HashSet<String> {
        self.players.iter().filter(|p| p.is_available()).map(|p| p.name.clone()).collect()
    }

    /// Rows passing `filter`, in board order
    pub fn view(&self, filter: &BoardFilter) -> Vec<&RankedPlayer> {
        self.players.iter().filter(|p| filter.accepts(p)).collect()
    }

    /// Search for players by partial name match
    pub fn search_players(&self, query: &str) -> Vec<&RankedPlayer> {
        self.view(&BoardFilter { query: Some(query.to_string()), ..Default::default() })
    }

    /// Resolve loosely typed input to a board name: exact, then case-insensitive,
    /// then a unique substring hit
    pub fn find_name(&self, input: &str) -> Option<&str> {
        let input = input.trim();
        if let Some(player) = self.get_by_name(input) {
            return Some(player.name.as_str());
        }
        if let Some(player) = self.players.iter().find(|p| p.name.eq_ignore_ascii_case(input)) {
            return Some(player.name.as_str());
        }
        match self.search_players(input).as_slice() {
            [only] => Some(only.name.as_str()),
            _ => None,
        }
    }

    pub fn summary(&self) -> BoardSummary {
        BoardSummary::from_rows(&self.players)
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}
