use chrono::{DateTime, Local};
use player_registry::{BoardFilter, MatchSummary, MatchTables, PlayerRegistry, RankedPlayer};
use rand::Rng;
use ranking_store::{
    consensus, open_backend, ConsensusRow, LocalFileBackend, RankingBackend, RankingError,
    RankingStore, StoreError, SyncStatus,
};
use sleeper_fetcher::{DraftSnapshot, SleeperFetcher};
use std::collections::HashSet;
use tracing::{info, warn};

use crate::commands::ListEdit;
use crate::config::AppConfig;
use crate::error::AppError;

/// What the last successful draft refresh found
#[derive(Debug, Clone)]
pub struct RefreshReport {
    pub summary: MatchSummary,
    pub drafted_ids: usize,
    pub pick_count: usize,
    pub refreshed_at: DateTime<Local>,
}

/// Everything one session owns: the board, the draft link and the rankings
pub struct AppState {
    config: AppConfig,
    registry: PlayerRegistry,
    tables: MatchTables,
    fetcher: SleeperFetcher,
    store: RankingStore,
    active_user: String,
    last_refresh: Option<RefreshReport>,
}

impl AppState {
    /// Assemble a session from already constructed parts
    pub fn new(
        config: AppConfig,
        registry: PlayerRegistry,
        fetcher: SleeperFetcher,
        store: RankingStore,
    ) -> Self {
        let tables = config.match_tables();
        let active_user = config.user_keys().into_iter().next().unwrap_or_default();
        Self { config, registry, tables, fetcher, store, active_user, last_refresh: None }
    }

    /// Load the board, open storage and restore saved rankings
    ///
    /// A missing or malformed ranking export is fatal. Storage problems only
    /// produce warnings: the session falls back to the local file, or to
    /// empty lists.
    pub async fn init(config: AppConfig) -> Result<(Self, Vec<StoreError>), AppError> {
        let registry = PlayerRegistry::load_from_csv(&config.rankings_csv).await?;
        let fetcher = SleeperFetcher::new(config.sleeper.clone())
            .map_err(|e| AppError::Config(format!("{e:#}")))?;

        let mut warnings = Vec::new();
        let backend: Box<dyn RankingBackend> = match open_backend(&config.storage) {
            Ok(backend) => backend,
            Err(err) => {
                warn!("Falling back to local rankings file: {}", err);
                warnings.push(err);
                Box::new(LocalFileBackend::new(&config.storage.local_path))
            }
        };

        let mut store = RankingStore::new(backend, config.user_keys());
        if let Some(err) = store.load().await.into_warning() {
            warnings.push(err);
        }

        Ok((Self::new(config, registry, fetcher, store), warnings))
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn registry(&self) -> &PlayerRegistry {
        &self.registry
    }

    pub fn active_user(&self) -> &str {
        &self.active_user
    }

    pub fn active_label(&self) -> &str {
        self.config.label_for(&self.active_user)
    }

    pub fn last_refresh(&self) -> Option<&RefreshReport> {
        self.last_refresh.as_ref()
    }

    pub fn storage_name(&self) -> String {
        self.store.backend_name()
    }

    pub fn switch_user(&mut self, key: &str) -> Result<(), AppError> {
        if !self.config.users.iter().any(|u| u.key == key) {
            return Err(RankingError::UnknownUser(key.to_string()).into());
        }
        self.active_user = key.to_string();
        info!("Active user is now {}", key);
        Ok(())
    }

    /// Pull the draft and re-flag the board
    ///
    /// On failure the board keeps the flags from the previous refresh.
    pub async fn refresh(&mut self) -> Result<&RefreshReport, AppError> {
        let snapshot = self.fetcher.fetch_snapshot().await.map_err(AppError::Fetch)?;
        Ok(self.apply_snapshot(snapshot))
    }

    /// Reconcile a fetched snapshot against the board
    pub fn apply_snapshot(&mut self, snapshot: DraftSnapshot) -> &RefreshReport {
        let summary = self.registry.apply_draft(&self.tables, &snapshot.directory, &snapshot.drafted);
        self.store.prune(&self.registry.available_names());

        info!("Draft refreshed: {} players drafted", snapshot.drafted.len());
        self.last_refresh.insert(RefreshReport {
            summary,
            drafted_ids: snapshot.drafted.len(),
            pick_count: snapshot.pick_count,
            refreshed_at: snapshot.fetched_at.with_timezone(&Local),
        })
    }

    pub fn board(&self, filter: &BoardFilter) -> Vec<&RankedPlayer> {
        self.registry.view(filter)
    }

    /// The active user's list after pruning, resolved to board rows
    pub fn my_rankings(&mut self) -> Vec<&RankedPlayer> {
        self.store.prune(&self.registry.available_names());
        let names = self.store.list(&self.active_user).unwrap_or(&[]);
        names.iter().filter_map(|name| self.registry.get_by_name(name)).collect()
    }

    /// Apply an edit to the active user's list and write it through
    pub async fn edit_rankings<R: Rng + ?Sized>(
        &mut self,
        edit: ListEdit,
        rng: &mut R,
    ) -> Result<SyncStatus, AppError> {
        let available = self.registry.available_names();
        self.store.prune(&available);
        let user = self.active_user.clone();

        let status = match edit {
            ListEdit::Add(input) => {
                let name = self.resolve_available(&input, &available)?;
                self.store.add(&user, &name, &available).await?
            }
            ListEdit::Remove(input) => {
                let name = self.resolve_ranked(&user, &input)?;
                self.store.remove(&user, &name, &available).await?
            }
            ListEdit::Up(position) => self.store.move_up(&user, index(position), &available).await?,
            ListEdit::Down(position) => {
                self.store.move_down(&user, index(position), &available).await?
            }
            ListEdit::Move { from, to } => {
                self.store.move_to(&user, index(from), index(to), &available).await?
            }
            ListEdit::Reverse => self.store.reverse(&user, &available).await?,
            ListEdit::Shuffle => self.store.shuffle(&user, &available, rng).await?,
            ListEdit::Reorder(positions) => {
                let current = self.store.list(&user)?;
                let order = positions
                    .iter()
                    .map(|p| {
                        current.get(index(*p)).cloned().ok_or(
                            RankingError::IndexOutOfRange {
                                index: index(*p),
                                len: current.len(),
                            },
                        )
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                self.store.reorder(&user, order, &available).await?
            }
        };

        Ok(status)
    }

    /// Team consensus over available players
    pub fn consensus(&mut self) -> Vec<ConsensusRow> {
        let available = self.registry.available_names();
        self.store.prune(&available);
        consensus(self.store.users(), self.store.state(), &available)
    }

    fn resolve_available(&self, input: &str, available: &HashSet<String>) -> Result<String, AppError> {
        match self.registry.find_name(input) {
            Some(name) if available.contains(name) => Ok(name.to_string()),
            _ => Err(AppError::UnknownPlayer(input.to_string())),
        }
    }

    /// A list position ("3", "#3") or a name already in the user's list
    fn resolve_ranked(&self, user: &str, input: &str) -> Result<String, AppError> {
        let list = self.store.list(user)?;

        if let Ok(position) = input.trim_start_matches('#').parse::<usize>() {
            return match position.checked_sub(1).and_then(|i| list.get(i)) {
                Some(name) => Ok(name.clone()),
                None => Err(RankingError::IndexOutOfRange {
                    index: position.saturating_sub(1),
                    len: list.len(),
                }
                .into()),
            };
        }

        let input = input.trim();
        list.iter()
            .find(|name| name.eq_ignore_ascii_case(input))
            .cloned()
            .or_else(|| self.registry.find_name(input).map(str::to_string))
            .ok_or_else(|| AppError::UnknownPlayer(input.to_string()))
    }
}

/// Typed list positions start at 1
fn index(position: usize) -> usize {
    position.saturating_sub(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use player_registry::{DirectoryEntry, DraftedIdSet};
    use ranking_store::InMemoryBackend;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use sleeper_fetcher::SleeperConfig;

    const BOARD: &str = "\
RK,TIERS,PLAYER NAME,TEAM,POS,AGE,BEST,WORST,AVG.,STD.DEV,ECR VS. ADP
1,1,Ja'Marr Chase,CIN,WR1,25,1,3,1.4,0.6,0
2,1,Josh Allen,BUF,QB1,29,1,8,2.9,1.7,+3
3,1,Bijan Robinson,ATL,RB1,23,1,6,3.1,1.2,-1
4,2,Marvin Harrison Jr.,ARI,WR2,22,3,20,9.8,4.1,-2
";

    fn app_with(config: AppConfig, backend: InMemoryBackend) -> AppState {
        let registry = PlayerRegistry::from_csv_reader(BOARD.as_bytes()).unwrap();
        let fetcher = SleeperFetcher::new(config.sleeper.clone()).unwrap();
        let store = RankingStore::new(Box::new(backend), config.user_keys());
        AppState::new(config, registry, fetcher, store)
    }

    fn app() -> (AppState, InMemoryBackend) {
        let backend = InMemoryBackend::new();
        (app_with(AppConfig::default(), backend.clone()), backend)
    }

    fn snapshot(drafted: &[&str]) -> DraftSnapshot {
        let entry = |id: &str, first: &str, last: &str| DirectoryEntry {
            id: id.to_string(),
            first_name: first.to_string(),
            last_name: last.to_string(),
            team: None,
            position: None,
        };
        DraftSnapshot {
            directory: vec![
                entry("4984", "Josh", "Allen"),
                entry("7564", "Ja'Marr", "Chase"),
                entry("9226", "Bijan", "Robinson"),
                entry("11632", "Marvin", "Harrison"),
            ],
            drafted: DraftedIdSet::from_ids(drafted.iter().copied()),
            pick_count: drafted.len(),
            fetched_at: chrono::Utc::now(),
        }
    }

    fn names(rows: &[&RankedPlayer]) -> Vec<String> {
        rows.iter().map(|p| p.name.clone()).collect()
    }

    async fn add_all(app: &mut AppState, players: &[&str]) {
        let mut rng = StdRng::seed_from_u64(1);
        for player in players {
            let status =
                app.edit_rankings(ListEdit::Add(player.to_string()), &mut rng).await.unwrap();
            assert!(status.is_synced());
        }
    }

    #[tokio::test]
    async fn test_init_fails_without_ranking_file() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let config = AppConfig {
            rankings_csv: temp_dir.path().join("missing.csv"),
            ..Default::default()
        };

        let err = AppState::init(config).await.err().unwrap();
        assert!(err.is_fatal());
    }

    #[tokio::test]
    async fn test_init_restores_saved_rankings() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let csv = temp_dir.path().join("rankings.csv");
        std::fs::write(&csv, BOARD).unwrap();
        let saved = temp_dir.path().join("user_rankings.json");
        std::fs::write(&saved, r#"{"kyle": ["Josh Allen"]}"#).unwrap();

        let mut config = AppConfig { rankings_csv: csv, ..Default::default() };
        config.storage.backend = ranking_store::BackendKind::Local;
        config.storage.local_path = saved;

        let (mut app, warnings) = AppState::init(config).await.unwrap();
        assert!(warnings.is_empty());
        app.switch_user("kyle").unwrap();
        assert_eq!(names(&app.my_rankings()), vec!["Josh Allen"]);
    }

    #[tokio::test]
    async fn test_override_marks_player_drafted_end_to_end() {
        let mut config = AppConfig::default();
        config.matching.overrides = vec!["Josh Allen".to_string()];
        let mut app = app_with(config, InMemoryBackend::new());

        let report = app.apply_snapshot(DraftSnapshot {
            directory: Vec::new(),
            drafted: DraftedIdSet::new(),
            pick_count: 0,
            fetched_at: chrono::Utc::now(),
        });
        assert_eq!(report.summary.overrides, 1);

        let allen = app.registry().get_by_name("Josh Allen").unwrap();
        assert!(allen.drafted);
        assert_eq!(allen.external_id.as_deref(), Some("manual_override"));
    }

    #[tokio::test]
    async fn test_reverse_is_written_through() {
        let (mut app, backend) = app();
        add_all(&mut app, &["Ja'Marr Chase", "Josh Allen", "Bijan Robinson"]).await;

        let mut rng = StdRng::seed_from_u64(1);
        let status = app.edit_rankings(ListEdit::Reverse, &mut rng).await.unwrap();
        assert!(status.is_synced());

        let expected = vec!["Bijan Robinson", "Josh Allen", "Ja'Marr Chase"];
        assert_eq!(names(&app.my_rankings()), expected);
        let saved = backend.stored().await.unwrap();
        assert_eq!(saved.list("nathan").unwrap().to_vec(), expected);
    }

    #[tokio::test]
    async fn test_add_resolves_loose_names_and_rejects_drafted() {
        let (mut app, _) = app();
        app.apply_snapshot(snapshot(&["4984"]));
        let mut rng = StdRng::seed_from_u64(1);

        let _ = app.edit_rankings(ListEdit::Add("bijan".to_string()), &mut rng).await.unwrap();
        assert_eq!(names(&app.my_rankings()), vec!["Bijan Robinson"]);

        let err = app.edit_rankings(ListEdit::Add("Josh Allen".to_string()), &mut rng).await;
        assert!(matches!(err, Err(AppError::UnknownPlayer(_))));
    }

    #[tokio::test]
    async fn test_drafted_player_is_pruned_everywhere() {
        let (mut app, backend) = app();
        add_all(&mut app, &["Josh Allen", "Ja'Marr Chase"]).await;
        app.switch_user("kyle").unwrap();
        add_all(&mut app, &["Ja'Marr Chase", "Josh Allen"]).await;

        app.apply_snapshot(snapshot(&["4984"]));

        assert_eq!(names(&app.my_rankings()), vec!["Ja'Marr Chase"]);
        let rows = app.consensus();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name, "Ja'Marr Chase");
        assert_eq!(rows[0].average_rank, 1.0);

        // Persisted history keeps the drafted name until the next edit
        let saved = backend.stored().await.unwrap();
        assert!(saved.list("kyle").unwrap().contains(&"Josh Allen".to_string()));
    }

    #[tokio::test]
    async fn test_consensus_averages_over_voters() {
        let (mut app, _) = app();
        add_all(&mut app, &["Ja'Marr Chase", "Bijan Robinson"]).await;
        app.switch_user("jack").unwrap();
        add_all(&mut app, &["Bijan Robinson", "Ja'Marr Chase"]).await;
        app.switch_user("kyle").unwrap();
        add_all(&mut app, &["Josh Allen"]).await;

        let rows = app.consensus();

        let averages: Vec<(String, f64)> =
            rows.iter().map(|r| (r.name.clone(), r.average_rank)).collect();
        assert_eq!(
            averages,
            vec![
                ("Josh Allen".to_string(), 1.0),
                ("Ja'Marr Chase".to_string(), 1.5),
                ("Bijan Robinson".to_string(), 1.5),
            ]
        );
        assert_eq!(rows[1].voters(), 2);
    }

    #[tokio::test]
    async fn test_remove_and_reorder_by_position() {
        let (mut app, _) = app();
        add_all(&mut app, &["Ja'Marr Chase", "Josh Allen", "Bijan Robinson"]).await;
        let mut rng = StdRng::seed_from_u64(1);

        let _ = app.edit_rankings(ListEdit::Reorder(vec![3, 1, 2]), &mut rng).await.unwrap();
        assert_eq!(names(&app.my_rankings()), vec!["Bijan Robinson", "Ja'Marr Chase", "Josh Allen"]);

        let _ = app.edit_rankings(ListEdit::Remove("#2".to_string()), &mut rng).await.unwrap();
        assert_eq!(names(&app.my_rankings()), vec!["Bijan Robinson", "Josh Allen"]);

        let _ = app.edit_rankings(ListEdit::Remove("josh allen".to_string()), &mut rng).await.unwrap();
        assert_eq!(names(&app.my_rankings()), vec!["Bijan Robinson"]);

        let err = app.edit_rankings(ListEdit::Remove("5".to_string()), &mut rng).await;
        assert!(matches!(err, Err(AppError::Ranking(_))));
    }

    #[tokio::test]
    async fn test_failed_save_is_a_warning_not_an_error() {
        let (mut app, backend) = app();
        add_all(&mut app, &["Josh Allen", "Bijan Robinson"]).await;
        backend.set_failing(true);
        let mut rng = StdRng::seed_from_u64(1);

        let status = app.edit_rankings(ListEdit::Up(2), &mut rng).await.unwrap();

        assert!(status.into_warning().is_some());
        assert_eq!(names(&app.my_rankings()), vec!["Bijan Robinson", "Josh Allen"]);
    }

    #[tokio::test]
    async fn test_refresh_failure_keeps_previous_flags() {
        let mut server = mockito::Server::new_async().await;
        server.mock("GET", "/players/nfl").with_status(500).create_async().await;

        let mut config = AppConfig::default();
        config.sleeper = SleeperConfig { base_url: server.url(), ..Default::default() };
        let mut app = app_with(config, InMemoryBackend::new());
        app.apply_snapshot(snapshot(&["4984"]));

        let err = app.refresh().await.err().unwrap();

        assert!(matches!(err, AppError::Fetch(_)));
        assert!(!err.is_fatal());
        assert!(!app.registry().is_available("Josh Allen"));
        assert!(app.last_refresh().is_some());
    }

    #[test]
    fn test_switch_to_unknown_user() {
        let (mut app, _) = app();
        assert!(app.switch_user("stranger").is_err());
        assert_eq!(app.active_user(), "nathan");
        assert_eq!(app.active_label(), "🔥 Nathan");
    }
}
