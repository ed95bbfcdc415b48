//! Identity reconciliation between the ranking board and the draft directory
//!
//! Names are the only join key the two sources share, so each ranked player is
//! resolved through a fixed sequence of tiers and the first tier that succeeds
//! wins:
//!
//! 1. **Override** - the display name is on the manual override list and is
//!    always treated as drafted
//! 2. **Exact** - case-insensitive match on the directory's "first last"
//! 3. **Alias** - one of the configured alternate spellings matches exactly
//! 4. **Suffix** - both names match once " Jr.", " II" or " III" are dropped
//!
//! A directory entry may satisfy several ranked rows; that ambiguity is
//! accepted and not reported.

use crate::names::{fold, suffix_key};
use crate::types::{DirectoryEntry, DraftedIdSet, RankedPlayer};
use std::collections::{HashMap, HashSet};
use tracing::{debug, info};

/// Id recorded for players resolved through the override list
pub const MANUAL_OVERRIDE_ID: &str = "manual_override";

/// Alternate spellings used by the draft directory for ranking-board names
const BUILTIN_ALIASES: &[(&str, &[&str])] = &[
    ("DJ Moore", &["D.J. Moore"]),
    ("Hollywood Brown", &["Marquise Brown"]),
    ("Chig Okonkwo", &["Chigoziem Okonkwo"]),
    ("Gabe Davis", &["Gabriel Davis"]),
    ("Josh Palmer", &["Joshua Palmer"]),
    ("Tank Dell", &["Nathaniel Dell"]),
];

/// Which tier resolved a ranked player
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchTier {
    Override,
    Exact,
    Alias,
    Suffix,
}

/// Override and alias tables consulted before and alongside directory lookup
#[derive(Debug, Clone, Default)]
pub struct MatchTables {
    overrides: HashSet<String>,
    aliases: HashMap<String, Vec<String>>,
}

impl MatchTables {
    /// Empty tables: no overrides, no aliases
    pub fn new() -> Self {
        Self::default()
    }

    /// Tables seeded with the built-in alias list
    pub fn builtin() -> Self {
        let mut tables = Self::new();
        for (name, accepts) in BUILTIN_ALIASES {
            tables = tables.with_alias(*name, accepts.iter().copied());
        }
        tables
    }

    /// Always treat `name` as drafted
    pub fn with_override(mut self, name: impl Into<String>) -> Self {
        self.overrides.insert(name.into().trim().to_string());
        self
    }

    /// Accept each of `accepts` as a directory spelling of `name`
    pub fn with_alias<I, S>(mut self, name: impl Into<String>, accepts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let entry = self.aliases.entry(name.into().trim().to_string()).or_default();
        for alias in accepts {
            let alias = alias.into();
            if !entry.contains(&alias) {
                entry.push(alias);
            }
        }
        self
    }

    pub fn is_override(&self, name: &str) -> bool {
        self.overrides.contains(name.trim())
    }

    pub fn aliases_for(&self, name: &str) -> &[String] {
        self.aliases.get(name.trim()).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Counts of how each ranked player was resolved during one refresh
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatchSummary {
    pub overrides: usize,
    pub exact: usize,
    pub alias: usize,
    pub suffix: usize,
    pub unmatched: usize,
    pub drafted: usize,
}

impl MatchSummary {
    fn record(&mut self, tier: MatchTier) {
        match tier {
            MatchTier::Override => self.overrides += 1,
            MatchTier::Exact => self.exact += 1,
            MatchTier::Alias => self.alias += 1,
            MatchTier::Suffix => self.suffix += 1,
        }
    }

    pub fn matched(&self) -> usize {
        self.overrides + self.exact + self.alias + self.suffix
    }
}

/// Resolves ranked display names to directory ids
///
/// The directory is indexed once per refresh; in both indexes the first entry
/// in directory order keeps a contested name.
pub struct Reconciler<'a> {
    tables: &'a MatchTables,
    by_full_name: HashMap<String, String>,
    by_suffix_key: HashMap<String, String>,
}

impl<'a> Reconciler<'a> {
    pub fn new(tables: &'a MatchTables, directory: &[DirectoryEntry]) -> Self {
        let mut by_full_name = HashMap::with_capacity(directory.len());
        let mut by_suffix_key = HashMap::with_capacity(directory.len());

        for entry in directory {
            let full_name = entry.full_name();
            if full_name.is_empty() {
                continue;
            }
            by_full_name.entry(fold(&full_name)).or_insert_with(|| entry.id.clone());
            by_suffix_key.entry(suffix_key(&full_name)).or_insert_with(|| entry.id.clone());
        }

        Self { tables, by_full_name, by_suffix_key }
    }

    /// Find the directory id for a ranked display name
    pub fn resolve(&self, display_name: &str) -> Option<(MatchTier, &str)> {
        if self.tables.is_override(display_name) {
            return Some((MatchTier::Override, MANUAL_OVERRIDE_ID));
        }

        if let Some(id) = self.by_full_name.get(&fold(display_name)) {
            return Some((MatchTier::Exact, id.as_str()));
        }

        for alias in self.tables.aliases_for(display_name) {
            if let Some(id) = self.by_full_name.get(&fold(alias)) {
                return Some((MatchTier::Alias, id.as_str()));
            }
        }

        self.by_suffix_key.get(&suffix_key(display_name)).map(|id| (MatchTier::Suffix, id.as_str()))
    }

    /// Set `drafted` and `external_id` on every ranked player
    ///
    /// Previous values are overwritten, so a player dropped from the draft
    /// (or from the directory) becomes available again.
    pub fn reconcile(&self, players: &mut [RankedPlayer], drafted: &DraftedIdSet) -> MatchSummary {
        let mut summary = MatchSummary::default();

        for player in players.iter_mut() {
            match self.resolve(&player.name) {
                Some((tier, id)) => {
                    summary.record(tier);
                    player.drafted = tier == MatchTier::Override || drafted.contains(id);
                    player.external_id = Some(id.to_string());
                }
                None => {
                    debug!("No directory match for '{}'", player.name);
                    summary.unmatched += 1;
                    player.drafted = false;
                    player.external_id = None;
                }
            }

            if player.drafted {
                summary.drafted += 1;
            }
        }

        info!(
            "Reconciled {} players: {} override, {} exact, {} alias, {} suffix, {} unmatched ({} drafted)",
            players.len(),
            summary.overrides,
            summary.exact,
            summary.alias,
            summary.suffix,
            summary.unmatched,
            summary.drafted
        );

        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: &str, first: &str, last: &str) -> DirectoryEntry {
        DirectoryEntry {
            id: id.to_string(),
            first_name: first.to_string(),
            last_name: last.to_string(),
            team: None,
            position: None,
        }
    }

    fn ranked(name: &str) -> RankedPlayer {
        RankedPlayer {
            rank: 1,
            tier: 1,
            name: name.to_string(),
            team: "FA".to_string(),
            position: "WR1".to_string(),
            age: None,
            best: None,
            worst: None,
            average: None,
            std_dev: None,
            ecr_vs_adp: None,
            drafted: false,
            external_id: None,
        }
    }

    fn directory() -> Vec<DirectoryEntry> {
        vec![
            entry("4984", "Josh", "Allen"),
            entry("11632", "Marvin", "Harrison"),
            entry("4983", "DJ", "Moore"),
            entry("4866", "D.J.", "Moore"),
            entry("8155", "Kenneth", "Walker"),
        ]
    }

    #[test]
    fn test_exact_match_is_case_insensitive() {
        let tables = MatchTables::new();
        let directory = directory();
        let reconciler = Reconciler::new(&tables, &directory);

        assert_eq!(reconciler.resolve("JOSH ALLEN"), Some((MatchTier::Exact, "4984")));
    }

    #[test]
    fn test_first_directory_entry_wins() {
        let tables = MatchTables::new();
        let directory = vec![entry("1", "Mike", "Williams"), entry("2", "Mike", "Williams")];
        let reconciler = Reconciler::new(&tables, &directory);

        assert_eq!(reconciler.resolve("Mike Williams"), Some((MatchTier::Exact, "1")));
    }

    #[test]
    fn test_exact_beats_alias() {
        let tables = MatchTables::builtin();
        let directory = directory();
        let reconciler = Reconciler::new(&tables, &directory);

        // "DJ Moore" exists verbatim, so the "D.J. Moore" alias is never consulted
        assert_eq!(reconciler.resolve("DJ Moore"), Some((MatchTier::Exact, "4983")));
    }

    #[test]
    fn test_alias_match() {
        let tables = MatchTables::new().with_alias("Hollywood Brown", ["Marquise Brown"]);
        let directory = vec![entry("5848", "Marquise", "Brown")];
        let reconciler = Reconciler::new(&tables, &directory);

        assert_eq!(reconciler.resolve("Hollywood Brown"), Some((MatchTier::Alias, "5848")));
    }

    #[test]
    fn test_suffix_normalized_match() {
        let tables = MatchTables::new();
        let directory = directory();
        let reconciler = Reconciler::new(&tables, &directory);

        assert_eq!(reconciler.resolve("Marvin Harrison Jr."), Some((MatchTier::Suffix, "11632")));
        assert_eq!(reconciler.resolve("Kenneth Walker III"), Some((MatchTier::Suffix, "8155")));
    }

    #[test]
    fn test_suffix_on_directory_side() {
        let tables = MatchTables::new();
        let directory = vec![entry("9509", "Brian", "Thomas Jr.")];
        let reconciler = Reconciler::new(&tables, &directory);

        assert_eq!(reconciler.resolve("Brian Thomas"), Some((MatchTier::Suffix, "9509")));
    }

    #[test]
    fn test_override_ignores_directory() {
        let tables = MatchTables::new().with_override("Josh Allen");
        let directory = directory();
        let reconciler = Reconciler::new(&tables, &directory);

        let mut players = vec![ranked("Josh Allen")];
        let summary = reconciler.reconcile(&mut players, &DraftedIdSet::new());

        assert!(players[0].drafted);
        assert_eq!(players[0].external_id.as_deref(), Some(MANUAL_OVERRIDE_ID));
        assert_eq!(summary.overrides, 1);
        assert_eq!(summary.drafted, 1);
    }

    #[test]
    fn test_override_with_empty_directory() {
        let tables = MatchTables::new().with_override("Josh Allen");
        let reconciler = Reconciler::new(&tables, &[]);

        let mut players = vec![ranked("Josh Allen")];
        reconciler.reconcile(&mut players, &DraftedIdSet::new());

        assert!(players[0].drafted);
        assert_eq!(players[0].external_id.as_deref(), Some("manual_override"));
    }

    #[test]
    fn test_reconcile_flags_drafted_players() {
        let tables = MatchTables::new();
        let directory = directory();
        let reconciler = Reconciler::new(&tables, &directory);

        let mut players = vec![ranked("Josh Allen"), ranked("Kenneth Walker III")];
        let drafted = DraftedIdSet::from_ids(["4984"]);
        let summary = reconciler.reconcile(&mut players, &drafted);

        assert!(players[0].drafted);
        assert_eq!(players[0].external_id.as_deref(), Some("4984"));
        assert!(!players[1].drafted);
        assert_eq!(players[1].external_id.as_deref(), Some("8155"));
        assert_eq!(summary.exact, 1);
        assert_eq!(summary.suffix, 1);
        assert_eq!(summary.drafted, 1);
    }

    #[test]
    fn test_unmatched_player_is_reset() {
        let tables = MatchTables::new();
        let reconciler = Reconciler::new(&tables, &[]);

        let mut player = ranked("Nobody Known");
        player.drafted = true;
        player.external_id = Some("stale".to_string());
        let mut players = vec![player];

        let summary = reconciler.reconcile(&mut players, &DraftedIdSet::new());

        assert!(!players[0].drafted);
        assert_eq!(players[0].external_id, None);
        assert_eq!(summary.unmatched, 1);
        assert_eq!(summary.matched(), 0);
    }

    #[test]
    fn test_one_directory_entry_can_match_many_rows() {
        let tables = MatchTables::new();
        let directory = vec![entry("7", "Marvin", "Harrison")];
        let reconciler = Reconciler::new(&tables, &directory);

        let mut players = vec![ranked("Marvin Harrison"), ranked("Marvin Harrison Jr.")];
        reconciler.reconcile(&mut players, &DraftedIdSet::from_ids(["7"]));

        assert!(players.iter().all(|p| p.drafted && p.external_id.as_deref() == Some("7")));
    }
}
