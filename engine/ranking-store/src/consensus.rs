//! Team consensus ranking
//!
//! A player's consensus rank is the mean of the 1-based positions given by
//! the members who ranked them. Members who left a player out are absent from
//! that mean, not penalized.

use crate::state::RankingState;
use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// One member's position for a player
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserRank {
    pub user: String,
    pub rank: usize,
}

/// A player ranked by at least one member
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConsensusRow {
    pub name: String,
    pub average_rank: f64,
    pub ranks: Vec<UserRank>,
}

impl ConsensusRow {
    /// Number of members who ranked the player
    pub fn voters(&self) -> usize {
        self.ranks.len()
    }
}

/// Rows for every available player in any member's list, best average first
///
/// Lists are read in `users` order; equal averages keep the order in which
/// players were first seen. Players missing from `available` (drafted or no
/// longer on the board) never appear, even if a stale list still holds them,
/// and do not count toward the positions of the names below them.
pub fn consensus(
    users: &[String],
    state: &RankingState,
    available: &HashSet<String>,
) -> Vec<ConsensusRow> {
    let mut rows: Vec<ConsensusRow> = Vec::new();
    let mut row_index: HashMap<&str, usize> = HashMap::new();

    for user in users {
        let Some(list) = state.list(user) else {
            continue;
        };

        // Positions count available names only, as the pruned list shows them
        for (index, name) in list.iter().filter(|name| available.contains(*name)).enumerate() {
            let slot = *row_index.entry(name.as_str()).or_insert_with(|| {
                rows.push(ConsensusRow { name: name.clone(), average_rank: 0.0, ranks: Vec::new() });
                rows.len() - 1
            });
            rows[slot].ranks.push(UserRank { user: user.clone(), rank: index + 1 });
        }
    }

    for row in &mut rows {
        let total: usize = row.ranks.iter().map(|r| r.rank).sum();
        row.average_rank = total as f64 / row.ranks.len() as f64;
    }

    rows.sort_by(|a, b| a.average_rank.total_cmp(&b.average_rank));
    rows
}
