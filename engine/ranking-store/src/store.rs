use crate::backend::RankingBackend;
use crate::error::{RankingError, StoreError};
use crate::state::RankingState;
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashSet;
use tracing::{info, warn};

/// Outcome of a write-through or load against the backend
///
/// A degraded sync never undoes the in-memory change.
#[must_use]
#[derive(Debug)]
pub enum SyncStatus {
    Synced,
    Degraded(StoreError),
}

impl SyncStatus {
    pub fn is_synced(&self) -> bool {
        matches!(self, SyncStatus::Synced)
    }

    /// The backend error, if the sync failed
    pub fn into_warning(self) -> Option<StoreError> {
        match self {
            SyncStatus::Synced => None,
            SyncStatus::Degraded(err) => Some(err),
        }
    }
}

/// Per-user ranking lists with write-through persistence
///
/// Each edit first prunes names that are no longer available, applies the
/// change to the in-memory list, then saves the whole document.
pub struct RankingStore {
    backend: Box<dyn RankingBackend>,
    users: Vec<String>,
    state: RankingState,
}

impl RankingStore {
    /// Create a store with an empty list per user; call `load` to restore
    pub fn new(backend: Box<dyn RankingBackend>, users: Vec<String>) -> Self {
        let state = RankingState::for_users(users.iter().cloned());
        Self { backend, users, state }
    }

    pub fn users(&self) -> &[String] {
        &self.users
    }

    pub fn state(&self) -> &RankingState {
        &self.state
    }

    pub fn backend_name(&self) -> String {
        self.backend.describe()
    }

    /// Restore saved lists
    ///
    /// Missing or unreadable state leaves an empty list per user; the error
    /// is only reported.
    pub async fn load(&mut self) -> SyncStatus {
        match self.backend.read().await {
            Ok(Some(mut state)) => {
                state.ensure_users(self.users.iter().cloned());
                self.state = state;
                info!("Loaded rankings from {}", self.backend.describe());
                SyncStatus::Synced
            }
            Ok(None) => {
                self.state = RankingState::for_users(self.users.iter().cloned());
                info!("No saved rankings in {}, starting empty", self.backend.describe());
                SyncStatus::Synced
            }
            Err(err) => {
                warn!("Failed to load rankings from {}: {}", self.backend.describe(), err);
                self.state = RankingState::for_users(self.users.iter().cloned());
                SyncStatus::Degraded(err)
            }
        }
    }

    /// Overwrite the stored document with the in-memory state
    pub async fn save(&self) -> SyncStatus {
        match self.backend.write(&self.state).await {
            Ok(()) => SyncStatus::Synced,
            Err(err) => {
                warn!("Failed to save rankings to {}: {}", self.backend.describe(), err);
                SyncStatus::Degraded(err)
            }
        }
    }

    /// One user's list as stored in memory
    pub fn list(&self, user: &str) -> Result<&[String], RankingError> {
        self.state.list(user).ok_or_else(|| RankingError::UnknownUser(user.to_string()))
    }

    /// Drop names that are no longer available from every list
    ///
    /// Only memory changes; the next edit persists the pruned lists.
    pub fn prune(&mut self, available: &HashSet<String>) -> usize {
        let mut removed = 0;
        for list in self.state.lists_mut() {
            let before = list.len();
            list.retain(|name| available.contains(name));
            removed += before - list.len();
        }
        if removed > 0 {
            info!("Pruned {} unavailable players from rankings", removed);
        }
        removed
    }

    async fn edit<F>(
        &mut self,
        user: &str,
        available: &HashSet<String>,
        change: F,
    ) -> Result<SyncStatus, RankingError>
    where
        F: FnOnce(&mut Vec<String>) -> Result<(), RankingError>,
    {
        if !self.users.iter().any(|u| u == user) {
            return Err(RankingError::UnknownUser(user.to_string()));
        }

        self.prune(available);
        let list = self
            .state
            .list_mut(user)
            .ok_or_else(|| RankingError::UnknownUser(user.to_string()))?;
        change(list)?;

        Ok(self.save().await)
    }

    /// Append an available player to the end of the list
    pub async fn add(
        &mut self,
        user: &str,
        name: &str,
        available: &HashSet<String>,
    ) -> Result<SyncStatus, RankingError> {
        self.edit(user, available, |list| {
            if !available.contains(name) {
                return Err(RankingError::UnavailablePlayer(name.to_string()));
            }
            if list.iter().any(|n| n == name) {
                return Err(RankingError::AlreadyRanked(name.to_string()));
            }
            list.push(name.to_string());
            Ok(())
        })
        .await
    }

    pub async fn remove(
        &mut self,
        user: &str,
        name: &str,
        available: &HashSet<String>,
    ) -> Result<SyncStatus, RankingError> {
        self.edit(user, available, |list| {
            let index = position_of(list, name)?;
            list.remove(index);
            Ok(())
        })
        .await
    }

    /// Swap the entry at `index` with the one above it; the top entry stays put
    pub async fn move_up(
        &mut self,
        user: &str,
        index: usize,
        available: &HashSet<String>,
    ) -> Result<SyncStatus, RankingError> {
        self.edit(user, available, |list| {
            check_index(list, index)?;
            if index > 0 {
                list.swap(index - 1, index);
            }
            Ok(())
        })
        .await
    }

    /// Swap the entry at `index` with the one below it; the bottom entry stays put
    pub async fn move_down(
        &mut self,
        user: &str,
        index: usize,
        available: &HashSet<String>,
    ) -> Result<SyncStatus, RankingError> {
        self.edit(user, available, |list| {
            check_index(list, index)?;
            if index + 1 < list.len() {
                list.swap(index, index + 1);
            }
            Ok(())
        })
        .await
    }

    /// Take the entry at `from` out and reinsert it at `to`
    pub async fn move_to(
        &mut self,
        user: &str,
        from: usize,
        to: usize,
        available: &HashSet<String>,
    ) -> Result<SyncStatus, RankingError> {
        self.edit(user, available, |list| {
            check_index(list, from)?;
            check_index(list, to)?;
            let name = list.remove(from);
            list.insert(to, name);
            Ok(())
        })
        .await
    }

    pub async fn reverse(
        &mut self,
        user: &str,
        available: &HashSet<String>,
    ) -> Result<SyncStatus, RankingError> {
        self.edit(user, available, |list| {
            list.reverse();
            Ok(())
        })
        .await
    }

    pub async fn shuffle<R: Rng + ?Sized>(
        &mut self,
        user: &str,
        available: &HashSet<String>,
        rng: &mut R,
    ) -> Result<SyncStatus, RankingError> {
        self.edit(user, available, |list| {
            list.shuffle(rng);
            Ok(())
        })
        .await
    }

    /// Replace the list with `order`, which must hold exactly the current names
    pub async fn reorder(
        &mut self,
        user: &str,
        order: Vec<String>,
        available: &HashSet<String>,
    ) -> Result<SyncStatus, RankingError> {
        self.edit(user, available, |list| {
            let current: HashSet<&String> = list.iter().collect();
            let proposed: HashSet<&String> = order.iter().collect();
            if order.len() != list.len() || proposed.len() != order.len() || current != proposed {
                return Err(RankingError::NotAPermutation);
            }
            *list = order;
            Ok(())
        })
        .await
    }
}

fn position_of(list: &[String], name: &str) -> Result<usize, RankingError> {
    list.iter().position(|n| n == name).ok_or_else(|| RankingError::NotRanked(name.to_string()))
}

fn check_index(list: &[String], index: usize) -> Result<(), RankingError> {
    if index >= list.len() {
        return Err(RankingError::IndexOutOfRange { index, len: list.len() });
    }
    Ok(())
}
