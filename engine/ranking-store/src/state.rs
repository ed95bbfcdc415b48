use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The persisted rankings document: user key to ordered player names
///
/// Serialized as a plain JSON object, `{"nathan": ["Josh Allen", ...], ...}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RankingState {
    lists: BTreeMap<String, Vec<String>>,
}

impl RankingState {
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty list for each user
    pub fn for_users<I, S>(users: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut state = Self::new();
        state.ensure_users(users);
        state
    }

    /// Add an empty list for every user without one; existing lists are kept
    pub fn ensure_users<I, S>(&mut self, users: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for user in users {
            self.lists.entry(user.into()).or_default();
        }
    }

    pub fn list(&self, user: &str) -> Option<&[String]> {
        self.lists.get(user).map(Vec::as_slice)
    }

    pub(crate) fn list_mut(&mut self, user: &str) -> Option<&mut Vec<String>> {
        self.lists.get_mut(user)
    }

    pub(crate) fn lists_mut(&mut self) -> impl Iterator<Item = &mut Vec<String>> {
        self.lists.values_mut()
    }

    /// Replace one user's list wholesale
    pub fn set_list(&mut self, user: impl Into<String>, names: Vec<String>) {
        self.lists.insert(user.into(), names);
    }

    pub fn users(&self) -> impl Iterator<Item = &str> {
        self.lists.keys().map(String::as_str)
    }
}
