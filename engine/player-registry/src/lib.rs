//! Player Registry - the static ranking board and its link to the live draft
//!
//! This crate loads the ranked player table exported by the ranking provider
//! and reconciles each row against the draft service's player directory so
//! that drafted players can be flagged.

pub mod matching;
pub mod names;
pub mod registry;
pub mod types;

pub use matching::{MatchSummary, MatchTables, MatchTier, Reconciler, MANUAL_OVERRIDE_ID};
pub use registry::{BoardFilter, BoardSummary, PlayerRegistry};
pub use types::{DirectoryEntry, DraftedIdSet, RankedPlayer, RegistryError};
