//! # Ranking Store
//!
//! Holds one ordered list of player names per team member, writes the whole
//! mapping through to a persistence backend after every change, and derives
//! the team consensus ranking from those lists.
//!
//! ## Architecture
//!
//! - **RankingBackend**: read/write contract for the single rankings document
//! - **LocalFileBackend**: JSON file on the local filesystem
//! - **GithubBackend**: the same document kept in a GitHub repository
//! - **RankingStore**: in-memory lists, mutations, pruning and write-through
//! - **consensus**: average rank across the members who ranked a player
//!
//! ## Usage
//!
//! ```rust
//! use ranking_store::{InMemoryBackend, RankingStore};
//! use std::collections::HashSet;
//!
//! #[tokio::main]
//! async fn main() {
//!     let users = vec!["nathan".to_string(), "kyle".to_string()];
//!     let mut store = RankingStore::new(Box::new(InMemoryBackend::new()), users);
//!     let _ = store.load().await;
//!
//!     let available: HashSet<String> = ["Josh Allen".to_string()].into_iter().collect();
//!     let status = store.add("nathan", "Josh Allen", &available).await.unwrap();
//!     assert!(status.is_synced());
//! }
//! ```

pub mod backend;
pub mod config;
pub mod consensus;
pub mod error;
pub mod github;
pub mod local;
pub mod state;
pub mod store;

pub use backend::{open_backend, select_backend, InMemoryBackend, RankingBackend};
pub use config::{BackendKind, GithubConfig, StoreConfig};
pub use consensus::{consensus, ConsensusRow, UserRank};
pub use error::{RankingError, Result, StoreError};
pub use github::GithubBackend;
pub use local::LocalFileBackend;
pub use state::RankingState;
pub use store::{RankingStore, SyncStatus};
