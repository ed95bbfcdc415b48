//! Sleeper Fetcher
//!
//! Pulls the full NFL player directory and the current picks of one draft
//! from the Sleeper API. Both calls are made on demand; nothing is cached
//! between refreshes.

pub mod config;
pub mod fetcher;
pub mod models;

pub use config::SleeperConfig;
pub use fetcher::{DraftSnapshot, SleeperFetcher};
pub use models::*;
