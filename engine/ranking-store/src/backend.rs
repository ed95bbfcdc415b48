//! Persistence backend trait and implementations

use crate::config::{BackendKind, StoreConfig};
use crate::error::{Result, StoreError};
use crate::github::GithubBackend;
use crate::local::LocalFileBackend;
use crate::state::RankingState;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Abstract trait for the rankings document store
///
/// Every backend holds exactly one document and overwrites it wholesale;
/// concurrent writers are not coordinated, the last write wins.
#[async_trait::async_trait]
pub trait RankingBackend: Send + Sync {
    /// Read the stored document, `None` when nothing was saved yet
    async fn read(&self) -> Result<Option<RankingState>>;

    /// Replace the stored document
    async fn write(&self, state: &RankingState) -> Result<()>;

    /// Human-readable location, for logs and the status line
    fn describe(&self) -> String;
}

/// Pick a backend from configuration and an optional access token
pub fn select_backend(
    config: &StoreConfig,
    token: Option<String>,
) -> Result<Box<dyn RankingBackend>> {
    let remote_ready = config.github.repo.is_some() && token.is_some();

    match (config.backend, token) {
        (BackendKind::Github, None) => Err(StoreError::config(format!(
            "GitHub backend selected but ${} is not set",
            config.github.token_env
        ))),
        (BackendKind::Github, Some(token)) => {
            Ok(Box::new(GithubBackend::new(config.github.clone(), token)?))
        }
        (BackendKind::Auto, Some(token)) if remote_ready => {
            Ok(Box::new(GithubBackend::new(config.github.clone(), token)?))
        }
        _ => Ok(Box::new(LocalFileBackend::new(&config.local_path))),
    }
}

/// Pick a backend, reading the token from the configured environment variable
pub fn open_backend(config: &StoreConfig) -> Result<Box<dyn RankingBackend>> {
    let token = std::env::var(&config.github.token_env).ok().filter(|t| !t.trim().is_empty());
    let backend = select_backend(config, token)?;
    tracing::info!("Rankings stored in {}", backend.describe());
    Ok(backend)
}

/// In-memory backend (for testing)
///
/// Clones share the same document, so a test can keep a handle while the
/// store owns another.
#[derive(Clone, Default)]
pub struct InMemoryBackend {
    document: Arc<tokio::sync::Mutex<Option<RankingState>>>,
    failing: Arc<AtomicBool>,
}

impl InMemoryBackend {
    /// Create a new empty in-memory backend
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a backend that already holds `state`
    pub fn with_state(state: RankingState) -> Self {
        Self { document: Arc::new(tokio::sync::Mutex::new(Some(state))), ..Default::default() }
    }

    /// Make every read and write fail until reset
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Current stored document
    pub async fn stored(&self) -> Option<RankingState> {
        self.document.lock().await.clone()
    }

    fn check(&self) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StoreError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                "in-memory backend set to fail",
            )));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl RankingBackend for InMemoryBackend {
    async fn read(&self) -> Result<Option<RankingState>> {
        self.check()?;
        Ok(self.document.lock().await.clone())
    }

    async fn write(&self, state: &RankingState) -> Result<()> {
        self.check()?;
        *self.document.lock().await = Some(state.clone());
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}
