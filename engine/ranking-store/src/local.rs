//! Local file-based rankings document

use crate::backend::RankingBackend;
use crate::error::Result;
use crate::state::RankingState;
use std::path::{Path, PathBuf};

/// Rankings document kept as pretty-printed JSON on disk
pub struct LocalFileBackend {
    path: PathBuf,
}

impl LocalFileBackend {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self { path: path.as_ref().to_path_buf() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait::async_trait]
impl RankingBackend for LocalFileBackend {
    async fn read(&self) -> Result<Option<RankingState>> {
        if !tokio::fs::try_exists(&self.path).await? {
            return Ok(None);
        }

        let content = tokio::fs::read_to_string(&self.path).await?;
        Ok(Some(serde_json::from_str(&content)?))
    }

    async fn write(&self, state: &RankingState) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        // Write beside the target and rename so a crash never leaves half a document
        let temp_path = self.path.with_extension("json.tmp");
        tokio::fs::write(&temp_path, serde_json::to_string_pretty(state)?).await?;
        tokio::fs::rename(&temp_path, &self.path).await?;

        tracing::debug!("Saved rankings to {:?}", self.path);
        Ok(())
    }

    fn describe(&self) -> String {
        format!("file:{}", self.path.display())
    }
}
