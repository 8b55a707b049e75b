//! JSON file adapter for the high-score store
//!
//! The file holds a single document, `{"high_score": 1234}`. A missing file reads as a
//! high score of 0. Writes go to a sibling temp file first and are renamed into place.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::engine::{HighScoreStore, StoreError};

#[derive(Debug, Default, Serialize, Deserialize)]
struct HighScoreFile {
    high_score: u32,
}

/// High score persisted as JSON on disk
#[derive(Debug)]
pub struct FileHighScoreStore {
    path: PathBuf,
    /// Serializes read-check-write cycles within this process
    lock: Mutex<()>,
}

impl FileHighScoreStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read(&self) -> Result<u32, StoreError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(StoreError::Io(e.to_string())),
        };
        let doc: HighScoreFile =
            serde_json::from_slice(&bytes).map_err(|e| StoreError::Corrupt(e.to_string()))?;
        Ok(doc.high_score)
    }

    async fn write(&self, score: u32) -> Result<(), StoreError> {
        let doc = HighScoreFile { high_score: score };
        let json = serde_json::to_vec_pretty(&doc).map_err(|e| StoreError::Io(e.to_string()))?;

        let tmp = self.path.with_extension("tmp");
        tokio::fs::write(&tmp, json)
            .await
            .map_err(|e| StoreError::Io(e.to_string()))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| StoreError::Io(e.to_string()))
    }
}

#[async_trait]
impl HighScoreStore for FileHighScoreStore {
    async fn high_score(&self) -> Result<u32, StoreError> {
        let _guard = self.lock.lock().await;
        self.read().await
    }

    async fn save_high_score(&self, score: u32) -> Result<bool, StoreError> {
        let _guard = self.lock.lock().await;
        // Re-read: another process (or an older session) may have written since we loaded.
        let current = self.read().await?;
        if score <= current {
            return Ok(false);
        }
        self.write(score).await?;
        Ok(true)
    }
}
