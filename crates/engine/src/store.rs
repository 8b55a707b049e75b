//! High-score persistence boundary
//!
//! The session only knows the [`HighScoreStore`] capability. Concrete storage (a file,
//! a key-value store, platform preferences) is an adapter chosen by the embedding
//! application. [`MemoryHighScoreStore`] is the in-process default.

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::Mutex;

/// Failure talking to a high-score backend
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("high score storage I/O failed: {0}")]
    Io(String),

    #[error("stored high score is corrupt: {0}")]
    Corrupt(String),

    #[error("high score storage unavailable: {0}")]
    Unavailable(String),
}

/// Async get/save access to the persisted high score
#[async_trait]
pub trait HighScoreStore: Send + Sync {
    /// Current high score, 0 if none was ever saved
    async fn high_score(&self) -> Result<u32, StoreError>;

    /// Save `score` if it beats the stored value.
    ///
    /// Implementations must re-check against their own stored value, since the caller's
    /// view may be stale. Returns whether `score` became the new high score.
    async fn save_high_score(&self, score: u32) -> Result<bool, StoreError>;
}

/// High score kept in memory for the lifetime of the store
#[derive(Debug, Default)]
pub struct MemoryHighScoreStore {
    best: Mutex<u32>,
    failing: bool,
}

impl MemoryHighScoreStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with an existing high score
    pub fn with_high_score(score: u32) -> Self {
        Self {
            best: Mutex::new(score),
            failing: false,
        }
    }

    /// Store whose every operation fails with [`StoreError::Unavailable`]
    pub fn failing() -> Self {
        Self {
            best: Mutex::new(0),
            failing: true,
        }
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.failing {
            return Err(StoreError::Unavailable("memory store configured to fail".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl HighScoreStore for MemoryHighScoreStore {
    async fn high_score(&self) -> Result<u32, StoreError> {
        self.check()?;
        Ok(*self.best.lock().await)
    }

    async fn save_high_score(&self, score: u32) -> Result<bool, StoreError> {
        self.check()?;
        let mut best = self.best.lock().await;
        if score > *best {
            *best = score;
            Ok(true)
        } else {
            Ok(false)
        }
    }
}
