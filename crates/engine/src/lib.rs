//! Session engine - sequencing board operations into a playable game
//!
//! Where `match3-core` answers "what happens to this board", this crate answers "what
//! happens next": it keeps the single mutable [`GameSession`], runs the tap state machine
//! and the cascade loop, publishes [`GameSnapshot`]s to an observer and talks to the
//! high-score store.
//!
//! # Module Structure
//!
//! - [`session`]: Tap state machine, swap resolution, cascade loop, game over
//! - [`snapshot`]: Published state, update messages and tap outcomes
//! - [`store`]: High-score store capability and the in-memory adapter
//! - [`config`]: Board size, palette, seed and scoring, from `MATCH3_*` variables
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use match3_engine::{GameConfig, GameSession, MemoryHighScoreStore};
//!
//! # tokio_test::block_on(async {
//! let config = GameConfig { seed: Some(7), ..GameConfig::default() };
//! let mut session = GameSession::start(config, Arc::new(MemoryHighScoreStore::new()))
//!     .await
//!     .unwrap();
//!
//! // A fresh session is settled: no matches left on the board
//! assert!(session.board().find_matches().is_empty());
//! assert_eq!(session.score(), 0);
//!
//! if let Some((a, b)) = session.hint() {
//!     session.tap_tile(a);
//!     session.tap_tile(b);
//!     assert!(session.score() >= 10);
//! }
//! # });
//! ```

pub mod config;
pub mod session;
pub mod snapshot;
pub mod store;

pub use match3_core as core;
pub use match3_types as types;

pub use config::GameConfig;
pub use session::GameSession;
pub use snapshot::{GameSnapshot, ResolutionStep, SessionPhase, SessionUpdate, TapOutcome};
pub use store::{HighScoreStore, MemoryHighScoreStore, StoreError};
