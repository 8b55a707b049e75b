//! Match-3 (workspace facade crate).
//!
//! This package exposes `match3::{types,core,engine}` while the implementation lives in
//! dedicated crates under `crates/`. It also carries the storage adapter used by the
//! `match3` binary, since picking a storage backend is the embedding application's job.

pub mod file_store;

pub use match3_core as core;
pub use match3_engine as engine;
pub use match3_types as types;

pub use file_store::FileHighScoreStore;
