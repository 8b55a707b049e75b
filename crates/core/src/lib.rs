//! Core board logic - pure, deterministic, and testable
//!
//! This crate contains the match-3 rules: the tile grid, match detection, removal,
//! gravity, refill, move search and scoring. It has **zero dependencies** on rendering,
//! input, persistence or async runtimes, making it:
//!
//! - **Deterministic**: The same color supplier produces identical boards and cascades
//! - **Immutable**: Every board operation returns a new [`Board`] value
//! - **Thread-safe**: Plain values, no interior mutability, no globals besides the tile id counter
//!
//! # Module Structure
//!
//! - [`board`]: Tile grid with match detection, gravity, refill and move search
//! - [`rng`]: Injected color suppliers (seeded random and scripted)
//! - [`scoring`]: Run-based scoring with a cascade multiplier
//! - [`error`]: Construction errors for invalid configuration
//!
//! # Example
//!
//! ```
//! use match3_core::{Board, ScoringRules, ScriptedColors};
//! use match3_core::types::Position;
//!
//! let board = Board::from_glyphs(&["RRG", "BGR", "GBB"]).unwrap();
//!
//! // Swapping (2,0) with (2,1) completes a red row
//! let swapped = board.swap(Position::new(2, 0), Position::new(2, 1));
//! let matches = swapped.find_matches();
//! assert_eq!(matches.len(), 3);
//! assert_eq!(ScoringRules::default().score(&matches, 1), 10);
//!
//! // Clear, settle and refill
//! let mut colors = ScriptedColors::from_glyphs("PYO").unwrap();
//! let refilled = swapped
//!     .remove_tiles(&matches)
//!     .apply_gravity()
//!     .fill_empty_spaces(&mut colors);
//! assert!(refilled.is_full());
//! ```

pub mod board;
pub mod error;
pub mod rng;
pub mod scoring;

pub use match3_types as types;

// Re-export commonly used types for convenience
pub use board::Board;
pub use error::ConfigError;
pub use rng::{ColorSupplier, RandomColors, ScriptedColors, SimpleRng};
pub use scoring::{runs, Axis, Run, ScoringRules};
