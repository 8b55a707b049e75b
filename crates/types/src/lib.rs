//! Core types module - shared data structures and constants
//!
//! This module defines the fundamental types used throughout the engine.
//! All types are plain values with no behavior beyond construction and comparison,
//! making them usable in any context (board logic, session orchestration, observers).
//!
//! # Coordinates
//!
//! Positions are `(x, y)` pairs where `x` is the column (left to right) and `y` is the
//! row (top to bottom). Row 0 is the top of the board; gravity pulls tiles towards the
//! highest row index.
//!
//! # Gameplay Constants
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `MIN_MATCH` | 3 | Shortest run that counts as a match |
//! | `THREE_MATCH_POINTS` | 10 | Points for a run of exactly 3 |
//! | `FOUR_PLUS_MATCH_POINTS` | 20 | Points for any run of 4 or more |
//! | `CASCADE_MULTIPLIER` | 1.5 | Per-level multiplier for cascades |
//! | `DEFAULT_BOARD_WIDTH` | 8 | Default number of columns |
//! | `DEFAULT_BOARD_HEIGHT` | 8 | Default number of rows |
//!
//! # Examples
//!
//! ```
//! use match3_types::{Position, TileColor, TileId};
//!
//! let a = Position::new(2, 3);
//! assert!(a.is_adjacent_to(Position::new(3, 3)));
//! assert!(!a.is_adjacent_to(Position::new(3, 4)));
//!
//! assert_eq!(TileColor::from_str("Blue"), Some(TileColor::Blue));
//! assert_eq!(TileColor::Blue.glyph(), 'B');
//!
//! let first = TileId::next();
//! let second = TileId::next();
//! assert!(second > first);
//! ```

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Shortest run of same-colored tiles that counts as a match
pub const MIN_MATCH: usize = 3;

/// Points awarded for a run of exactly three tiles
pub const THREE_MATCH_POINTS: u32 = 10;

/// Points awarded for a run of four or more tiles (flat, no extra for 5+)
pub const FOUR_PLUS_MATCH_POINTS: u32 = 20;

/// Multiplier applied once per cascade level beyond the first
pub const CASCADE_MULTIPLIER: f64 = 1.5;

/// Default board width in cells
pub const DEFAULT_BOARD_WIDTH: usize = 8;

/// Default board height in cells
pub const DEFAULT_BOARD_HEIGHT: usize = 8;

/// Integer cell coordinate on the board.
///
/// Coordinates are signed so neighbour arithmetic can step off the board; such
/// positions are simply rejected by the board's bounds check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// True when `other` is directly left, right, above or below this position.
    ///
    /// Diagonal neighbours are not adjacent, and a position is not adjacent to itself.
    ///
    /// ```
    /// use match3_types::Position;
    ///
    /// let p = Position::new(1, 1);
    /// assert!(p.is_adjacent_to(Position::new(1, 0)));
    /// assert!(p.is_adjacent_to(Position::new(0, 1)));
    /// assert!(!p.is_adjacent_to(Position::new(2, 2)));
    /// assert!(!p.is_adjacent_to(p));
    /// ```
    pub fn is_adjacent_to(&self, other: Position) -> bool {
        let dx = (self.x - other.x).abs();
        let dy = (self.y - other.y).abs();
        (dx == 1 && dy == 0) || (dx == 0 && dy == 1)
    }

    /// Position one column to the right
    pub fn right(&self) -> Position {
        Position::new(self.x + 1, self.y)
    }

    /// Position one row further down
    pub fn down(&self) -> Position {
        Position::new(self.x, self.y + 1)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// The fixed tile palette
///
/// Six colors make up the reference palette. A game may play with a subset of them
/// (see the color suppliers in the core crate), but never with colors outside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TileColor {
    Red,
    Orange,
    Yellow,
    Green,
    Blue,
    Purple,
}

impl TileColor {
    /// Every palette member, in declaration order
    pub const ALL: [TileColor; 6] = [
        TileColor::Red,
        TileColor::Orange,
        TileColor::Yellow,
        TileColor::Green,
        TileColor::Blue,
        TileColor::Purple,
    ];

    /// Parse a color from its name (case-insensitive)
    ///
    /// # Examples
    ///
    /// ```
    /// use match3_types::TileColor;
    ///
    /// assert_eq!(TileColor::from_str("red"), Some(TileColor::Red));
    /// assert_eq!(TileColor::from_str("PURPLE"), Some(TileColor::Purple));
    /// assert_eq!(TileColor::from_str("teal"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "red" => Some(TileColor::Red),
            "orange" => Some(TileColor::Orange),
            "yellow" => Some(TileColor::Yellow),
            "green" => Some(TileColor::Green),
            "blue" => Some(TileColor::Blue),
            "purple" => Some(TileColor::Purple),
            _ => None,
        }
    }

    /// Lowercase name
    pub fn as_str(&self) -> &'static str {
        match self {
            TileColor::Red => "red",
            TileColor::Orange => "orange",
            TileColor::Yellow => "yellow",
            TileColor::Green => "green",
            TileColor::Blue => "blue",
            TileColor::Purple => "purple",
        }
    }

    /// Single-letter glyph used in board dumps and fixtures
    pub fn glyph(&self) -> char {
        match self {
            TileColor::Red => 'R',
            TileColor::Orange => 'O',
            TileColor::Yellow => 'Y',
            TileColor::Green => 'G',
            TileColor::Blue => 'B',
            TileColor::Purple => 'P',
        }
    }

    /// Inverse of [`TileColor::glyph`] (case-insensitive)
    ///
    /// ```
    /// use match3_types::TileColor;
    ///
    /// assert_eq!(TileColor::from_glyph('g'), Some(TileColor::Green));
    /// assert_eq!(TileColor::from_glyph('.'), None);
    /// ```
    pub fn from_glyph(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'R' => Some(TileColor::Red),
            'O' => Some(TileColor::Orange),
            'Y' => Some(TileColor::Yellow),
            'G' => Some(TileColor::Green),
            'B' => Some(TileColor::Blue),
            'P' => Some(TileColor::Purple),
            _ => None,
        }
    }
}

impl fmt::Display for TileColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Source of tile ids for the whole process
static NEXT_TILE_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique tile identity
///
/// Ids are handed out monotonically and never reused, so a tile can be followed across
/// board transformations even when its position changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TileId(u64);

impl TileId {
    /// Allocate a fresh id
    pub fn next() -> Self {
        TileId(NEXT_TILE_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for TileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A colored tile sitting at a board position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tile {
    pub id: TileId,
    pub color: TileColor,
    pub position: Position,
}

impl Tile {
    /// Create a tile with a freshly allocated id
    pub fn new(color: TileColor, position: Position) -> Self {
        Self {
            id: TileId::next(),
            color,
            position,
        }
    }

    /// Same tile (same id and color) at another position
    pub fn moved_to(&self, position: Position) -> Self {
        Self { position, ..*self }
    }
}
