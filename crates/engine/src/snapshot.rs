use std::collections::BTreeSet;

use serde::Serialize;

use crate::core::Board;
use crate::types::{Position, TileId};

/// Where the session is in its tap/resolve cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    /// Waiting for the first tap of a move
    Idle,
    /// One tile selected, waiting for the second tap
    TileSelected,
    /// A swap is being resolved; taps are ignored
    ResolvingCascade,
    /// No valid moves remain; taps are ignored
    GameOver,
}

/// Which step of a resolution produced a snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResolutionStep {
    /// Board at rest (also used for selection changes)
    Settled,
    /// Two tiles exchanged positions
    Swapped,
    /// A swap without matches was undone
    SwappedBack,
    /// Matched tiles were removed and scored
    Cleared { points: u32 },
    /// Remaining tiles fell into the gaps
    Fell,
    /// Empty cells received new tiles
    Refilled,
}

/// Complete, immutable view of a session
///
/// The session replaces its snapshot wholesale on every transition and publishes the new
/// value; observers never see a partially updated state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameSnapshot {
    pub board: Board,
    pub score: u32,
    pub high_score: u32,
    pub selected: Option<Position>,
    pub phase: SessionPhase,
    pub step: ResolutionStep,
    pub game_over: bool,
    /// Cascade level of the step being shown (0 outside a cascade)
    pub cascade_level: u32,
    /// Tiles touched by this step, for the observer's transition handling
    pub in_progress: BTreeSet<TileId>,
}

impl GameSnapshot {
    /// Settled snapshot of `board` with nothing selected
    pub fn settled(board: Board, score: u32, high_score: u32) -> Self {
        Self {
            board,
            score,
            high_score,
            selected: None,
            phase: SessionPhase::Idle,
            step: ResolutionStep::Settled,
            game_over: false,
            cascade_level: 0,
            in_progress: BTreeSet::new(),
        }
    }

    /// Whether a tap would currently be accepted
    pub fn playable(&self) -> bool {
        !self.game_over && self.phase != SessionPhase::ResolvingCascade
    }
}

/// Message published to the session's observer
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionUpdate {
    Snapshot(GameSnapshot),
    HighScoreSaved { score: u32, new_record: bool },
    HighScoreSaveFailed { score: u32, error: String },
}

/// Result of a single `tap_tile` call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum TapOutcome {
    /// Game over, resolution in flight, or the position is off the board
    Ignored,
    Selected,
    Deselected,
    SelectionMoved,
    /// The swap produced no match and was undone
    SwapReverted,
    /// The swap matched; `cascades` counts resolution cycles (at least 1)
    Resolved { points: u32, cascades: u32 },
    /// As `Resolved`, and the resulting board has no valid moves left
    GameOver { points: u32, cascades: u32 },
}
