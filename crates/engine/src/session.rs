//! Game session - the only stateful component
//!
//! The session turns taps into board transitions. It owns the current [`GameSnapshot`],
//! the color supplier used for refills and a handle to the high-score store, and it
//! sequences the board's pure operations:
//!
//! ```text
//! tap, tap -> swap -> find matches --none--> swap back
//!                          |
//!                          +--> [score -> remove -> gravity -> refill -> find matches]*
//!                          |
//!                          +--> valid moves left? --no--> game over (+ save high score)
//! ```
//!
//! Every intermediate board is published, in that fixed order, before the next step
//! runs. Saving a high score is spawned onto the tokio runtime and never blocks or rolls
//! back gameplay.

use std::collections::BTreeSet;
use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::GameConfig;
use crate::core::{Board, ColorSupplier, ConfigError, ScoringRules};
use crate::snapshot::{GameSnapshot, ResolutionStep, SessionPhase, SessionUpdate, TapOutcome};
use crate::store::HighScoreStore;
use crate::types::{Position, TileId};

type Colors = Box<dyn ColorSupplier + Send>;

/// Cascade cycles run for one swap before resolution gives up.
///
/// A supplier that keeps refilling into new runs (a single-color script, say) would
/// otherwise never settle. When the limit is hit the board is kept as it is, matches
/// included, and the session settles on it.
pub const MAX_CASCADE_LEVELS: u32 = 100;

/// A single endless-mode game plus its high score
pub struct GameSession {
    state: GameSnapshot,
    scoring: ScoringRules,
    colors: Colors,
    store: Arc<dyn HighScoreStore>,
    runtime: Option<Handle>,
    updates: Option<mpsc::UnboundedSender<SessionUpdate>>,
    pending_saves: Vec<JoinHandle<()>>,
}

impl GameSession {
    /// Start a game from configuration, with the configured random palette.
    pub async fn start(
        config: GameConfig,
        store: Arc<dyn HighScoreStore>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let colors = config.color_supplier()?;
        Self::start_with_colors(config, colors, store).await
    }

    /// Start a game with an explicit color supplier (scripted colors in tests)
    pub async fn start_with_colors(
        config: GameConfig,
        mut colors: impl ColorSupplier + Send + 'static,
        store: Arc<dyn HighScoreStore>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let board = Board::create_random(config.width, config.height, &mut colors)?;
        Ok(Self::from_board(board, config.scoring, colors, store).await)
    }

    /// Start a game on a prepared board.
    ///
    /// Matches already present are cleared without scoring. If the settled board has no
    /// valid moves the session starts in [`SessionPhase::GameOver`]; no regeneration is
    /// attempted.
    pub async fn from_board(
        board: Board,
        scoring: ScoringRules,
        colors: impl ColorSupplier + Send + 'static,
        store: Arc<dyn HighScoreStore>,
    ) -> Self {
        let high_score = match store.high_score().await {
            Ok(score) => score,
            Err(err) => {
                warn!(error = %err, "could not load high score, starting from 0");
                0
            }
        };

        let mut session = Self {
            state: GameSnapshot::settled(board, 0, high_score),
            scoring,
            colors: Box::new(colors),
            store,
            runtime: Handle::try_current().ok(),
            updates: None,
            pending_saves: Vec::new(),
        };
        session.resolve_initial_board();
        session
    }

    /// Throw the current board away and start over with a fresh random one.
    ///
    /// Score and selection reset; the high score is kept.
    pub fn new_game(&mut self) -> Result<(), ConfigError> {
        let width = self.state.board.width();
        let height = self.state.board.height();
        let board = Board::create_random(width, height, self.colors.as_mut())?;

        info!(width, height, "new game");
        self.state = GameSnapshot::settled(board, 0, self.state.high_score);
        self.resolve_initial_board();
        Ok(())
    }

    /// Current snapshot
    pub fn snapshot(&self) -> &GameSnapshot {
        &self.state
    }

    pub fn board(&self) -> &Board {
        &self.state.board
    }

    pub fn score(&self) -> u32 {
        self.state.score
    }

    pub fn high_score(&self) -> u32 {
        self.state.high_score
    }

    pub fn selected(&self) -> Option<Position> {
        self.state.selected
    }

    pub fn phase(&self) -> SessionPhase {
        self.state.phase
    }

    pub fn is_game_over(&self) -> bool {
        self.state.game_over
    }

    /// A swap that would produce a match, if any
    pub fn hint(&self) -> Option<(Position, Position)> {
        self.state.board.find_valid_move()
    }

    /// Receive every published update from now on.
    ///
    /// The current snapshot is delivered first. Only one observer is supported; calling
    /// this again detaches the previous receiver.
    pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<SessionUpdate> {
        let (tx, rx) = mpsc::unbounded_channel();
        let _ = tx.send(SessionUpdate::Snapshot(self.state.clone()));
        self.updates = Some(tx);
        rx
    }

    /// Wait for every high-score save spawned so far
    pub async fn flush_high_score(&mut self) {
        for handle in self.pending_saves.drain(..) {
            if let Err(err) = handle.await {
                warn!(error = %err, "high score save task did not complete");
            }
        }
    }

    /// Handle a tap on `pos`.
    pub fn tap_tile(&mut self, pos: Position) -> TapOutcome {
        if !self.state.playable() {
            debug!(%pos, phase = ?self.state.phase, "tap ignored");
            return TapOutcome::Ignored;
        }
        if !self.state.board.is_valid_position(pos) {
            debug!(%pos, "tap outside the board ignored");
            return TapOutcome::Ignored;
        }

        match self.state.selected {
            None => {
                self.select(Some(pos));
                TapOutcome::Selected
            }
            Some(selected) if selected == pos => {
                self.select(None);
                TapOutcome::Deselected
            }
            Some(selected) if selected.is_adjacent_to(pos) => self.swap_and_resolve(selected, pos),
            Some(_) => {
                self.select(Some(pos));
                TapOutcome::SelectionMoved
            }
        }
    }

    fn select(&mut self, selected: Option<Position>) {
        let phase = match selected {
            Some(_) => SessionPhase::TileSelected,
            None => SessionPhase::Idle,
        };
        let next = GameSnapshot {
            selected,
            phase,
            step: ResolutionStep::Settled,
            ..self.state.clone()
        };
        self.publish(next);
    }

    fn swap_and_resolve(&mut self, a: Position, b: Position) -> TapOutcome {
        let board = self.state.board.clone();
        let (Some(first), Some(second)) = (board.tile_at(a).copied(), board.tile_at(b).copied())
        else {
            warn!(%a, %b, "swap requested on an empty cell");
            self.select(None);
            return TapOutcome::Ignored;
        };
        let pair: BTreeSet<TileId> = [first.id, second.id].into_iter().collect();

        let swapped = board.swap(a, b);
        self.publish_step(swapped.clone(), ResolutionStep::Swapped, 0, pair.clone());

        let matches = swapped.find_matches();
        if matches.is_empty() {
            debug!(%a, %b, "swap produced no match, reverting");
            let reverted = swapped.swap_by_id(first.id, second.id);
            self.publish_step(reverted.clone(), ResolutionStep::SwappedBack, 0, pair);
            self.publish(GameSnapshot {
                selected: None,
                phase: SessionPhase::Idle,
                step: ResolutionStep::Settled,
                cascade_level: 0,
                in_progress: BTreeSet::new(),
                board: reverted,
                ..self.state.clone()
            });
            return TapOutcome::SwapReverted;
        }

        let score_before = self.state.score;
        let (settled, cascades) = self.run_cascade(swapped, matches, true);
        let points = self.state.score - score_before;

        if self.settle(settled) {
            TapOutcome::Resolved { points, cascades }
        } else {
            TapOutcome::GameOver { points, cascades }
        }
    }

    /// Clear, drop and refill until the board has no matches, or for at most
    /// [`MAX_CASCADE_LEVELS`] cycles.
    ///
    /// Returns the final board and the number of cycles run. `matches` must be the
    /// non-empty match set of `board`.
    fn run_cascade(
        &mut self,
        mut board: Board,
        mut matches: BTreeSet<Position>,
        scored: bool,
    ) -> (Board, u32) {
        let mut level: u32 = 1;

        loop {
            let points = if scored {
                self.scoring.score(&matches, level)
            } else {
                0
            };
            self.state.score = self.state.score.saturating_add(points);
            debug!(
                level,
                matched = matches.len(),
                points,
                score = self.state.score,
                "cascade step"
            );

            let removed: BTreeSet<TileId> = matches
                .iter()
                .filter_map(|pos| board.tile_at(*pos).map(|tile| tile.id))
                .collect();
            let cleared = board.remove_tiles(&matches);
            self.publish_step(cleared.clone(), ResolutionStep::Cleared { points }, level, removed);

            let fallen = cleared.apply_gravity();
            let moved = Board::moved_tiles(&cleared, &fallen);
            self.publish_step(fallen.clone(), ResolutionStep::Fell, level, moved);

            let refilled = fallen.fill_empty_spaces(self.colors.as_mut());
            let created = Board::new_tiles(&fallen, &refilled);
            self.publish_step(refilled.clone(), ResolutionStep::Refilled, level, created);

            board = refilled;
            matches = board.find_matches();
            if matches.is_empty() {
                return (board, level);
            }
            if level >= MAX_CASCADE_LEVELS {
                warn!(level, matched = matches.len(), "cascade did not settle, giving up");
                return (board, level);
            }
            level += 1;
        }
    }

    /// Publish the settled board. Returns false if the game is over.
    fn settle(&mut self, board: Board) -> bool {
        let has_moves = board.has_valid_moves();
        let mut next = GameSnapshot::settled(board, self.state.score, self.state.high_score);

        if has_moves {
            self.publish(next);
            return true;
        }

        next.phase = SessionPhase::GameOver;
        next.game_over = true;
        info!(score = next.score, high_score = next.high_score, "game over: no valid moves");

        let record = next.score > next.high_score;
        if record {
            next.high_score = next.score;
        }
        self.publish(next);
        if record {
            self.persist_high_score(self.state.score);
        }
        false
    }

    /// Clear matches left on a fresh board (no points), then check for moves
    fn resolve_initial_board(&mut self) {
        let board = self.state.board.clone();
        let matches = board.find_matches();

        let settled = if matches.is_empty() {
            board
        } else {
            debug!(matched = matches.len(), "resolving matches on the initial board");
            self.state.phase = SessionPhase::ResolvingCascade;
            let (settled, cycles) = self.run_cascade(board, matches, false);
            debug!(cycles, "initial board settled");
            settled
        };

        self.settle(settled);
    }

    fn persist_high_score(&mut self, score: u32) {
        let updates = self.updates.clone();
        let Some(runtime) = self.runtime.as_ref() else {
            warn!(score, "no async runtime available, high score not saved");
            if let Some(tx) = updates {
                let _ = tx.send(SessionUpdate::HighScoreSaveFailed {
                    score,
                    error: "no async runtime available".into(),
                });
            }
            return;
        };

        let store = Arc::clone(&self.store);
        let handle = runtime.spawn(async move {
            let update = match store.save_high_score(score).await {
                Ok(new_record) => {
                    info!(score, new_record, "high score saved");
                    SessionUpdate::HighScoreSaved { score, new_record }
                }
                Err(err) => {
                    warn!(score, error = %err, "failed to save high score");
                    SessionUpdate::HighScoreSaveFailed {
                        score,
                        error: err.to_string(),
                    }
                }
            };
            if let Some(tx) = updates {
                let _ = tx.send(update);
            }
        });
        self.pending_saves.retain(|pending| !pending.is_finished());
        self.pending_saves.push(handle);
    }

    fn publish_step(
        &mut self,
        board: Board,
        step: ResolutionStep,
        cascade_level: u32,
        in_progress: BTreeSet<TileId>,
    ) {
        let next = GameSnapshot {
            board,
            phase: SessionPhase::ResolvingCascade,
            step,
            cascade_level,
            in_progress,
            ..self.state.clone()
        };
        self.publish(next);
    }

    /// Replace the snapshot and hand a copy to the observer
    fn publish(&mut self, next: GameSnapshot) {
        self.state = next;
        if let Some(tx) = &self.updates {
            let _ = tx.send(SessionUpdate::Snapshot(self.state.clone()));
        }
    }
}

impl std::fmt::Debug for GameSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameSession")
            .field("state", &self.state)
            .field("scoring", &self.scoring)
            .field("pending_saves", &self.pending_saves.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ScriptedColors;
    use crate::store::MemoryHighScoreStore;

    fn fixture_board() -> Board {
        Board::from_glyphs(&["RGBY", "RGBY", "GRYB", "YBGR"]).unwrap()
    }

    async fn session_on(board: Board, script: &str) -> GameSession {
        GameSession::from_board(
            board,
            ScoringRules::default(),
            ScriptedColors::from_glyphs(script).unwrap(),
            Arc::new(MemoryHighScoreStore::new()),
        )
        .await
    }

    #[tokio::test]
    async fn test_taps_ignored_while_resolving() {
        let mut session = session_on(fixture_board(), "P").await;
        session.state.phase = SessionPhase::ResolvingCascade;

        assert_eq!(session.tap_tile(Position::new(0, 0)), TapOutcome::Ignored);
        assert_eq!(session.selected(), None);
    }

    #[tokio::test]
    async fn test_initial_matches_cleared_without_points() {
        let board = Board::from_glyphs(&["RRRY", "RGBY", "GRYB", "YBGR"]).unwrap();
        let mut session = session_on(board, "POGBYO").await;

        assert_eq!(session.score(), 0);
        assert!(session.board().find_matches().is_empty());
        assert!(session.board().is_full());
        assert!(session.pending_saves.is_empty());

        let mut rx = session.subscribe();
        match rx.try_recv() {
            Ok(SessionUpdate::Snapshot(snapshot)) => assert_eq!(snapshot.score, 0),
            other => panic!("expected initial snapshot, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_new_game_resets_score_but_keeps_high_score() {
        let mut session = session_on(fixture_board(), "POGBYOR").await;
        session.state.score = 120;
        session.state.high_score = 300;

        session.new_game().unwrap();

        assert_eq!(session.score(), 0);
        assert_eq!(session.high_score(), 300);
        assert_eq!(session.selected(), None);
        assert!(session.board().find_matches().is_empty());
        assert_eq!(session.board().width(), 4);
        assert_eq!(session.board().height(), 4);
    }

    #[test]
    fn test_save_without_runtime_is_reported() {
        // Session built and driven entirely outside a tokio runtime
        let mut session = futures::executor::block_on(session_on(
            Board::from_glyphs(&["RRG", "GBR", "BYP"]).unwrap(),
            "OPY",
        ));
        assert!(session.runtime.is_none());

        let mut rx = session.subscribe();
        session.tap_tile(Position::new(2, 0));
        let outcome = session.tap_tile(Position::new(2, 1));
        assert_eq!(outcome, TapOutcome::GameOver { points: 10, cascades: 1 });
        assert_eq!(session.high_score(), 10);

        let mut failed = false;
        while let Ok(update) = rx.try_recv() {
            if let SessionUpdate::HighScoreSaveFailed { score, .. } = update {
                assert_eq!(score, 10);
                failed = true;
            }
        }
        assert!(failed);
    }

    #[tokio::test]
    async fn test_endless_cascade_is_cut_off() {
        // Every refill is red, so the top row matches again after each clear
        let board = Board::from_glyphs(&["RRR", "GBY", "YGB"]).unwrap();
        let session = session_on(board, "R").await;

        assert_eq!(session.score(), 0);
        assert!(session.board().is_full());
        assert_eq!(session.board().to_string(), "RRR\nGBY\nYGB");
        assert!(!session.board().find_matches().is_empty());
        assert!(!session.is_game_over());
    }

    #[test]
    fn test_finished_saves_are_pruned() {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();

        let mut session = runtime.block_on(session_on(fixture_board(), "P"));
        for score in [10, 20, 30] {
            session.persist_high_score(score);
            // Let the spawned save run to completion
            runtime.block_on(async { tokio::time::sleep(std::time::Duration::from_millis(5)).await });
        }
        assert!(session.pending_saves.len() < 3);

        runtime.block_on(session.flush_high_score());
        assert!(session.pending_saves.is_empty());
    }
}
