//! Headless autoplay runner (default binary).
//!
//! Plays an endless-mode game by always taking the first available move, until the
//! board runs out of moves or the move cap is reached. There is no rendering; progress
//! goes to the log (stderr) and the final board and score to stdout.
//!
//! Environment:
//! - `MATCH3_WIDTH`, `MATCH3_HEIGHT`, `MATCH3_SEED`, `MATCH3_PALETTE`: see `GameConfig::from_env`
//! - `MATCH3_MAX_MOVES`: move cap (default 200)
//! - `MATCH3_HIGH_SCORE_FILE`: high score file (default `match3-highscore.json`)
//! - `MATCH3_JSON`: set to "1" or "true" to print every published update as a JSON line
//! - `RUST_LOG`: log filter (default `info`)

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use match3::engine::{GameConfig, GameSession, SessionUpdate, TapOutcome};
use match3::FileHighScoreStore;

struct RunnerConfig {
    max_moves: u32,
    high_score_file: String,
    json: bool,
}

impl RunnerConfig {
    fn from_env() -> Self {
        use std::env;

        let max_moves = env::var("MATCH3_MAX_MOVES")
            .ok()
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(200);

        let high_score_file = env::var("MATCH3_HIGH_SCORE_FILE")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "match3-highscore.json".to_string());

        let json = env::var("MATCH3_JSON")
            .map(|v| v == "1" || v.to_lowercase() == "true")
            .unwrap_or(false);

        Self {
            max_moves,
            high_score_file,
            json,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let runner = RunnerConfig::from_env();
    let config = GameConfig::from_env();
    config.validate().context("invalid MATCH3_* configuration")?;
    info!(
        width = config.width,
        height = config.height,
        colors = config.palette.len(),
        "starting autoplay"
    );

    let store = Arc::new(FileHighScoreStore::new(&runner.high_score_file));
    let mut session = GameSession::start(config, store)
        .await
        .context("failed to start game session")?;
    let mut updates = session.subscribe();

    let mut moves = 0u32;
    while moves < runner.max_moves && !session.is_game_over() {
        let Some((a, b)) = session.hint() else {
            break;
        };

        session.tap_tile(a);
        let outcome = session.tap_tile(b);
        moves += 1;

        match outcome {
            TapOutcome::Resolved { points, cascades } => {
                info!(moves, %a, %b, points, cascades, score = session.score(), "move resolved");
            }
            TapOutcome::GameOver { points, cascades } => {
                info!(moves, %a, %b, points, cascades, score = session.score(), "last move");
            }
            other => debug!(?other, "unexpected tap outcome for a hinted move"),
        }

        drain_updates(&mut updates, runner.json)?;
    }

    session.flush_high_score().await;
    drain_updates(&mut updates, runner.json)?;

    println!("{}", session.board());
    println!(
        "score: {}  high score: {}  moves: {}{}",
        session.score(),
        session.high_score(),
        moves,
        if session.is_game_over() { "  (no moves left)" } else { "" }
    );
    Ok(())
}

fn drain_updates(updates: &mut UnboundedReceiver<SessionUpdate>, json: bool) -> Result<()> {
    while let Ok(update) = updates.try_recv() {
        if let SessionUpdate::HighScoreSaveFailed { score, error } = &update {
            warn!(score, error = error.as_str(), "high score was not persisted");
        }
        if json {
            println!(
                "{}",
                serde_json::to_string(&update).context("failed to encode update")?
            );
        }
    }
    Ok(())
}
