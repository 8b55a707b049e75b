//! Construction errors
//!
//! Board operations themselves are total; only building a board or a color supplier
//! from bad configuration can fail.

use thiserror::Error;

/// Invalid board or palette configuration
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("board width must be greater than zero")]
    ZeroWidth,

    #[error("board height must be greater than zero")]
    ZeroHeight,

    #[error("color palette must contain at least one color")]
    EmptyPalette,

    #[error("{colors} distinct color(s) cannot settle a {width}x{height} board")]
    TooFewColors {
        colors: usize,
        width: usize,
        height: usize,
    },

    #[error("row {row} has {found} cells, expected {expected}")]
    RaggedRows {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("unknown tile color `{0}`")]
    UnknownColor(String),
}
