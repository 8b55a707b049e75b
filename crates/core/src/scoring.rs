//! Scoring module - points for cleared matches
//!
//! The match set handed over by the board is a flat union of positions, so the scorer
//! re-derives the runs itself: positions are grouped by row and by column, and each
//! group is split into maximal runs of consecutive coordinates.
//!
//! Policy notes:
//! - A run of exactly 3 earns `three_match_points`.
//! - Any run of 4 or more earns the flat `four_plus_match_points`; a 5-run is worth the
//!   same as a 4-run.
//! - The sum is multiplied by `cascade_multiplier ^ (cascade_level - 1)` and truncated.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::types::{
    Position, CASCADE_MULTIPLIER, FOUR_PLUS_MATCH_POINTS, MIN_MATCH, THREE_MATCH_POINTS,
};

/// Axis a run lies along
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    Row,
    Column,
}

/// A maximal run of consecutive matched positions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Run {
    pub axis: Axis,
    /// First (top-most or left-most) position of the run
    pub start: Position,
    pub len: usize,
}

/// Point values used by [`ScoringRules::score`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringRules {
    pub three_match_points: u32,
    pub four_plus_match_points: u32,
    pub cascade_multiplier: f64,
}

impl Default for ScoringRules {
    fn default() -> Self {
        Self {
            three_match_points: THREE_MATCH_POINTS,
            four_plus_match_points: FOUR_PLUS_MATCH_POINTS,
            cascade_multiplier: CASCADE_MULTIPLIER,
        }
    }
}

impl ScoringRules {
    /// Points for a single run of `len` tiles (before the cascade multiplier)
    pub fn run_points(&self, len: usize) -> u32 {
        match len {
            n if n < MIN_MATCH => 0,
            n if n == MIN_MATCH => self.three_match_points,
            _ => self.four_plus_match_points,
        }
    }

    /// Score a set of matched positions cleared at `cascade_level` (1-based).
    ///
    /// A level of 0 is treated as 1. The result saturates at `u32::MAX`.
    pub fn score(&self, matched: &BTreeSet<Position>, cascade_level: u32) -> u32 {
        let base: u64 = runs(matched)
            .iter()
            .map(|run| self.run_points(run.len) as u64)
            .sum();

        let exponent = cascade_level.saturating_sub(1).min(i32::MAX as u32) as i32;
        let scaled = base as f64 * self.cascade_multiplier.powi(exponent);

        if scaled >= u32::MAX as f64 {
            u32::MAX
        } else {
            scaled as u32
        }
    }
}

/// Re-derive the row and column runs contained in `matched`.
///
/// Rows come first (top to bottom), then columns (left to right). Runs shorter than
/// [`MIN_MATCH`] are included; they simply score nothing.
pub fn runs(matched: &BTreeSet<Position>) -> Vec<Run> {
    let mut rows: BTreeMap<i32, Vec<i32>> = BTreeMap::new();
    let mut columns: BTreeMap<i32, Vec<i32>> = BTreeMap::new();
    for pos in matched {
        rows.entry(pos.y).or_default().push(pos.x);
        columns.entry(pos.x).or_default().push(pos.y);
    }

    let mut out = Vec::new();
    for (y, xs) in rows {
        for (start, len) in consecutive_spans(xs) {
            out.push(Run {
                axis: Axis::Row,
                start: Position::new(start, y),
                len,
            });
        }
    }
    for (x, ys) in columns {
        for (start, len) in consecutive_spans(ys) {
            out.push(Run {
                axis: Axis::Column,
                start: Position::new(x, start),
                len,
            });
        }
    }
    out
}

/// Split coordinates into maximal spans of consecutive values: `(start, len)` pairs
fn consecutive_spans(mut coords: Vec<i32>) -> Vec<(i32, usize)> {
    coords.sort_unstable();
    coords.dedup();

    let mut spans: Vec<(i32, usize)> = Vec::new();
    for c in coords {
        match spans.last_mut() {
            Some((start, len)) if *start + *len as i32 == c => *len += 1,
            _ => spans.push((c, 1)),
        }
    }
    spans
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(y: i32, xs: std::ops::Range<i32>) -> BTreeSet<Position> {
        xs.map(|x| Position::new(x, y)).collect()
    }

    #[test]
    fn test_run_points_table() {
        let rules = ScoringRules::default();
        assert_eq!(rules.run_points(1), 0);
        assert_eq!(rules.run_points(2), 0);
        assert_eq!(rules.run_points(3), 10);
        assert_eq!(rules.run_points(4), 20);
        assert_eq!(rules.run_points(5), 20);
        assert_eq!(rules.run_points(8), 20);
    }

    #[test]
    fn test_consecutive_spans() {
        assert_eq!(consecutive_spans(vec![4, 0, 1, 2, 5, 7]), vec![(0, 3), (4, 2), (7, 1)]);
        assert!(consecutive_spans(Vec::new()).is_empty());
    }

    #[test]
    fn test_runs_split_rows_and_columns() {
        let matched = row(0, 0..3);
        let found = runs(&matched);
        // One horizontal 3-run and three single-cell column fragments
        assert_eq!(
            found.iter().filter(|r| r.axis == Axis::Row).collect::<Vec<_>>(),
            vec![&Run {
                axis: Axis::Row,
                start: Position::new(0, 0),
                len: 3
            }]
        );
        assert!(found
            .iter()
            .filter(|r| r.axis == Axis::Column)
            .all(|r| r.len == 1));
    }

    #[test]
    fn test_cascade_level_scaling() {
        let rules = ScoringRules::default();
        let three = row(0, 0..3);
        assert_eq!(rules.score(&three, 1), 10);
        assert_eq!(rules.score(&three, 2), 15);
        assert_eq!(rules.score(&three, 3), 22); // 22.5 truncated
        assert_eq!(rules.score(&three, 0), 10);
    }

    #[test]
    fn test_score_saturates() {
        let rules = ScoringRules {
            cascade_multiplier: 1000.0,
            ..ScoringRules::default()
        };
        assert_eq!(rules.score(&row(0, 0..3), 10), u32::MAX);
    }
}
