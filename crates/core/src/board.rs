//! Board module - immutable grid of colored tiles
//!
//! The board is a `width x height` grid where each cell is empty or holds a [`Tile`].
//! Cells live in a flat row-major vector (`y * width + x`), so looking up a position is a
//! single index computation.
//!
//! Every operation that changes the grid (swap, removal, gravity, refill) returns a new
//! `Board` and leaves `self` untouched. Callers compare the before/after values by tile id
//! to learn which tiles moved; the board itself keeps no history.
//!
//! Coordinates: `(x, y)` where `x` counts columns left to right and `y` counts rows top to
//! bottom. Gravity pulls tiles towards `y = height - 1`.

use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;

use crate::error::ConfigError;
use crate::rng::ColorSupplier;
use crate::types::{Position, Tile, TileColor, TileId, MIN_MATCH};

/// Immutable snapshot of the tile grid
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Board {
    width: usize,
    height: usize,
    /// Flat array of cells, row-major order (y * width + x)
    cells: Vec<Option<Tile>>,
}

impl Board {
    /// Create an empty board (every cell unoccupied)
    pub fn new(width: usize, height: usize) -> Result<Self, ConfigError> {
        if width == 0 {
            return Err(ConfigError::ZeroWidth);
        }
        if height == 0 {
            return Err(ConfigError::ZeroHeight);
        }
        Ok(Self {
            width,
            height,
            cells: vec![None; width * height],
        })
    }

    /// Create a fully occupied board with colors drawn from `colors`.
    ///
    /// Cells are filled row by row (row 0 left to right, then row 1, ...). Accidental
    /// matches are left in place; resolving them is up to the caller.
    pub fn create_random<C: ColorSupplier + ?Sized>(
        width: usize,
        height: usize,
        colors: &mut C,
    ) -> Result<Self, ConfigError> {
        Ok(Self::new(width, height)?.fill_empty_spaces(colors))
    }

    /// Create a board from row-major cells, allocating fresh tile ids.
    ///
    /// All rows must have the same, non-zero length.
    pub fn from_rows(rows: Vec<Vec<Option<TileColor>>>) -> Result<Self, ConfigError> {
        let height = rows.len();
        let width = rows.first().map(Vec::len).unwrap_or(0);
        let mut board = Self::new(width, height)?;

        for (y, row) in rows.into_iter().enumerate() {
            if row.len() != width {
                return Err(ConfigError::RaggedRows {
                    row: y,
                    expected: width,
                    found: row.len(),
                });
            }
            for (x, color) in row.into_iter().enumerate() {
                let pos = Position::new(x as i32, y as i32);
                board.cells[y * width + x] = color.map(|c| Tile::new(c, pos));
            }
        }

        Ok(board)
    }

    /// Create a board from glyph rows such as `["RRG", "B.B"]`; `.` marks an empty cell.
    pub fn from_glyphs(rows: &[&str]) -> Result<Self, ConfigError> {
        let rows = rows
            .iter()
            .map(|row| {
                row.chars()
                    .filter(|c| !c.is_whitespace())
                    .map(|c| match c {
                        '.' => Ok(None),
                        _ => TileColor::from_glyph(c)
                            .map(Some)
                            .ok_or_else(|| ConfigError::UnknownColor(c.to_string())),
                    })
                    .collect::<Result<Vec<_>, _>>()
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_rows(rows)
    }

    /// Get width of the board
    pub fn width(&self) -> usize {
        self.width
    }

    /// Get height of the board
    pub fn height(&self) -> usize {
        self.height
    }

    /// Calculate flat index from a position
    #[inline(always)]
    fn index(&self, pos: Position) -> Option<usize> {
        if !self.is_valid_position(pos) {
            return None;
        }
        Some(pos.y as usize * self.width + pos.x as usize)
    }

    /// True iff `0 <= x < width` and `0 <= y < height`
    pub fn is_valid_position(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.y >= 0 && (pos.x as usize) < self.width && (pos.y as usize) < self.height
    }

    /// Tile at `pos`, or `None` for an empty or out-of-bounds cell
    pub fn tile_at(&self, pos: Position) -> Option<&Tile> {
        self.index(pos).and_then(|idx| self.cells[idx].as_ref())
    }

    /// Look a tile up by identity
    pub fn tile_by_id(&self, id: TileId) -> Option<&Tile> {
        self.tiles().find(|tile| tile.id == id)
    }

    /// All tiles in row-major order
    pub fn tiles(&self) -> impl Iterator<Item = &Tile> + '_ {
        self.cells.iter().flatten()
    }

    /// Number of occupied cells
    pub fn tile_count(&self) -> usize {
        self.tiles().count()
    }

    /// True when every cell holds a tile
    pub fn is_full(&self) -> bool {
        self.cells.iter().all(Option::is_some)
    }

    /// Every position on the board, row-major
    pub fn positions(&self) -> impl Iterator<Item = Position> {
        let width = self.width as i32;
        let height = self.height as i32;
        (0..height).flat_map(move |y| (0..width).map(move |x| Position::new(x, y)))
    }

    /// Exchange the tiles at `a` and `b`.
    ///
    /// Only adjacent, in-bounds, occupied pairs are swapped. Anything else returns an
    /// unchanged copy; speculative swaps are expected and are not an error.
    pub fn swap(&self, a: Position, b: Position) -> Board {
        if !a.is_adjacent_to(b) {
            return self.clone();
        }
        let (Some(ia), Some(ib)) = (self.index(a), self.index(b)) else {
            return self.clone();
        };
        let (Some(ta), Some(tb)) = (self.cells[ia], self.cells[ib]) else {
            return self.clone();
        };

        let mut next = self.clone();
        next.cells[ia] = Some(tb.moved_to(a));
        next.cells[ib] = Some(ta.moved_to(b));
        next
    }

    /// Same contract as [`Board::swap`], addressing the tiles by id
    pub fn swap_by_id(&self, a: TileId, b: TileId) -> Board {
        match (self.tile_by_id(a), self.tile_by_id(b)) {
            (Some(ta), Some(tb)) => self.swap(ta.position, tb.position),
            _ => self.clone(),
        }
    }

    /// Positions of every tile that is part of a run of at least [`MIN_MATCH`].
    ///
    /// Rows and columns are scanned independently over the whole board and the results
    /// merged, so a tile in both a horizontal and a vertical run is reported once. Empty
    /// cells break runs.
    pub fn find_matches(&self) -> BTreeSet<Position> {
        let mut matches = BTreeSet::new();
        let width = self.width as i32;
        let height = self.height as i32;

        for y in 0..height {
            self.mark_runs((0..width).map(|x| Position::new(x, y)), &mut matches);
        }
        for x in 0..width {
            self.mark_runs((0..height).map(|y| Position::new(x, y)), &mut matches);
        }

        matches
    }

    /// Walk one line of cells and add every run of `MIN_MATCH`+ to `out`
    fn mark_runs(&self, line: impl Iterator<Item = Position>, out: &mut BTreeSet<Position>) {
        let mut run: Vec<Position> = Vec::new();
        let mut run_color: Option<TileColor> = None;

        for pos in line {
            let color = self.tile_at(pos).map(|t| t.color);
            if color.is_some() && color == run_color {
                run.push(pos);
                continue;
            }
            if run_color.is_some() && run.len() >= MIN_MATCH {
                out.extend(run.iter().copied());
            }
            run.clear();
            run.push(pos);
            run_color = color;
        }

        if run_color.is_some() && run.len() >= MIN_MATCH {
            out.extend(run);
        }
    }

    /// Copy of the board without the tiles at `positions` (cells are left empty)
    pub fn remove_tiles<'a>(&self, positions: impl IntoIterator<Item = &'a Position>) -> Board {
        let mut next = self.clone();
        for &pos in positions {
            if let Some(idx) = next.index(pos) {
                next.cells[idx] = None;
            }
        }
        next
    }

    /// Let tiles fall to the bottom of their column.
    ///
    /// Each column is compacted independently: occupied cells keep their top-to-bottom
    /// order and land in the bottom `k` rows, leaving the empty cells at the top. Tile ids
    /// are preserved.
    pub fn apply_gravity(&self) -> Board {
        let mut next = self.clone();

        for x in 0..self.width {
            let column: Vec<Tile> = (0..self.height)
                .filter_map(|y| self.cells[y * self.width + x])
                .collect();
            let first_row = self.height - column.len();

            for y in 0..first_row {
                next.cells[y * self.width + x] = None;
            }
            for (offset, tile) in column.into_iter().enumerate() {
                let y = first_row + offset;
                next.cells[y * self.width + x] =
                    Some(tile.moved_to(Position::new(x as i32, y as i32)));
            }
        }

        next
    }

    /// Fill every empty cell with a new tile colored by `colors` (row-major order)
    pub fn fill_empty_spaces<C: ColorSupplier + ?Sized>(&self, colors: &mut C) -> Board {
        let mut next = self.clone();
        for pos in self.positions() {
            let Some(idx) = next.index(pos) else {
                continue;
            };
            if next.cells[idx].is_none() {
                next.cells[idx] = Some(Tile::new(colors.next_color(), pos));
            }
        }
        next
    }

    /// First swap (scanning row-major, right neighbour before down neighbour) that would
    /// produce a match.
    ///
    /// Each trial swaps and rescans the whole board, so the search is quadratic in the
    /// number of cells. That is fine for 6x6 to 8x8 boards but grows fast beyond that.
    pub fn find_valid_move(&self) -> Option<(Position, Position)> {
        for pos in self.positions() {
            if self.tile_at(pos).is_none() {
                continue;
            }
            for neighbour in [pos.right(), pos.down()] {
                if self.tile_at(neighbour).is_none() {
                    continue;
                }
                if !self.swap(pos, neighbour).find_matches().is_empty() {
                    return Some((pos, neighbour));
                }
            }
        }
        None
    }

    /// True if at least one adjacent swap yields a match
    pub fn has_valid_moves(&self) -> bool {
        self.find_valid_move().is_some()
    }

    /// Ids of tiles present in both boards whose position changed
    pub fn moved_tiles(before: &Board, after: &Board) -> BTreeSet<TileId> {
        after
            .tiles()
            .filter(|tile| {
                before
                    .tile_by_id(tile.id)
                    .is_some_and(|old| old.position != tile.position)
            })
            .map(|tile| tile.id)
            .collect()
    }

    /// Ids of tiles present in `after` but not in `before`
    pub fn new_tiles(before: &Board, after: &Board) -> BTreeSet<TileId> {
        let known: BTreeSet<TileId> = before.tiles().map(|t| t.id).collect();
        after
            .tiles()
            .map(|t| t.id)
            .filter(|id| !known.contains(id))
            .collect()
    }

    /// Colors as rows, `None` for empty cells (handy for assertions)
    pub fn color_rows(&self) -> Vec<Vec<Option<TileColor>>> {
        self.cells
            .chunks(self.width)
            .map(|row| row.iter().map(|cell| cell.map(|t| t.color)).collect())
            .collect()
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (y, row) in self.cells.chunks(self.width).enumerate() {
            if y > 0 {
                writeln!(f)?;
            }
            for cell in row {
                let glyph = cell.map(|t| t.color.glyph()).unwrap_or('.');
                write!(f, "{glyph}")?;
            }
        }
        Ok(())
    }
}
