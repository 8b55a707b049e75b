//! Board tests - match detection, swaps, gravity, refill and move search

use std::collections::BTreeSet;

use match3::core::{Board, ConfigError, RandomColors, ScriptedColors};
use match3::types::{Position, TileColor, TileId};

fn p(x: i32, y: i32) -> Position {
    Position::new(x, y)
}

fn ids(board: &Board) -> BTreeSet<TileId> {
    board.tiles().map(|t| t.id).collect()
}

#[test]
fn test_create_random_is_full_with_unique_ids() {
    let mut colors = RandomColors::full_palette(12345);
    let board = Board::create_random(8, 8, &mut colors).unwrap();

    assert_eq!(board.width(), 8);
    assert_eq!(board.height(), 8);
    assert_eq!(board.tile_count(), 64);
    assert_eq!(ids(&board).len(), 64);
    for pos in board.positions() {
        assert_eq!(board.tile_at(pos).unwrap().position, pos);
    }
}

#[test]
fn test_create_random_rejects_zero_size() {
    let mut colors = RandomColors::full_palette(1);
    assert_eq!(
        Board::create_random(0, 8, &mut colors).unwrap_err(),
        ConfigError::ZeroWidth
    );
    assert_eq!(
        Board::create_random(8, 0, &mut colors).unwrap_err(),
        ConfigError::ZeroHeight
    );
}

#[test]
fn test_same_seed_same_board() {
    let a = Board::create_random(6, 6, &mut RandomColors::full_palette(99)).unwrap();
    let b = Board::create_random(6, 6, &mut RandomColors::full_palette(99)).unwrap();
    assert_eq!(a.color_rows(), b.color_rows());
}

#[test]
fn test_lookups() {
    let board = Board::from_glyphs(&["RG", "B."]).unwrap();

    assert!(board.is_valid_position(p(0, 0)));
    assert!(board.is_valid_position(p(1, 1)));
    assert!(!board.is_valid_position(p(-1, 0)));
    assert!(!board.is_valid_position(p(2, 0)));
    assert!(!board.is_valid_position(p(0, 2)));

    assert_eq!(board.tile_at(p(1, 0)).map(|t| t.color), Some(TileColor::Green));
    assert!(board.tile_at(p(1, 1)).is_none());
    assert!(board.tile_at(p(5, 5)).is_none());

    let blue = *board.tile_at(p(0, 1)).unwrap();
    assert_eq!(board.tile_by_id(blue.id), Some(&blue));
    assert!(board.tile_by_id(TileId::next()).is_none());
}

#[test]
fn test_find_matches_rows_scenario() {
    let board = Board::from_glyphs(&["RRR", "BBG", "YYY"]).unwrap();
    let expected: BTreeSet<Position> = [
        p(0, 0),
        p(1, 0),
        p(2, 0),
        p(0, 2),
        p(1, 2),
        p(2, 2),
    ]
    .into_iter()
    .collect();

    assert_eq!(board.find_matches(), expected);
}

#[test]
fn test_find_matches_includes_whole_long_runs() {
    let board = Board::from_glyphs(&["GRRRRR", "BYGBYG"]).unwrap();
    let matches = board.find_matches();
    assert_eq!(matches.len(), 5);
    for x in 1..6 {
        assert!(matches.contains(&p(x, 0)));
    }
}

#[test]
fn test_find_matches_columns_and_crossings_deduplicated() {
    // An L/T shape: row 2 and column 1 share (1, 2)
    let board = Board::from_glyphs(&["GBY", "YBG", "BBB", "GYO"]).unwrap();
    let matches = board.find_matches();

    let expected: BTreeSet<Position> = [p(1, 0), p(1, 1), p(0, 2), p(1, 2), p(2, 2)]
        .into_iter()
        .collect();
    assert_eq!(matches, expected);
}

#[test]
fn test_find_matches_none_for_pairs() {
    let board = Board::from_glyphs(&["RRGG", "GGRR", "BBYY"]).unwrap();
    assert!(board.find_matches().is_empty());
}

#[test]
fn test_empty_cells_never_match() {
    let board = Board::new(4, 4).unwrap();
    assert!(board.find_matches().is_empty());
    assert!(!board.has_valid_moves());
}

#[test]
fn test_swap_exchanges_tiles() {
    let board = Board::from_glyphs(&["RG", "BY"]).unwrap();
    let red = *board.tile_at(p(0, 0)).unwrap();
    let green = *board.tile_at(p(1, 0)).unwrap();

    let swapped = board.swap(p(0, 0), p(1, 0));

    assert_eq!(swapped.tile_at(p(0, 0)).unwrap().id, green.id);
    assert_eq!(swapped.tile_at(p(1, 0)).unwrap().id, red.id);
    assert_eq!(swapped.tile_at(p(1, 0)).unwrap().position, p(1, 0));
    // The original is untouched
    assert_eq!(board.tile_at(p(0, 0)), Some(&red));
}

#[test]
fn test_swap_is_self_inverse() {
    let board = Board::from_glyphs(&["RGB", "YOP"]).unwrap();
    for (a, b) in [(p(0, 0), p(1, 0)), (p(1, 0), p(1, 1)), (p(2, 1), p(2, 0))] {
        assert_eq!(board.swap(a, b).swap(a, b), board);
    }
}

#[test]
fn test_invalid_swaps_are_noops() {
    let board = Board::from_glyphs(&["RG.", "BYP"]).unwrap();

    // Diagonal
    assert_eq!(board.swap(p(0, 0), p(1, 1)), board);
    // Not neighbours
    assert_eq!(board.swap(p(0, 0), p(0, 0)), board);
    assert_eq!(board.swap(p(0, 1), p(2, 1)), board);
    // Out of bounds
    assert_eq!(board.swap(p(0, 0), p(-1, 0)), board);
    assert_eq!(board.swap(p(2, 1), p(3, 1)), board);
    // Empty cell
    assert_eq!(board.swap(p(1, 0), p(2, 0)), board);
}

#[test]
fn test_swap_by_id() {
    let board = Board::from_glyphs(&["RG", "BY"]).unwrap();
    let red = board.tile_at(p(0, 0)).unwrap().id;
    let blue = board.tile_at(p(0, 1)).unwrap().id;
    let yellow = board.tile_at(p(1, 1)).unwrap().id;

    assert_eq!(board.swap_by_id(red, blue), board.swap(p(0, 0), p(0, 1)));
    // Diagonal by id is still a no-op
    assert_eq!(board.swap_by_id(red, yellow), board);
    // Unknown id
    assert_eq!(board.swap_by_id(red, TileId::next()), board);
}

#[test]
fn test_remove_tiles_leaves_holes() {
    let board = Board::from_glyphs(&["RRR", "BGY"]).unwrap();
    let matches = board.find_matches();
    let cleared = board.remove_tiles(&matches);

    assert_eq!(cleared.to_string(), "...\nBGY");
    assert_eq!(cleared.tile_count(), 3);
    assert!(!cleared.is_full());
}

#[test]
fn test_gravity_scenario_preserves_order() {
    let board = Board::from_rows(vec![
        vec![Some(TileColor::Red)],
        vec![None],
        vec![Some(TileColor::Blue)],
    ])
    .unwrap();
    let top = board.tile_at(p(0, 0)).unwrap().id;
    let bottom = board.tile_at(p(0, 2)).unwrap().id;

    let settled = board.apply_gravity();

    assert!(settled.tile_at(p(0, 0)).is_none());
    assert_eq!(settled.tile_at(p(0, 1)).unwrap().id, top);
    assert_eq!(settled.tile_at(p(0, 2)).unwrap().id, bottom);
    assert_eq!(Board::moved_tiles(&board, &settled), BTreeSet::from([top]));
}

#[test]
fn test_gravity_columns_independent() {
    let board = Board::from_glyphs(&["RG.", ".BY", "O.P", ".Y."]).unwrap();
    let settled = board.apply_gravity();
    assert_eq!(settled.to_string(), "...\n.G.\nRBY\nOYP");
    assert_eq!(ids(&settled), ids(&board));
}

#[test]
fn test_gravity_is_idempotent() {
    let board = Board::from_glyphs(&["R.G.", ".B..", "Y..O", "..P."]).unwrap();
    let once = board.apply_gravity();
    assert_eq!(once.apply_gravity(), once);
}

#[test]
fn test_remove_gravity_fill_restores_full_board() {
    let mut colors = RandomColors::full_palette(7);
    let board = Board::create_random(6, 6, &mut colors).unwrap();
    let holes: Vec<Position> = vec![p(0, 0), p(3, 2), p(3, 3), p(5, 5), p(2, 4)];

    let cleared = board.remove_tiles(&holes).remove_tiles(&[p(1, 1)]);
    let refilled = cleared.apply_gravity().fill_empty_spaces(&mut colors);

    assert!(refilled.is_full());
    assert_eq!(refilled.tile_count(), 36);
    assert_eq!(ids(&refilled).len(), 36);

    let created = Board::new_tiles(&cleared, &refilled);
    assert_eq!(created.len(), 6);
    for id in created {
        assert!(board.tile_by_id(id).is_none());
    }
}

#[test]
fn test_fill_uses_supplier_row_major() {
    let board = Board::from_glyphs(&["...", "..R", "GBY"]).unwrap();
    let mut colors = ScriptedColors::from_glyphs("OPOPO").unwrap();
    let filled = board.fill_empty_spaces(&mut colors);
    assert_eq!(filled.to_string(), "OPO\nPOR\nGBY");
    assert_eq!(colors.drawn(), 5);
}

#[test]
fn test_has_valid_moves_two_by_two() {
    let board = Board::from_glyphs(&["RG", "BY"]).unwrap();
    assert!(!board.has_valid_moves());
    assert_eq!(board.find_valid_move(), None);
}

#[test]
fn test_has_valid_moves_finds_vertical_completion() {
    let board = Board::from_glyphs(&["RGBY", "RGBY", "GRYB", "YBGR"]).unwrap();
    assert!(board.find_matches().is_empty());
    assert!(board.has_valid_moves());

    let (a, b) = board.find_valid_move().unwrap();
    assert!(a.is_adjacent_to(b));
    assert!(!board.swap(a, b).find_matches().is_empty());
}

#[test]
fn test_no_moves_when_no_color_has_three() {
    let board = Board::from_glyphs(&["OPY", "GBG", "BYP"]).unwrap();
    assert!(!board.has_valid_moves());
}
