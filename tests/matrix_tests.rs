//! Matrix integration tests - bounds, collision, clearing, heuristics.

use headless_tetris::types::{PieceKind, COLS, ROWS};
use headless_tetris::Matrix;

fn fill_row(matrix: &mut Matrix, row: i8, skip_col: Option<i8>) {
    for col in 0..COLS as i8 {
        if Some(col) != skip_col {
            matrix.set(row, col, Some(PieceKind::I));
        }
    }
}

#[test]
fn new_matrix_is_empty() {
    let matrix = Matrix::new();
    assert!(matrix.is_empty());
    for row in 0..ROWS as i8 {
        for col in 0..COLS as i8 {
            assert_eq!(matrix.get(row, col), Some(None));
        }
    }
}

#[test]
fn positions_outside_columns_are_rejected() {
    let matrix = Matrix::new();
    assert!(!matrix.is_valid_position(&[(5, -1)]));
    assert!(!matrix.is_valid_position(&[(5, COLS as i8)]));
    assert!(matrix.is_valid_position(&[(5, 0)]));
    assert!(matrix.is_valid_position(&[(5, COLS as i8 - 1)]));
}

#[test]
fn positions_below_the_floor_are_rejected() {
    let matrix = Matrix::new();
    assert!(!matrix.is_valid_position(&[(ROWS as i8, 4)]));
    assert!(matrix.is_valid_position(&[(ROWS as i8 - 1, 4)]));
}

#[test]
fn positions_overlapping_locked_cells_are_rejected() {
    let mut matrix = Matrix::new();
    matrix.set(12, 6, Some(PieceKind::S));
    assert!(!matrix.is_valid_position(&[(12, 6)]));
    assert!(matrix.is_valid_position(&[(11, 6), (13, 6)]));
}

#[test]
fn rows_above_the_matrix_only_check_columns() {
    let matrix = Matrix::new();
    assert!(matrix.is_valid_position(&[(-1, 0), (-3, 9)]));
    assert!(!matrix.is_valid_position(&[(-1, -1)]));
    assert!(!matrix.is_valid_position(&[(-1, COLS as i8)]));
}

#[test]
fn lock_writes_kind_into_the_grid() {
    let mut matrix = Matrix::new();
    matrix.lock(&[(22, 0), (23, 0), (23, 1), (23, 2)], PieceKind::J);
    assert_eq!(matrix.get(22, 0), Some(Some(PieceKind::J)));
    assert_eq!(matrix.get(23, 2), Some(Some(PieceKind::J)));
    assert_eq!(matrix.get(22, 1), Some(None));
}

#[test]
fn single_full_row_clears_and_compacts() {
    let mut matrix = Matrix::new();
    fill_row(&mut matrix, 23, None);
    matrix.set(22, 4, Some(PieceKind::T));

    let cleared = matrix.clear_full_rows();
    assert_eq!(cleared.as_slice(), &[23]);

    // The marker above gravitates into the bottom row; a fresh empty row
    // appears at the top.
    assert_eq!(matrix.get(23, 4), Some(Some(PieceKind::T)));
    assert_eq!(matrix.get(22, 4), Some(None));
    assert_eq!(matrix.get(0, 4), Some(None));
}

#[test]
fn partial_rows_do_not_clear() {
    let mut matrix = Matrix::new();
    fill_row(&mut matrix, 23, Some(7));
    assert!(matrix.clear_full_rows().is_empty());
    assert!(!matrix.is_empty());
}

#[test]
fn four_simultaneous_clears_preserve_relative_order() {
    let mut matrix = Matrix::new();
    for row in 20..24 {
        fill_row(&mut matrix, row, None);
    }
    matrix.set(18, 0, Some(PieceKind::L));
    matrix.set(19, 0, Some(PieceKind::S));

    let cleared = matrix.clear_full_rows();
    assert_eq!(cleared.len(), 4);

    // Both markers drop four rows, keeping their order.
    assert_eq!(matrix.get(22, 0), Some(Some(PieceKind::L)));
    assert_eq!(matrix.get(23, 0), Some(Some(PieceKind::S)));
}

#[test]
fn interleaved_full_rows_clear_together() {
    let mut matrix = Matrix::new();
    fill_row(&mut matrix, 20, None);
    fill_row(&mut matrix, 22, None);
    matrix.set(21, 3, Some(PieceKind::Z));
    matrix.set(19, 3, Some(PieceKind::J));

    let cleared = matrix.clear_full_rows();
    assert_eq!(cleared.as_slice(), &[22, 20]);

    // The empty bottom row stays put; the Z marker drops past the one full
    // row below it, the J marker past both.
    assert_eq!(matrix.get(23, 3), Some(None));
    assert_eq!(matrix.get(22, 3), Some(Some(PieceKind::Z)));
    assert_eq!(matrix.get(21, 3), Some(Some(PieceKind::J)));
}

#[test]
fn clearing_everything_leaves_an_empty_matrix() {
    let mut matrix = Matrix::new();
    fill_row(&mut matrix, 22, None);
    fill_row(&mut matrix, 23, None);
    assert_eq!(matrix.clear_full_rows().len(), 2);
    assert!(matrix.is_empty());
}

#[test]
fn heuristics_on_a_staircase() {
    let mut matrix = Matrix::new();
    // Heights 1, 2, 3 in columns 0..3.
    matrix.set(23, 0, Some(PieceKind::I));
    matrix.set(23, 1, Some(PieceKind::I));
    matrix.set(22, 1, Some(PieceKind::I));
    matrix.set(23, 2, Some(PieceKind::I));
    matrix.set(22, 2, Some(PieceKind::I));
    matrix.set(21, 2, Some(PieceKind::I));

    assert_eq!(matrix.aggregate_height(), 6);
    assert_eq!(matrix.count_holes(), 0);
    // Steps of 1, 1, then the 3-high drop back to the flat right side.
    assert_eq!(matrix.bumpiness(), 1 + 1 + 3);

    let score = matrix.evaluate([1.0, 0.0, 0.0, 0.0]);
    assert_eq!(score, 6.0);
}
