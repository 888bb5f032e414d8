//! Pieces module - tetromino catalog and SRS rotation.
//!
//! Shapes are stored in their spawn orientation as (row, col) offsets and
//! rotated 90 degrees about a per-kind pivot cell; the I piece has no
//! natural center cell and uses a line-rebuild scheme instead. Wall kicks
//! are the standard SRS offset tables, expressed as (dcol, drow) with rows
//! growing downward.
//!
//! Reference: https://tetris.wiki/SRS

use crate::types::{PieceKind, Rotation};

/// Absolute or relative (row, col) cell position.
pub type CellPos = (i8, i8);

/// Four minos of one piece. The array order is the catalog order and is
/// preserved by every transform; T-spin detection relies on the T pivot
/// staying at `cells[PIECE_PIVOTS[T]]`.
pub type PieceCells = [CellPos; 4];

/// Spawn-orientation shapes, relative to the piece origin.
fn catalog_shape(kind: PieceKind) -> PieceCells {
    match kind {
        PieceKind::Z => [(0, -1), (0, 0), (1, 0), (1, 1)],
        PieceKind::S => [(1, -1), (1, 0), (0, 0), (0, 1)],
        PieceKind::L => [(1, -1), (1, 0), (1, 1), (0, 1)],
        PieceKind::J => [(1, -1), (1, 0), (1, 1), (0, -1)],
        PieceKind::O => [(0, 0), (0, 1), (1, 0), (1, 1)],
        PieceKind::T => [(1, -1), (1, 0), (1, 1), (0, 0)],
        PieceKind::I => [(0, 0), (0, 1), (0, 2), (0, 3)],
    }
}

/// Index of the rotation pivot within the catalog cell order.
fn pivot_index(kind: PieceKind) -> usize {
    match kind {
        // Middle of the three-segment row.
        PieceKind::L | PieceKind::J | PieceKind::T => 1,
        // Lower cell of the vertical two-stack.
        PieceKind::S => 1,
        PieceKind::Z => 2,
        // Not used geometrically; the I piece rotates by line rebuild
        // and the O piece never rotates.
        PieceKind::I => 1,
        PieceKind::O => 0,
    }
}

/// Spawn cells: the catalog shape translated two rows into the buffer and
/// horizontally centered (+4 columns, +3 for the wider I piece).
pub fn spawn_cells(kind: PieceKind) -> PieceCells {
    let col_shift = if kind == PieceKind::I { 3 } else { 4 };
    let mut cells = catalog_shape(kind);
    for (row, col) in &mut cells {
        *row += 2;
        *col += col_shift;
    }
    cells
}

/// Number of kick tests per rotation transition.
pub const KICK_TESTS: usize = 5;

type KickTable = [[(i8, i8); KICK_TESTS]; 8];

/// Kick offsets for J, L, S, T and Z.
const JLSTZ_KICKS: KickTable = [
    // Spawn -> Right (cw)
    [(0, 0), (-1, 0), (-1, -1), (0, 2), (-1, 2)],
    // Spawn -> Left (ccw)
    [(0, 0), (1, 0), (1, -1), (0, 2), (1, 2)],
    // Right -> Spawn (ccw)
    [(0, 0), (1, 0), (1, 1), (0, -2), (1, -2)],
    // Right -> Flip (cw)
    [(0, 0), (1, 0), (1, 1), (0, -2), (1, -2)],
    // Flip -> Right (ccw)
    [(0, 0), (-1, 0), (-1, -1), (0, 2), (-1, 2)],
    // Flip -> Left (cw)
    [(0, 0), (1, 0), (1, -1), (0, 2), (1, 2)],
    // Left -> Flip (ccw)
    [(0, 0), (-1, 0), (-1, 1), (0, -2), (-1, -2)],
    // Left -> Spawn (cw)
    [(0, 0), (-1, 0), (-1, 1), (0, -2), (-1, -2)],
];

/// Kick offsets for the I piece.
const I_KICKS: KickTable = [
    // Spawn -> Right (cw)
    [(0, 0), (-2, 0), (1, 0), (-2, 1), (1, -2)],
    // Spawn -> Left (ccw)
    [(0, 0), (-1, 0), (2, 0), (-1, -2), (2, 1)],
    // Right -> Spawn (ccw)
    [(0, 0), (2, 0), (-1, 0), (2, -1), (-1, 2)],
    // Right -> Flip (cw)
    [(0, 0), (-1, 0), (2, 0), (-1, -2), (2, 1)],
    // Flip -> Right (ccw)
    [(0, 0), (1, 0), (-2, 0), (1, 2), (-2, -1)],
    // Flip -> Left (cw)
    [(0, 0), (2, 0), (-1, 0), (2, -1), (-1, 2)],
    // Left -> Flip (ccw)
    [(0, 0), (-2, 0), (1, 0), (-2, 1), (1, -2)],
    // Left -> Spawn (cw)
    [(0, 0), (1, 0), (-2, 0), (1, 2), (-2, -1)],
];

fn kick_index(from: Rotation, clockwise: bool) -> usize {
    match (from, clockwise) {
        (Rotation::Spawn, true) => 0,
        (Rotation::Spawn, false) => 1,
        (Rotation::Right, false) => 2,
        (Rotation::Right, true) => 3,
        (Rotation::Flip, false) => 4,
        (Rotation::Flip, true) => 5,
        (Rotation::Left, false) => 6,
        (Rotation::Left, true) => 7,
    }
}

/// Rotate cells 90 degrees about the pivot cell, order-preserving.
fn rotate_about_pivot(cells: &PieceCells, pivot: usize, clockwise: bool) -> PieceCells {
    let (pr, pc) = cells[pivot];
    let mut out = *cells;
    for (row, col) in &mut out {
        let (dr, dc) = (*row - pr, *col - pc);
        if clockwise {
            *row = pr + dc;
            *col = pc - dr;
        } else {
            *row = pr - dc;
            *col = pc + dr;
        }
    }
    out
}

/// Rotate the I piece by rebuilding its line perpendicular to the old one.
///
/// The pivot is the cell at index 2 (cw) or 1 (ccw) along the long axis,
/// counted in ascending order from Spawn/Right and descending from
/// Flip/Left; the rebuilt line spans a fixed offset range per state. This
/// reproduces the SRS I rotation without a fractional geometric center.
fn rotate_i_line(cells: &PieceCells, from: Rotation, clockwise: bool) -> PieceCells {
    let horizontal = matches!(from, Rotation::Spawn | Rotation::Flip);
    let descending = matches!(from, Rotation::Flip | Rotation::Left);

    let mut sorted = *cells;
    sorted.sort_unstable_by_key(|&(row, col)| if horizontal { col } else { row });
    if descending {
        sorted.reverse();
    }
    let (pr, pc) = sorted[if clockwise { 2 } else { 1 }];

    let span: [i8; 4] = match from {
        Rotation::Spawn => [-1, 0, 1, 2],
        Rotation::Flip => [-2, -1, 0, 1],
        Rotation::Right => [-2, -1, 0, 1],
        Rotation::Left => [-1, 0, 1, 2],
    };

    let mut out = [(0i8, 0i8); 4];
    for (i, offset) in span.into_iter().enumerate() {
        out[i] = if horizontal {
            // Horizontal line becomes a vertical one through the pivot column.
            (pr + offset, pc)
        } else {
            (pr, pc + offset)
        };
    }
    out
}

/// A successful rotation with the kick that made it fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RotationOutcome {
    pub cells: PieceCells,
    pub rotation: Rotation,
    /// Which kick test succeeded (0 = no kick, KICK_TESTS - 1 = last resort).
    pub kick: usize,
}

impl RotationOutcome {
    /// The last-resort kick grants unconditional full T-spin credit.
    pub fn used_last_kick(&self) -> bool {
        self.kick == KICK_TESTS - 1
    }
}

/// Attempt an SRS rotation with wall kicks. Returns None for the O piece
/// and when every kick test collides; the caller leaves the piece unchanged.
pub fn try_rotate(
    kind: PieceKind,
    rotation: Rotation,
    cells: &PieceCells,
    clockwise: bool,
    is_valid: impl Fn(&PieceCells) -> bool,
) -> Option<RotationOutcome> {
    if kind == PieceKind::O {
        return None;
    }

    let target = if clockwise { rotation.cw() } else { rotation.ccw() };
    let rotated = if kind == PieceKind::I {
        rotate_i_line(cells, rotation, clockwise)
    } else {
        rotate_about_pivot(cells, pivot_index(kind), clockwise)
    };

    let table = if kind == PieceKind::I {
        &I_KICKS
    } else {
        &JLSTZ_KICKS
    };
    let kicks = &table[kick_index(rotation, clockwise)];

    for (i, &(dcol, drow)) in kicks.iter().enumerate() {
        let mut kicked = rotated;
        for (row, col) in &mut kicked {
            *row += drow;
            *col += dcol;
        }
        if is_valid(&kicked) {
            return Some(RotationOutcome {
                cells: kicked,
                rotation: target,
                kick: i,
            });
        }
    }

    None
}

/// Pivot cell of a piece in absolute coordinates (T-spin corner anchor).
pub fn pivot_cell(kind: PieceKind, cells: &PieceCells) -> CellPos {
    cells[pivot_index(kind)]
}
