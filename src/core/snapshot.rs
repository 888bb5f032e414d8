//! Snapshot module - serializable views of a session.
//!
//! `GameSnapshot` is the full-state marshal format for drivers that need to
//! hand the game off (or log it); `PlannerRequest` is the narrower exchange
//! format consumed by external move planners over a file or pipe, paired
//! with `parse_plan` for the action list they send back.

use serde::{Deserialize, Serialize};

use crate::core::game::{GameSession, Piece};
use crate::core::pieces::PieceCells;
use crate::types::{Cell, GameMode, GameOverCondition, PieceKind, Rotation, COLS, ROWS};

/// Number of field rows in the planner exchange format. The planner models
/// a 40-row board; rows above our 24 are always empty.
pub const PLANNER_FIELD_ROWS: usize = 40;

/// Active piece view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveSnapshot {
    pub kind: PieceKind,
    pub rotation: Rotation,
    pub cells: PieceCells,
}

impl From<&Piece> for ActiveSnapshot {
    fn from(piece: &Piece) -> Self {
        Self {
            kind: piece.kind,
            rotation: piece.rotation,
            cells: piece.cells,
        }
    }
}

/// Complete serializable game state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub mode: GameMode,
    /// Row-major grid, top row first (buffer rows included).
    pub grid: [[Cell; COLS]; ROWS],
    pub active: Option<ActiveSnapshot>,
    pub ghost: Option<PieceCells>,
    pub hold: Option<PieceKind>,
    pub next_queue: [PieceKind; 5],
    pub bag_piece_count: u8,
    pub score: u32,
    pub lines: u32,
    pub combo: u32,
    pub back_to_back: bool,
    pub total_pieces_placed: u32,
    pub pieces_remaining: Option<u32>,
    pub elapsed_ms: u32,
    pub game_over: Option<GameOverCondition>,
}

impl GameSnapshot {
    pub fn capture(session: &GameSession) -> Self {
        let mut grid = [[None; COLS]; ROWS];
        for row in 0..ROWS {
            for col in 0..COLS {
                grid[row][col] = session.matrix().cells()[row * COLS + col];
            }
        }

        Self {
            mode: session.mode(),
            grid,
            active: session.active().map(ActiveSnapshot::from),
            ghost: session.ghost_cells(),
            hold: session.held(),
            next_queue: session.next_queue(),
            bag_piece_count: session.bag_piece_count(),
            score: session.score(),
            lines: session.lines(),
            combo: session.combo(),
            back_to_back: session.back_to_back(),
            total_pieces_placed: session.total_pieces_placed(),
            pieces_remaining: session.pieces_remaining(),
            elapsed_ms: session.elapsed_ms(),
            game_over: session.game_over_condition(),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

/// The state handed to an external move planner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannerRequest {
    pub piece: PieceKind,
    /// 40 rows by 10 columns, bottom row first, 1 = filled.
    pub field: Vec<Vec<u8>>,
    /// Pieces still waiting in the current bag, draw order.
    pub bag: Vec<PieceKind>,
    pub hold: Option<PieceKind>,
    pub next: Vec<PieceKind>,
    pub b2b: bool,
    pub combo: u32,
}

impl PlannerRequest {
    /// None when the session has no active piece (terminal states).
    pub fn capture(session: &GameSession) -> Option<Self> {
        let active = session.active()?;

        let cells = session.matrix().cells();
        let mut field = Vec::with_capacity(PLANNER_FIELD_ROWS);
        for planner_row in 0..PLANNER_FIELD_ROWS {
            let mut row = vec![0u8; COLS];
            // Planner rows count up from the floor; ours count down from
            // the buffer.
            if planner_row < ROWS {
                let matrix_row = ROWS - 1 - planner_row;
                for (col, cell) in row.iter_mut().enumerate() {
                    *cell = u8::from(cells[matrix_row * COLS + col].is_some());
                }
            }
            field.push(row);
        }

        Some(Self {
            piece: active.kind,
            field,
            bag: session.remaining_bag().to_vec(),
            hold: session.held(),
            next: session.next_queue().to_vec(),
            b2b: session.back_to_back(),
            combo: session.combo(),
        })
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

/// Decode a planner's action-name sequence ("Hold", "Left", "Right", "Ccw",
/// "Cw", "SonicDrop", ...). Unknown names are skipped, mirroring the
/// lenient command handling of the step interface.
pub fn parse_plan(names: &[String]) -> Vec<crate::types::GameAction> {
    names
        .iter()
        .filter_map(|name| crate::types::GameAction::from_name(name))
        .collect()
}
