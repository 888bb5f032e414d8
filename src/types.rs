//! Core types shared across the crate.
//!
//! Pure data: constants and closed enums with no game logic attached.

use serde::{Deserialize, Serialize};

/// Playfield dimensions. The matrix is 10 columns by 24 rows, of which the
/// top 4 rows are a hidden buffer above the visible skyline.
pub const COLS: usize = 10;
pub const ROWS: usize = 24;
pub const VISIBLE_ROWS: usize = 20;
pub const BUFFER_ROWS: usize = ROWS - VISIBLE_ROWS;

/// Timing constants (milliseconds).
pub const GRAVITY_MS: u32 = 100;
pub const LOCK_DELAY_MS: u32 = 250;
pub const LOCKOUT_OVERRIDE_MS: u32 = 2000;
pub const DAS_MS: u32 = 150;
pub const ARR_MS: u32 = 75;
pub const SOFT_DROP_DAS_MS: u32 = 75;
pub const SOFT_DROP_ARR_MS: u32 = 35;

/// Virtual time advanced per `step(action)` call.
pub const STEP_QUANTUM_MS: u32 = 10;

/// Lifetime of the cosmetic clear message.
pub const CLEAR_TEXT_MS: u32 = 2000;

/// Mode parameters.
pub const SPRINT_LINE_TARGET: u32 = 40;
pub const BLITZ_DURATION_MS: u32 = 180_000;
pub const BLITZ_PIECE_ALLOTMENT: u32 = 600;

/// Combo bonus per chained clear.
pub const COMBO_BASE: u32 = 50;

/// Back-to-back multiplier as a ratio (3/2). Every base score in the table
/// is a multiple of 100, so this multiplication is exact in integers.
pub const B2B_NUMERATOR: u32 = 3;
pub const B2B_DENOMINATOR: u32 = 2;

/// Tetromino piece kinds, in bag order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PieceKind {
    I,
    O,
    T,
    L,
    J,
    S,
    Z,
}

impl PieceKind {
    /// All seven kinds, the contents of one fresh bag.
    pub const ALL: [PieceKind; 7] = [
        PieceKind::I,
        PieceKind::O,
        PieceKind::T,
        PieceKind::L,
        PieceKind::J,
        PieceKind::S,
        PieceKind::Z,
    ];

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "I" => Some(PieceKind::I),
            "O" => Some(PieceKind::O),
            "T" => Some(PieceKind::T),
            "L" => Some(PieceKind::L),
            "J" => Some(PieceKind::J),
            "S" => Some(PieceKind::S),
            "Z" => Some(PieceKind::Z),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PieceKind::I => "I",
            PieceKind::O => "O",
            PieceKind::T => "T",
            PieceKind::L => "L",
            PieceKind::J => "J",
            PieceKind::S => "S",
            PieceKind::Z => "Z",
        }
    }
}

/// Rotation states. `Spawn` is the catalog orientation; the cycle
/// Spawn -> Right -> Flip -> Left is one clockwise turn each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rotation {
    Spawn,
    Right,
    Flip,
    Left,
}

impl Rotation {
    pub fn cw(&self) -> Self {
        match self {
            Rotation::Spawn => Rotation::Right,
            Rotation::Right => Rotation::Flip,
            Rotation::Flip => Rotation::Left,
            Rotation::Left => Rotation::Spawn,
        }
    }

    pub fn ccw(&self) -> Self {
        match self {
            Rotation::Spawn => Rotation::Left,
            Rotation::Left => Rotation::Flip,
            Rotation::Flip => Rotation::Right,
            Rotation::Right => Rotation::Spawn,
        }
    }
}

/// The command surface consumed by drivers. Indices are the wire values
/// used by the step interface; anything outside 0..=8 is rejected upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameAction {
    NoOp,
    MoveLeft,
    MoveRight,
    RotateCcw,
    RotateCw,
    SoftDrop,
    HardDrop,
    Hold,
    SonicDrop,
}

impl GameAction {
    pub fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(GameAction::NoOp),
            1 => Some(GameAction::MoveLeft),
            2 => Some(GameAction::MoveRight),
            3 => Some(GameAction::RotateCcw),
            4 => Some(GameAction::RotateCw),
            5 => Some(GameAction::SoftDrop),
            6 => Some(GameAction::HardDrop),
            7 => Some(GameAction::Hold),
            8 => Some(GameAction::SonicDrop),
            _ => None,
        }
    }

    pub fn index(&self) -> u8 {
        match self {
            GameAction::NoOp => 0,
            GameAction::MoveLeft => 1,
            GameAction::MoveRight => 2,
            GameAction::RotateCcw => 3,
            GameAction::RotateCw => 4,
            GameAction::SoftDrop => 5,
            GameAction::HardDrop => 6,
            GameAction::Hold => 7,
            GameAction::SonicDrop => 8,
        }
    }

    /// Parse the action names used by external move planners.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "Left" => Some(GameAction::MoveLeft),
            "Right" => Some(GameAction::MoveRight),
            "Ccw" => Some(GameAction::RotateCcw),
            "Cw" => Some(GameAction::RotateCw),
            "SonicDrop" => Some(GameAction::SonicDrop),
            "HardDrop" => Some(GameAction::HardDrop),
            "Hold" => Some(GameAction::Hold),
            _ => None,
        }
    }
}

/// T-spin classification of a lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpinKind {
    None,
    Mini,
    Full,
}

/// Session rule sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameMode {
    /// Open-ended play; lines count up.
    Endless,
    /// 40-line countdown; reaching zero ends the session successfully.
    Sprint,
    /// 180-second score attack with a 600-piece allotment.
    Blitz,
}

/// Why a session ended. Terminal and monotonic; only `reset` leaves it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameOverCondition {
    TopOut,
    SprintClear,
    TimeUp,
    OutOfPieces,
}

impl GameOverCondition {
    pub fn label(&self) -> &'static str {
        match self {
            GameOverCondition::TopOut => "Top Out!",
            GameOverCondition::SprintClear => "Clear!",
            GameOverCondition::TimeUp => "Time!",
            GameOverCondition::OutOfPieces => "Out of Pieces!",
        }
    }
}

/// Cell on the matrix (None = empty, Some = locked mino of that kind).
pub type Cell = Option<PieceKind>;
