//! Core module - the deterministic rules engine.
//!
//! Pure game state and rules; no I/O, no threads, no rendering. External
//! drivers call in synchronously through `GameSession`.

pub mod bag;
pub mod game;
pub mod matrix;
pub mod pieces;
pub mod scoring;
pub mod snapshot;
pub mod timing;

pub use bag::BagQueue;
pub use game::{GameConfig, GameSession, Piece, WallClock};
pub use matrix::Matrix;
pub use snapshot::{GameSnapshot, PlannerRequest};
