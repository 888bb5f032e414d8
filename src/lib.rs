//! Headless guideline Tetris rules engine.
//!
//! A deterministic game-state core - SRS rotation with wall kicks, 7-bag
//! randomizer, hold, ghost, gravity/DAS/ARR/lock-delay timing, T-spin
//! detection and back-to-back/combo/perfect-clear scoring - behind a narrow
//! command/query surface for render loops, gym-style environments and
//! scripted agents. No rendering, no input polling, no networking.

pub mod core;
pub mod types;

pub use crate::core::{GameConfig, GameSession, GameSnapshot, Matrix, PlannerRequest, WallClock};
pub use crate::types::{GameAction, GameMode, GameOverCondition, PieceKind, Rotation, SpinKind};
