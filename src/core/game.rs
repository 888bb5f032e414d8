//! Game module - the session state machine.
//!
//! `GameSession` owns the matrix, the active piece, the randomizer, every
//! timing register and the scoring state, and exposes the step/advance
//! surface that external drivers consume. There are no ambient globals and
//! no internal threads; time enters exclusively through `advance` (or the
//! `WallClock` helper, which measures real time and feeds the same path).

use std::time::Instant;

use crate::core::bag::{BagQueue, PREVIEW_LEN};
use crate::core::matrix::Matrix;
use crate::core::pieces::{self, PieceCells};
use crate::core::scoring::{drop_points, score_clear};
use crate::core::timing::TimerBank;
use crate::types::{
    GameAction, GameMode, GameOverCondition, PieceKind, Rotation, SpinKind, ARR_MS,
    BLITZ_DURATION_MS, BLITZ_PIECE_ALLOTMENT, CLEAR_TEXT_MS, DAS_MS, GRAVITY_MS, LOCKOUT_OVERRIDE_MS,
    LOCK_DELAY_MS, SOFT_DROP_ARR_MS, SOFT_DROP_DAS_MS, SPRINT_LINE_TARGET, STEP_QUANTUM_MS,
};

/// The active falling piece. Exactly one exists while the session runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Piece {
    pub kind: PieceKind,
    pub rotation: Rotation,
    /// Absolute (row, col) positions of the four minos, catalog order.
    pub cells: PieceCells,
}

impl Piece {
    pub fn spawn(kind: PieceKind) -> Self {
        Self {
            kind,
            rotation: Rotation::Spawn,
            cells: pieces::spawn_cells(kind),
        }
    }

    pub fn translated(&self, drow: i8, dcol: i8) -> PieceCells {
        let mut cells = self.cells;
        for (row, col) in &mut cells {
            *row += drow;
            *col += dcol;
        }
        cells
    }

    /// Rotation pivot in absolute coordinates.
    pub fn pivot(&self) -> (i8, i8) {
        pieces::pivot_cell(self.kind, &self.cells)
    }
}

/// Session rules and handling tuning. Timing fields default to the standard
/// handling values; `advanced_handling` applies the faster preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameConfig {
    pub mode: GameMode,
    pub seed: u32,
    pub gravity_ms: u32,
    pub lock_delay_ms: u32,
    pub lockout_override_ms: u32,
    pub das_ms: u32,
    pub arr_ms: u32,
    pub soft_drop_das_ms: u32,
    pub soft_drop_arr_ms: u32,
    /// Lines to clear in Sprint.
    pub sprint_line_target: u32,
    /// Piece budget in Blitz.
    pub blitz_piece_allotment: u32,
    /// Session clock limit in Blitz.
    pub blitz_duration_ms: u32,
}

impl GameConfig {
    pub fn new(mode: GameMode, seed: u32) -> Self {
        Self {
            mode,
            seed,
            gravity_ms: GRAVITY_MS,
            lock_delay_ms: LOCK_DELAY_MS,
            lockout_override_ms: LOCKOUT_OVERRIDE_MS,
            das_ms: DAS_MS,
            arr_ms: ARR_MS,
            soft_drop_das_ms: SOFT_DROP_DAS_MS,
            soft_drop_arr_ms: SOFT_DROP_ARR_MS,
            sprint_line_target: SPRINT_LINE_TARGET,
            blitz_piece_allotment: BLITZ_PIECE_ALLOTMENT,
            blitz_duration_ms: BLITZ_DURATION_MS,
        }
    }

    /// Instant horizontal repeat and fast soft drop.
    pub fn advanced_handling(mut self) -> Self {
        self.arr_ms = 0;
        self.soft_drop_das_ms = 70;
        self.soft_drop_arr_ms = 15;
        self
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::new(GameMode::Endless, 1)
    }
}

/// Cosmetic clear announcement with a cooperative expiry countdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ClearText {
    label: &'static str,
    gold: bool,
    remaining_ms: u32,
}

/// Complete game state for one session.
#[derive(Debug, Clone)]
pub struct GameSession {
    config: GameConfig,
    matrix: Matrix,
    bag: BagQueue,
    active: Option<Piece>,
    held: Option<PieceKind>,
    hold_used: bool,
    timers: TimerBank,
    left_held: bool,
    right_held: bool,
    soft_drop_held: bool,
    score: u32,
    /// Lines remaining in Sprint, lines cleared otherwise.
    lines: u32,
    combo: u32,
    back_to_back: bool,
    total_pieces_placed: u32,
    /// Blitz piece allotment; None in other modes.
    pieces_remaining: Option<u32>,
    elapsed_ms: u32,
    qualified_for_t_spin: bool,
    wall_kick_5_used: bool,
    clear_text: Option<ClearText>,
    game_over: Option<GameOverCondition>,
}

impl GameSession {
    pub fn new(config: GameConfig) -> Self {
        let mut session = Self {
            config,
            matrix: Matrix::new(),
            bag: BagQueue::new(config.seed),
            active: None,
            held: None,
            hold_used: false,
            timers: TimerBank::new(),
            left_held: false,
            right_held: false,
            soft_drop_held: false,
            score: 0,
            lines: match config.mode {
                GameMode::Sprint => config.sprint_line_target,
                _ => 0,
            },
            combo: 0,
            back_to_back: false,
            total_pieces_placed: 0,
            pieces_remaining: match config.mode {
                GameMode::Blitz => Some(config.blitz_piece_allotment),
                _ => None,
            },
            elapsed_ms: 0,
            qualified_for_t_spin: false,
            wall_kick_5_used: false,
            clear_text: None,
            game_over: None,
        };
        session.spawn_next();
        session
    }

    /// Start over in the same mode with the RNG sequence advanced. The only
    /// transition out of game over.
    pub fn reset(&mut self) {
        let config = GameConfig {
            seed: self.bag.rng_state(),
            ..self.config
        };
        *self = Self::new(config);
    }

    // ----- queries -----

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn mode(&self) -> GameMode {
        self.config.mode
    }

    pub fn matrix(&self) -> &Matrix {
        &self.matrix
    }

    pub fn active(&self) -> Option<&Piece> {
        self.active.as_ref()
    }

    pub fn held(&self) -> Option<PieceKind> {
        self.held
    }

    pub fn hold_used(&self) -> bool {
        self.hold_used
    }

    pub fn next_queue(&self) -> [PieceKind; PREVIEW_LEN] {
        self.bag.preview()
    }

    pub fn bag_piece_count(&self) -> u8 {
        self.bag.bag_piece_count()
    }

    pub fn remaining_bag(&self) -> &[PieceKind] {
        self.bag.remaining_bag()
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    /// Lines remaining (Sprint) or cleared (other modes).
    pub fn lines(&self) -> u32 {
        self.lines
    }

    pub fn combo(&self) -> u32 {
        self.combo
    }

    pub fn back_to_back(&self) -> bool {
        self.back_to_back
    }

    pub fn total_pieces_placed(&self) -> u32 {
        self.total_pieces_placed
    }

    pub fn pieces_remaining(&self) -> Option<u32> {
        self.pieces_remaining
    }

    pub fn elapsed_ms(&self) -> u32 {
        self.elapsed_ms
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over.is_some()
    }

    pub fn game_over_condition(&self) -> Option<GameOverCondition> {
        self.game_over
    }

    /// The current clear announcement, if one is still showing:
    /// (label, renders-in-back-to-back-gold).
    pub fn clear_text(&self) -> Option<(&'static str, bool)> {
        self.clear_text.map(|t| (t.label, t.gold))
    }

    /// Direct grid access for scenario setup (tests, external tooling).
    /// Drivers must not mutate the matrix between steps.
    pub fn matrix_mut(&mut self) -> &mut Matrix {
        &mut self.matrix
    }

    /// Full serializable state for driver handoff.
    pub fn snapshot(&self) -> crate::core::snapshot::GameSnapshot {
        crate::core::snapshot::GameSnapshot::capture(self)
    }

    /// Resting cells of the active piece, for player preview.
    pub fn ghost_cells(&self) -> Option<PieceCells> {
        let piece = self.active?;
        let mut drop = 0i8;
        while self.matrix.is_valid_position(&piece.translated(drop + 1, 0)) {
            drop += 1;
        }
        Some(piece.translated(drop, 0))
    }

    /// True when any mino rests on the floor or on a locked cell.
    pub fn is_grounded(&self) -> bool {
        match self.active {
            Some(piece) => !self.matrix.is_valid_position(&piece.translated(1, 0)),
            None => false,
        }
    }

    // ----- movement -----

    /// Validate-and-commit a translation. A successful horizontal shift
    /// invalidates any pending spin; timer effects are left to the callers.
    fn shift(&mut self, drow: i8, dcol: i8) -> bool {
        let Some(piece) = self.active else {
            return false;
        };
        let cells = piece.translated(drow, dcol);
        if !self.matrix.is_valid_position(&cells) {
            return false;
        }
        self.active = Some(Piece { cells, ..piece });
        if dcol != 0 {
            self.qualified_for_t_spin = false;
            self.wall_kick_5_used = false;
        }
        true
    }

    /// Player-driven translation; success re-arms both lock delays.
    pub fn try_move(&mut self, drow: i8, dcol: i8) -> bool {
        if self.is_game_over() {
            return false;
        }
        if self.shift(drow, dcol) {
            self.timers.reset_lock_delays();
            true
        } else {
            false
        }
    }

    /// SRS rotation with wall kicks. The O piece never rotates but the
    /// attempt still re-arms the lock delays, like any other input.
    pub fn try_rotate(&mut self, clockwise: bool) -> bool {
        if self.is_game_over() {
            return false;
        }
        let Some(piece) = self.active else {
            return false;
        };

        if piece.kind == PieceKind::O {
            self.timers.reset_lock_delays();
            return false;
        }

        // A fresh attempt always forfeits last-kick credit until it succeeds.
        self.wall_kick_5_used = false;

        let matrix = &self.matrix;
        let outcome = pieces::try_rotate(piece.kind, piece.rotation, &piece.cells, clockwise, |c| {
            matrix.is_valid_position(c)
        });

        match outcome {
            Some(out) => {
                self.active = Some(Piece {
                    rotation: out.rotation,
                    cells: out.cells,
                    ..piece
                });
                self.qualified_for_t_spin = true;
                self.wall_kick_5_used = out.used_last_kick();
                self.timers.reset_lock_delays();
                true
            }
            None => false,
        }
    }

    /// Descend to the resting row without locking. Returns rows descended.
    fn drop_to_rest(&mut self) -> u32 {
        let mut rows = 0;
        while self.shift(1, 0) {
            rows += 1;
        }
        if rows > 0 {
            self.qualified_for_t_spin = false;
            self.wall_kick_5_used = false;
        }
        rows
    }

    /// One soft-drop row: +1 point on success; a grounded failure arms the
    /// soft-drop lock delay and the lockout override.
    pub fn soft_drop_step(&mut self) -> bool {
        if self.is_game_over() {
            return false;
        }
        if self.try_move(1, 0) {
            self.score += drop_points(1, false);
            self.qualified_for_t_spin = false;
            self.wall_kick_5_used = false;
            true
        } else {
            if self.is_grounded() {
                self.timers.arm_soft_drop_lock();
            }
            false
        }
    }

    /// Drop to rest and lock immediately, bypassing all delay timers.
    /// +2 points per row descended.
    pub fn hard_drop(&mut self) {
        if self.is_game_over() || self.active.is_none() {
            return;
        }
        let rows = self.drop_to_rest();
        self.score += drop_points(rows, true);
        self.lock_active();
    }

    /// Drop to rest without locking or points (planner drivers finish the
    /// sequence with a hard drop). Returns rows descended.
    pub fn sonic_drop(&mut self) -> u32 {
        if self.is_game_over() {
            return 0;
        }
        self.drop_to_rest()
    }

    /// Hold swap, at most once per lock. An empty slot stores the current
    /// kind and spawns from the queue; otherwise the kinds swap and the
    /// swapped-in piece respawns at spawn orientation and position.
    pub fn hold(&mut self) -> bool {
        if self.is_game_over() || self.hold_used {
            return false;
        }
        let Some(piece) = self.active else {
            return false;
        };

        match self.held {
            None => {
                self.held = Some(piece.kind);
                self.spawn_next();
            }
            Some(stored) => {
                self.held = Some(piece.kind);
                let respawned = Piece::spawn(stored);
                if !self.matrix.is_valid_position(&respawned.cells) {
                    self.active = Some(respawned);
                    self.game_over = Some(GameOverCondition::TopOut);
                    return false;
                }
                self.active = Some(respawned);
                self.qualified_for_t_spin = false;
                self.wall_kick_5_used = false;
                self.timers.clear_locks();
            }
        }

        self.hold_used = true;
        true
    }

    // ----- held-input surface (DAS/ARR lives in the core) -----

    pub fn press_left(&mut self) {
        if self.left_held {
            return;
        }
        self.left_held = true;
        self.timers.horizontal.press();
        self.try_move(0, -1);
    }

    pub fn release_left(&mut self) {
        self.left_held = false;
        if !self.right_held {
            self.timers.horizontal.release();
        }
    }

    pub fn press_right(&mut self) {
        if self.right_held {
            return;
        }
        self.right_held = true;
        self.timers.horizontal.press();
        self.try_move(0, 1);
    }

    pub fn release_right(&mut self) {
        self.right_held = false;
        if !self.left_held {
            self.timers.horizontal.release();
        }
    }

    pub fn press_soft_drop(&mut self) {
        if self.soft_drop_held {
            return;
        }
        self.soft_drop_held = true;
        self.timers.soft_drop.press();
        self.soft_drop_step();
    }

    pub fn release_soft_drop(&mut self) {
        self.soft_drop_held = false;
        self.timers.soft_drop.release();
        self.timers.clear_soft_drop_lock();
    }

    // ----- spawning and locking -----

    fn spawn_next(&mut self) {
        let piece = Piece::spawn(self.bag.draw());
        self.qualified_for_t_spin = false;
        self.wall_kick_5_used = false;
        self.timers.clear_locks();

        let top_out = !self.matrix.is_valid_position(&piece.cells);
        self.active = Some(piece);
        if top_out {
            self.game_over = Some(GameOverCondition::TopOut);
        }
    }

    /// T-spin classification at lock time. Only called for a T piece whose
    /// last successful input was a rotation. Corners are the four cells
    /// diagonal to the pivot; "front" flanks the side the nub points toward,
    /// and walls or the floor count as filled.
    fn detect_t_spin(&self, piece: &Piece) -> SpinKind {
        if self.wall_kick_5_used {
            // The last-resort kick gives unconditional full credit.
            return SpinKind::Full;
        }

        let (pr, pc) = piece.pivot();
        let (front, back) = match piece.rotation {
            Rotation::Spawn => ([(pr - 1, pc - 1), (pr - 1, pc + 1)], [(pr + 1, pc - 1), (pr + 1, pc + 1)]),
            Rotation::Right => ([(pr - 1, pc + 1), (pr + 1, pc + 1)], [(pr - 1, pc - 1), (pr + 1, pc - 1)]),
            Rotation::Flip => ([(pr + 1, pc - 1), (pr + 1, pc + 1)], [(pr - 1, pc - 1), (pr - 1, pc + 1)]),
            Rotation::Left => ([(pr - 1, pc - 1), (pr + 1, pc - 1)], [(pr - 1, pc + 1), (pr + 1, pc + 1)]),
        };

        let filled = |cells: [(i8, i8); 2]| {
            let a = self.matrix.corner_filled(cells[0].0, cells[0].1);
            let b = self.matrix.corner_filled(cells[1].0, cells[1].1);
            (a, b)
        };
        let (front_a, front_b) = filled(front);
        let (back_a, back_b) = filled(back);

        if front_a && front_b && (back_a || back_b) {
            SpinKind::Full
        } else if back_a && back_b && (front_a || front_b) {
            SpinKind::Mini
        } else {
            SpinKind::None
        }
    }

    /// Lock pipeline: grid write, spin classification, line clear, scoring,
    /// mode bookkeeping, then the next spawn (unless the session ended).
    fn lock_active(&mut self) {
        let Some(piece) = self.active.take() else {
            return;
        };

        self.matrix.lock(&piece.cells, piece.kind);

        let spin = if piece.kind == PieceKind::T && self.qualified_for_t_spin {
            self.detect_t_spin(&piece)
        } else {
            SpinKind::None
        };

        let cleared = self.matrix.clear_full_rows();
        let lines_cleared = cleared.len();
        let perfect_clear = lines_cleared > 0 && self.matrix.is_empty();

        match self.config.mode {
            GameMode::Sprint if lines_cleared > 0 => {
                if self.lines > lines_cleared as u32 {
                    self.lines -= lines_cleared as u32;
                } else {
                    self.lines = 0;
                    self.game_over.get_or_insert(GameOverCondition::SprintClear);
                }
            }
            _ => self.lines += lines_cleared as u32,
        }

        if lines_cleared == 0 {
            self.combo = 0;
        }

        let result = score_clear(
            lines_cleared,
            perfect_clear,
            spin,
            self.back_to_back,
            self.combo,
        );
        self.score += result.awarded;
        self.back_to_back = result.b2b_after;
        if let Some(label) = result.label {
            self.clear_text = Some(ClearText {
                label,
                gold: result.gold,
                remaining_ms: CLEAR_TEXT_MS,
            });
        }

        if lines_cleared > 0 {
            self.combo += 1;
        }

        self.total_pieces_placed += 1;
        if let Some(remaining) = &mut self.pieces_remaining {
            *remaining = remaining.saturating_sub(1);
            if *remaining == 0 {
                self.game_over.get_or_insert(GameOverCondition::OutOfPieces);
            }
        }

        self.hold_used = false;

        if self.game_over.is_none() {
            self.spawn_next();
        }
    }

    // ----- time -----

    /// Advance virtual time: gravity, auto-repeat, lock delay, lockout
    /// override, mode clocks and the clear-message expiry. Fixed-tick
    /// drivers call this directly; wall-clock drivers go through
    /// `WallClock`.
    pub fn advance(&mut self, dt_ms: u32) {
        if self.is_game_over() {
            return;
        }

        self.elapsed_ms = self.elapsed_ms.saturating_add(dt_ms);

        if let Some(text) = &mut self.clear_text {
            text.remaining_ms = text.remaining_ms.saturating_sub(dt_ms);
            if text.remaining_ms == 0 {
                self.clear_text = None;
            }
        }

        if self.config.mode == GameMode::Blitz && self.elapsed_ms >= self.config.blitz_duration_ms {
            self.game_over = Some(GameOverCondition::TimeUp);
            return;
        }

        if self.active.is_none() {
            return;
        }

        // Armed lock registers accrue the elapsed time first; events below
        // may re-arm them back to zero.
        self.timers.tick_locks(dt_ms);

        // Gravity: a successful descent disarms every lock register; a
        // grounded failure arms the gravity lock and the lockout override.
        let gravity_steps = self.timers.gravity_steps(dt_ms, self.config.gravity_ms);
        for _ in 0..gravity_steps {
            if self.shift(1, 0) {
                self.timers.clear_locks();
            } else if self.is_grounded() {
                self.timers.arm_gravity_lock();
            }
        }

        // Soft-drop auto-repeat.
        if self.soft_drop_held {
            let fires = self.timers.soft_drop.advance(
                dt_ms,
                self.config.soft_drop_das_ms,
                self.config.soft_drop_arr_ms,
            );
            let mut fired = 0;
            // An unbounded fire count (ARR = 0) ends at the first failed move.
            while fired < fires {
                if !self.soft_drop_step() {
                    break;
                }
                fired += 1;
            }
        }

        // Horizontal auto-repeat; left wins when both directions are held.
        let dcol = if self.left_held {
            -1
        } else if self.right_held {
            1
        } else {
            0
        };
        if dcol != 0 {
            let fires =
                self.timers
                    .horizontal
                    .advance(dt_ms, self.config.das_ms, self.config.arr_ms);
            let mut fired = 0;
            while fired < fires {
                if !self.try_move(0, dcol) {
                    break;
                }
                fired += 1;
            }
        }

        // Lock decision: still grounded with an expired lock delay, or the
        // lockout override ran out regardless of recent resets.
        if self.is_grounded()
            && (self.timers.lock_delay_expired(self.config.lock_delay_ms)
                || self.timers.lockout_expired(self.config.lockout_override_ms))
        {
            self.lock_active();
        }
    }

    // ----- command surface -----

    /// Execute one action. Returns whether the action had any effect.
    pub fn apply_action(&mut self, action: GameAction) -> bool {
        if self.is_game_over() {
            return false;
        }
        match action {
            GameAction::NoOp => false,
            GameAction::MoveLeft => self.try_move(0, -1),
            GameAction::MoveRight => self.try_move(0, 1),
            GameAction::RotateCcw => self.try_rotate(false),
            GameAction::RotateCw => self.try_rotate(true),
            GameAction::SoftDrop => self.soft_drop_step(),
            GameAction::HardDrop => {
                self.hard_drop();
                true
            }
            GameAction::Hold => self.hold(),
            GameAction::SonicDrop => self.sonic_drop() > 0,
        }
    }

    /// Execute one action, then advance the timing machine by the fixed
    /// 10 ms quantum, so gravity and locking progress under step drivers.
    pub fn step(&mut self, action: GameAction) {
        self.apply_action(action);
        self.advance(STEP_QUANTUM_MS);
    }

    /// `step` by wire index. Unknown indices are rejected as a pure no-op:
    /// no action, no time.
    pub fn step_index(&mut self, index: u8) {
        if let Some(action) = GameAction::from_index(index) {
            self.step(action);
        }
    }

    /// Pure lookahead: the session after `action`, leaving `self` untouched.
    pub fn simulate(&self, action: GameAction) -> GameSession {
        let mut next = self.clone();
        next.step(action);
        next
    }
}

impl Default for GameSession {
    fn default() -> Self {
        Self::new(GameConfig::default())
    }
}

/// Wall-clock driver adapter: measures real elapsed time and feeds it to
/// `advance`, making wall-clock and fixed-tick mode semantically identical.
#[derive(Debug)]
pub struct WallClock {
    last: Instant,
}

impl WallClock {
    pub fn new() -> Self {
        Self {
            last: Instant::now(),
        }
    }

    /// Advance the session by however much real time has passed.
    pub fn pump(&mut self, session: &mut GameSession) -> u32 {
        let now = Instant::now();
        let dt = now.duration_since(self.last).as_millis() as u32;
        self.last = now;
        if dt > 0 {
            session.advance(dt);
        }
        dt
    }
}

impl Default for WallClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::COLS;

    fn session() -> GameSession {
        GameSession::new(GameConfig::new(GameMode::Endless, 12345))
    }

    fn session_with_active(kind: PieceKind) -> GameSession {
        // Walk seeds until the requested kind spawns first.
        for seed in 1..2000 {
            let s = GameSession::new(GameConfig::new(GameMode::Endless, seed));
            if s.active().unwrap().kind == kind {
                return s;
            }
        }
        panic!("no seed produced an initial {kind:?} piece");
    }

    #[test]
    fn new_session_spawns_in_the_buffer() {
        let s = session();
        let piece = s.active().expect("fresh session has an active piece");
        assert!(piece.cells.iter().all(|&(row, _)| row < 4));
        assert!(!s.is_game_over());
        assert_eq!(s.score(), 0);
        assert_eq!(s.total_pieces_placed(), 0);
    }

    #[test]
    fn moves_commit_or_leave_the_piece_alone() {
        let mut s = session();
        let before = s.active().unwrap().cells;

        assert!(s.try_move(0, 1));
        assert_eq!(s.active().unwrap().cells, {
            let mut c = before;
            for cell in &mut c {
                cell.1 += 1;
            }
            c
        });

        assert!(s.try_move(0, -1));
        assert_eq!(s.active().unwrap().cells, before);
    }

    #[test]
    fn pieces_may_rest_partially_above_the_skyline() {
        let mut s = session();
        // Rows above the matrix are legal positions (column-checked only).
        assert!(s.try_move(-1, 0));
        assert!(s.try_move(-1, 0));
        assert!(s
            .active()
            .unwrap()
            .cells
            .iter()
            .any(|&(row, _)| row < 2));
    }

    #[test]
    fn walls_stop_horizontal_movement() {
        let mut s = session();
        let mut moved = 0;
        for _ in 0..COLS {
            if s.try_move(0, -1) {
                moved += 1;
            }
        }
        assert!(moved < COLS);
        let min_col = s.active().unwrap().cells.iter().map(|&(_, c)| c).min().unwrap();
        assert_eq!(min_col, 0);
    }

    #[test]
    fn rotation_updates_state_and_spin_flags() {
        let mut s = session_with_active(PieceKind::T);
        assert!(s.try_rotate(true));
        assert_eq!(s.active().unwrap().rotation, Rotation::Right);
        assert!(s.qualified_for_t_spin);

        // A horizontal shift forfeits the qualification.
        assert!(s.try_move(0, 1));
        assert!(!s.qualified_for_t_spin);
    }

    #[test]
    fn o_piece_rotation_is_a_no_op() {
        let mut s = session_with_active(PieceKind::O);
        let cells = s.active().unwrap().cells;
        assert!(!s.try_rotate(true));
        assert!(!s.try_rotate(false));
        assert_eq!(s.active().unwrap().cells, cells);
    }

    #[test]
    fn hard_drop_locks_on_the_bottom_row_and_scores_distance() {
        let mut s = session_with_active(PieceKind::I);
        // Spawn I occupies row 2; the floor row is 23, so it falls 21 rows.
        s.hard_drop();

        assert_eq!(s.total_pieces_placed(), 1);
        assert_eq!(s.score(), 42);
        assert_eq!(s.lines(), 0);
        assert_eq!(s.combo(), 0);
        assert!(s.matrix().is_occupied(23, 3));
        assert!(s.active().is_some(), "next piece spawned");
    }

    #[test]
    fn sonic_drop_descends_without_locking_or_points() {
        let mut s = session_with_active(PieceKind::I);
        let rows = s.sonic_drop();
        assert_eq!(rows, 21);
        assert_eq!(s.score(), 0);
        assert_eq!(s.total_pieces_placed(), 0);
        assert!(s.is_grounded());
    }

    #[test]
    fn ghost_matches_sonic_drop_resting_cells() {
        let mut s = session();
        let ghost = s.ghost_cells().unwrap();
        s.sonic_drop();
        assert_eq!(s.active().unwrap().cells, ghost);
    }

    #[test]
    fn hold_is_idempotent_until_the_next_lock() {
        let mut s = session();
        let first = s.active().unwrap().kind;
        let next = s.next_queue()[0];

        assert!(s.hold());
        assert_eq!(s.held(), Some(first));
        assert_eq!(s.active().unwrap().kind, next);

        // Second hold in a row is refused.
        assert!(!s.hold());
        assert_eq!(s.held(), Some(first));

        // After a lock the swap works and returns the stored kind.
        s.hard_drop();
        if s.is_game_over() {
            return;
        }
        let swapped_out = s.active().unwrap().kind;
        assert!(s.hold());
        assert_eq!(s.active().unwrap().kind, first);
        assert_eq!(s.held(), Some(swapped_out));
    }

    #[test]
    fn hold_swap_respawns_at_spawn_state() {
        let mut s = session();
        let first = s.active().unwrap().kind;
        assert!(s.hold());
        s.hard_drop();
        if s.is_game_over() {
            return;
        }
        assert!(s.hold());
        let piece = s.active().unwrap();
        assert_eq!(piece.kind, first);
        assert_eq!(piece.rotation, Rotation::Spawn);
        assert_eq!(piece.cells, pieces::spawn_cells(first));
    }

    #[test]
    fn gravity_pulls_the_piece_down() {
        let mut s = session();
        let top_before = s.active().unwrap().cells.iter().map(|&(r, _)| r).min().unwrap();
        // 500ms at 100ms gravity = 5 rows.
        for _ in 0..50 {
            s.advance(10);
        }
        let top_after = s.active().unwrap().cells.iter().map(|&(r, _)| r).min().unwrap();
        assert_eq!(top_after - top_before, 5);
    }

    #[test]
    fn grounded_piece_locks_after_the_lock_delay() {
        let mut s = session();
        s.sonic_drop();
        assert!(s.is_grounded());

        // The next gravity attempt fails and arms the lock delay; 250ms
        // later the piece locks.
        for _ in 0..40 {
            s.advance(10);
        }
        assert_eq!(s.total_pieces_placed(), 1);
    }

    #[test]
    fn movement_keeps_resetting_the_lock_delay() {
        let mut s = session();
        s.sonic_drop();

        // Wiggle horizontally every 100ms; the lock delay never elapses.
        let mut dir = 1i8;
        for _ in 0..10 {
            for _ in 0..10 {
                s.advance(10);
            }
            if !s.try_move(0, dir) {
                dir = -dir;
                s.try_move(0, dir);
            }
        }
        assert_eq!(s.total_pieces_placed(), 0);
    }

    #[test]
    fn lockout_override_forces_the_lock_eventually() {
        let mut s = session();
        s.sonic_drop();

        // Same wiggle, but past the 2000ms override the piece locks anyway.
        let mut dir = 1i8;
        for _ in 0..30 {
            for _ in 0..10 {
                s.advance(10);
            }
            if s.is_game_over() || s.total_pieces_placed() > 0 {
                break;
            }
            if !s.try_move(0, dir) {
                dir = -dir;
                s.try_move(0, dir);
            }
        }
        assert_eq!(s.total_pieces_placed(), 1);
    }

    #[test]
    fn das_repeats_carry_the_piece_to_the_wall() {
        let mut s = session();
        s.press_left();
        // One immediate move on press, then repeats after DAS.
        for _ in 0..100 {
            s.advance(10);
        }
        let min_col = s.active().unwrap().cells.iter().map(|&(_, c)| c).min().unwrap();
        assert_eq!(min_col, 0);
        s.release_left();
    }

    #[test]
    fn zero_arr_snaps_to_the_wall_once_das_elapses() {
        let config = GameConfig::new(GameMode::Endless, 12345).advanced_handling();
        let mut s = GameSession::new(config);
        s.press_right();

        // Before DAS only the initial press move has happened.
        s.advance(140);
        let max_col = s.active().unwrap().cells.iter().map(|&(_, c)| c).max().unwrap();
        assert!(max_col < COLS as i8 - 1);

        // DAS elapses inside this tick; instant repeat reaches the wall.
        s.advance(10);
        let max_col = s.active().unwrap().cells.iter().map(|&(_, c)| c).max().unwrap();
        assert_eq!(max_col, COLS as i8 - 1);
        s.release_right();
    }

    #[test]
    fn soft_drop_held_descends_and_scores_per_row() {
        let mut s = session();
        let score_before = s.score();
        s.press_soft_drop();
        assert_eq!(s.score(), score_before + 1);
        for _ in 0..20 {
            s.advance(10);
        }
        assert!(s.score() > score_before + 1);
        s.release_soft_drop();
    }

    #[test]
    fn step_advances_exactly_the_quantum() {
        let mut s = session();
        s.step(GameAction::NoOp);
        assert_eq!(s.elapsed_ms(), 10);
    }

    #[test]
    fn invalid_action_indices_are_rejected_outright() {
        let mut s = session();
        let before = s.elapsed_ms();
        s.step_index(9);
        s.step_index(200);
        assert_eq!(s.elapsed_ms(), before);
        s.step_index(0);
        assert_eq!(s.elapsed_ms(), before + 10);
    }

    #[test]
    fn simulate_leaves_the_session_untouched() {
        let s = session();
        let cells_before = s.active().unwrap().cells;
        let next = s.simulate(GameAction::HardDrop);
        assert_eq!(s.active().unwrap().cells, cells_before);
        assert_eq!(s.total_pieces_placed(), 0);
        assert_eq!(next.total_pieces_placed(), 1);
    }

    #[test]
    fn top_out_when_the_spawn_area_is_buried() {
        let mut s = session();
        for row in 0..6 {
            for col in 1..COLS as i8 {
                s.matrix_mut().set(row, col, Some(PieceKind::J));
            }
        }
        s.hard_drop();
        assert!(s.is_game_over());
        assert_eq!(s.game_over_condition(), Some(GameOverCondition::TopOut));

        // Game over is terminal: nothing moves any more.
        assert!(!s.apply_action(GameAction::MoveLeft));
        let placed = s.total_pieces_placed();
        s.step(GameAction::HardDrop);
        assert_eq!(s.total_pieces_placed(), placed);
    }

    #[test]
    fn reset_leaves_game_over_and_clears_state() {
        let mut s = session();
        s.hard_drop();
        let placed = s.total_pieces_placed();
        assert_eq!(placed, 1);

        s.reset();
        assert!(!s.is_game_over());
        assert_eq!(s.total_pieces_placed(), 0);
        assert_eq!(s.score(), 0);
        assert!(s.matrix().is_empty());
    }

    #[test]
    fn sprint_counts_lines_down() {
        let s = GameSession::new(GameConfig::new(GameMode::Sprint, 7));
        assert_eq!(s.lines(), SPRINT_LINE_TARGET);
    }

    #[test]
    fn blitz_ends_when_the_clock_runs_out() {
        let mut s = GameSession::new(GameConfig::new(GameMode::Blitz, 7));
        assert_eq!(s.pieces_remaining(), Some(BLITZ_PIECE_ALLOTMENT));
        // Burn the entire 180s clock in large steps.
        for _ in 0..200 {
            s.advance(1000);
            if s.is_game_over() {
                break;
            }
        }
        assert_eq!(s.game_over_condition(), Some(GameOverCondition::TimeUp));
    }

    #[test]
    fn clear_text_expires_cooperatively() {
        let mut s = session();
        s.clear_text = Some(ClearText {
            label: "Single!",
            gold: false,
            remaining_ms: CLEAR_TEXT_MS,
        });
        assert!(s.clear_text().is_some());
        s.advance(CLEAR_TEXT_MS - 1);
        assert!(s.clear_text().is_some());
        s.advance(1);
        assert!(s.clear_text().is_none());
    }
}
