//! Timing module - millisecond registers for the lock state machine.
//!
//! Everything here is driven by virtual elapsed milliseconds fed through
//! `GameSession::advance`; a wall-clock driver measures real time and feeds
//! the same path, so both modes share one set of semantics.
//!
//! Lock-delay registers are `Option<u32>` elapsed accumulators: `None` means
//! the timer is not armed. Re-arming a running timer back to `Some(0)` is
//! the "move resets lock delay" rule; the lockout override is armed together
//! with the first lock timer and is deliberately never reset by moves.

/// Sentinel repeat count meaning "repeat until the move fails" (ARR = 0).
pub const REPEAT_UNBOUNDED: u32 = u32::MAX;

/// DAS/ARR state for one held input (horizontal pair or soft drop).
///
/// The first auto-repeat fires the instant the DAS delay elapses; later
/// repeats fire every ARR interval, with excess time carried over so a
/// coarse tick cannot lose repeats.
#[derive(Debug, Clone, Copy, Default)]
pub struct RepeatTimer {
    held_ms: u32,
    arr_acc_ms: u32,
}

impl RepeatTimer {
    /// Restart on a fresh key press.
    pub fn press(&mut self) {
        self.held_ms = 0;
        self.arr_acc_ms = 0;
    }

    /// Clear on release.
    pub fn release(&mut self) {
        self.held_ms = 0;
        self.arr_acc_ms = 0;
    }

    /// Advance by `dt` ms of hold time; returns how many auto-repeats are
    /// due, or `REPEAT_UNBOUNDED` when `arr == 0` and DAS has elapsed.
    pub fn advance(&mut self, dt: u32, das: u32, arr: u32) -> u32 {
        let before = self.held_ms;
        self.held_ms = self.held_ms.saturating_add(dt);

        if self.held_ms < das {
            return 0;
        }

        let mut fires = 0;
        if before < das {
            // DAS boundary crossed this tick: one immediate repeat, with the
            // overshoot feeding the ARR accumulator.
            fires = 1;
            self.arr_acc_ms = self.held_ms - das;
        } else {
            self.arr_acc_ms = self.arr_acc_ms.saturating_add(dt);
        }

        if arr == 0 {
            return REPEAT_UNBOUNDED;
        }

        while self.arr_acc_ms >= arr {
            self.arr_acc_ms -= arr;
            fires += 1;
        }
        fires
    }
}

/// All timing registers of one active piece plus the gravity accumulator.
#[derive(Debug, Clone, Copy, Default)]
pub struct TimerBank {
    gravity_acc_ms: u32,
    pub horizontal: RepeatTimer,
    pub soft_drop: RepeatTimer,
    gravity_lock_ms: Option<u32>,
    soft_drop_lock_ms: Option<u32>,
    lockout_override_ms: Option<u32>,
}

impl TimerBank {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of gravity descents due after `dt` more milliseconds.
    pub fn gravity_steps(&mut self, dt: u32, interval: u32) -> u32 {
        self.gravity_acc_ms = self.gravity_acc_ms.saturating_add(dt);
        let mut steps = 0;
        while self.gravity_acc_ms >= interval {
            self.gravity_acc_ms -= interval;
            steps += 1;
        }
        steps
    }

    /// Accumulate `dt` into every armed lock register.
    pub fn tick_locks(&mut self, dt: u32) {
        for timer in [
            &mut self.gravity_lock_ms,
            &mut self.soft_drop_lock_ms,
            &mut self.lockout_override_ms,
        ] {
            if let Some(elapsed) = timer {
                *elapsed = elapsed.saturating_add(dt);
            }
        }
    }

    /// Arm the gravity-side lock delay and the lockout override if idle.
    pub fn arm_gravity_lock(&mut self) {
        self.gravity_lock_ms.get_or_insert(0);
        self.lockout_override_ms.get_or_insert(0);
    }

    /// Arm the soft-drop-side lock delay and the lockout override if idle.
    pub fn arm_soft_drop_lock(&mut self) {
        self.soft_drop_lock_ms.get_or_insert(0);
        self.lockout_override_ms.get_or_insert(0);
    }

    /// Re-arm both lock delays (successful move or rotation). The lockout
    /// override keeps running.
    pub fn reset_lock_delays(&mut self) {
        if self.gravity_lock_ms.is_some() {
            self.gravity_lock_ms = Some(0);
        }
        if self.soft_drop_lock_ms.is_some() {
            self.soft_drop_lock_ms = Some(0);
        }
    }

    /// Disarm everything lock-related (gravity descent succeeded, or a new
    /// piece took over).
    pub fn clear_locks(&mut self) {
        self.gravity_lock_ms = None;
        self.soft_drop_lock_ms = None;
        self.lockout_override_ms = None;
    }

    /// Disarm only the soft-drop lock register (soft drop released).
    pub fn clear_soft_drop_lock(&mut self) {
        self.soft_drop_lock_ms = None;
    }

    /// Either lock delay ran out while armed.
    pub fn lock_delay_expired(&self, lock_delay: u32) -> bool {
        self.gravity_lock_ms.is_some_and(|t| t >= lock_delay)
            || self.soft_drop_lock_ms.is_some_and(|t| t >= lock_delay)
    }

    /// The lockout override ran out; not resettable by movement.
    pub fn lockout_expired(&self, lockout: u32) -> bool {
        self.lockout_override_ms.is_some_and(|t| t >= lockout)
    }
}
