//! Scoring module - clear classification, score table, back-to-back rules.
//!
//! The table is keyed by (lines cleared, perfect clear, spin kind). Perfect
//! clears use fixed scores rather than additive bonuses; the two deepest
//! perfect clears (PC triple with spin, PC tetris) additionally carry a
//! "unique" back-to-back bonus that replaces the usual 3/2 multiplier.
//!
//! All values are multiples of 100, so the 3/2 back-to-back multiplier is
//! exact in integer arithmetic.

use crate::types::{SpinKind, B2B_DENOMINATOR, B2B_NUMERATOR, COMBO_BASE};

/// Outcome of scoring one lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClearScore {
    /// Table value before back-to-back and combo adjustments.
    pub base: u32,
    /// Points actually awarded (base after b2b rule, plus combo bonus).
    pub awarded: u32,
    /// Back-to-back status after this lock.
    pub b2b_after: bool,
    /// Display label for the clear, if it has one.
    pub label: Option<&'static str>,
    /// True when the label should render in the back-to-back accent color
    /// (the chain was alive before this clear and survived it).
    pub gold: bool,
}

/// One row of the score table.
struct TableRow {
    base: u32,
    /// Some(next b2b state); None leaves the chain untouched.
    b2b: Option<bool>,
    /// Fixed bonus replacing the 3/2 multiplier (deep perfect clears).
    unique_bonus: Option<u32>,
    label: Option<&'static str>,
}

fn table_row(lines: usize, perfect_clear: bool, spin: SpinKind) -> TableRow {
    let row = |base, b2b, unique_bonus, label| TableRow {
        base,
        b2b,
        unique_bonus,
        label,
    };

    match (lines, perfect_clear, spin) {
        // No lines: spins still score; the b2b chain is neither broken nor
        // started.
        (0, _, SpinKind::Mini) => row(100, None, None, Some("Mini T-Spin!")),
        (0, _, SpinKind::Full) => row(400, None, None, Some("T-Spin!")),
        (0, _, SpinKind::None) => row(0, None, None, None),

        // Singles. A perfect-clear single cannot carry a spin.
        (1, false, SpinKind::None) => row(100, Some(false), None, Some("Single!")),
        (1, false, SpinKind::Mini) => row(200, Some(true), None, Some("Mini TSS!")),
        (1, false, SpinKind::Full) => row(800, Some(true), None, Some("TSS!")),
        (1, true, _) => row(900, Some(false), None, Some("Perfect Clear!")),

        // Doubles.
        (2, false, SpinKind::None) => row(300, Some(false), None, Some("Double!")),
        (2, false, SpinKind::Mini) => row(400, Some(true), None, Some("Mini TSD!")),
        (2, false, SpinKind::Full) => row(1200, Some(true), None, Some("TSD!")),
        (2, true, _) => row(1500, Some(false), None, Some("Perfect Clear!")),

        // Triples. Every spin triple is a full TST (all four corners are
        // necessarily covered, so no mini variant exists).
        (3, false, SpinKind::None) => row(500, Some(false), None, Some("Triple!")),
        (3, false, _) => row(1600, Some(true), None, Some("TST!")),
        (3, true, SpinKind::None) => row(2300, Some(false), None, Some("Perfect Clear!")),
        (3, true, _) => row(3400, Some(true), Some(800), Some("Perfect TST!")),

        // Tetrises.
        (4, false, _) => row(800, Some(true), None, Some("Tetris!")),
        (4, true, _) => row(2800, Some(true), Some(1200), Some("Perfect Tetris!")),

        _ => row(0, None, None, None),
    }
}

/// Score one lock.
///
/// `combo` is the chain counter *before* this clear increments it; the
/// caller resets it to zero on a no-clear lock before calling in, so the
/// combo bonus is always `COMBO_BASE * combo`.
///
/// Back-to-back point assignment uses the permissive rule: base points
/// whenever the player lacked b2b coming in or this clear broke it, the
/// 3/2 multiplier when the chain held across the clear, and the fixed
/// unique bonus instead of the multiplier for the deep perfect clears.
pub fn score_clear(
    lines: usize,
    perfect_clear: bool,
    spin: SpinKind,
    had_b2b: bool,
    combo: u32,
) -> ClearScore {
    let row = table_row(lines, perfect_clear, spin);
    let b2b_after = row.b2b.unwrap_or(had_b2b);

    let points = if !had_b2b || !b2b_after {
        row.base
    } else if let Some(bonus) = row.unique_bonus {
        row.base + bonus
    } else {
        row.base * B2B_NUMERATOR / B2B_DENOMINATOR
    };

    ClearScore {
        base: row.base,
        awarded: points + COMBO_BASE * combo,
        b2b_after,
        label: row.label,
        gold: had_b2b && b2b_after,
    }
}

/// Points for descending `rows` cells: 1 each for soft drops, 2 for hard
/// drops. Sonic drops score nothing.
pub fn drop_points(rows: u32, hard: bool) -> u32 {
    if hard {
        rows * 2
    } else {
        rows
    }
}
