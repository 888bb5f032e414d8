//! Bag module - seeded RNG and the two-bag piece randomizer.
//!
//! Two independently shuffled 7-bags are kept alive at all times so the
//! 5-piece preview never has to look further than one unfilled bag ahead.
//! Draws come off the primary bag; when it drains, the secondary is promoted
//! and a fresh secondary is shuffled.

use crate::types::PieceKind;

/// Simple LCG (Numerical Recipes constants). Deterministic per seed.
#[derive(Debug, Clone)]
pub struct SimpleRng {
    state: u32,
}

impl SimpleRng {
    pub fn new(seed: u32) -> Self {
        // A zero state would never leave zero.
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    pub fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_mul(1664525).wrapping_add(1013904223);
        self.state
    }

    pub fn next_range(&mut self, max: u32) -> u32 {
        self.next_u32() % max
    }

    /// Fisher-Yates shuffle.
    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        for i in (1..slice.len()).rev() {
            let j = self.next_range((i + 1) as u32) as usize;
            slice.swap(i, j);
        }
    }

    pub fn state(&self) -> u32 {
        self.state
    }
}

/// Two-bag randomizer with a 5-piece preview queue.
#[derive(Debug, Clone)]
pub struct BagQueue {
    primary: Vec<PieceKind>,
    secondary: Vec<PieceKind>,
    preview: Vec<PieceKind>,
    /// Cyclic 1..=7 spawn counter, used by UIs to draw bag separators.
    /// Not gameplay-affecting.
    bag_piece_count: u8,
    rng: SimpleRng,
}

/// Preview length guaranteed after every draw.
pub const PREVIEW_LEN: usize = 5;

impl BagQueue {
    pub fn new(seed: u32) -> Self {
        let mut queue = Self {
            primary: Vec::with_capacity(7),
            secondary: Vec::with_capacity(7),
            preview: Vec::with_capacity(PREVIEW_LEN + 1),
            bag_piece_count: 0,
            rng: SimpleRng::new(seed),
        };
        queue.top_up_preview();
        queue
    }

    fn fresh_bag(rng: &mut SimpleRng) -> Vec<PieceKind> {
        let mut bag = PieceKind::ALL.to_vec();
        rng.shuffle(&mut bag);
        bag
    }

    /// Refill policy: both bags empty means two fresh shuffles; a drained
    /// primary promotes the secondary and shuffles a new one behind it.
    fn refill(&mut self) {
        if self.primary.is_empty() && self.secondary.is_empty() {
            self.primary = Self::fresh_bag(&mut self.rng);
            self.secondary = Self::fresh_bag(&mut self.rng);
        } else if self.primary.is_empty() {
            self.primary = std::mem::take(&mut self.secondary);
            self.secondary = Self::fresh_bag(&mut self.rng);
        }
    }

    fn top_up_preview(&mut self) {
        while self.preview.len() < PREVIEW_LEN {
            if self.primary.is_empty() {
                self.refill();
            }
            self.preview.push(self.primary.remove(0));
        }
    }

    /// Dequeue the next piece, keeping the preview fully populated both
    /// before and after the draw.
    pub fn draw(&mut self) -> PieceKind {
        self.top_up_preview();
        let kind = self.preview.remove(0);
        self.top_up_preview();

        self.bag_piece_count = if self.bag_piece_count < 7 {
            self.bag_piece_count + 1
        } else {
            1
        };

        kind
    }

    /// The upcoming 5 pieces in draw order.
    pub fn preview(&self) -> [PieceKind; PREVIEW_LEN] {
        let mut out = [PieceKind::I; PREVIEW_LEN];
        out.copy_from_slice(&self.preview[..PREVIEW_LEN]);
        out
    }

    /// Pieces still waiting in the primary bag (after the preview cut).
    pub fn remaining_bag(&self) -> &[PieceKind] {
        &self.primary
    }

    pub fn bag_piece_count(&self) -> u8 {
        self.bag_piece_count
    }

    /// Current RNG state, usable as the seed of a follow-up session.
    pub fn rng_state(&self) -> u32 {
        self.rng.state()
    }
}

impl Default for BagQueue {
    fn default() -> Self {
        Self::new(1)
    }
}
