//! Synthetic card sheets shared by integration tests and benches.

#![allow(dead_code)]

use cardgrid_core::ingest::Detection;
use cardgrid_core::layout::Geometry;

#[derive(Clone)]
pub struct XorShift64 {
    state: u64,
}

impl XorShift64 {
    pub fn new(seed: u64) -> Self {
        Self { state: seed.max(1) }
    }

    pub fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }

    pub fn gen_f64(&mut self, min: f64, max: f64) -> f64 {
        let n = self.next_u64() as f64 / u64::MAX as f64;
        min + (max - min) * n
    }

    pub fn gen_usize(&mut self, min: usize, max: usize) -> usize {
        min + (self.next_u64() % (max - min + 1) as u64) as usize
    }
}

pub const LINE_HEIGHT: f64 = 24.0;
pub const COLUMN_PITCH: f64 = 400.0;
pub const CARD_PITCH: f64 = 160.0;

pub fn rect(x0: f64, y0: f64, x1: f64, y1: f64, text: &str, confidence: f64) -> Detection {
    Detection::new(Geometry::rect(x0, y0, x1, y1), text, confidence)
}

/// A sheet of `cards[c]` cards in column `c`, each card 1-3 lines tall.
///
/// Lines inside a card are 4px apart and cards are `CARD_PITCH` apart, so
/// with the default multiplier every card is recovered. Detections are
/// shuffled so callers never rely on input order.
pub fn card_sheet(seed: u64, cards: &[usize]) -> Vec<Detection> {
    let mut rng = XorShift64::new(seed);
    let mut out = Vec::new();
    // start jitter would split a lone column into several
    let occupied = cards.iter().filter(|&&count| count > 0).count();
    let jitter = if occupied > 1 { 6.0 } else { 0.0 };
    for (col, &count) in cards.iter().enumerate() {
        for card in 0..count {
            let lines = rng.gen_usize(1, 3);
            let top = card as f64 * CARD_PITCH;
            for line in 0..lines {
                let x0 = 30.0 + col as f64 * COLUMN_PITCH + rng.gen_f64(0.0, jitter);
                let y0 = top + line as f64 * (LINE_HEIGHT + 4.0);
                out.push(rect(
                    x0,
                    y0,
                    x0 + rng.gen_f64(80.0, 200.0),
                    y0 + LINE_HEIGHT,
                    &format!("c{col} r{card} l{line}"),
                    rng.gen_f64(0.5, 1.0),
                ));
            }
        }
    }
    for i in (1..out.len()).rev() {
        let j = rng.gen_usize(0, i);
        out.swap(i, j);
    }
    out
}
