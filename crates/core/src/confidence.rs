//! Confidence aggregation.

use crate::layout::{Block, Card};

/// Arithmetic mean of block confidences; 0 when there are none.
pub fn mean_confidence(blocks: &[Block]) -> f64 {
    if blocks.is_empty() {
        return 0.0;
    }
    blocks.iter().map(|b| b.confidence).sum::<f64>() / blocks.len() as f64
}

/// Mean confidence over every block placed in a card.
///
/// Each block is weighted once, so a three-line card counts three times as
/// much as a one-line card. Returns 0 when no block was placed.
pub fn overall_confidence<'a>(cards: impl IntoIterator<Item = &'a Card>) -> f64 {
    let (sum, count) = cards
        .into_iter()
        .flat_map(|card| card.blocks.iter())
        .fold((0.0, 0usize), |(sum, count), b| (sum + b.confidence, count + 1));
    if count == 0 {
        0.0
    } else {
        (sum / count as f64).clamp(0.0, 1.0)
    }
}

/// Round to 4 decimal places for reporting.
pub fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}
