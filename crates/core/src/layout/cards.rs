//! Card clustering inside a single column.
//!
//! A card is a run of vertically adjacent blocks. The break threshold scales
//! with the column's median block height, so dense and sparse documents are
//! handled with the same multiplier.

use tracing::trace;

use super::clustering::{median, split_on_gaps};
use super::params::FALLBACK_LINE_HEIGHT;
use super::types::Block;
use crate::confidence::mean_confidence;

/// One logical multi-line item.
#[derive(Clone, Debug, PartialEq)]
pub struct Card {
    /// Member blocks, top to bottom.
    pub blocks: Vec<Block>,
}

impl Card {
    /// Member texts joined line by line.
    pub fn merged_text(&self) -> String {
        self.blocks
            .iter()
            .map(|b| b.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Mean member confidence, 0 for an empty card.
    pub fn confidence(&self) -> f64 {
        mean_confidence(&self.blocks)
    }

    pub fn start_y(&self) -> Option<f64> {
        self.blocks.first().map(Block::start_y)
    }
}

/// Median block height of a column, falling back to
/// [`FALLBACK_LINE_HEIGHT`] when the column carries no usable heights.
pub fn median_height(blocks: &[Block]) -> f64 {
    match median(blocks.iter().map(Block::height).collect()) {
        Some(h) if h > 0.0 => h,
        _ => FALLBACK_LINE_HEIGHT,
    }
}

/// Group the blocks of one column into cards.
///
/// `blocks` must already be sorted by `start_y`. A new card starts when the
/// space between a block's top and the previous block's bottom is strictly
/// greater than `median_height * row_gap_multiplier`.
pub fn cluster_cards(blocks: Vec<Block>, row_gap_multiplier: f64) -> Vec<Card> {
    let threshold = median_height(&blocks) * row_gap_multiplier;
    let cards: Vec<Card> = split_on_gaps(blocks, threshold, |prev, next| {
        next.start_y() - prev.end_y()
    })
    .into_iter()
    .map(|blocks| Card { blocks })
    .collect();
    trace!(threshold, cards = cards.len(), "clustered column");
    cards
}
