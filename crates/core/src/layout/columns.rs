//! Column partitioning and block assignment.
//!
//! Columns are found from the horizontal start positions of blocks alone:
//! the widest gap between consecutive starts sets the scale, and every gap
//! strictly wider than `column_gap_ratio` of it opens a new column.

use ordered_float::OrderedFloat;
use tracing::debug;

use super::clustering::{cluster_starts, max_gap, sorted};
use super::types::Block;

/// A vertical strip of the page.
#[derive(Clone, Debug, PartialEq)]
pub struct Column {
    pub index: usize,
    /// Leftmost block start that opened this column.
    pub left: f64,
    /// Blocks sorted by `start_y`, ties in detection order.
    pub blocks: Vec<Block>,
}

/// Find the left boundaries of the columns spanned by `blocks`.
///
/// Boundaries are strictly increasing. An empty input yields no boundaries;
/// otherwise there is at least one.
pub fn partition_columns(blocks: &[Block], column_gap_ratio: f64) -> Vec<f64> {
    let xs = sorted(blocks.iter().map(Block::start_x).collect());
    let threshold = max_gap(&xs) * column_gap_ratio;
    let boundaries = cluster_starts(&xs, threshold);
    debug!(
        blocks = blocks.len(),
        threshold,
        columns = boundaries.len(),
        "column boundaries"
    );
    boundaries
}

/// Index of the column owning a block that starts at `x`.
///
/// The owner is the column with the greatest boundary `<= x`; anything left
/// of the first boundary belongs to column 0.
pub fn column_index(boundaries: &[f64], x: f64) -> usize {
    boundaries.partition_point(|b| *b <= x).saturating_sub(1)
}

/// Distribute `blocks` over the columns described by `boundaries`.
///
/// Returns one `Column` per boundary, each holding its blocks stable-sorted
/// by `start_y`.
pub fn assign_columns(blocks: Vec<Block>, boundaries: &[f64]) -> Vec<Column> {
    let mut columns: Vec<Column> = boundaries
        .iter()
        .enumerate()
        .map(|(index, left)| Column {
            index,
            left: *left,
            blocks: Vec::new(),
        })
        .collect();
    if columns.is_empty() {
        return columns;
    }

    for block in blocks {
        let idx = column_index(boundaries, block.start_x());
        columns[idx].blocks.push(block);
    }
    for column in &mut columns {
        column.blocks.sort_by_key(|b| OrderedFloat(b.start_y()));
    }
    columns
}
