//! Final result assembly.

use serde::{Deserialize, Serialize};

use crate::confidence::round4;
use crate::layout::{Cell, Grid};

/// Structured result handed to presentation and export code.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutResult {
    pub rows: usize,
    pub columns: usize,
    /// `cells[row][col]`; every row has exactly `columns` entries.
    pub cells: Vec<Vec<Cell>>,
    pub overall_confidence: f64,
    pub dropped_block_count: usize,
    pub warnings: Vec<String>,
    /// Number of blocks placed in the grid.
    pub block_count: usize,
    /// Present cells in row-major order, one per line.
    pub text: String,
}

impl LayoutResult {
    pub fn cell(&self, row: usize, col: usize) -> Option<&Cell> {
        self.cells.get(row).and_then(|r| r.get(col))
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }
}

/// Assemble the result. Confidences are rounded to four decimals.
pub fn build_output(
    grid: Grid,
    overall_confidence: f64,
    block_count: usize,
    dropped_block_count: usize,
    warnings: Vec<String>,
) -> LayoutResult {
    let text = grid
        .present_cells()
        .map(|c| c.text.as_str())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join("\n");
    let cells = grid
        .cells
        .into_iter()
        .map(|row| {
            row.into_iter()
                .map(|cell| Cell {
                    confidence: round4(cell.confidence),
                    ..cell
                })
                .collect()
        })
        .collect();

    LayoutResult {
        rows: grid.rows,
        columns: grid.cols,
        cells,
        overall_confidence: round4(overall_confidence),
        dropped_block_count,
        warnings,
        block_count,
        text,
    }
}
