//! Grid assembly from per-column cards.
//!
//! Row `r` of the grid holds the `r`-th card of every column. Nothing aligns
//! cards across columns; the layout is assumed to keep the same number of
//! items at the same height in every column, and columns that come up short
//! are padded with placeholder cells.

use serde::{Deserialize, Serialize};

use super::cards::Card;

/// One grid cell.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    pub text: String,
    pub confidence: f64,
    /// False for padding cells below the end of a short column.
    pub present: bool,
}

impl Cell {
    /// Placeholder for a missing card.
    pub fn absent() -> Self {
        Self {
            text: String::new(),
            confidence: 0.0,
            present: false,
        }
    }

    pub fn from_card(card: &Card) -> Self {
        Self {
            text: card.merged_text(),
            confidence: card.confidence(),
            present: true,
        }
    }
}

/// Rectangular table of cells indexed `[row][col]`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Grid {
    pub rows: usize,
    pub cols: usize,
    pub cells: Vec<Vec<Cell>>,
}

impl Grid {
    pub fn get(&self, row: usize, col: usize) -> Option<&Cell> {
        self.cells.get(row).and_then(|r| r.get(col))
    }

    /// Present cells in row-major order.
    pub fn present_cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter().flatten().filter(|c| c.present)
    }
}

/// Build the grid from the card lists of each column, left to right.
pub fn assemble_grid(columns: &[Vec<Card>]) -> Grid {
    let cols = columns.len();
    let rows = columns.iter().map(Vec::len).max().unwrap_or(0);
    let cells = (0..rows)
        .map(|r| {
            columns
                .iter()
                .map(|cards| cards.get(r).map_or_else(Cell::absent, Cell::from_card))
                .collect()
        })
        .collect();
    Grid { rows, cols, cells }
}
