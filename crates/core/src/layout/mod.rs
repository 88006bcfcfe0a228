//! Layout reconstruction stages.
//!
//! This module contains:
//! - Block and geometry types
//! - Reconstruction parameters (EngineParams)
//! - Gap-based clustering primitives
//! - Column partitioning, card clustering and grid assembly

pub mod cards;
pub mod clustering;
pub mod columns;
pub mod grid;
pub mod params;
pub mod types;

pub use cards::{Card, cluster_cards, median_height};
pub use columns::{Column, assign_columns, column_index, partition_columns};
pub use grid::{Cell, Grid, assemble_grid};
pub use params::*;
pub use types::{BBox, Block, Geometry};
