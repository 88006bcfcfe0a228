//! cardgrid - rebuilds card tables from OCR text detections.
//!
//! The recognizer hands over an unordered list of text boxes. This crate
//! splits them into columns by horizontal gaps, stacks vertically adjacent
//! boxes into cards, lays the cards out on a grid and cleans up the
//! recognized text.

pub mod confidence;
pub mod engine;
pub mod error;
pub mod ingest;
pub mod layout;
pub mod normalize;
pub mod output;
pub mod source;

pub use engine::{EngineConfig, LayoutEngine};
pub use error::{LayoutError, Result};
pub use ingest::{Detection, ImageSize};
pub use output::LayoutResult;
