//! Layout reconstruction parameters.
//!
//! Contains `EngineParams` for controlling how blocks are split into
//! columns and cards.

use crate::error::{LayoutError, Result};

/// Default ratio of the widest horizontal gap that counts as a column break.
pub const DEFAULT_COLUMN_GAP_RATIO: f64 = 0.667;

/// Default multiple of the median line height that separates two cards.
pub const DEFAULT_ROW_GAP_MULTIPLIER: f64 = 1.2;

/// Line height used when a column has no usable geometry (pixels).
pub const FALLBACK_LINE_HEIGHT: f64 = 20.0;

/// Parameters for layout reconstruction.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineParams {
    /// A horizontal gap between consecutive block starts is a column break
    /// when it is strictly larger than this fraction of the largest gap.
    pub column_gap_ratio: f64,

    /// Two vertically adjacent blocks belong to different cards when the
    /// space between them is strictly larger than this multiple of the
    /// column's median block height.
    pub row_gap_multiplier: f64,

    /// Blocks with a confidence below this value are dropped during ingest.
    /// Zero disables the filter.
    pub min_confidence: f64,

    /// Cluster columns on the rayon pool.
    pub parallel: bool,
}

impl Default for EngineParams {
    fn default() -> Self {
        Self {
            column_gap_ratio: DEFAULT_COLUMN_GAP_RATIO,
            row_gap_multiplier: DEFAULT_ROW_GAP_MULTIPLIER,
            min_confidence: 0.0,
            parallel: true,
        }
    }
}

impl EngineParams {
    /// Creates new parameters with the specified values.
    ///
    /// # Errors
    /// Returns `InvalidConfig` if `column_gap_ratio` is not in `(0, 1]`,
    /// `row_gap_multiplier` is not a positive finite number, or
    /// `min_confidence` is not in `[0, 1]`.
    pub fn new(
        column_gap_ratio: f64,
        row_gap_multiplier: f64,
        min_confidence: f64,
        parallel: bool,
    ) -> Result<Self> {
        let params = Self {
            column_gap_ratio,
            row_gap_multiplier,
            min_confidence,
            parallel,
        };
        params.validate()?;
        Ok(params)
    }

    /// Checks every coefficient is in its allowed range.
    pub fn validate(&self) -> Result<()> {
        if !(self.column_gap_ratio > 0.0 && self.column_gap_ratio <= 1.0) {
            return Err(LayoutError::InvalidConfig(format!(
                "column_gap_ratio should be in (0, 1], got {}",
                self.column_gap_ratio
            )));
        }
        if !(self.row_gap_multiplier.is_finite() && self.row_gap_multiplier > 0.0) {
            return Err(LayoutError::InvalidConfig(format!(
                "row_gap_multiplier should be a positive number, got {}",
                self.row_gap_multiplier
            )));
        }
        if !(0.0..=1.0).contains(&self.min_confidence) {
            return Err(LayoutError::InvalidConfig(format!(
                "min_confidence should be between 0 and 1, got {}",
                self.min_confidence
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let params = EngineParams::default();
        assert!(params.validate().is_ok());
        assert_eq!(params.column_gap_ratio, 0.667);
        assert_eq!(params.row_gap_multiplier, 1.2);
        assert_eq!(params.min_confidence, 0.0);
    }

    #[test]
    fn rejects_out_of_range_coefficients() {
        assert!(EngineParams::new(0.0, 1.2, 0.0, true).is_err());
        assert!(EngineParams::new(1.5, 1.2, 0.0, true).is_err());
        assert!(EngineParams::new(0.5, -1.0, 0.0, true).is_err());
        assert!(EngineParams::new(0.5, f64::NAN, 0.0, true).is_err());
        assert!(EngineParams::new(0.5, 1.2, 1.1, true).is_err());
        assert!(EngineParams::new(1.0, 0.5, 1.0, false).is_ok());
    }
}
