//! The layout reconstruction pipeline.
//!
//! `LayoutEngine` owns the validated parameters and the compiled rule set;
//! everything derived from a document lives only for the duration of one
//! [`LayoutEngine::reconstruct`] call, so one engine can serve any number of
//! threads.
//!
//! # Example
//! ```
//! use cardgrid_core::engine::LayoutEngine;
//! use cardgrid_core::ingest::Detection;
//! use cardgrid_core::layout::Geometry;
//!
//! let engine = LayoutEngine::default();
//! let detections = vec![
//!     Detection::new(Geometry::rect(10.0, 0.0, 90.0, 30.0), "928Panels", 0.9),
//!     Detection::new(Geometry::rect(10.0, 40.0, 90.0, 70.0), "Enerqy", 0.8),
//! ];
//! let result = engine.reconstruct(&detections, None)?;
//! assert_eq!((result.rows, result.columns), (1, 1));
//! assert_eq!(result.cells[0][0].text, "928 Panels\nEnergy");
//! # Ok::<(), cardgrid_core::error::LayoutError>(())
//! ```

use std::path::Path;

use indexmap::IndexMap;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::confidence::overall_confidence;
use crate::error::Result;
use crate::ingest::{Detection, ImageSize, ingest};
use crate::layout::{
    Card, Column, EngineParams, Grid, assemble_grid, assign_columns, cluster_cards,
    partition_columns,
};
use crate::normalize::{BUILTIN_RULES_VERSION, PatternSpec, RuleSet, TextNormalizer};
use crate::output::{LayoutResult, build_output};

/// Engine configuration as stored on disk.
///
/// Every field is optional; missing fields take the defaults of
/// [`EngineParams`] and the built-in rule set.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    pub column_gap_ratio: f64,
    pub row_gap_multiplier: f64,
    pub min_confidence_filter: f64,
    pub parallel: bool,
    /// Start from the built-in rules and add the entries below.
    pub use_builtin_rules: bool,
    pub rules_version: Option<String>,
    pub correction_dictionary: IndexMap<String, String>,
    pub correction_patterns: Vec<PatternSpec>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        let params = EngineParams::default();
        Self {
            column_gap_ratio: params.column_gap_ratio,
            row_gap_multiplier: params.row_gap_multiplier,
            min_confidence_filter: params.min_confidence,
            parallel: params.parallel,
            use_builtin_rules: true,
            rules_version: None,
            correction_dictionary: IndexMap::new(),
            correction_patterns: Vec::new(),
        }
    }
}

impl EngineConfig {
    /// Parse a JSON configuration document.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a JSON configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn params(&self) -> Result<EngineParams> {
        EngineParams::new(
            self.column_gap_ratio,
            self.row_gap_multiplier,
            self.min_confidence_filter,
            self.parallel,
        )
    }

    /// Compile the configured corrections.
    pub fn rules(&self) -> Result<RuleSet> {
        let mut rules = if self.use_builtin_rules {
            RuleSet::builtin().extended_with(
                self.correction_dictionary.clone(),
                &self.correction_patterns,
            )?
        } else {
            RuleSet::new(
                "custom",
                self.correction_dictionary.clone(),
                &self.correction_patterns,
            )?
        };
        if let Some(version) = &self.rules_version {
            rules.version = version.clone();
        } else if self.use_builtin_rules
            && (!self.correction_dictionary.is_empty() || !self.correction_patterns.is_empty())
        {
            rules.version = format!("{BUILTIN_RULES_VERSION}+custom");
        }
        Ok(rules)
    }

    /// Validate everything and build an engine. All configuration errors
    /// surface here, before any document is processed.
    pub fn build(&self) -> Result<LayoutEngine> {
        LayoutEngine::new(self.params()?, self.rules()?)
    }
}

/// Reconstructs card grids from detections.
#[derive(Clone, Debug)]
pub struct LayoutEngine {
    params: EngineParams,
    normalizer: TextNormalizer,
}

impl Default for LayoutEngine {
    /// Default parameters with the built-in rules.
    fn default() -> Self {
        Self {
            params: EngineParams::default(),
            normalizer: TextNormalizer::new(RuleSet::builtin()),
        }
    }
}

impl LayoutEngine {
    /// # Errors
    /// `InvalidConfig` when `params` fail [`EngineParams::validate`].
    pub fn new(params: EngineParams, rules: RuleSet) -> Result<Self> {
        params.validate()?;
        Ok(Self {
            params,
            normalizer: TextNormalizer::new(rules),
        })
    }

    pub fn params(&self) -> &EngineParams {
        &self.params
    }

    pub fn normalizer(&self) -> &TextNormalizer {
        &self.normalizer
    }

    /// Run the full pipeline over one document.
    ///
    /// # Errors
    /// `InvalidInput` when a detection has malformed geometry or a
    /// confidence outside `[0, 1]`, `InvalidImageSize` for a degenerate
    /// image, `NonConvergentRule` when a cell never settles. No partial
    /// result is produced.
    pub fn reconstruct(
        &self,
        detections: &[Detection],
        image: Option<ImageSize>,
    ) -> Result<LayoutResult> {
        let report = ingest(detections, image, self.params.min_confidence)?;
        let mut warnings = report.warnings;

        if report.blocks.is_empty() {
            warnings.push("no blocks to lay out; returning an empty grid".to_string());
            return Ok(build_output(
                Grid::default(),
                0.0,
                0,
                report.dropped,
                warnings,
            ));
        }

        let boundaries = partition_columns(&report.blocks, self.params.column_gap_ratio);
        let columns = assign_columns(report.blocks, &boundaries);
        let cards = self.cluster(columns);

        let block_count: usize = cards.iter().flatten().map(|c| c.blocks.len()).sum();
        let overall = overall_confidence(cards.iter().flatten());

        let mut grid = assemble_grid(&cards);
        for (col, column_cards) in cards.iter().enumerate() {
            if column_cards.len() < grid.rows {
                warnings.push(format!(
                    "column {col} has {} card(s) but the grid has {} row(s); trailing cells are empty",
                    column_cards.len(),
                    grid.rows
                ));
            }
        }
        for cell in grid.cells.iter_mut().flatten().filter(|c| c.present) {
            cell.text = self.normalizer.normalize(&cell.text)?;
        }

        info!(
            rows = grid.rows,
            columns = grid.cols,
            blocks = block_count,
            dropped = report.dropped,
            confidence = overall,
            "layout reconstructed"
        );
        Ok(build_output(
            grid,
            overall,
            block_count,
            report.dropped,
            warnings,
        ))
    }

    fn cluster(&self, columns: Vec<Column>) -> Vec<Vec<Card>> {
        let multiplier = self.params.row_gap_multiplier;
        let cards: Vec<Vec<Card>> = if self.params.parallel && columns.len() > 1 {
            columns
                .into_par_iter()
                .map(|column| cluster_cards(column.blocks, multiplier))
                .collect()
        } else {
            columns
                .into_iter()
                .map(|column| cluster_cards(column.blocks, multiplier))
                .collect()
        };
        debug!(
            cards_per_column = ?cards.iter().map(Vec::len).collect::<Vec<_>>(),
            "cards clustered"
        );
        cards
    }
}
