//! Block ingest: validation of raw detections.
//!
//! Turns the recognizer's detections into immutable [`Block`]s. Structural
//! problems (bad geometry, confidence outside `[0, 1]`) fail the whole call;
//! low-confidence or off-image blocks are dropped and counted.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{LayoutError, Result};
use crate::layout::{Block, Geometry};

/// One detection as produced by the text recognizer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    #[serde(alias = "box", alias = "polygon", alias = "geometry")]
    pub bbox: Geometry,
    #[serde(default)]
    pub text: String,
    pub confidence: f64,
}

impl Detection {
    pub fn new(bbox: Geometry, text: impl Into<String>, confidence: f64) -> Self {
        Self {
            bbox,
            text: text.into(),
            confidence,
        }
    }
}

/// Dimensions of the source image, used to discard detections that fall
/// outside of it.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ImageSize {
    pub width: f64,
    pub height: f64,
}

/// Blocks that survived ingest plus bookkeeping about the ones that did not.
#[derive(Clone, Debug, Default)]
pub struct IngestReport {
    pub blocks: Vec<Block>,
    pub dropped: usize,
    pub warnings: Vec<String>,
}

/// Validate and convert detections into blocks.
///
/// Surviving blocks keep the detection order; `Block::id` is the detection's
/// index in `detections`.
pub fn ingest(
    detections: &[Detection],
    image: Option<ImageSize>,
    min_confidence: f64,
) -> Result<IngestReport> {
    if let Some(size) = image {
        if !(size.width.is_finite() && size.height.is_finite())
            || size.width <= 0.0
            || size.height <= 0.0
        {
            return Err(LayoutError::InvalidImageSize {
                width: size.width,
                height: size.height,
            });
        }
    }

    let mut report = IngestReport {
        blocks: Vec::with_capacity(detections.len()),
        ..IngestReport::default()
    };
    let mut low_confidence = 0usize;
    let mut off_image = 0usize;

    for (index, det) in detections.iter().enumerate() {
        let bbox = det
            .bbox
            .to_bbox()
            .map_err(|reason| LayoutError::invalid_input(index, reason))?;
        if !det.confidence.is_finite() || !(0.0..=1.0).contains(&det.confidence) {
            return Err(LayoutError::invalid_input(
                index,
                format!("confidence {} outside [0, 1]", det.confidence),
            ));
        }

        if det.confidence < min_confidence {
            low_confidence += 1;
            continue;
        }
        if let Some(size) = image {
            if bbox.outside_of(size.width, size.height) {
                off_image += 1;
                continue;
            }
        }

        report.blocks.push(Block {
            id: index,
            bbox,
            text: det.text.clone(),
            confidence: det.confidence,
        });
    }

    if low_confidence > 0 {
        report.warnings.push(format!(
            "dropped {low_confidence} block(s) with confidence below {min_confidence}"
        ));
    }
    if off_image > 0 {
        report
            .warnings
            .push(format!("dropped {off_image} block(s) outside the image bounds"));
    }
    report.dropped = low_confidence + off_image;
    if report.dropped > 0 {
        warn!(
            dropped = report.dropped,
            low_confidence, off_image, "blocks dropped during ingest"
        );
    }
    debug!(kept = report.blocks.len(), "ingest complete");

    Ok(report)
}
