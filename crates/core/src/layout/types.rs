//! Geometry and block types shared by the layout stages.

use serde::{Deserialize, Serialize};

/// Axis-aligned box in image coordinates (origin top-left, y grows down).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BBox {
    pub x0: f64,
    pub top: f64,
    pub x1: f64,
    pub bottom: f64,
}

impl BBox {
    pub fn new(x0: f64, top: f64, x1: f64, bottom: f64) -> Self {
        Self {
            x0,
            top,
            x1,
            bottom,
        }
    }

    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }

    /// True when no part of the box lies inside `[0, width] x [0, height]`.
    pub fn outside_of(&self, width: f64, height: f64) -> bool {
        self.x1 < 0.0 || self.bottom < 0.0 || self.x0 > width || self.top > height
    }
}

/// Region reported by the recognizer for one detection.
///
/// Either a plain `[x0, y0, x1, y1]` rectangle or a quadrilateral given as
/// corner points, the way text detectors emit rotated boxes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Geometry {
    Rect([f64; 4]),
    Polygon(Vec<[f64; 2]>),
}

impl Geometry {
    pub fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Geometry::Rect([x0, y0, x1, y1])
    }

    /// Axis-aligned envelope, or a description of what is wrong with the
    /// geometry.
    pub fn to_bbox(&self) -> Result<BBox, String> {
        match self {
            Geometry::Rect([x0, y0, x1, y1]) => {
                if ![x0, y0, x1, y1].iter().all(|v| v.is_finite()) {
                    return Err("bbox has a non-finite coordinate".to_string());
                }
                if x1 < x0 || y1 < y0 {
                    return Err(format!(
                        "bbox corners out of order: ({x0}, {y0}) -> ({x1}, {y1})"
                    ));
                }
                Ok(BBox::new(*x0, *y0, *x1, *y1))
            }
            Geometry::Polygon(points) => {
                if points.len() != 4 {
                    return Err(format!("polygon needs 4 points, got {}", points.len()));
                }
                let mut x0 = f64::INFINITY;
                let mut top = f64::INFINITY;
                let mut x1 = f64::NEG_INFINITY;
                let mut bottom = f64::NEG_INFINITY;
                for [x, y] in points {
                    if !x.is_finite() || !y.is_finite() {
                        return Err("polygon has a non-finite coordinate".to_string());
                    }
                    x0 = x0.min(*x);
                    top = top.min(*y);
                    x1 = x1.max(*x);
                    bottom = bottom.max(*y);
                }
                Ok(BBox::new(x0, top, x1, bottom))
            }
        }
    }
}

/// A validated text detection.
///
/// `id` is the position of the detection in the caller's list; it is used as
/// the final tie-break whenever two blocks sort equal.
#[derive(Clone, Debug, PartialEq)]
pub struct Block {
    pub id: usize,
    pub bbox: BBox,
    pub text: String,
    pub confidence: f64,
}

impl Block {
    pub fn start_x(&self) -> f64 {
        self.bbox.x0
    }

    pub fn end_x(&self) -> f64 {
        self.bbox.x1
    }

    pub fn start_y(&self) -> f64 {
        self.bbox.top
    }

    pub fn end_y(&self) -> f64 {
        self.bbox.bottom
    }

    pub fn width(&self) -> f64 {
        self.bbox.width()
    }

    pub fn height(&self) -> f64 {
        self.bbox.height()
    }
}
