//! OCR detections: a four-corner bounding box plus recognized text.
//!
//! Detections decode from the triple layout OCR engines such as EasyOCR emit:
//!
//! ```json
//! [[[10, 20], [80, 20], [80, 34], [10, 34]], "Invoice No", 0.97]
//! ```
//!
//! The box is a fixed `[Point; 4]`, so a box with the wrong number of corners
//! is rejected at decode time rather than deep inside reading-order logic.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// A single (x, y) corner in image pixel coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "(f64, f64)", into = "(f64, f64)")]
pub struct Point {
    /// Horizontal coordinate (left = 0)
    pub x: f64,
    /// Vertical coordinate (top = 0)
    pub y: f64,
}

impl Point {
    /// Create a new point
    #[inline]
    #[must_use = "point is created but not used"]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl From<(f64, f64)> for Point {
    #[inline]
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

impl From<Point> for (f64, f64) {
    #[inline]
    fn from(p: Point) -> Self {
        (p.x, p.y)
    }
}

/// Four-corner box in top-left, top-right, bottom-right, bottom-left order.
pub type Quad = [Point; 4];

/// Build an axis-aligned [`Quad`] from a left/top origin and a size.
#[inline]
#[must_use = "quad is created but not used"]
pub fn quad_from_rect(left: f64, top: f64, width: f64, height: f64) -> Quad {
    let right = left + width;
    let bottom = top + height;
    [
        Point::new(left, top),
        Point::new(right, top),
        Point::new(right, bottom),
        Point::new(left, bottom),
    ]
}

/// One recognized text run as reported by an OCR engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "(Quad, String, f64)", into = "(Quad, String, f64)")]
pub struct Detection {
    /// Corner points of the text run
    pub bbox: Quad,
    /// Recognized text
    pub text: String,
    /// Engine confidence (0.0 to 1.0); carried through but never consulted
    pub confidence: f64,
}

impl Detection {
    /// Create a new detection
    #[inline]
    #[must_use = "detection is created but not used"]
    pub fn new(bbox: Quad, text: impl Into<String>, confidence: f64) -> Self {
        Self {
            bbox,
            text: text.into(),
            confidence,
        }
    }

    /// Vertical midpoint: mean of the top-left and bottom-right corner y.
    #[inline]
    #[must_use = "midpoint is computed but not used"]
    pub fn mid_y(&self) -> f64 {
        (self.bbox[0].y + self.bbox[2].y) / 2.0
    }

    /// Left edge, taken from the top-left corner.
    #[inline]
    #[must_use = "left edge is computed but not used"]
    pub fn left(&self) -> f64 {
        self.bbox[0].x
    }
}

impl From<(Quad, String, f64)> for Detection {
    #[inline]
    fn from((bbox, text, confidence): (Quad, String, f64)) -> Self {
        Self {
            bbox,
            text,
            confidence,
        }
    }
}

impl From<Detection> for (Quad, String, f64) {
    #[inline]
    fn from(d: Detection) -> Self {
        (d.bbox, d.text, d.confidence)
    }
}

/// Decode a JSON array of detection triples.
///
/// # Errors
///
/// Returns [`crate::DocediError::JsonError`] if the input is not valid JSON or
/// any bounding box does not have exactly four `[x, y]` corners.
pub fn detections_from_json(json: &str) -> Result<Vec<Detection>> {
    Ok(serde_json::from_str(json)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[allow(clippy::float_cmp)]
    fn test_detection_decodes_from_triple() {
        let json = r#"[[[10, 20], [80, 20], [80, 34], [10, 34]], "Invoice No", 0.97]"#;
        let det: Detection = serde_json::from_str(json).unwrap();
        assert_eq!(det.text, "Invoice No");
        assert_eq!(det.left(), 10.0);
        assert_eq!(det.mid_y(), 27.0);
        assert_eq!(det.confidence, 0.97);
    }

    #[test]
    fn test_detection_rejects_wrong_arity() {
        let json = r#"[[[[10, 20], [80, 20], [80, 34]], "short", 0.5]]"#;
        assert!(detections_from_json(json).is_err());
    }

    #[test]
    fn test_detection_serializes_as_triple() {
        let det = Detection::new(quad_from_rect(1.0, 2.0, 3.0, 4.0), "A", 1.0);
        let value = serde_json::to_value(&det).unwrap();
        assert_eq!(
            value,
            serde_json::json!([[[1.0, 2.0], [4.0, 2.0], [4.0, 6.0], [1.0, 6.0]], "A", 1.0])
        );
    }

    #[test]
    #[allow(clippy::float_cmp)]
    fn test_quad_from_rect_corners() {
        let quad = quad_from_rect(5.0, 10.0, 20.0, 30.0);
        assert_eq!(quad[0], Point::new(5.0, 10.0));
        assert_eq!(quad[2], Point::new(25.0, 40.0));
        assert_eq!(quad[3].y, 40.0);
    }
}
