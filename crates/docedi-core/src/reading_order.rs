//! Reading-order reconstruction from OCR detections.
//!
//! OCR engines report text runs in no particular order. This module rebuilds
//! an approximate human reading order by bucketing runs into rows on their
//! quantized vertical midpoint, then reading each row left to right.
//!
//! # Row quantization
//!
//! A run's row key is its midpoint-y rounded to the nearest multiple of
//! [`ROW_QUANTUM`], with ties rounded half to even: `5.0` maps to key `0`,
//! `15.0` and `25.0` both map to key `20`.
//!
//! Runs whose midpoints round to the same key always share a line, even if
//! they sit on visually different lines; runs straddling a bucket boundary
//! may split across adjacent lines. This is a heuristic, not a layout model.

use std::collections::BTreeMap;

use crate::detection::Detection;

/// Vertical distance, in pixels, that collapses into one row bucket.
pub const ROW_QUANTUM: f64 = 10.0;

/// Quantize a vertical midpoint to its row key.
///
/// Rounds `mid_y / ROW_QUANTUM` half to even, then scales back up.
///
/// ```rust
/// use docedi_core::reading_order::row_key;
///
/// assert_eq!(row_key(4.0), 0);
/// assert_eq!(row_key(6.0), 10);
/// assert_eq!(row_key(15.0), 20);
/// assert_eq!(row_key(25.0), 20);
/// ```
// Row keys are small pixel multiples; truncation to i64 cannot occur for real images.
#[allow(clippy::cast_possible_truncation)]
#[inline]
#[must_use = "row key is computed but not used"]
pub fn row_key(mid_y: f64) -> i64 {
    ((mid_y / ROW_QUANTUM).round_ties_even() * ROW_QUANTUM) as i64
}

/// Group detections into row buckets keyed by [`row_key`].
///
/// Each bucket holds `(left_x, text)` entries in input order; the map
/// iterates keys in ascending (top to bottom) order.
#[must_use = "row buckets are computed but not used"]
pub fn row_buckets(detections: &[Detection]) -> BTreeMap<i64, Vec<(f64, &str)>> {
    let mut rows: BTreeMap<i64, Vec<(f64, &str)>> = BTreeMap::new();
    for det in detections {
        rows.entry(row_key(det.mid_y()))
            .or_default()
            .push((det.left(), det.text.as_str()));
    }
    rows
}

/// Rebuild reading-ordered text from unordered detections.
///
/// Rows are emitted top to bottom, each row's runs left to right (stable on
/// equal x) joined by a single space. Every line, including the last, ends
/// with `\n`. Empty input yields an empty string. Identical texts are not
/// deduplicated.
///
/// ```rust
/// use docedi_core::{quad_from_rect, reconstruct_text, Detection};
///
/// let detections = vec![
///     Detection::new(quad_from_rect(120.0, 10.0, 60.0, 12.0), "INV-001", 0.9),
///     Detection::new(quad_from_rect(10.0, 12.0, 90.0, 12.0), "Invoice No", 0.9),
///     Detection::new(quad_from_rect(10.0, 40.0, 50.0, 12.0), "Total", 0.9),
/// ];
/// assert_eq!(reconstruct_text(&detections), "Invoice No INV-001\nTotal\n");
/// ```
#[must_use = "reconstructed text is returned but not used"]
pub fn reconstruct_text(detections: &[Detection]) -> String {
    let mut text = String::new();
    for (_, mut row) in row_buckets(detections) {
        row.sort_by(|a, b| a.0.total_cmp(&b.0));
        let line = row
            .iter()
            .map(|(_, t)| *t)
            .collect::<Vec<_>>()
            .join(" ");
        text.push_str(&line);
        text.push('\n');
    }
    log::debug!(
        "reconstructed {} detections into {} lines",
        detections.len(),
        text.lines().count()
    );
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::{quad_from_rect, Point};

    /// Detection whose top-left/bottom-right corners give exactly `mid_y`.
    fn det_at(x: f64, mid_y: f64, text: &str) -> Detection {
        Detection::new(quad_from_rect(x, mid_y - 5.0, 40.0, 10.0), text, 0.9)
    }

    #[test]
    fn test_empty_input_yields_empty_string() {
        assert_eq!(reconstruct_text(&[]), "");
    }

    #[test]
    fn test_row_key_rounds_half_to_even() {
        assert_eq!(row_key(0.0), 0);
        assert_eq!(row_key(4.0), 0);
        assert_eq!(row_key(5.0), 0);
        assert_eq!(row_key(6.0), 10);
        assert_eq!(row_key(14.0), 10);
        assert_eq!(row_key(15.0), 20);
        assert_eq!(row_key(25.0), 20);
        assert_eq!(row_key(35.0), 40);
    }

    #[test]
    fn test_rows_sorted_top_to_bottom_and_left_to_right() {
        let detections = vec![
            det_at(200.0, 52.0, "$1,200.00"),
            det_at(10.0, 20.0, "Purchase"),
            det_at(10.0, 51.0, "Total"),
            det_at(90.0, 18.0, "Order"),
        ];
        assert_eq!(
            reconstruct_text(&detections),
            "Purchase Order\nTotal $1,200.00\n"
        );
    }

    #[test]
    fn test_midpoints_4_and_14_split_into_two_rows() {
        let detections = vec![det_at(0.0, 4.0, "a"), det_at(0.0, 14.0, "b")];
        assert_eq!(reconstruct_text(&detections), "a\nb\n");
    }

    #[test]
    fn test_midpoints_6_and_14_merge_despite_distance() {
        // Known limitation: 6 and 14 both round to 10 and share a line.
        let detections = vec![det_at(50.0, 6.0, "right"), det_at(0.0, 14.0, "left")];
        assert_eq!(reconstruct_text(&detections), "left right\n");
    }

    #[test]
    fn test_equal_x_keeps_input_order() {
        let detections = vec![
            det_at(10.0, 30.0, "first"),
            det_at(10.0, 31.0, "second"),
            det_at(10.0, 29.0, "third"),
        ];
        assert_eq!(reconstruct_text(&detections), "first second third\n");
    }

    #[test]
    fn test_duplicates_are_kept() {
        let detections = vec![det_at(0.0, 10.0, "Qty"), det_at(60.0, 10.0, "Qty")];
        assert_eq!(reconstruct_text(&detections), "Qty Qty\n");
    }

    #[test]
    fn test_only_first_and_third_corners_are_used() {
        // Skewed box: corners 1 and 3 are far off, but only 0 and 2 count.
        let det = Detection::new(
            [
                Point::new(30.0, 0.0),
                Point::new(500.0, -400.0),
                Point::new(90.0, 20.0),
                Point::new(-500.0, 900.0),
            ],
            "skewed",
            0.5,
        );
        let buckets = row_buckets(std::slice::from_ref(&det));
        assert_eq!(buckets.keys().copied().collect::<Vec<_>>(), vec![10]);
        assert_eq!(buckets[&10], vec![(30.0, "skewed")]);
    }

    #[test]
    fn test_negative_midpoints_sort_above_zero() {
        let detections = vec![det_at(0.0, 3.0, "below"), det_at(0.0, -12.0, "above")];
        assert_eq!(reconstruct_text(&detections), "above\nbelow\n");
    }
}
