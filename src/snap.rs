//! Edge-to-edge proximity snapping between a dragged room and its neighbors.
//!
//! For every other room on the same floor, the four edge-pair gaps are
//! measured, but an axis pair only counts when the rectangles' projections
//! overlap on the perpendicular axis — rooms that could not sit side-by-side
//! or stacked never attract each other. The minimum-distance candidate wins
//! per axis independently, so a room can snap horizontally to one neighbor
//! and vertically to a different one in the same drag.

#[cfg(test)]
#[path = "snap_test.rs"]
mod snap_test;

use crate::model::Rect;

/// Per-axis corrections that align `candidate` with its nearest neighbors.
/// `None` on an axis means no neighbor was within threshold there, and the
/// caller should grid-snap that axis instead.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SnapCorrection {
    pub dx: Option<f64>,
    pub dy: Option<f64>,
}

fn x_projections_overlap(a: &Rect, b: &Rect) -> bool {
    a.end_x > b.start_x && a.start_x < b.end_x
}

fn y_projections_overlap(a: &Rect, b: &Rect) -> bool {
    a.end_y > b.start_y && a.start_y < b.end_y
}

/// Compute the minimum-distance edge alignment for `candidate` against
/// `neighbors`, considering only gaps within `threshold`.
#[must_use]
pub fn proximity_snap(candidate: &Rect, neighbors: &[Rect], threshold: f64) -> SnapCorrection {
    let mut best_dx: Option<f64> = None;
    let mut best_dy: Option<f64> = None;

    let mut consider = |best: &mut Option<f64>, gap: f64| {
        if gap.abs() <= threshold && best.is_none_or(|b| gap.abs() < b.abs()) {
            *best = Some(gap);
        }
    };

    for other in neighbors {
        if y_projections_overlap(candidate, other) {
            // Side-by-side alignment: our right edge to their left, and
            // our left edge to their right.
            consider(&mut best_dx, other.start_x - candidate.end_x);
            consider(&mut best_dx, other.end_x - candidate.start_x);
        }
        if x_projections_overlap(candidate, other) {
            // Stacked alignment: our bottom edge to their top, and our top
            // edge to their bottom.
            consider(&mut best_dy, other.start_y - candidate.end_y);
            consider(&mut best_dy, other.end_y - candidate.start_y);
        }
    }

    SnapCorrection { dx: best_dx, dy: best_dy }
}
