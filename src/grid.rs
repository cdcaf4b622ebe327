//! Grid quantization. Pure functions; each entity class snaps at its own
//! resolution (`ROOM_GRID`, `CONNECTOR_GRID`, `FURNITURE_GRID`).
//!
//! Snapping is applied to position *deltas* measured from the drag-start
//! snapshot, never to accumulated per-frame positions, so a long drag cannot
//! compound rounding error.

#[cfg(test)]
#[path = "grid_test.rs"]
mod grid_test;

use crate::camera::Point;

/// Quantize `value` to the nearest multiple of `resolution`.
///
/// Idempotent: `snap(snap(v, r), r) == snap(v, r)`.
#[must_use]
pub fn snap(value: f64, resolution: f64) -> f64 {
    debug_assert!(resolution > 0.0);
    (value / resolution).round() * resolution
}

/// Quantize both coordinates of a point.
#[must_use]
pub fn snap_point(p: Point, resolution: f64) -> Point {
    Point::new(snap(p.x, resolution), snap(p.y, resolution))
}
