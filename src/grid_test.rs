#![allow(clippy::float_cmp)]

use super::*;
use crate::consts::{CONNECTOR_GRID, FURNITURE_GRID, ROOM_GRID};

#[test]
fn snap_exact_multiple_is_unchanged() {
    assert_eq!(snap(64.0, 32.0), 64.0);
    assert_eq!(snap(0.0, 32.0), 0.0);
}

#[test]
fn snap_rounds_to_nearest() {
    assert_eq!(snap(40.0, 32.0), 32.0);
    assert_eq!(snap(56.0, 32.0), 64.0);
}

#[test]
fn snap_rounds_half_away_from_zero() {
    assert_eq!(snap(16.0, 32.0), 32.0);
    assert_eq!(snap(-16.0, 32.0), -32.0);
}

#[test]
fn snap_negative_values() {
    assert_eq!(snap(-40.0, 32.0), -32.0);
    assert_eq!(snap(-60.0, 32.0), -64.0);
}

#[test]
fn snap_is_idempotent() {
    for resolution in [ROOM_GRID, CONNECTOR_GRID, FURNITURE_GRID] {
        let mut x = -500.0;
        while x < 500.0 {
            let once = snap(x, resolution);
            assert_eq!(snap(once, resolution), once, "x={x} r={resolution}");
            x += 7.3;
        }
    }
}

#[test]
fn snap_respects_resolution() {
    assert_eq!(snap(20.0, CONNECTOR_GRID), 16.0);
    assert_eq!(snap(20.0, FURNITURE_GRID), 24.0);
}

#[test]
fn snap_point_quantizes_both_axes() {
    let p = snap_point(Point::new(33.0, -9.0), FURNITURE_GRID);
    assert_eq!(p, Point::new(32.0, -8.0));
}
