//! Overlap testing and repair: rectangle intersection, resize clamping,
//! containment checks, and a bounded ring search for the nearest valid
//! position.
//!
//! Geometry violations are always corrected locally; nothing here is a hard
//! error. Callers receive a `degraded` flag when the ring search gives up so
//! they can surface a warning instead of silently keeping an overlap.

#[cfg(test)]
#[path = "collide_test.rs"]
mod collide_test;

use tracing::warn;

use crate::camera::Point;
use crate::consts::MAX_SEARCH_RINGS;
use crate::hit::ResizeHandle;
use crate::model::Rect;

/// Whether two rectangles overlap. Touching edges do not count.
#[must_use]
pub fn overlaps(a: &Rect, b: &Rect) -> bool {
    a.end_x > b.start_x && a.start_x < b.end_x && a.end_y > b.start_y && a.start_y < b.end_y
}

/// Whether `rect` overlaps any rectangle in `obstacles`.
#[must_use]
pub fn overlaps_any(rect: &Rect, obstacles: &[Rect]) -> bool {
    obstacles.iter().any(|o| overlaps(rect, o))
}

/// Whether a centered-coordinate rect lies within `±half_x` × `±half_y`.
///
/// Used for furniture-in-room containment, where furniture rects are
/// expressed relative to the room center.
#[must_use]
pub fn is_within_bounds(rect: &Rect, half_x: f64, half_y: f64) -> bool {
    rect.start_x >= -half_x && rect.end_x <= half_x && rect.start_y >= -half_y && rect.end_y <= half_y
}

/// Result of [`find_nearest_valid_position`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchOutcome {
    /// Center position of the placed `width` × `height` box.
    pub position: Point,
    /// True when the ring cap was exhausted and `position` is the original
    /// target, possibly still in violation.
    pub degraded: bool,
}

fn candidate_valid(
    center: Point,
    width: f64,
    height: f64,
    obstacles: &[Rect],
    bounds: Option<(f64, f64)>,
) -> bool {
    let rect = Rect::centered(center, width, height);
    if let Some((hx, hy)) = bounds {
        if !is_within_bounds(&rect, hx, hy) {
            return false;
        }
    }
    !overlaps_any(&rect, obstacles)
}

/// Search an expanding square ring around `target` for the nearest center at
/// which a `width` × `height` box neither overlaps any obstacle nor leaves
/// the optional containment bounds.
///
/// The ring step is the caller's active grid resolution. Candidates within a
/// ring are tried nearest-first, so ties break by distance, not iteration
/// order. The search is capped at `MAX_SEARCH_RINGS`; past the cap the
/// original target comes back flagged as degraded.
#[must_use]
pub fn find_nearest_valid_position(
    target: Point,
    width: f64,
    height: f64,
    obstacles: &[Rect],
    bounds: Option<(f64, f64)>,
    step: f64,
) -> SearchOutcome {
    debug_assert!(step > 0.0);
    if candidate_valid(target, width, height, obstacles, bounds) {
        return SearchOutcome { position: target, degraded: false };
    }

    for ring in 1..=MAX_SEARCH_RINGS {
        let r = i64::from(ring);
        let mut offsets: Vec<(i64, i64)> = Vec::with_capacity((8 * r) as usize);
        for dx in -r..=r {
            for dy in -r..=r {
                if dx.abs().max(dy.abs()) == r {
                    offsets.push((dx, dy));
                }
            }
        }
        // Nearest-first within the ring; x then y as the final tie-break.
        offsets.sort_by_key(|&(dx, dy)| (dx * dx + dy * dy, dx, dy));

        for (dx, dy) in offsets {
            #[allow(clippy::cast_precision_loss)]
            let candidate = Point::new(target.x + dx as f64 * step, target.y + dy as f64 * step);
            if candidate_valid(candidate, width, height, obstacles, bounds) {
                return SearchOutcome { position: candidate, degraded: false };
            }
        }
    }

    warn!(
        x = target.x,
        y = target.y,
        rings = MAX_SEARCH_RINGS,
        "nearest-valid-position search exhausted; returning original target"
    );
    SearchOutcome { position: target, degraded: true }
}

/// Clamp a raw resize so only the edges implied by `handle` move and neither
/// axis span falls below `min_size`.
///
/// The opposite edge never moves: when a span would drop under `min_size`,
/// the *moving* edge is pulled back until the span equals `min_size` exactly.
#[must_use]
pub fn clamp_resize(handle: ResizeHandle, original: &Rect, raw: &Rect, min_size: f64) -> Rect {
    let mut out = *original;

    if handle.moves_west() {
        out.start_x = raw.start_x.min(original.end_x - min_size);
    }
    if handle.moves_east() {
        out.end_x = raw.end_x.max(original.start_x + min_size);
    }
    if handle.moves_north() {
        out.start_y = raw.start_y.min(original.end_y - min_size);
    }
    if handle.moves_south() {
        out.end_y = raw.end_y.max(original.start_y + min_size);
    }

    out
}
