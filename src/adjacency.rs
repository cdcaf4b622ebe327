//! Exact edge-adjacency detection and connector synthesis.
//!
//! Runs after a move/resize/create gesture commits. Because committed room
//! geometry is grid-snapped, adjacency is tested with exact equality on the
//! shared edge coordinate, not an epsilon. Failures to persist a synthesized
//! connector never roll back the room change itself; the two are independent
//! facts.

#[cfg(test)]
#[path = "adjacency_test.rs"]
mod adjacency_test;

use uuid::Uuid;

use crate::camera::Point;
use crate::consts::{CONNECTOR_DEDUP_TOLERANCE, CONNECTOR_HEIGHT, CONNECTOR_WIDTH};
use crate::model::{Connector, ConnectorState, Rect, Room, RoomId};

/// A detected shared boundary segment between two rooms.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SharedEdge {
    pub other: RoomId,
    /// Midpoint of the overlapping shared segment.
    pub x: f64,
    pub y: f64,
    /// 90° when the shared wall runs north-south (east/west adjacency),
    /// 0° when it runs east-west (north/south adjacency).
    pub rotation: f64,
}

/// The exactly-shared boundary segment between two rectangles, if any.
///
/// Returns the segment endpoints; a vertical segment means an east/west
/// adjacency. `None` when the edges don't coincide exactly or the
/// perpendicular projections don't overlap.
#[must_use]
pub fn shared_segment(a: &Rect, b: &Rect) -> Option<(Point, Point)> {
    let y_lo = a.start_y.max(b.start_y);
    let y_hi = a.end_y.min(b.end_y);
    if y_hi > y_lo {
        if a.end_x == b.start_x {
            return Some((Point::new(a.end_x, y_lo), Point::new(a.end_x, y_hi)));
        }
        if a.start_x == b.end_x {
            return Some((Point::new(a.start_x, y_lo), Point::new(a.start_x, y_hi)));
        }
    }

    let x_lo = a.start_x.max(b.start_x);
    let x_hi = a.end_x.min(b.end_x);
    if x_hi > x_lo {
        if a.end_y == b.start_y {
            return Some((Point::new(x_lo, a.end_y), Point::new(x_hi, a.end_y)));
        }
        if a.start_y == b.end_y {
            return Some((Point::new(x_lo, a.start_y), Point::new(x_hi, a.start_y)));
        }
    }

    None
}

/// Clamp `p` onto the axis-aligned segment `(a, b)`.
#[must_use]
pub fn nearest_on_segment(p: Point, a: Point, b: Point) -> Point {
    Point::new(
        p.x.clamp(a.x.min(b.x), a.x.max(b.x)),
        p.y.clamp(a.y.min(b.y), a.y.max(b.y)),
    )
}

/// Find every room in `others` sharing an exact edge with `room`, with
/// overlapping perpendicular projection. Same-floor filtering is the
/// caller's job.
#[must_use]
pub fn detect(room: &Room, others: &[Room]) -> Vec<SharedEdge> {
    let mut edges = Vec::new();

    for other in others {
        if other.id == room.id {
            continue;
        }
        if let Some((a, b)) = shared_segment(&room.rect, &other.rect) {
            edges.push(SharedEdge {
                other: other.id,
                x: (a.x + b.x) / 2.0,
                y: (a.y + b.y) / 2.0,
                rotation: if a.x == b.x { 90.0 } else { 0.0 },
            });
        }
    }

    edges
}

/// Whether an existing connector already covers an adjacency between the
/// same room pair within the dedup tolerance.
#[must_use]
pub fn covered(edge: &SharedEdge, room: RoomId, existing: &[Connector]) -> bool {
    existing.iter().any(|c| {
        c.links(room, edge.other)
            && (c.x - edge.x).abs() <= CONNECTOR_DEDUP_TOLERANCE
            && (c.y - edge.y).abs() <= CONNECTOR_DEDUP_TOLERANCE
    })
}

/// Synthesize connectors for every adjacency of `room` not already covered
/// by an existing connector.
///
/// New connectors sit at the midpoint of the shared segment with the fixed
/// footprint, initial state `Closed`.
#[must_use]
pub fn synthesize(room: &Room, others: &[Room], existing: &[Connector]) -> Vec<Connector> {
    detect(room, others)
        .into_iter()
        .filter(|edge| !covered(edge, room.id, existing))
        .map(|edge| Connector {
            id: Uuid::new_v4(),
            from_room: room.id,
            to_room: edge.other,
            x: edge.x,
            y: edge.y,
            width: CONNECTOR_WIDTH,
            height: CONNECTOR_HEIGHT,
            rotation: edge.rotation,
            state: ConnectorState::Closed,
        })
        .collect()
}
