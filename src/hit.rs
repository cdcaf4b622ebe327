#[cfg(test)]
#[path = "hit_test.rs"]
mod hit_test;

use crate::camera::{Camera, Point};
use crate::consts::HANDLE_RADIUS_PX;
use crate::input::Selection;
use crate::model::{Rect, Room};
use crate::session::LayoutSession;

/// Which part of an entity was hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitPart {
    Body,
    ResizeHandle(ResizeHandle),
}

/// Handle position for resizing a room: four corners plus four edge midpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeHandle {
    N,
    Ne,
    E,
    Se,
    S,
    Sw,
    W,
    Nw,
}

impl ResizeHandle {
    /// All eight handles in hit-test order.
    pub const ALL: [Self; 8] = [
        Self::Nw,
        Self::N,
        Self::Ne,
        Self::E,
        Self::Se,
        Self::S,
        Self::Sw,
        Self::W,
    ];

    #[must_use]
    pub fn moves_west(self) -> bool {
        matches!(self, Self::W | Self::Nw | Self::Sw)
    }

    #[must_use]
    pub fn moves_east(self) -> bool {
        matches!(self, Self::E | Self::Ne | Self::Se)
    }

    #[must_use]
    pub fn moves_north(self) -> bool {
        matches!(self, Self::N | Self::Nw | Self::Ne)
    }

    #[must_use]
    pub fn moves_south(self) -> bool {
        matches!(self, Self::S | Self::Sw | Self::Se)
    }

    /// World-space position of this handle on the boundary of `rect`.
    #[must_use]
    pub fn position(self, rect: &Rect) -> Point {
        let cx = (rect.start_x + rect.end_x) / 2.0;
        let cy = (rect.start_y + rect.end_y) / 2.0;
        match self {
            Self::Nw => Point::new(rect.start_x, rect.start_y),
            Self::N => Point::new(cx, rect.start_y),
            Self::Ne => Point::new(rect.end_x, rect.start_y),
            Self::E => Point::new(rect.end_x, cy),
            Self::Se => Point::new(rect.end_x, rect.end_y),
            Self::S => Point::new(cx, rect.end_y),
            Self::Sw => Point::new(rect.start_x, rect.end_y),
            Self::W => Point::new(rect.start_x, cy),
        }
    }
}

/// Result of a hit test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    pub target: Selection,
    pub part: HitPart,
}

fn handle_under(room: &Room, world_pt: Point, slop: f64) -> Option<ResizeHandle> {
    ResizeHandle::ALL.into_iter().find(|handle| {
        let p = handle.position(&room.rect);
        (p.x - world_pt.x).abs() <= slop && (p.y - world_pt.y).abs() <= slop
    })
}

/// Test what lies under `world_pt` on the given floor.
///
/// Resize handles of the selected room are checked first (with screen-space
/// slop scaled through the camera), then furniture topmost-first, then
/// connectors, then room bodies. Rooms on one floor never overlap, so room
/// iteration order does not matter; furniture is ordered by z-index.
#[must_use]
pub fn hit_test(
    world_pt: Point,
    session: &LayoutSession,
    camera: &Camera,
    floor: i32,
) -> Option<Hit> {
    let slop = camera.screen_dist_to_world(HANDLE_RADIUS_PX);

    if let Some(Selection::Room(id)) = session.selection {
        if let Some(room) = session.room(id) {
            if room.floor == floor {
                if let Some(handle) = handle_under(room, world_pt, slop) {
                    return Some(Hit {
                        target: Selection::Room(id),
                        part: HitPart::ResizeHandle(handle),
                    });
                }
            }
        }
    }

    for item in session.furniture_sorted().into_iter().rev() {
        let Some(room) = session.room(item.room_id) else {
            continue;
        };
        if room.floor != floor {
            continue;
        }
        let rel = room.to_room_relative(world_pt);
        if item.rel_rect().contains_point(rel) {
            return Some(Hit { target: Selection::Furniture(item.id), part: HitPart::Body });
        }
    }

    for conn in session.connectors_sorted() {
        let on_floor = session
            .room(conn.from_room)
            .is_some_and(|r| r.floor == floor);
        if !on_floor {
            continue;
        }
        let half_w = (conn.width / 2.0).max(slop);
        let half_h = (conn.height / 2.0).max(slop);
        let rect = Rect::centered(Point::new(conn.x, conn.y), half_w * 2.0, half_h * 2.0);
        if rect.contains_point(world_pt) {
            return Some(Hit { target: Selection::Connector(conn.id), part: HitPart::Body });
        }
    }

    for room in session.rooms_on_floor(floor) {
        if room.rect.contains_point(world_pt) {
            return Some(Hit { target: Selection::Room(room.id), part: HitPart::Body });
        }
    }

    None
}
