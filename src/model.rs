//! Entity model: rooms, connectors, furniture, and their sparse updates.
//!
//! All geometry is in abstract world units. Rooms are axis-aligned rectangles
//! on an integer floor index. Connectors link exactly two rooms at a point on
//! their shared boundary. Furniture positions are offsets from the owning
//! room's *center*, so furniture travels with the room on translation without
//! any recomputation.

#[cfg(test)]
#[path = "model_test.rs"]
mod model_test;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::camera::Point;

/// Unique identifier for a room.
pub type RoomId = Uuid;

/// Unique identifier for a connector.
pub type ConnectorId = Uuid;

/// Unique identifier for a furniture item.
pub type FurnitureId = Uuid;

/// Axis-aligned rectangle in world units. `start` edges are the low
/// coordinates; invariants require `end_x > start_x` and `end_y > start_y`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub start_x: f64,
    pub end_x: f64,
    pub start_y: f64,
    pub end_y: f64,
}

impl Rect {
    #[must_use]
    pub fn new(start_x: f64, end_x: f64, start_y: f64, end_y: f64) -> Self {
        Self { start_x, end_x, start_y, end_y }
    }

    /// Build a normalized rect from two opposite corners in any order.
    #[must_use]
    pub fn from_corners(a: Point, b: Point) -> Self {
        Self {
            start_x: a.x.min(b.x),
            end_x: a.x.max(b.x),
            start_y: a.y.min(b.y),
            end_y: a.y.max(b.y),
        }
    }

    /// Build a rect of the given size centered on `center`.
    #[must_use]
    pub fn centered(center: Point, width: f64, height: f64) -> Self {
        Self {
            start_x: center.x - width / 2.0,
            end_x: center.x + width / 2.0,
            start_y: center.y - height / 2.0,
            end_y: center.y + height / 2.0,
        }
    }

    #[must_use]
    pub fn width(&self) -> f64 {
        self.end_x - self.start_x
    }

    #[must_use]
    pub fn height(&self) -> f64 {
        self.end_y - self.start_y
    }

    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(
            (self.start_x + self.end_x) / 2.0,
            (self.start_y + self.end_y) / 2.0,
        )
    }

    #[must_use]
    pub fn translated(&self, dx: f64, dy: f64) -> Self {
        Self {
            start_x: self.start_x + dx,
            end_x: self.end_x + dx,
            start_y: self.start_y + dy,
            end_y: self.end_y + dy,
        }
    }

    /// Whether `p` lies inside the rect (boundary counts as inside).
    #[must_use]
    pub fn contains_point(&self, p: Point) -> bool {
        p.x >= self.start_x && p.x <= self.end_x && p.y >= self.start_y && p.y <= self.end_y
    }
}

/// The type tag of a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoomKind {
    #[default]
    Generic,
    Corridor,
    Storage,
    Outdoor,
}

/// A rectangular space on one floor of the layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Room {
    pub id: RoomId,
    /// Floor index; geometry queries never cross floors.
    pub floor: i32,
    pub rect: Rect,
    pub kind: RoomKind,
    /// Locked rooms can be selected but not moved or resized.
    pub locked: bool,
}

impl Room {
    /// World-space center of the room; the origin of its furniture.
    #[must_use]
    pub fn center(&self) -> Point {
        self.rect.center()
    }

    /// Half of the room's width and height, the bound for furniture placement.
    #[must_use]
    pub fn half_extents(&self) -> (f64, f64) {
        (self.rect.width() / 2.0, self.rect.height() / 2.0)
    }

    /// Convert a room-relative offset to a world-space point.
    #[must_use]
    pub fn to_world(&self, rel: Point) -> Point {
        let c = self.center();
        Point::new(c.x + rel.x, c.y + rel.y)
    }

    /// Convert a world-space point to an offset from the room's center.
    #[must_use]
    pub fn to_room_relative(&self, world: Point) -> Point {
        let c = self.center();
        Point::new(world.x - c.x, world.y - c.y)
    }
}

/// Open/closed/locked state of a connector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectorState {
    Open,
    Closed,
    Locked,
}

/// A door-like link between exactly two rooms, positioned on (or within
/// snapping tolerance of) their shared boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Connector {
    pub id: ConnectorId,
    pub from_room: RoomId,
    pub to_room: RoomId,
    /// World-space position.
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Rotation in degrees; one of 0, 90, 180, 270. 90° means the shared
    /// wall runs north-south (an east/west adjacency).
    pub rotation: f64,
    pub state: ConnectorState,
}

impl Connector {
    /// Whether this connector links the same unordered room pair as `(a, b)`.
    #[must_use]
    pub fn links(&self, a: RoomId, b: RoomId) -> bool {
        (self.from_room == a && self.to_room == b) || (self.from_room == b && self.to_room == a)
    }
}

/// A decoration object owned by a room. `x` / `y` are offsets from the
/// owning room's center, not world coordinates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Furniture {
    pub id: FurnitureId,
    pub room_id: RoomId,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub rotation: f64,
    /// Stacking order within the room; lower values draw beneath higher.
    pub z_index: i64,
}

impl Furniture {
    /// Room-relative bounding box centered on the item's position.
    #[must_use]
    pub fn rel_rect(&self) -> Rect {
        Rect::centered(Point::new(self.x, self.y), self.width, self.height)
    }
}

/// Sparse update for a room. Only present fields are applied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoomPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub floor: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_y: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_y: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<RoomKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locked: Option<bool>,
}

impl RoomPatch {
    /// A patch carrying all four rectangle edges.
    #[must_use]
    pub fn from_rect(rect: Rect) -> Self {
        Self {
            start_x: Some(rect.start_x),
            end_x: Some(rect.end_x),
            start_y: Some(rect.start_y),
            end_y: Some(rect.end_y),
            ..Self::default()
        }
    }

    /// The rect this patch would produce when applied over `current`.
    #[must_use]
    pub fn rect_over(&self, current: Rect) -> Rect {
        Rect {
            start_x: self.start_x.unwrap_or(current.start_x),
            end_x: self.end_x.unwrap_or(current.end_x),
            start_y: self.start_y.unwrap_or(current.start_y),
            end_y: self.end_y.unwrap_or(current.end_y),
        }
    }
}

/// Sparse update for a connector.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConnectorPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<ConnectorState>,
}

impl ConnectorPatch {
    /// A patch carrying only a position.
    #[must_use]
    pub fn at(x: f64, y: f64) -> Self {
        Self { x: Some(x), y: Some(y), ..Self::default() }
    }
}

/// Sparse update for a furniture item.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FurniturePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub z_index: Option<i64>,
}

impl FurniturePatch {
    /// A patch carrying only a room-relative position.
    #[must_use]
    pub fn at(x: f64, y: f64) -> Self {
        Self { x: Some(x), y: Some(y), ..Self::default() }
    }
}
