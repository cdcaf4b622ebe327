//! Input model: tools, modifier keys, mouse buttons, and the gesture state
//! machine.
//!
//! `InteractionState` is the active gesture being tracked between
//! pointer-down and pointer-up. Every dragging variant carries a snapshot of
//! the original geometry taken at drag start; deltas are always computed as
//! `current world pointer − drag-start world pointer` against that snapshot,
//! never accumulated per frame, so a long drag cannot drift.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use serde::{Deserialize, Serialize};

use crate::camera::Point;
use crate::hit::{Hit, ResizeHandle};
use crate::model::{ConnectorId, FurnitureId, Rect, RoomId};

/// Which tool is currently active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tool {
    /// Pointer / selection tool (default).
    #[default]
    Select,
    /// Drag out a new room.
    Room,
    /// Place a furniture item inside a room.
    Furniture,
}

/// Keyboard/mouse modifier keys held during an event.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, Default)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

/// Mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    /// Left mouse button (or single-finger tap).
    Primary,
    /// Middle mouse button (scroll wheel click).
    Middle,
    /// Right mouse button (or two-finger tap).
    Secondary,
}

/// A keyboard key, named as reported by the host (e.g. `"Escape"`, `"Delete"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key(pub String);

/// Wheel / trackpad scroll delta.
#[derive(Debug, Clone, Copy)]
pub struct WheelDelta {
    /// Horizontal scroll amount in pixels.
    pub dx: f64,
    /// Vertical scroll amount in pixels (positive = down).
    pub dy: f64,
}

/// The currently selected entity, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "kind", content = "id")]
pub enum Selection {
    Room(RoomId),
    Connector(ConnectorId),
    Furniture(FurnitureId),
}

/// Persistent UI state visible to the renderer.
#[derive(Debug, Clone, Default)]
pub struct UiState {
    /// Currently active tool.
    pub tool: Tool,
    /// Floor the user is editing; geometry queries never cross floors.
    pub floor: i32,
}

/// The gesture state machine.
///
/// `Idle → PendingDrag → {Panning, MovingRoom, ResizingRoom, MovingConnector,
/// MovingFurniture, CreatingRoom} → Idle`. While `PendingDrag`, no geometry
/// changes are applied: a release inside the drag threshold is a click
/// (selection change only).
#[derive(Debug, Clone, Default)]
pub enum InteractionState {
    /// No gesture in progress; waiting for the next pointer-down.
    #[default]
    Idle,
    /// Pointer is down but movement has not yet exceeded the drag threshold.
    PendingDrag {
        /// Screen-space position of the pointer-down, for the threshold test.
        start_screen: Point,
        /// World-space position of the pointer-down.
        start_world: Point,
        /// What was under the pointer at pointer-down, if anything.
        target: Option<Hit>,
        /// Which button started the gesture.
        button: Button,
    },
    /// Dragging the camera.
    Panning {
        /// Screen-space position of the previous pointer event.
        last_screen: Point,
    },
    /// Translating an existing room.
    MovingRoom {
        id: RoomId,
        /// World-space pointer position at drag start.
        start_world: Point,
        /// Room rectangle at drag start; all deltas apply against this.
        orig: Rect,
    },
    /// Resizing a room by one of its eight handles.
    ResizingRoom {
        id: RoomId,
        handle: ResizeHandle,
        start_world: Point,
        orig: Rect,
    },
    /// Translating a connector along its rooms' shared boundary.
    MovingConnector {
        id: ConnectorId,
        start_world: Point,
        /// Connector position at drag start.
        orig_x: f64,
        orig_y: f64,
    },
    /// Translating a furniture item within its room.
    MovingFurniture {
        id: FurnitureId,
        start_world: Point,
        /// Room-relative position at drag start.
        orig_x: f64,
        orig_y: f64,
    },
    /// Dragging out a new provisional room from an anchor corner.
    CreatingRoom {
        /// Id of the provisional room already inserted in the session.
        id: RoomId,
        /// Grid-snapped world-space corner where the drag started.
        anchor_world: Point,
    },
}

impl InteractionState {
    /// The entity being manipulated by the active gesture, for drag
    /// highlighting in the render snapshot.
    #[must_use]
    pub fn drag_target(&self) -> Option<Selection> {
        match self {
            Self::MovingRoom { id, .. }
            | Self::ResizingRoom { id, .. }
            | Self::CreatingRoom { id, .. } => Some(Selection::Room(*id)),
            Self::MovingConnector { id, .. } => Some(Selection::Connector(*id)),
            Self::MovingFurniture { id, .. } => Some(Selection::Furniture(*id)),
            Self::Idle | Self::PendingDrag { .. } | Self::Panning { .. } => None,
        }
    }
}
