//! The layout session: exclusive owner of the live entity collections and
//! the camera.
//!
//! Every other module receives references into the session and returns
//! proposed or validated geometry; nothing else holds its own copy of an
//! entity. A UI binding layer observes the session through
//! [`RenderSnapshot`] and never mutates it directly.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use std::collections::HashMap;

use serde::Serialize;

use crate::camera::Camera;
use crate::input::Selection;
use crate::model::{
    Connector, ConnectorId, ConnectorPatch, Furniture, FurnitureId, FurniturePatch, Rect, Room,
    RoomId, RoomPatch,
};

/// Entities removed by a cascading room deletion.
#[derive(Debug, Clone, Default)]
pub struct CascadeRemoval {
    pub room: Option<Room>,
    pub connectors: Vec<Connector>,
    pub furniture: Vec<Furniture>,
}

/// Pull-based scene snapshot consumed once per frame by a renderer.
///
/// The engine never calls into a renderer; this is the entire contract.
#[derive(Debug, Clone, Serialize)]
pub struct RenderSnapshot {
    pub rooms: Vec<Room>,
    pub connectors: Vec<Connector>,
    pub furniture: Vec<Furniture>,
    pub camera: Camera,
    pub selection: Option<Selection>,
    /// Entity being manipulated by the in-flight gesture, if any.
    pub active_drag: Option<Selection>,
}

/// In-memory store of rooms, connectors, and furniture, plus the camera and
/// current selection.
#[derive(Debug, Default)]
pub struct LayoutSession {
    rooms: HashMap<RoomId, Room>,
    connectors: HashMap<ConnectorId, Connector>,
    furniture: HashMap<FurnitureId, Furniture>,
    pub camera: Camera,
    pub selection: Option<Selection>,
}

impl LayoutSession {
    /// Create an empty session.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace all entities with a full snapshot from the source of truth.
    pub fn load_snapshot(
        &mut self,
        rooms: Vec<Room>,
        connectors: Vec<Connector>,
        furniture: Vec<Furniture>,
    ) {
        self.rooms = rooms.into_iter().map(|r| (r.id, r)).collect();
        self.connectors = connectors.into_iter().map(|c| (c.id, c)).collect();
        self.furniture = furniture.into_iter().map(|f| (f.id, f)).collect();
        self.selection = None;
    }

    // --- Queries ---

    #[must_use]
    pub fn room(&self, id: RoomId) -> Option<&Room> {
        self.rooms.get(&id)
    }

    #[must_use]
    pub fn connector(&self, id: ConnectorId) -> Option<&Connector> {
        self.connectors.get(&id)
    }

    #[must_use]
    pub fn furniture_item(&self, id: FurnitureId) -> Option<&Furniture> {
        self.furniture.get(&id)
    }

    /// Rooms on the given floor, ordered by id for determinism.
    #[must_use]
    pub fn rooms_on_floor(&self, floor: i32) -> Vec<&Room> {
        let mut rooms: Vec<&Room> = self.rooms.values().filter(|r| r.floor == floor).collect();
        rooms.sort_by_key(|r| r.id);
        rooms
    }

    /// Rectangles of same-floor rooms other than `exclude`, the obstacle set
    /// for collision and proximity queries.
    #[must_use]
    pub fn floor_obstacles(&self, floor: i32, exclude: RoomId) -> Vec<Rect> {
        let mut rooms: Vec<&Room> = self
            .rooms
            .values()
            .filter(|r| r.floor == floor && r.id != exclude)
            .collect();
        rooms.sort_by_key(|r| r.id);
        rooms.iter().map(|r| r.rect).collect()
    }

    /// Same-floor rooms other than `exclude`, cloned for adjacency scans.
    #[must_use]
    pub fn floor_neighbors(&self, floor: i32, exclude: RoomId) -> Vec<Room> {
        let mut rooms: Vec<Room> = self
            .rooms
            .values()
            .filter(|r| r.floor == floor && r.id != exclude)
            .cloned()
            .collect();
        rooms.sort_by_key(|r| r.id);
        rooms
    }

    /// Furniture owned by `room_id`, ordered by `(z_index, id)`.
    #[must_use]
    pub fn furniture_in(&self, room_id: RoomId) -> Vec<&Furniture> {
        let mut items: Vec<&Furniture> =
            self.furniture.values().filter(|f| f.room_id == room_id).collect();
        items.sort_by(|a, b| a.z_index.cmp(&b.z_index).then_with(|| a.id.cmp(&b.id)));
        items
    }

    /// All furniture ordered by `(z_index, id)` for draw order.
    #[must_use]
    pub fn furniture_sorted(&self) -> Vec<&Furniture> {
        let mut items: Vec<&Furniture> = self.furniture.values().collect();
        items.sort_by(|a, b| a.z_index.cmp(&b.z_index).then_with(|| a.id.cmp(&b.id)));
        items
    }

    /// All connectors ordered by id.
    #[must_use]
    pub fn connectors_sorted(&self) -> Vec<&Connector> {
        let mut items: Vec<&Connector> = self.connectors.values().collect();
        items.sort_by_key(|c| c.id);
        items
    }

    /// Connectors referencing `room_id` on either end, ordered by id.
    #[must_use]
    pub fn connectors_of(&self, room_id: RoomId) -> Vec<&Connector> {
        let mut items: Vec<&Connector> = self
            .connectors
            .values()
            .filter(|c| c.from_room == room_id || c.to_room == room_id)
            .collect();
        items.sort_by_key(|c| c.id);
        items
    }

    #[must_use]
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty() && self.connectors.is_empty() && self.furniture.is_empty()
    }

    // --- Mutations ---

    /// Insert or replace a room.
    pub fn insert_room(&mut self, room: Room) {
        self.rooms.insert(room.id, room);
    }

    /// Insert or replace a connector.
    pub fn insert_connector(&mut self, connector: Connector) {
        self.connectors.insert(connector.id, connector);
    }

    /// Insert or replace a furniture item.
    pub fn insert_furniture(&mut self, item: Furniture) {
        self.furniture.insert(item.id, item);
    }

    /// Overwrite a room's rectangle. Geometry validation is the caller's job.
    pub(crate) fn set_room_rect(&mut self, id: RoomId, rect: Rect) {
        if let Some(room) = self.rooms.get_mut(&id) {
            room.rect = rect;
        }
    }

    /// Overwrite a connector's position.
    pub(crate) fn set_connector_pos(&mut self, id: ConnectorId, x: f64, y: f64) {
        if let Some(conn) = self.connectors.get_mut(&id) {
            conn.x = x;
            conn.y = y;
        }
    }

    /// Overwrite a furniture item's room-relative position.
    pub(crate) fn set_furniture_pos(&mut self, id: FurnitureId, x: f64, y: f64) {
        if let Some(item) = self.furniture.get_mut(&id) {
            item.x = x;
            item.y = y;
        }
    }

    /// Apply a sparse update to a room. Returns false if it doesn't exist.
    pub fn apply_room_patch(&mut self, id: RoomId, patch: &RoomPatch) -> bool {
        let Some(room) = self.rooms.get_mut(&id) else {
            return false;
        };
        if let Some(floor) = patch.floor {
            room.floor = floor;
        }
        room.rect = patch.rect_over(room.rect);
        if let Some(kind) = patch.kind {
            room.kind = kind;
        }
        if let Some(locked) = patch.locked {
            room.locked = locked;
        }
        true
    }

    /// Apply a sparse update to a connector. Returns false if it doesn't exist.
    pub fn apply_connector_patch(&mut self, id: ConnectorId, patch: &ConnectorPatch) -> bool {
        let Some(conn) = self.connectors.get_mut(&id) else {
            return false;
        };
        if let Some(x) = patch.x {
            conn.x = x;
        }
        if let Some(y) = patch.y {
            conn.y = y;
        }
        if let Some(w) = patch.width {
            conn.width = w;
        }
        if let Some(h) = patch.height {
            conn.height = h;
        }
        if let Some(r) = patch.rotation {
            conn.rotation = r;
        }
        if let Some(s) = patch.state {
            conn.state = s;
        }
        true
    }

    /// Apply a sparse update to a furniture item. Returns false if it doesn't exist.
    pub fn apply_furniture_patch(&mut self, id: FurnitureId, patch: &FurniturePatch) -> bool {
        let Some(item) = self.furniture.get_mut(&id) else {
            return false;
        };
        if let Some(x) = patch.x {
            item.x = x;
        }
        if let Some(y) = patch.y {
            item.y = y;
        }
        if let Some(w) = patch.width {
            item.width = w;
        }
        if let Some(h) = patch.height {
            item.height = h;
        }
        if let Some(r) = patch.rotation {
            item.rotation = r;
        }
        if let Some(z) = patch.z_index {
            item.z_index = z;
        }
        true
    }

    /// Remove a room, cascading removal of connectors referencing it and
    /// furniture owned by it. Dangling references are prevented here, at
    /// deletion time, not by validation after the fact.
    pub fn remove_room(&mut self, id: RoomId) -> CascadeRemoval {
        let mut removal = CascadeRemoval { room: self.rooms.remove(&id), ..Default::default() };
        if removal.room.is_none() {
            return removal;
        }

        let connector_ids: Vec<ConnectorId> = self
            .connectors
            .values()
            .filter(|c| c.from_room == id || c.to_room == id)
            .map(|c| c.id)
            .collect();
        for cid in connector_ids {
            if let Some(c) = self.connectors.remove(&cid) {
                removal.connectors.push(c);
            }
        }

        let furniture_ids: Vec<FurnitureId> = self
            .furniture
            .values()
            .filter(|f| f.room_id == id)
            .map(|f| f.id)
            .collect();
        for fid in furniture_ids {
            if let Some(f) = self.furniture.remove(&fid) {
                removal.furniture.push(f);
            }
        }

        self.clear_selection_of(id);
        for c in &removal.connectors {
            self.clear_selection_of(c.id);
        }
        for f in &removal.furniture {
            self.clear_selection_of(f.id);
        }
        removal
    }

    /// Remove a connector by id.
    pub fn remove_connector(&mut self, id: ConnectorId) -> Option<Connector> {
        let removed = self.connectors.remove(&id);
        if removed.is_some() {
            self.clear_selection_of(id);
        }
        removed
    }

    /// Remove a furniture item by id.
    pub fn remove_furniture(&mut self, id: FurnitureId) -> Option<Furniture> {
        let removed = self.furniture.remove(&id);
        if removed.is_some() {
            self.clear_selection_of(id);
        }
        removed
    }

    fn clear_selection_of(&mut self, id: uuid::Uuid) {
        let selected = match self.selection {
            Some(Selection::Room(s) | Selection::Connector(s) | Selection::Furniture(s)) => s,
            None => return,
        };
        if selected == id {
            self.selection = None;
        }
    }

    // --- Rendering ---

    /// Build the pull-based scene snapshot. Rooms are ordered by floor then
    /// id, furniture by z-order, connectors by id.
    #[must_use]
    pub fn render_snapshot(&self, active_drag: Option<Selection>) -> RenderSnapshot {
        let mut rooms: Vec<Room> = self.rooms.values().cloned().collect();
        rooms.sort_by(|a, b| a.floor.cmp(&b.floor).then_with(|| a.id.cmp(&b.id)));
        RenderSnapshot {
            rooms,
            connectors: self.connectors_sorted().into_iter().cloned().collect(),
            furniture: self.furniture_sorted().into_iter().cloned().collect(),
            camera: self.camera,
            selection: self.selection,
            active_drag,
        }
    }
}
