//! Top-level engine: turns pointer/key/wheel events into validated session
//! mutations and [`Action`]s for the host to persist.
//!
//! Control flow per gesture: pointer-down classifies the target, pointer-move
//! converts through the camera, applies grid and proximity snapping to the
//! delta from the drag-start snapshot, validates the candidate against
//! same-floor obstacles, and writes only valid geometry into the session.
//! Pointer-up commits, runs adjacency detection, and emits actions carrying
//! revert data so a persistence failure can roll the entity back.

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

use tracing::{debug, warn};
use uuid::Uuid;

use crate::adjacency;
use crate::camera::{Point, Viewport};
use crate::collide;
use crate::consts::{
    CONNECTOR_BOUNDARY_TOLERANCE, CONNECTOR_GRID, CONNECTOR_HEIGHT, CONNECTOR_WIDTH,
    DEFAULT_FURNITURE_SIZE, DRAG_THRESHOLD_PX, FURNITURE_GRID, MIN_ROOM_SIZE, ROOM_GRID,
    SNAP_THRESHOLD, WHEEL_ZOOM_STEP,
};
use crate::grid;
use crate::hit::{self, Hit, HitPart, ResizeHandle};
use crate::input::{Button, InteractionState, Key, Modifiers, Selection, Tool, UiState, WheelDelta};
use crate::model::{
    Connector, ConnectorId, ConnectorPatch, ConnectorState, Furniture, FurnitureId,
    FurniturePatch, Rect, Room, RoomId, RoomKind, RoomPatch,
};
use crate::session::{LayoutSession, RenderSnapshot};
use crate::snap;

/// Actions returned from event handlers for the host to process.
///
/// Update actions carry both the committed fields and a `revert` patch of the
/// pre-gesture state, so [`crate::persist::commit`] can roll back on failure.
#[derive(Debug, Clone)]
pub enum Action {
    RoomCreated(Room),
    RoomUpdated { id: RoomId, fields: RoomPatch, revert: RoomPatch },
    RoomDeleted { id: RoomId },
    ConnectorCreated { connector: Connector, auto: bool },
    ConnectorUpdated { id: ConnectorId, fields: ConnectorPatch, revert: ConnectorPatch },
    ConnectorDeleted { id: ConnectorId },
    FurnitureCreated(Furniture),
    FurnitureUpdated { id: FurnitureId, fields: FurniturePatch, revert: FurniturePatch },
    FurnitureDeleted { id: FurnitureId },
    SelectionChanged(Option<Selection>),
    Warning(GeometryWarning),
    RenderNeeded,
}

/// A geometry violation that was auto-corrected. Never a hard error; a UI
/// layer can surface these ("repositioned due to collision").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeometryWarning {
    /// The entity was moved off its requested position to avoid an overlap
    /// or an out-of-bounds placement.
    CollisionRepaired { id: Uuid },
    /// The nearest-valid-position search hit its ring cap; the entity may
    /// still be in violation.
    PlacementDegraded { id: Uuid },
    /// A connector was pulled back onto the shared boundary of its rooms.
    BoundaryReattached { id: Uuid },
}

/// Failure of an explicit layout operation (not a geometry violation).
#[derive(Debug, Clone, thiserror::Error)]
pub enum LayoutError {
    #[error("room not found: {0}")]
    RoomNotFound(RoomId),
    #[error("rooms {0} and {1} share no boundary")]
    NotAdjacent(RoomId, RoomId),
    #[error("a connector must link two distinct rooms")]
    SameRoom,
}

/// Core engine state: the session, UI state, gesture state machine, and
/// viewport. Exactly one gesture can be in flight at a time.
#[derive(Debug, Default)]
pub struct EngineCore {
    pub session: LayoutSession,
    pub ui: UiState,
    pub input: InteractionState,
    pub viewport: Viewport,
}

impl EngineCore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // --- Host wiring ---

    /// Update viewport dimensions.
    pub fn set_viewport(&mut self, width: f64, height: f64) {
        self.viewport = Viewport::new(width, height);
    }

    /// Set the active tool.
    pub fn set_tool(&mut self, tool: Tool) {
        self.ui.tool = tool;
    }

    /// Switch the floor being edited. Cancels any in-flight gesture.
    pub fn set_floor(&mut self, floor: i32) -> Vec<Action> {
        let actions = self.cancel_gesture();
        self.ui.floor = floor;
        actions
    }

    // --- Queries ---

    /// The currently selected entity, if any.
    #[must_use]
    pub fn selection(&self) -> Option<Selection> {
        self.session.selection
    }

    /// Build the pull-based scene snapshot for a renderer.
    #[must_use]
    pub fn render_snapshot(&self) -> RenderSnapshot {
        self.session.render_snapshot(self.input.drag_target())
    }

    // --- Pointer events ---

    pub fn on_pointer_down(
        &mut self,
        screen: Point,
        button: Button,
        _modifiers: Modifiers,
    ) -> Vec<Action> {
        if !matches!(self.input, InteractionState::Idle) {
            return Vec::new();
        }
        if button == Button::Middle {
            self.input = InteractionState::Panning { last_screen: screen };
            return Vec::new();
        }
        let world = self.session.camera.screen_to_world(screen, self.viewport);
        let target = hit::hit_test(world, &self.session, &self.session.camera, self.ui.floor);
        self.input = InteractionState::PendingDrag {
            start_screen: screen,
            start_world: world,
            target,
            button,
        };
        Vec::new()
    }

    pub fn on_pointer_move(&mut self, screen: Point, _modifiers: Modifiers) -> Vec<Action> {
        if let InteractionState::PendingDrag { start_screen, .. } = self.input {
            let moved = ((screen.x - start_screen.x).powi(2)
                + (screen.y - start_screen.y).powi(2))
            .sqrt();
            if moved > DRAG_THRESHOLD_PX {
                self.promote_pending();
            }
        }

        match self.input.clone() {
            InteractionState::Idle | InteractionState::PendingDrag { .. } => Vec::new(),
            InteractionState::Panning { last_screen } => {
                let dx = screen.x - last_screen.x;
                let dy = screen.y - last_screen.y;
                self.session.camera.pan_by(dx, dy);
                self.input = InteractionState::Panning { last_screen: screen };
                vec![Action::RenderNeeded]
            }
            InteractionState::MovingRoom { id, start_world, orig } => {
                self.move_room_frame(id, start_world, orig, screen)
            }
            InteractionState::ResizingRoom { id, handle, start_world, orig } => {
                self.resize_room_frame(id, handle, start_world, orig, screen)
            }
            InteractionState::MovingConnector { id, start_world, orig_x, orig_y } => {
                let world = self.session.camera.screen_to_world(screen, self.viewport);
                let dx = grid::snap(world.x - start_world.x, CONNECTOR_GRID);
                let dy = grid::snap(world.y - start_world.y, CONNECTOR_GRID);
                self.session.set_connector_pos(id, orig_x + dx, orig_y + dy);
                vec![Action::RenderNeeded]
            }
            InteractionState::MovingFurniture { id, start_world, orig_x, orig_y } => {
                self.move_furniture_frame(id, start_world, orig_x, orig_y, screen)
            }
            InteractionState::CreatingRoom { id, anchor_world } => {
                self.create_room_frame(id, anchor_world, screen)
            }
        }
    }

    pub fn on_pointer_up(
        &mut self,
        screen: Point,
        _button: Button,
        _modifiers: Modifiers,
    ) -> Vec<Action> {
        match std::mem::take(&mut self.input) {
            InteractionState::Idle | InteractionState::Panning { .. } => Vec::new(),
            InteractionState::PendingDrag { target, .. } => self.click(screen, target),
            InteractionState::MovingRoom { id, orig, .. }
            | InteractionState::ResizingRoom { id, orig, .. } => self.commit_room_gesture(id, orig),
            InteractionState::MovingConnector { id, orig_x, orig_y, .. } => {
                self.commit_connector_gesture(id, orig_x, orig_y)
            }
            InteractionState::MovingFurniture { id, orig_x, orig_y, .. } => {
                self.commit_furniture_gesture(id, orig_x, orig_y)
            }
            InteractionState::CreatingRoom { id, .. } => self.commit_create_gesture(id),
        }
    }

    pub fn on_wheel(
        &mut self,
        screen: Point,
        delta: WheelDelta,
        _modifiers: Modifiers,
    ) -> Vec<Action> {
        if delta.dy == 0.0 {
            return Vec::new();
        }
        let factor = if delta.dy < 0.0 { WHEEL_ZOOM_STEP } else { 1.0 / WHEEL_ZOOM_STEP };
        let viewport = self.viewport;
        self.session.camera.zoom_at(screen, factor, viewport);
        vec![Action::RenderNeeded]
    }

    pub fn on_key_down(&mut self, key: &Key, _modifiers: Modifiers) -> Vec<Action> {
        match key.0.as_str() {
            "Escape" => self.cancel_gesture(),
            "Delete" | "Backspace" => self.delete_selection(),
            _ => Vec::new(),
        }
    }

    /// The host lost pointer capture mid-gesture; same contract as Escape.
    pub fn on_pointer_capture_lost(&mut self) -> Vec<Action> {
        self.cancel_gesture()
    }

    /// Abort any in-flight gesture, rolling the session back to the
    /// drag-start snapshot. Nothing is committed.
    pub fn cancel_gesture(&mut self) -> Vec<Action> {
        match std::mem::take(&mut self.input) {
            InteractionState::Idle => Vec::new(),
            InteractionState::PendingDrag { .. } | InteractionState::Panning { .. } => {
                vec![Action::RenderNeeded]
            }
            InteractionState::MovingRoom { id, orig, .. }
            | InteractionState::ResizingRoom { id, orig, .. } => {
                self.session.set_room_rect(id, orig);
                vec![Action::RenderNeeded]
            }
            InteractionState::MovingConnector { id, orig_x, orig_y, .. } => {
                self.session.set_connector_pos(id, orig_x, orig_y);
                vec![Action::RenderNeeded]
            }
            InteractionState::MovingFurniture { id, orig_x, orig_y, .. } => {
                self.session.set_furniture_pos(id, orig_x, orig_y);
                vec![Action::RenderNeeded]
            }
            InteractionState::CreatingRoom { id, .. } => {
                self.session.remove_room(id);
                vec![Action::RenderNeeded]
            }
        }
    }

    // --- Explicit operations (property editor, programmatic placement) ---

    /// Delete the selected entity, cascading connectors and furniture when a
    /// room goes.
    pub fn delete_selection(&mut self) -> Vec<Action> {
        let Some(selection) = self.session.selection else {
            return Vec::new();
        };
        let mut actions = Vec::new();
        match selection {
            Selection::Room(id) => {
                let removal = self.session.remove_room(id);
                if removal.room.is_some() {
                    actions.push(Action::RoomDeleted { id });
                    for c in removal.connectors {
                        actions.push(Action::ConnectorDeleted { id: c.id });
                    }
                    for f in removal.furniture {
                        actions.push(Action::FurnitureDeleted { id: f.id });
                    }
                }
            }
            Selection::Connector(id) => {
                if self.session.remove_connector(id).is_some() {
                    actions.push(Action::ConnectorDeleted { id });
                }
            }
            Selection::Furniture(id) => {
                if self.session.remove_furniture(id).is_some() {
                    actions.push(Action::FurnitureDeleted { id });
                }
            }
        }
        if actions.is_empty() {
            return actions;
        }
        actions.push(Action::SelectionChanged(None));
        actions.push(Action::RenderNeeded);
        actions
    }

    /// Place a room programmatically. The rect is min-size-clamped and moved
    /// to the nearest collision-free position before insertion.
    pub fn create_room(&mut self, floor: i32, rect: Rect, kind: RoomKind) -> Vec<Action> {
        let id = Uuid::new_v4();
        let mut actions = Vec::new();
        let rect = Rect {
            end_x: rect.end_x.max(rect.start_x + MIN_ROOM_SIZE),
            end_y: rect.end_y.max(rect.start_y + MIN_ROOM_SIZE),
            ..rect
        };
        let obstacles = self.session.floor_obstacles(floor, id);
        let rect = self.repair_rect(id, rect, &obstacles, &mut actions);
        let room = Room { id, floor, rect, kind, locked: false };
        self.session.insert_room(room.clone());
        actions.push(Action::RoomCreated(room));
        actions.extend(self.synthesize_connectors(id));
        actions.push(Action::RenderNeeded);
        actions
    }

    /// Manually create a connector between two rooms near `at`, pulled onto
    /// their shared boundary.
    ///
    /// # Errors
    ///
    /// Fails when either room is missing, the rooms are the same, or they
    /// share no boundary segment.
    pub fn create_connector(
        &mut self,
        from: RoomId,
        to: RoomId,
        at: Point,
    ) -> Result<Vec<Action>, LayoutError> {
        if from == to {
            return Err(LayoutError::SameRoom);
        }
        let from_rect = self.session.room(from).ok_or(LayoutError::RoomNotFound(from))?.rect;
        let to_rect = self.session.room(to).ok_or(LayoutError::RoomNotFound(to))?.rect;
        let (a, b) =
            adjacency::shared_segment(&from_rect, &to_rect).ok_or(LayoutError::NotAdjacent(from, to))?;
        let pos = adjacency::nearest_on_segment(at, a, b);
        let connector = Connector {
            id: Uuid::new_v4(),
            from_room: from,
            to_room: to,
            x: pos.x,
            y: pos.y,
            width: CONNECTOR_WIDTH,
            height: CONNECTOR_HEIGHT,
            rotation: if a.x == b.x { 90.0 } else { 0.0 },
            state: ConnectorState::Closed,
        };
        self.session.insert_connector(connector.clone());
        Ok(vec![
            Action::ConnectorCreated { connector, auto: false },
            Action::RenderNeeded,
        ])
    }

    /// Place a furniture item in a room at a world-space point, converting
    /// to room-relative coordinates and repairing collisions.
    ///
    /// # Errors
    ///
    /// Fails when the room is missing.
    pub fn create_furniture(
        &mut self,
        room_id: RoomId,
        world_pt: Point,
        width: f64,
        height: f64,
    ) -> Result<Vec<Action>, LayoutError> {
        let room = self.session.room(room_id).ok_or(LayoutError::RoomNotFound(room_id))?;
        let rel = grid::snap_point(room.to_room_relative(world_pt), FURNITURE_GRID);
        Ok(self.place_furniture(room_id, rel, width, height))
    }

    /// Apply a property-editor patch to a room, re-entering the same
    /// validation path as a drag commit.
    pub fn apply_room_patch(&mut self, id: RoomId, patch: &RoomPatch) -> Vec<Action> {
        let Some(room) = self.session.room(id).cloned() else {
            return Vec::new();
        };
        let mut actions = Vec::new();

        let floor = patch.floor.unwrap_or(room.floor);
        let mut rect = patch.rect_over(room.rect);
        rect.end_x = rect.end_x.max(rect.start_x + MIN_ROOM_SIZE);
        rect.end_y = rect.end_y.max(rect.start_y + MIN_ROOM_SIZE);
        let obstacles = self.session.floor_obstacles(floor, id);
        let rect = self.repair_rect(id, rect, &obstacles, &mut actions);

        let fields = RoomPatch {
            floor: patch.floor,
            kind: patch.kind,
            locked: patch.locked,
            ..RoomPatch::from_rect(rect)
        };
        let revert = RoomPatch {
            floor: patch.floor.map(|_| room.floor),
            kind: patch.kind.map(|_| room.kind),
            locked: patch.locked.map(|_| room.locked),
            ..RoomPatch::from_rect(room.rect)
        };
        self.session.apply_room_patch(id, &fields);
        actions.push(Action::RoomUpdated { id, fields, revert });
        actions.extend(self.revalidate_furniture(id));
        actions.extend(self.synthesize_connectors(id));
        actions.push(Action::RenderNeeded);
        actions
    }

    /// Apply a property-editor patch to a connector, then pull it back onto
    /// the shared boundary of its rooms if the patch moved it off.
    pub fn apply_connector_patch(&mut self, id: ConnectorId, patch: &ConnectorPatch) -> Vec<Action> {
        let Some(conn) = self.session.connector(id).cloned() else {
            return Vec::new();
        };
        let revert = ConnectorPatch {
            x: patch.x.map(|_| conn.x),
            y: patch.y.map(|_| conn.y),
            width: patch.width.map(|_| conn.width),
            height: patch.height.map(|_| conn.height),
            rotation: patch.rotation.map(|_| conn.rotation),
            state: patch.state.map(|_| conn.state),
        };
        self.session.apply_connector_patch(id, patch);
        let mut actions = vec![Action::ConnectorUpdated { id, fields: patch.clone(), revert }];
        actions.extend(self.reattach_connector(id));
        actions.push(Action::RenderNeeded);
        actions
    }

    /// Apply a property-editor patch to a furniture item, re-validating
    /// containment and sibling overlap.
    pub fn apply_furniture_patch(&mut self, id: FurnitureId, patch: &FurniturePatch) -> Vec<Action> {
        let Some(item) = self.session.furniture_item(id).cloned() else {
            return Vec::new();
        };
        let revert = FurniturePatch {
            x: patch.x.map(|_| item.x),
            y: patch.y.map(|_| item.y),
            width: patch.width.map(|_| item.width),
            height: patch.height.map(|_| item.height),
            rotation: patch.rotation.map(|_| item.rotation),
            z_index: patch.z_index.map(|_| item.z_index),
        };
        self.session.apply_furniture_patch(id, patch);
        let mut actions = vec![Action::FurnitureUpdated { id, fields: patch.clone(), revert }];
        actions.extend(self.revalidate_furniture_item(id));
        actions.push(Action::RenderNeeded);
        actions
    }

    // --- Gesture internals ---

    fn promote_pending(&mut self) {
        let InteractionState::PendingDrag { start_screen, start_world, target, button } =
            self.input.clone()
        else {
            return;
        };

        if button == Button::Secondary {
            self.input = InteractionState::Panning { last_screen: start_screen };
            return;
        }

        if self.ui.tool == Tool::Room && target.is_none() {
            let anchor = grid::snap_point(start_world, ROOM_GRID);
            let id = Uuid::new_v4();
            self.session.insert_room(Room {
                id,
                floor: self.ui.floor,
                rect: Rect::new(
                    anchor.x,
                    anchor.x + MIN_ROOM_SIZE,
                    anchor.y,
                    anchor.y + MIN_ROOM_SIZE,
                ),
                kind: RoomKind::default(),
                locked: false,
            });
            self.input = InteractionState::CreatingRoom { id, anchor_world: anchor };
            return;
        }

        match target {
            None => {
                self.input = InteractionState::Panning { last_screen: start_screen };
            }
            Some(Hit { target: Selection::Room(id), part }) => {
                let Some(room) = self.session.room(id) else {
                    self.input = InteractionState::Idle;
                    return;
                };
                if room.locked {
                    // Click-select only; the threshold check repeats harmlessly.
                    return;
                }
                let orig = room.rect;
                self.input = match part {
                    HitPart::Body => InteractionState::MovingRoom { id, start_world, orig },
                    HitPart::ResizeHandle(handle) => {
                        InteractionState::ResizingRoom { id, handle, start_world, orig }
                    }
                };
            }
            Some(Hit { target: Selection::Connector(id), .. }) => {
                let Some(conn) = self.session.connector(id) else {
                    self.input = InteractionState::Idle;
                    return;
                };
                self.input = InteractionState::MovingConnector {
                    id,
                    start_world,
                    orig_x: conn.x,
                    orig_y: conn.y,
                };
            }
            Some(Hit { target: Selection::Furniture(id), .. }) => {
                let Some(item) = self.session.furniture_item(id) else {
                    self.input = InteractionState::Idle;
                    return;
                };
                self.input = InteractionState::MovingFurniture {
                    id,
                    start_world,
                    orig_x: item.x,
                    orig_y: item.y,
                };
            }
        }
    }

    fn move_room_frame(
        &mut self,
        id: RoomId,
        start_world: Point,
        orig: Rect,
        screen: Point,
    ) -> Vec<Action> {
        let Some(floor) = self.session.room(id).map(|r| r.floor) else {
            self.input = InteractionState::Idle;
            return Vec::new();
        };
        let world = self.session.camera.screen_to_world(screen, self.viewport);
        let raw_dx = world.x - start_world.x;
        let raw_dy = world.y - start_world.y;

        let obstacles = self.session.floor_obstacles(floor, id);
        let candidate = orig.translated(raw_dx, raw_dy);
        let corr = snap::proximity_snap(&candidate, &obstacles, SNAP_THRESHOLD);
        let dx = corr.dx.map_or_else(|| grid::snap(raw_dx, ROOM_GRID), |c| raw_dx + c);
        let dy = corr.dy.map_or_else(|| grid::snap(raw_dy, ROOM_GRID), |c| raw_dy + c);
        let snapped = orig.translated(dx, dy);

        if !collide::overlaps_any(&snapped, &obstacles) {
            self.session.set_room_rect(id, snapped);
        }
        vec![Action::RenderNeeded]
    }

    fn resize_room_frame(
        &mut self,
        id: RoomId,
        handle: ResizeHandle,
        start_world: Point,
        orig: Rect,
        screen: Point,
    ) -> Vec<Action> {
        let Some(floor) = self.session.room(id).map(|r| r.floor) else {
            self.input = InteractionState::Idle;
            return Vec::new();
        };
        let world = self.session.camera.screen_to_world(screen, self.viewport);
        let dx = grid::snap(world.x - start_world.x, ROOM_GRID);
        let dy = grid::snap(world.y - start_world.y, ROOM_GRID);

        let mut raw = orig;
        if handle.moves_west() {
            raw.start_x = orig.start_x + dx;
        }
        if handle.moves_east() {
            raw.end_x = orig.end_x + dx;
        }
        if handle.moves_north() {
            raw.start_y = orig.start_y + dy;
        }
        if handle.moves_south() {
            raw.end_y = orig.end_y + dy;
        }

        let clamped = collide::clamp_resize(handle, &orig, &raw, MIN_ROOM_SIZE);
        let obstacles = self.session.floor_obstacles(floor, id);
        if !collide::overlaps_any(&clamped, &obstacles) {
            self.session.set_room_rect(id, clamped);
        }
        vec![Action::RenderNeeded]
    }

    fn move_furniture_frame(
        &mut self,
        id: FurnitureId,
        start_world: Point,
        orig_x: f64,
        orig_y: f64,
        screen: Point,
    ) -> Vec<Action> {
        let Some(item) = self.session.furniture_item(id).cloned() else {
            self.input = InteractionState::Idle;
            return Vec::new();
        };
        let Some(room) = self.session.room(item.room_id).cloned() else {
            self.input = InteractionState::Idle;
            return Vec::new();
        };
        let world = self.session.camera.screen_to_world(screen, self.viewport);
        let dx = grid::snap(world.x - start_world.x, FURNITURE_GRID);
        let dy = grid::snap(world.y - start_world.y, FURNITURE_GRID);

        let candidate =
            Rect::centered(Point::new(orig_x + dx, orig_y + dy), item.width, item.height);
        let (hx, hy) = room.half_extents();
        let siblings = self.sibling_rects(item.room_id, id);
        if collide::is_within_bounds(&candidate, hx, hy)
            && !collide::overlaps_any(&candidate, &siblings)
        {
            self.session.set_furniture_pos(id, orig_x + dx, orig_y + dy);
        }
        vec![Action::RenderNeeded]
    }

    fn create_room_frame(&mut self, id: RoomId, anchor_world: Point, screen: Point) -> Vec<Action> {
        let world = self.session.camera.screen_to_world(screen, self.viewport);
        let corner = grid::snap_point(world, ROOM_GRID);
        let mut rect = Rect::from_corners(anchor_world, corner);
        rect.end_x = rect.end_x.max(rect.start_x + MIN_ROOM_SIZE);
        rect.end_y = rect.end_y.max(rect.start_y + MIN_ROOM_SIZE);

        let obstacles = self.session.floor_obstacles(self.ui.floor, id);
        if !collide::overlaps_any(&rect, &obstacles) {
            self.session.set_room_rect(id, rect);
        }
        vec![Action::RenderNeeded]
    }

    fn click(&mut self, screen: Point, target: Option<Hit>) -> Vec<Action> {
        if self.ui.tool == Tool::Furniture {
            if let Some(Hit { target: Selection::Room(room_id), .. }) = target {
                let world = self.session.camera.screen_to_world(screen, self.viewport);
                match self.create_furniture(
                    room_id,
                    world,
                    DEFAULT_FURNITURE_SIZE,
                    DEFAULT_FURNITURE_SIZE,
                ) {
                    Ok(actions) => return actions,
                    Err(e) => {
                        warn!(error = %e, "furniture placement failed");
                        return Vec::new();
                    }
                }
            }
        }

        let selection = target.map(|h| h.target);
        if selection == self.session.selection {
            return Vec::new();
        }
        self.session.selection = selection;
        vec![Action::SelectionChanged(selection), Action::RenderNeeded]
    }

    fn commit_room_gesture(&mut self, id: RoomId, orig: Rect) -> Vec<Action> {
        let Some(room) = self.session.room(id).cloned() else {
            return Vec::new();
        };
        if room.rect == orig {
            return vec![Action::RenderNeeded];
        }
        debug!(room_id = %id, "room gesture committed");
        let mut actions = vec![Action::RoomUpdated {
            id,
            fields: RoomPatch::from_rect(room.rect),
            revert: RoomPatch::from_rect(orig),
        }];
        actions.extend(self.revalidate_furniture(id));
        actions.extend(self.synthesize_connectors(id));
        actions.push(Action::RenderNeeded);
        actions
    }

    fn commit_connector_gesture(&mut self, id: ConnectorId, orig_x: f64, orig_y: f64) -> Vec<Action> {
        let mut actions = self.reattach_connector(id);
        let Some(conn) = self.session.connector(id) else {
            return actions;
        };
        if conn.x == orig_x && conn.y == orig_y {
            actions.push(Action::RenderNeeded);
            return actions;
        }
        actions.push(Action::ConnectorUpdated {
            id,
            fields: ConnectorPatch::at(conn.x, conn.y),
            revert: ConnectorPatch::at(orig_x, orig_y),
        });
        actions.push(Action::RenderNeeded);
        actions
    }

    fn commit_furniture_gesture(&mut self, id: FurnitureId, orig_x: f64, orig_y: f64) -> Vec<Action> {
        let Some(item) = self.session.furniture_item(id) else {
            return Vec::new();
        };
        if item.x == orig_x && item.y == orig_y {
            return vec![Action::RenderNeeded];
        }
        vec![
            Action::FurnitureUpdated {
                id,
                fields: FurniturePatch::at(item.x, item.y),
                revert: FurniturePatch::at(orig_x, orig_y),
            },
            Action::RenderNeeded,
        ]
    }

    fn commit_create_gesture(&mut self, id: RoomId) -> Vec<Action> {
        let Some(room) = self.session.room(id).cloned() else {
            return Vec::new();
        };
        let mut actions = Vec::new();
        let obstacles = self.session.floor_obstacles(room.floor, id);
        if collide::overlaps_any(&room.rect, &obstacles) {
            let outcome = collide::find_nearest_valid_position(
                room.rect.center(),
                room.rect.width(),
                room.rect.height(),
                &obstacles,
                None,
                ROOM_GRID,
            );
            if outcome.degraded {
                warn!(room_id = %id, "no collision-free placement for new room; discarding");
                self.session.remove_room(id);
                actions.push(Action::Warning(GeometryWarning::PlacementDegraded { id }));
                actions.push(Action::RenderNeeded);
                return actions;
            }
            self.session.set_room_rect(
                id,
                Rect::centered(outcome.position, room.rect.width(), room.rect.height()),
            );
            actions.push(Action::Warning(GeometryWarning::CollisionRepaired { id }));
        }

        let created = match self.session.room(id) {
            Some(r) => r.clone(),
            None => return actions,
        };
        self.session.selection = Some(Selection::Room(id));
        actions.push(Action::RoomCreated(created));
        actions.push(Action::SelectionChanged(Some(Selection::Room(id))));
        actions.extend(self.synthesize_connectors(id));
        actions.push(Action::RenderNeeded);
        actions
    }

    // --- Validation helpers ---

    /// Room-relative rects of a room's furniture, excluding `exclude`.
    fn sibling_rects(&self, room_id: RoomId, exclude: FurnitureId) -> Vec<Rect> {
        self.session
            .furniture_in(room_id)
            .into_iter()
            .filter(|f| f.id != exclude)
            .map(Furniture::rel_rect)
            .collect()
    }

    /// Move `rect` to the nearest collision-free position, pushing warnings
    /// into `actions`. Falls back to the original rect when degraded.
    fn repair_rect(
        &self,
        id: RoomId,
        rect: Rect,
        obstacles: &[Rect],
        actions: &mut Vec<Action>,
    ) -> Rect {
        if !collide::overlaps_any(&rect, obstacles) {
            return rect;
        }
        let outcome = collide::find_nearest_valid_position(
            rect.center(),
            rect.width(),
            rect.height(),
            obstacles,
            None,
            ROOM_GRID,
        );
        if outcome.degraded {
            actions.push(Action::Warning(GeometryWarning::PlacementDegraded { id }));
            return rect;
        }
        actions.push(Action::Warning(GeometryWarning::CollisionRepaired { id }));
        Rect::centered(outcome.position, rect.width(), rect.height())
    }

    /// Insert a furniture item at a room-relative target, repairing the
    /// position if it violates containment or overlaps a sibling.
    fn place_furniture(&mut self, room_id: RoomId, rel: Point, width: f64, height: f64) -> Vec<Action> {
        let Some(room) = self.session.room(room_id).cloned() else {
            return Vec::new();
        };
        let id = Uuid::new_v4();
        let mut actions = Vec::new();

        let (hx, hy) = room.half_extents();
        let siblings = self.sibling_rects(room_id, id);
        let candidate = Rect::centered(rel, width, height);
        let pos = if collide::is_within_bounds(&candidate, hx, hy)
            && !collide::overlaps_any(&candidate, &siblings)
        {
            rel
        } else {
            let outcome = collide::find_nearest_valid_position(
                rel,
                width,
                height,
                &siblings,
                Some((hx, hy)),
                FURNITURE_GRID,
            );
            actions.push(Action::Warning(if outcome.degraded {
                GeometryWarning::PlacementDegraded { id }
            } else {
                GeometryWarning::CollisionRepaired { id }
            }));
            outcome.position
        };

        let z_index = self
            .session
            .furniture_in(room_id)
            .last()
            .map_or(0, |f| f.z_index + 1);
        let item = Furniture {
            id,
            room_id,
            x: pos.x,
            y: pos.y,
            width,
            height,
            rotation: 0.0,
            z_index,
        };
        self.session.insert_furniture(item.clone());
        self.session.selection = Some(Selection::Furniture(id));
        actions.push(Action::FurnitureCreated(item));
        actions.push(Action::SelectionChanged(Some(Selection::Furniture(id))));
        actions.push(Action::RenderNeeded);
        actions
    }

    /// After a room shrinks, pull any furniture that no longer fits back
    /// inside and apart from its siblings.
    fn revalidate_furniture(&mut self, room_id: RoomId) -> Vec<Action> {
        let ids: Vec<FurnitureId> =
            self.session.furniture_in(room_id).into_iter().map(|f| f.id).collect();
        let mut actions = Vec::new();
        for id in ids {
            actions.extend(self.revalidate_furniture_item(id));
        }
        actions
    }

    fn revalidate_furniture_item(&mut self, id: FurnitureId) -> Vec<Action> {
        let Some(item) = self.session.furniture_item(id).cloned() else {
            return Vec::new();
        };
        let Some(room) = self.session.room(item.room_id).cloned() else {
            return Vec::new();
        };
        let (hx, hy) = room.half_extents();
        let siblings = self.sibling_rects(item.room_id, id);
        let rect = item.rel_rect();
        if collide::is_within_bounds(&rect, hx, hy) && !collide::overlaps_any(&rect, &siblings) {
            return Vec::new();
        }

        let outcome = collide::find_nearest_valid_position(
            Point::new(item.x, item.y),
            item.width,
            item.height,
            &siblings,
            Some((hx, hy)),
            FURNITURE_GRID,
        );
        let mut actions = vec![Action::Warning(if outcome.degraded {
            GeometryWarning::PlacementDegraded { id }
        } else {
            GeometryWarning::CollisionRepaired { id }
        })];
        if outcome.position.x != item.x || outcome.position.y != item.y {
            self.session.set_furniture_pos(id, outcome.position.x, outcome.position.y);
            actions.push(Action::FurnitureUpdated {
                id,
                fields: FurniturePatch::at(outcome.position.x, outcome.position.y),
                revert: FurniturePatch::at(item.x, item.y),
            });
        }
        actions
    }

    /// Pull a connector back onto the shared boundary of its two rooms when
    /// it has drifted past tolerance, or revert it to the boundary midpoint
    /// when the rooms are no longer adjacent.
    fn reattach_connector(&mut self, id: ConnectorId) -> Vec<Action> {
        let Some(conn) = self.session.connector(id).cloned() else {
            return Vec::new();
        };
        let (Some(from), Some(to)) =
            (self.session.room(conn.from_room), self.session.room(conn.to_room))
        else {
            return Vec::new();
        };
        let Some((a, b)) = adjacency::shared_segment(&from.rect, &to.rect) else {
            return Vec::new();
        };
        let nearest = adjacency::nearest_on_segment(Point::new(conn.x, conn.y), a, b);
        let dist = ((conn.x - nearest.x).powi(2) + (conn.y - nearest.y).powi(2)).sqrt();
        if dist <= CONNECTOR_BOUNDARY_TOLERANCE {
            return Vec::new();
        }
        self.session.set_connector_pos(id, nearest.x, nearest.y);
        vec![Action::Warning(GeometryWarning::BoundaryReattached { id })]
    }

    /// Run adjacency detection for a room and insert a connector for every
    /// uncovered shared edge.
    fn synthesize_connectors(&mut self, id: RoomId) -> Vec<Action> {
        let Some(room) = self.session.room(id).cloned() else {
            return Vec::new();
        };
        let neighbors = self.session.floor_neighbors(room.floor, id);
        let existing: Vec<Connector> =
            self.session.connectors_sorted().into_iter().cloned().collect();
        let created = adjacency::synthesize(&room, &neighbors, &existing);
        let mut actions = Vec::new();
        for connector in created {
            self.session.insert_connector(connector.clone());
            actions.push(Action::ConnectorCreated { connector, auto: true });
        }
        actions
    }
}
