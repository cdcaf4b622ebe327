#![allow(clippy::float_cmp, clippy::too_many_lines)]

use super::*;

// Default camera (focal point at origin, zoom 1) over the default 800x600
// viewport puts world (0, 0) at screen (400, 300).
fn screen_for(world_x: f64, world_y: f64) -> Point {
    Point::new(world_x + 400.0, world_y + 300.0)
}

fn mods() -> Modifiers {
    Modifiers::default()
}

fn room_at(start_x: f64, end_x: f64, start_y: f64, end_y: f64, floor: i32) -> Room {
    Room {
        id: Uuid::new_v4(),
        floor,
        rect: Rect::new(start_x, end_x, start_y, end_y),
        kind: RoomKind::default(),
        locked: false,
    }
}

fn engine_with(rooms: Vec<Room>) -> EngineCore {
    let mut engine = EngineCore::new();
    for room in rooms {
        engine.session.insert_room(room);
    }
    engine
}

fn connector_created(actions: &[Action]) -> Vec<&Connector> {
    actions
        .iter()
        .filter_map(|a| match a {
            Action::ConnectorCreated { connector, .. } => Some(connector),
            _ => None,
        })
        .collect()
}

fn has_warning(actions: &[Action], warning: GeometryWarning) -> bool {
    actions.iter().any(|a| matches!(a, Action::Warning(w) if *w == warning))
}

// --- Selection clicks ---

#[test]
fn click_on_room_selects_it() {
    let room = room_at(0.0, 128.0, 0.0, 128.0, 0);
    let id = room.id;
    let mut engine = engine_with(vec![room]);

    engine.on_pointer_down(screen_for(64.0, 64.0), Button::Primary, mods());
    let actions = engine.on_pointer_up(screen_for(64.0, 64.0), Button::Primary, mods());

    assert_eq!(engine.selection(), Some(Selection::Room(id)));
    assert!(actions
        .iter()
        .any(|a| matches!(a, Action::SelectionChanged(Some(Selection::Room(r))) if *r == id)));
}

#[test]
fn click_on_empty_space_clears_selection() {
    let room = room_at(0.0, 128.0, 0.0, 128.0, 0);
    let id = room.id;
    let mut engine = engine_with(vec![room]);
    engine.session.selection = Some(Selection::Room(id));

    engine.on_pointer_down(screen_for(500.0, 500.0), Button::Primary, mods());
    let actions = engine.on_pointer_up(screen_for(500.0, 500.0), Button::Primary, mods());

    assert_eq!(engine.selection(), None);
    assert!(actions.iter().any(|a| matches!(a, Action::SelectionChanged(None))));
}

#[test]
fn click_on_already_selected_room_emits_nothing() {
    let room = room_at(0.0, 128.0, 0.0, 128.0, 0);
    let id = room.id;
    let mut engine = engine_with(vec![room]);
    engine.session.selection = Some(Selection::Room(id));

    engine.on_pointer_down(screen_for(64.0, 64.0), Button::Primary, mods());
    let actions = engine.on_pointer_up(screen_for(64.0, 64.0), Button::Primary, mods());
    assert!(actions.is_empty());
}

#[test]
fn sub_threshold_move_is_still_a_click() {
    let room = room_at(0.0, 128.0, 0.0, 128.0, 0);
    let id = room.id;
    let mut engine = engine_with(vec![room]);

    engine.on_pointer_down(screen_for(64.0, 64.0), Button::Primary, mods());
    engine.on_pointer_move(screen_for(66.0, 64.0), mods());
    engine.on_pointer_up(screen_for(66.0, 64.0), Button::Primary, mods());

    assert_eq!(engine.selection(), Some(Selection::Room(id)));
    assert_eq!(engine.session.room(id).unwrap().rect, Rect::new(0.0, 128.0, 0.0, 128.0));
}

// --- Panning ---

#[test]
fn middle_button_pans_immediately() {
    let mut engine = EngineCore::new();
    engine.on_pointer_down(Point::new(400.0, 300.0), Button::Middle, mods());
    engine.on_pointer_move(Point::new(410.0, 280.0), mods());

    assert_eq!(engine.session.camera.x, -10.0);
    assert_eq!(engine.session.camera.y, 20.0);

    engine.on_pointer_up(Point::new(410.0, 280.0), Button::Middle, mods());
    assert!(matches!(engine.input, InteractionState::Idle));
}

#[test]
fn primary_drag_on_empty_space_pans() {
    let mut engine = EngineCore::new();
    engine.on_pointer_down(Point::new(400.0, 300.0), Button::Primary, mods());
    engine.on_pointer_move(Point::new(420.0, 300.0), mods());
    assert_eq!(engine.session.camera.x, -20.0);
}

#[test]
fn secondary_drag_pans_even_over_a_room() {
    let room = room_at(0.0, 128.0, 0.0, 128.0, 0);
    let id = room.id;
    let mut engine = engine_with(vec![room]);

    engine.on_pointer_down(screen_for(64.0, 64.0), Button::Secondary, mods());
    engine.on_pointer_move(screen_for(96.0, 64.0), mods());

    assert_eq!(engine.session.camera.x, -32.0);
    assert_eq!(engine.session.room(id).unwrap().rect.start_x, 0.0);
}

#[test]
fn pointer_down_is_ignored_mid_gesture() {
    let mut engine = EngineCore::new();
    engine.on_pointer_down(Point::new(400.0, 300.0), Button::Middle, mods());
    let actions = engine.on_pointer_down(Point::new(200.0, 200.0), Button::Primary, mods());
    assert!(actions.is_empty());
    assert!(matches!(engine.input, InteractionState::Panning { .. }));
}

// --- Room move ---

#[test]
fn drag_toward_neighbor_snaps_edges_and_synthesizes_a_connector() {
    // A dragged 8 world units right ends with its edge 4 from B; proximity
    // snap closes the gap, and the committed adjacency produces exactly one
    // connector at the shared-wall midpoint.
    let a = room_at(0.0, 128.0, 0.0, 128.0, 0);
    let b = room_at(140.0, 268.0, 0.0, 128.0, 0);
    let a_id = a.id;
    let b_id = b.id;
    let mut engine = engine_with(vec![a, b]);

    engine.on_pointer_down(screen_for(64.0, 64.0), Button::Primary, mods());
    engine.on_pointer_move(screen_for(72.0, 64.0), mods());
    let actions = engine.on_pointer_up(screen_for(72.0, 64.0), Button::Primary, mods());

    let rect = engine.session.room(a_id).unwrap().rect;
    assert_eq!(rect, Rect::new(12.0, 140.0, 0.0, 128.0));

    assert!(actions.iter().any(|a| matches!(a, Action::RoomUpdated { id, .. } if *id == a_id)));
    let created = connector_created(&actions);
    assert_eq!(created.len(), 1);
    let conn = created[0];
    assert!(conn.links(a_id, b_id));
    assert_eq!((conn.x, conn.y), (140.0, 64.0));
    assert_eq!(conn.rotation, 90.0);
    assert_eq!(conn.state, ConnectorState::Closed);
    assert!(actions
        .iter()
        .any(|a| matches!(a, Action::ConnectorCreated { auto: true, .. })));
}

#[test]
fn free_drag_snaps_to_the_room_grid() {
    let room = room_at(0.0, 128.0, 0.0, 128.0, 0);
    let id = room.id;
    let mut engine = engine_with(vec![room]);

    // 40 world units rounds to 32 on the room grid.
    engine.on_pointer_down(screen_for(64.0, 64.0), Button::Primary, mods());
    engine.on_pointer_move(screen_for(104.0, 64.0), mods());

    assert_eq!(engine.session.room(id).unwrap().rect.start_x, 32.0);
}

#[test]
fn drag_into_overlap_keeps_last_valid_frame() {
    let a = room_at(0.0, 128.0, 0.0, 128.0, 0);
    let b = room_at(160.0, 288.0, 0.0, 128.0, 0);
    let a_id = a.id;
    let mut engine = engine_with(vec![a, b]);

    // 160 would land A squarely on B; the frame is skipped.
    engine.on_pointer_down(screen_for(64.0, 64.0), Button::Primary, mods());
    engine.on_pointer_move(screen_for(224.0, 64.0), mods());

    assert_eq!(engine.session.room(a_id).unwrap().rect.start_x, 0.0);
}

#[test]
fn unmoved_drag_commit_emits_no_update() {
    let room = room_at(0.0, 128.0, 0.0, 128.0, 0);
    let mut engine = engine_with(vec![room]);

    engine.on_pointer_down(screen_for(64.0, 64.0), Button::Primary, mods());
    engine.on_pointer_move(screen_for(68.0, 64.0), mods());
    // 4 world units rounds back to zero on the room grid.
    let actions = engine.on_pointer_up(screen_for(68.0, 64.0), Button::Primary, mods());
    assert!(!actions.iter().any(|a| matches!(a, Action::RoomUpdated { .. })));
}

#[test]
fn locked_room_selects_but_never_moves() {
    let mut room = room_at(0.0, 128.0, 0.0, 128.0, 0);
    room.locked = true;
    let id = room.id;
    let mut engine = engine_with(vec![room]);

    engine.on_pointer_down(screen_for(64.0, 64.0), Button::Primary, mods());
    engine.on_pointer_move(screen_for(128.0, 64.0), mods());
    let actions = engine.on_pointer_up(screen_for(128.0, 64.0), Button::Primary, mods());

    assert_eq!(engine.session.room(id).unwrap().rect.start_x, 0.0);
    assert_eq!(engine.selection(), Some(Selection::Room(id)));
    assert!(!actions.iter().any(|a| matches!(a, Action::RoomUpdated { .. })));
}

// --- Room resize ---

#[test]
fn east_handle_drag_widens_and_commits() {
    let room = room_at(0.0, 128.0, 0.0, 128.0, 0);
    let id = room.id;
    let mut engine = engine_with(vec![room]);
    engine.session.selection = Some(Selection::Room(id));

    engine.on_pointer_down(screen_for(128.0, 64.0), Button::Primary, mods());
    engine.on_pointer_move(screen_for(160.0, 64.0), mods());
    let actions = engine.on_pointer_up(screen_for(160.0, 64.0), Button::Primary, mods());

    assert_eq!(engine.session.room(id).unwrap().rect, Rect::new(0.0, 160.0, 0.0, 128.0));
    assert!(actions.iter().any(|a| matches!(a, Action::RoomUpdated { id: r, .. } if *r == id)));
}

#[test]
fn resize_below_minimum_clamps_at_min_size() {
    let room = room_at(0.0, 128.0, 0.0, 128.0, 0);
    let id = room.id;
    let mut engine = engine_with(vec![room]);
    engine.session.selection = Some(Selection::Room(id));

    // Drag the east edge far past the west edge.
    engine.on_pointer_down(screen_for(128.0, 64.0), Button::Primary, mods());
    engine.on_pointer_move(screen_for(-64.0, 64.0), mods());

    let rect = engine.session.room(id).unwrap().rect;
    assert_eq!(rect.start_x, 0.0);
    assert_eq!(rect.width(), MIN_ROOM_SIZE);
}

#[test]
fn shrinking_a_room_pulls_furniture_back_inside() {
    let room = room_at(0.0, 256.0, 0.0, 128.0, 0);
    let id = room.id;
    let mut engine = engine_with(vec![room]);
    // Near the east wall of the 256-wide room.
    engine.session.insert_furniture(Furniture {
        id: Uuid::new_v4(),
        room_id: id,
        x: 112.0,
        y: 0.0,
        width: 16.0,
        height: 16.0,
        rotation: 0.0,
        z_index: 0,
    });
    engine.session.selection = Some(Selection::Room(id));

    // Halve the width; furniture at rel x 112 is now outside the +/-64 span.
    engine.on_pointer_down(screen_for(256.0, 64.0), Button::Primary, mods());
    engine.on_pointer_move(screen_for(128.0, 64.0), mods());
    let actions = engine.on_pointer_up(screen_for(128.0, 64.0), Button::Primary, mods());

    assert!(actions.iter().any(|a| matches!(
        a,
        Action::Warning(GeometryWarning::CollisionRepaired { .. })
    )));
    let item = engine.session.furniture_sorted()[0];
    let (hx, hy) = engine.session.room(id).unwrap().half_extents();
    assert!(collide::is_within_bounds(&item.rel_rect(), hx, hy));
}

// --- Room creation gesture ---

#[test]
fn room_tool_drag_creates_a_grid_aligned_room() {
    let mut engine = EngineCore::new();
    engine.set_tool(Tool::Room);

    engine.on_pointer_down(screen_for(10.0, 10.0), Button::Primary, mods());
    engine.on_pointer_move(screen_for(96.0, 64.0), mods());
    let actions = engine.on_pointer_up(screen_for(96.0, 64.0), Button::Primary, mods());

    assert_eq!(engine.session.room_count(), 1);
    let room = engine.session.rooms_on_floor(0)[0];
    assert_eq!(room.rect, Rect::new(0.0, 96.0, 0.0, 64.0));
    assert!(actions.iter().any(|a| matches!(a, Action::RoomCreated(_))));
    assert_eq!(engine.selection(), Some(Selection::Room(room.id)));
}

#[test]
fn tiny_creation_drag_yields_a_minimum_size_room() {
    let mut engine = EngineCore::new();
    engine.set_tool(Tool::Room);

    engine.on_pointer_down(screen_for(10.0, 10.0), Button::Primary, mods());
    engine.on_pointer_move(screen_for(15.0, 10.0), mods());
    engine.on_pointer_up(screen_for(15.0, 10.0), Button::Primary, mods());

    let room = engine.session.rooms_on_floor(0)[0];
    assert_eq!(room.rect, Rect::new(0.0, MIN_ROOM_SIZE, 0.0, MIN_ROOM_SIZE));
}

#[test]
fn room_tool_drag_on_existing_room_moves_it_instead() {
    let room = room_at(0.0, 128.0, 0.0, 128.0, 0);
    let id = room.id;
    let mut engine = engine_with(vec![room]);
    engine.set_tool(Tool::Room);

    engine.on_pointer_down(screen_for(64.0, 64.0), Button::Primary, mods());
    engine.on_pointer_move(screen_for(96.0, 64.0), mods());
    engine.on_pointer_up(screen_for(96.0, 64.0), Button::Primary, mods());

    assert_eq!(engine.session.room_count(), 1);
    assert_eq!(engine.session.room(id).unwrap().rect.start_x, 32.0);
}

#[test]
fn creation_commit_on_occupied_ground_repairs_the_position() {
    // The blocker's edge is off-grid, so the grid-snapped anchor lands the
    // provisional room overlapping it. Per-frame validation keeps the
    // provisional at the anchor and the commit has to relocate it.
    let blocker = room_at(-64.0, 70.0, -64.0, 70.0, 0);
    let blocker_rect = blocker.rect;
    let mut engine = engine_with(vec![blocker]);
    engine.set_tool(Tool::Room);

    engine.on_pointer_down(screen_for(74.0, 10.0), Button::Primary, mods());
    engine.on_pointer_move(screen_for(128.0, 32.0), mods());
    let actions = engine.on_pointer_up(screen_for(128.0, 32.0), Button::Primary, mods());

    let created = actions
        .iter()
        .find_map(|a| match a {
            Action::RoomCreated(r) => Some(r.clone()),
            _ => None,
        })
        .unwrap();
    assert!(has_warning(&actions, GeometryWarning::CollisionRepaired { id: created.id }));
    assert_eq!(engine.session.room_count(), 2);
    assert!(!collide::overlaps(&created.rect, &blocker_rect));
}

// --- Cancel / rollback ---

#[test]
fn escape_rolls_a_move_back_to_drag_start() {
    let room = room_at(0.0, 128.0, 0.0, 128.0, 0);
    let id = room.id;
    let mut engine = engine_with(vec![room]);

    engine.on_pointer_down(screen_for(64.0, 64.0), Button::Primary, mods());
    engine.on_pointer_move(screen_for(128.0, 64.0), mods());
    assert_eq!(engine.session.room(id).unwrap().rect.start_x, 64.0);

    engine.on_key_down(&Key("Escape".to_string()), mods());
    assert_eq!(engine.session.room(id).unwrap().rect.start_x, 0.0);
    assert!(matches!(engine.input, InteractionState::Idle));
}

#[test]
fn capture_loss_rolls_back_like_escape() {
    let room = room_at(0.0, 128.0, 0.0, 128.0, 0);
    let id = room.id;
    let mut engine = engine_with(vec![room]);

    engine.on_pointer_down(screen_for(64.0, 64.0), Button::Primary, mods());
    engine.on_pointer_move(screen_for(128.0, 64.0), mods());
    engine.on_pointer_capture_lost();

    assert_eq!(engine.session.room(id).unwrap().rect.start_x, 0.0);
}

#[test]
fn escape_discards_a_provisional_room() {
    let mut engine = EngineCore::new();
    engine.set_tool(Tool::Room);

    engine.on_pointer_down(screen_for(10.0, 10.0), Button::Primary, mods());
    engine.on_pointer_move(screen_for(96.0, 64.0), mods());
    engine.on_key_down(&Key("Escape".to_string()), mods());

    assert_eq!(engine.session.room_count(), 0);
}

#[test]
fn switching_floors_cancels_the_gesture() {
    let room = room_at(0.0, 128.0, 0.0, 128.0, 0);
    let id = room.id;
    let mut engine = engine_with(vec![room]);

    engine.on_pointer_down(screen_for(64.0, 64.0), Button::Primary, mods());
    engine.on_pointer_move(screen_for(128.0, 64.0), mods());
    engine.set_floor(2);

    assert_eq!(engine.session.room(id).unwrap().rect.start_x, 0.0);
    assert_eq!(engine.ui.floor, 2);
}

// --- Connector gestures ---

fn adjacent_pair_with_connector() -> (EngineCore, ConnectorId) {
    let a = room_at(0.0, 128.0, 0.0, 128.0, 0);
    let b = room_at(128.0, 256.0, 0.0, 128.0, 0);
    let conn = Connector {
        id: Uuid::new_v4(),
        from_room: a.id,
        to_room: b.id,
        x: 128.0,
        y: 64.0,
        width: CONNECTOR_WIDTH,
        height: CONNECTOR_HEIGHT,
        rotation: 90.0,
        state: ConnectorState::Closed,
    };
    let conn_id = conn.id;
    let mut engine = engine_with(vec![a, b]);
    engine.session.insert_connector(conn);
    (engine, conn_id)
}

#[test]
fn connector_slides_along_the_shared_wall() {
    let (mut engine, conn_id) = adjacent_pair_with_connector();

    engine.on_pointer_down(screen_for(128.0, 64.0), Button::Primary, mods());
    engine.on_pointer_move(screen_for(128.0, 96.0), mods());
    let actions = engine.on_pointer_up(screen_for(128.0, 96.0), Button::Primary, mods());

    let conn = engine.session.connector(conn_id).unwrap();
    assert_eq!((conn.x, conn.y), (128.0, 96.0));
    assert!(actions
        .iter()
        .any(|a| matches!(a, Action::ConnectorUpdated { id, .. } if *id == conn_id)));
}

#[test]
fn connector_dragged_off_the_wall_is_reattached() {
    let (mut engine, conn_id) = adjacent_pair_with_connector();

    // 48 perpendicular world units, well past the boundary tolerance.
    engine.on_pointer_down(screen_for(128.0, 64.0), Button::Primary, mods());
    engine.on_pointer_move(screen_for(176.0, 64.0), mods());
    let actions = engine.on_pointer_up(screen_for(176.0, 64.0), Button::Primary, mods());

    let conn = engine.session.connector(conn_id).unwrap();
    assert_eq!((conn.x, conn.y), (128.0, 64.0));
    assert!(has_warning(&actions, GeometryWarning::BoundaryReattached { id: conn_id }));
    assert!(!actions.iter().any(|a| matches!(a, Action::ConnectorUpdated { .. })));
}

#[test]
fn manual_connector_requires_adjacency() {
    let a = room_at(0.0, 128.0, 0.0, 128.0, 0);
    let b = room_at(500.0, 628.0, 0.0, 128.0, 0);
    let (a_id, b_id) = (a.id, b.id);
    let mut engine = engine_with(vec![a, b]);

    let result = engine.create_connector(a_id, b_id, Point::new(128.0, 64.0));
    assert!(matches!(result, Err(LayoutError::NotAdjacent(..))));
    assert!(matches!(
        engine.create_connector(a_id, a_id, Point::new(0.0, 0.0)),
        Err(LayoutError::SameRoom)
    ));
}

#[test]
fn manual_connector_lands_on_the_shared_segment() {
    let a = room_at(0.0, 128.0, 0.0, 128.0, 0);
    let b = room_at(128.0, 256.0, 0.0, 128.0, 0);
    let (a_id, b_id) = (a.id, b.id);
    let mut engine = engine_with(vec![a, b]);

    // Requested point is off the wall; it is pulled to the nearest boundary
    // point.
    let actions = engine.create_connector(a_id, b_id, Point::new(150.0, 100.0)).unwrap();
    let created = connector_created(&actions);
    assert_eq!(created.len(), 1);
    assert_eq!((created[0].x, created[0].y), (128.0, 100.0));
    assert!(actions
        .iter()
        .any(|a| matches!(a, Action::ConnectorCreated { auto: false, .. })));
}

// --- Furniture ---

#[test]
fn furniture_tool_click_places_an_item_in_the_room() {
    let room = room_at(0.0, 64.0, 0.0, 64.0, 0);
    let id = room.id;
    let mut engine = engine_with(vec![room]);
    engine.set_tool(Tool::Furniture);

    engine.on_pointer_down(screen_for(32.0, 32.0), Button::Primary, mods());
    let actions = engine.on_pointer_up(screen_for(32.0, 32.0), Button::Primary, mods());

    let items = engine.session.furniture_in(id);
    assert_eq!(items.len(), 1);
    assert_eq!((items[0].x, items[0].y), (0.0, 0.0));
    assert_eq!(items[0].width, DEFAULT_FURNITURE_SIZE);
    assert!(actions.iter().any(|a| matches!(a, Action::FurnitureCreated(_))));
    assert_eq!(engine.selection(), Some(Selection::Furniture(items[0].id)));
}

#[test]
fn furniture_tool_click_outside_rooms_places_nothing() {
    let mut engine = engine_with(vec![room_at(0.0, 64.0, 0.0, 64.0, 0)]);
    engine.set_tool(Tool::Furniture);

    engine.on_pointer_down(screen_for(500.0, 500.0), Button::Primary, mods());
    let actions = engine.on_pointer_up(screen_for(500.0, 500.0), Button::Primary, mods());
    assert!(engine.session.furniture_sorted().is_empty());
    assert!(actions.iter().any(|a| matches!(a, Action::SelectionChanged(None)))
        || engine.selection().is_none());
}

#[test]
fn out_of_bounds_placement_is_repaired_inward() {
    let room = room_at(0.0, 64.0, 0.0, 64.0, 0);
    let id = room.id;
    let mut engine = engine_with(vec![room]);

    // World (72, 72) is room-relative (40, 40): a 32x32 item there pokes
    // out of the 64x64 room.
    let actions = engine.create_furniture(id, Point::new(72.0, 72.0), 32.0, 32.0).unwrap();

    let items = engine.session.furniture_in(id);
    assert_eq!(items.len(), 1);
    assert_eq!((items[0].x, items[0].y), (16.0, 16.0));
    assert!(has_warning(&actions, GeometryWarning::CollisionRepaired { id: items[0].id }));
}

#[test]
fn furniture_drag_is_confined_to_its_room() {
    let room = room_at(0.0, 64.0, 0.0, 64.0, 0);
    let id = room.id;
    let mut engine = engine_with(vec![room]);
    let item = Furniture {
        id: Uuid::new_v4(),
        room_id: id,
        x: 0.0,
        y: 0.0,
        width: 32.0,
        height: 32.0,
        rotation: 0.0,
        z_index: 0,
    };
    let item_id = item.id;
    engine.session.insert_furniture(item);

    // A drag that would poke the item out of the room is skipped.
    engine.on_pointer_down(screen_for(32.0, 32.0), Button::Primary, mods());
    engine.on_pointer_move(screen_for(72.0, 72.0), mods());
    let item = engine.session.furniture_item(item_id).unwrap();
    assert_eq!((item.x, item.y), (0.0, 0.0));
    engine.on_key_down(&Key("Escape".to_string()), mods());

    // A small in-bounds drag lands on the furniture grid.
    engine.on_pointer_down(screen_for(32.0, 32.0), Button::Primary, mods());
    engine.on_pointer_move(screen_for(42.0, 32.0), mods());
    let actions = engine.on_pointer_up(screen_for(42.0, 32.0), Button::Primary, mods());
    let item = engine.session.furniture_item(item_id).unwrap();
    assert_eq!((item.x, item.y), (8.0, 0.0));
    assert!(actions
        .iter()
        .any(|a| matches!(a, Action::FurnitureUpdated { id, .. } if *id == item_id)));
}

// --- Deletion ---

#[test]
fn delete_key_cascades_a_room_deletion() {
    let a = room_at(0.0, 128.0, 0.0, 128.0, 0);
    let b = room_at(128.0, 256.0, 0.0, 128.0, 0);
    let a_id = a.id;
    let conn = Connector {
        id: Uuid::new_v4(),
        from_room: a.id,
        to_room: b.id,
        x: 128.0,
        y: 64.0,
        width: CONNECTOR_WIDTH,
        height: CONNECTOR_HEIGHT,
        rotation: 90.0,
        state: ConnectorState::Closed,
    };
    let item = Furniture {
        id: Uuid::new_v4(),
        room_id: a_id,
        x: 0.0,
        y: 0.0,
        width: 16.0,
        height: 16.0,
        rotation: 0.0,
        z_index: 0,
    };
    let mut engine = engine_with(vec![a, b]);
    engine.session.insert_connector(conn);
    engine.session.insert_furniture(item);
    engine.session.selection = Some(Selection::Room(a_id));

    let actions = engine.on_key_down(&Key("Delete".to_string()), mods());

    assert!(actions.iter().any(|a| matches!(a, Action::RoomDeleted { id } if *id == a_id)));
    assert!(actions.iter().any(|a| matches!(a, Action::ConnectorDeleted { .. })));
    assert!(actions.iter().any(|a| matches!(a, Action::FurnitureDeleted { .. })));
    assert!(actions.iter().any(|a| matches!(a, Action::SelectionChanged(None))));
    assert!(engine.session.room(a_id).is_none());
}

#[test]
fn delete_with_no_selection_is_a_no_op() {
    let mut engine = engine_with(vec![room_at(0.0, 128.0, 0.0, 128.0, 0)]);
    let actions = engine.on_key_down(&Key("Delete".to_string()), mods());
    assert!(actions.is_empty());
    assert_eq!(engine.session.room_count(), 1);
}

// --- Wheel zoom ---

#[test]
fn wheel_zoom_keeps_the_cursor_point_stationary() {
    let mut engine = EngineCore::new();
    let cursor = Point::new(500.0, 350.0);
    let before = engine.session.camera.screen_to_world(cursor, engine.viewport);

    engine.on_wheel(cursor, WheelDelta { dx: 0.0, dy: -1.0 }, mods());
    assert!((engine.session.camera.zoom - 1.1).abs() < 1e-12);

    let after = engine.session.camera.screen_to_world(cursor, engine.viewport);
    assert!((after.x - before.x).abs() < 1e-9);
    assert!((after.y - before.y).abs() < 1e-9);
}

#[test]
fn wheel_down_zooms_out() {
    let mut engine = EngineCore::new();
    engine.on_wheel(Point::new(400.0, 300.0), WheelDelta { dx: 0.0, dy: 1.0 }, mods());
    assert!(engine.session.camera.zoom < 1.0);
}

#[test]
fn horizontal_scroll_does_nothing() {
    let mut engine = EngineCore::new();
    let actions = engine.on_wheel(Point::new(400.0, 300.0), WheelDelta { dx: 5.0, dy: 0.0 }, mods());
    assert!(actions.is_empty());
}

// --- Programmatic operations ---

#[test]
fn create_room_repairs_overlap_before_insert() {
    let blocker = room_at(0.0, 128.0, 0.0, 128.0, 0);
    let blocker_rect = blocker.rect;
    let mut engine = engine_with(vec![blocker]);

    let actions = engine.create_room(0, Rect::new(32.0, 160.0, 0.0, 128.0), RoomKind::Generic);

    let created = actions
        .iter()
        .find_map(|a| match a {
            Action::RoomCreated(r) => Some(r.clone()),
            _ => None,
        })
        .unwrap();
    assert!(!collide::overlaps(&created.rect, &blocker_rect));
    assert!(has_warning(&actions, GeometryWarning::CollisionRepaired { id: created.id }));
}

#[test]
fn apply_room_patch_clamps_to_minimum_size() {
    let room = room_at(0.0, 128.0, 0.0, 128.0, 0);
    let id = room.id;
    let mut engine = engine_with(vec![room]);

    engine.apply_room_patch(id, &RoomPatch { end_x: Some(10.0), ..RoomPatch::default() });
    assert_eq!(engine.session.room(id).unwrap().rect.end_x, MIN_ROOM_SIZE);
}

#[test]
fn apply_room_patch_carries_a_revert_of_touched_fields() {
    let room = room_at(0.0, 128.0, 0.0, 128.0, 0);
    let id = room.id;
    let mut engine = engine_with(vec![room]);

    let actions =
        engine.apply_room_patch(id, &RoomPatch { locked: Some(true), ..RoomPatch::default() });
    let (fields, revert) = actions
        .iter()
        .find_map(|a| match a {
            Action::RoomUpdated { fields, revert, .. } => Some((fields.clone(), revert.clone())),
            _ => None,
        })
        .unwrap();
    assert_eq!(fields.locked, Some(true));
    assert_eq!(revert.locked, Some(false));
    assert_eq!(revert.start_x, Some(0.0));
}

#[test]
fn apply_room_patch_synthesizes_connectors_for_new_adjacency() {
    let a = room_at(0.0, 128.0, 0.0, 128.0, 0);
    let b = room_at(256.0, 384.0, 0.0, 128.0, 0);
    let a_id = a.id;
    let mut engine = engine_with(vec![a, b]);

    let actions = engine.apply_room_patch(a_id, &RoomPatch::from_rect(Rect::new(128.0, 256.0, 0.0, 128.0)));
    assert_eq!(connector_created(&actions).len(), 1);
}

#[test]
fn apply_connector_patch_off_wall_reattaches() {
    let (mut engine, conn_id) = adjacent_pair_with_connector();

    let actions = engine.apply_connector_patch(
        conn_id,
        &ConnectorPatch { x: Some(300.0), ..ConnectorPatch::default() },
    );

    let conn = engine.session.connector(conn_id).unwrap();
    assert_eq!(conn.x, 128.0);
    assert!(has_warning(&actions, GeometryWarning::BoundaryReattached { id: conn_id }));
}

#[test]
fn apply_furniture_patch_revalidates_containment() {
    let room = room_at(0.0, 64.0, 0.0, 64.0, 0);
    let id = room.id;
    let mut engine = engine_with(vec![room]);
    let actions = engine.create_furniture(id, Point::new(32.0, 32.0), 32.0, 32.0).unwrap();
    let item_id = actions
        .iter()
        .find_map(|a| match a {
            Action::FurnitureCreated(f) => Some(f.id),
            _ => None,
        })
        .unwrap();

    let actions = engine.apply_furniture_patch(
        item_id,
        &FurniturePatch { x: Some(200.0), ..FurniturePatch::default() },
    );

    let item = engine.session.furniture_item(item_id).unwrap();
    let (hx, hy) = engine.session.room(id).unwrap().half_extents();
    assert!(collide::is_within_bounds(&item.rel_rect(), hx, hy));
    assert!(has_warning(&actions, GeometryWarning::CollisionRepaired { id: item_id }));
}

// --- Floor isolation ---

#[test]
fn rooms_on_other_floors_neither_collide_nor_connect() {
    let a = room_at(0.0, 128.0, 0.0, 128.0, 0);
    let upstairs = room_at(128.0, 256.0, 0.0, 128.0, 1);
    let a_id = a.id;
    let mut engine = engine_with(vec![a, upstairs]);

    // Moving A against the upstairs room's footprint neither blocks nor
    // synthesizes a connector.
    let actions = engine.apply_room_patch(a_id, &RoomPatch::from_rect(Rect::new(0.0, 128.0, 0.0, 128.0)));
    assert!(connector_created(&actions).is_empty());
    assert!(!has_warning(&actions, GeometryWarning::CollisionRepaired { id: a_id }));
}
