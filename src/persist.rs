//! Persistence collaborator contract and optimistic commit reconciliation.
//!
//! DESIGN
//! ======
//! The engine applies geometry to the in-memory session immediately and
//! hands the resulting [`Action`]s to a [`Persistence`] implementation
//! afterwards. [`commit`] pushes each action to the store; an update that
//! the store rejects reverts the session entity to the pre-drag state the
//! action carries, and a rejected create removes the entity again. A
//! synthesized connector that fails to persist is dropped without touching
//! the room change that produced it.
//!
//! ERROR HANDLING
//! ==============
//! Update/delete on a missing id returns `Ok(None)` / `Ok(false)` rather
//! than an error, so "not found" is distinguishable from transport failure.

#[cfg(test)]
#[path = "persist_test.rs"]
mod persist_test;

use std::collections::HashMap;

use tracing::warn;
use uuid::Uuid;

use crate::engine::Action;
use crate::model::{
    Connector, ConnectorId, ConnectorPatch, Furniture, FurnitureId, FurniturePatch, Room, RoomId,
    RoomPatch,
};
use crate::session::LayoutSession;

/// Failure talking to the durable store.
#[derive(Debug, Clone, thiserror::Error)]
pub enum PersistError {
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("rejected by store: {0}")]
    Rejected(String),
    #[error("not found: {0}")]
    NotFound(Uuid),
}

/// Durable storage for layout entities.
pub trait Persistence {
    /// All rooms on a floor.
    fn list_rooms(&self, floor: i32) -> Result<Vec<Room>, PersistError>;
    /// All connectors referencing a room.
    fn list_connectors(&self, room: RoomId) -> Result<Vec<Connector>, PersistError>;
    /// All furniture owned by a room.
    fn list_furniture(&self, room: RoomId) -> Result<Vec<Furniture>, PersistError>;

    fn create_room(&mut self, room: &Room) -> Result<Room, PersistError>;
    fn update_room(&mut self, id: RoomId, patch: &RoomPatch) -> Result<Option<Room>, PersistError>;
    fn delete_room(&mut self, id: RoomId) -> Result<bool, PersistError>;

    fn create_connector(&mut self, connector: &Connector) -> Result<Connector, PersistError>;
    fn update_connector(
        &mut self,
        id: ConnectorId,
        patch: &ConnectorPatch,
    ) -> Result<Option<Connector>, PersistError>;
    fn delete_connector(&mut self, id: ConnectorId) -> Result<bool, PersistError>;

    fn create_furniture(&mut self, item: &Furniture) -> Result<Furniture, PersistError>;
    fn update_furniture(
        &mut self,
        id: FurnitureId,
        patch: &FurniturePatch,
    ) -> Result<Option<Furniture>, PersistError>;
    fn delete_furniture(&mut self, id: FurnitureId) -> Result<bool, PersistError>;
}

/// A commit that the store did not accept, with how the session compensated.
#[derive(Debug, Clone)]
pub struct CommitFailure {
    pub id: Uuid,
    pub error: PersistError,
    /// True when the session was rolled back or cleaned up in response.
    pub compensated: bool,
}

/// Push committed actions to the store, compensating the session on failure.
///
/// Rejected updates revert to the pre-drag state carried by the action;
/// rejected creates remove the entity from the session. A failed create of
/// an auto-synthesized connector never rolls back the room change it came
/// from. Rejected deletes need no compensation: the entity is already gone
/// locally and the host may reload from the source of truth.
pub fn commit(
    session: &mut LayoutSession,
    actions: &[Action],
    store: &mut dyn Persistence,
) -> Vec<CommitFailure> {
    let mut failures = Vec::new();

    for action in actions {
        match action {
            Action::RoomCreated(room) => {
                if session.room(room.id).is_none() {
                    continue;
                }
                if let Err(e) = store.create_room(room) {
                    warn!(room_id = %room.id, error = %e, "room create rejected; removing from session");
                    session.remove_room(room.id);
                    failures.push(CommitFailure { id: room.id, error: e, compensated: true });
                }
            }
            Action::RoomUpdated { id, fields, revert } => {
                if session.room(*id).is_none() {
                    continue;
                }
                let error = match store.update_room(*id, fields) {
                    Ok(Some(_)) => continue,
                    Ok(None) => PersistError::NotFound(*id),
                    Err(e) => e,
                };
                warn!(room_id = %id, error = %error, "room update rejected; reverting");
                session.apply_room_patch(*id, revert);
                failures.push(CommitFailure { id: *id, error, compensated: true });
            }
            Action::RoomDeleted { id } => {
                if let Err(e) = store.delete_room(*id) {
                    warn!(room_id = %id, error = %e, "room delete failed");
                    failures.push(CommitFailure { id: *id, error: e, compensated: false });
                }
            }
            Action::ConnectorCreated { connector, auto } => {
                if session.connector(connector.id).is_none() {
                    continue;
                }
                if let Err(e) = store.create_connector(connector) {
                    warn!(
                        connector_id = %connector.id,
                        auto,
                        error = %e,
                        "connector create rejected; removing from session"
                    );
                    session.remove_connector(connector.id);
                    failures.push(CommitFailure { id: connector.id, error: e, compensated: true });
                }
            }
            Action::ConnectorUpdated { id, fields, revert } => {
                if session.connector(*id).is_none() {
                    continue;
                }
                let error = match store.update_connector(*id, fields) {
                    Ok(Some(_)) => continue,
                    Ok(None) => PersistError::NotFound(*id),
                    Err(e) => e,
                };
                warn!(connector_id = %id, error = %error, "connector update rejected; reverting");
                session.apply_connector_patch(*id, revert);
                failures.push(CommitFailure { id: *id, error, compensated: true });
            }
            Action::ConnectorDeleted { id } => {
                if let Err(e) = store.delete_connector(*id) {
                    warn!(connector_id = %id, error = %e, "connector delete failed");
                    failures.push(CommitFailure { id: *id, error: e, compensated: false });
                }
            }
            Action::FurnitureCreated(item) => {
                if session.furniture_item(item.id).is_none() {
                    continue;
                }
                if let Err(e) = store.create_furniture(item) {
                    warn!(furniture_id = %item.id, error = %e, "furniture create rejected; removing from session");
                    session.remove_furniture(item.id);
                    failures.push(CommitFailure { id: item.id, error: e, compensated: true });
                }
            }
            Action::FurnitureUpdated { id, fields, revert } => {
                if session.furniture_item(*id).is_none() {
                    continue;
                }
                let error = match store.update_furniture(*id, fields) {
                    Ok(Some(_)) => continue,
                    Ok(None) => PersistError::NotFound(*id),
                    Err(e) => e,
                };
                warn!(furniture_id = %id, error = %error, "furniture update rejected; reverting");
                session.apply_furniture_patch(*id, revert);
                failures.push(CommitFailure { id: *id, error, compensated: true });
            }
            Action::FurnitureDeleted { id } => {
                if let Err(e) = store.delete_furniture(*id) {
                    warn!(furniture_id = %id, error = %e, "furniture delete failed");
                    failures.push(CommitFailure { id: *id, error: e, compensated: false });
                }
            }
            Action::SelectionChanged(_) | Action::Warning(_) | Action::RenderNeeded => {}
        }
    }

    failures
}

/// In-memory [`Persistence`] implementation for hosts without a backend and
/// for tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    rooms: HashMap<RoomId, Room>,
    connectors: HashMap<ConnectorId, Connector>,
    furniture: HashMap<FurnitureId, Furniture>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    #[must_use]
    pub fn connector_count(&self) -> usize {
        self.connectors.len()
    }

    #[must_use]
    pub fn furniture_count(&self) -> usize {
        self.furniture.len()
    }
}

impl Persistence for MemoryStore {
    fn list_rooms(&self, floor: i32) -> Result<Vec<Room>, PersistError> {
        let mut rooms: Vec<Room> =
            self.rooms.values().filter(|r| r.floor == floor).cloned().collect();
        rooms.sort_by_key(|r| r.id);
        Ok(rooms)
    }

    fn list_connectors(&self, room: RoomId) -> Result<Vec<Connector>, PersistError> {
        let mut items: Vec<Connector> = self
            .connectors
            .values()
            .filter(|c| c.from_room == room || c.to_room == room)
            .cloned()
            .collect();
        items.sort_by_key(|c| c.id);
        Ok(items)
    }

    fn list_furniture(&self, room: RoomId) -> Result<Vec<Furniture>, PersistError> {
        let mut items: Vec<Furniture> =
            self.furniture.values().filter(|f| f.room_id == room).cloned().collect();
        items.sort_by_key(|f| f.id);
        Ok(items)
    }

    fn create_room(&mut self, room: &Room) -> Result<Room, PersistError> {
        self.rooms.insert(room.id, room.clone());
        Ok(room.clone())
    }

    fn update_room(&mut self, id: RoomId, patch: &RoomPatch) -> Result<Option<Room>, PersistError> {
        let Some(room) = self.rooms.get_mut(&id) else {
            return Ok(None);
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
        Ok(Some(room.clone()))
    }

    fn delete_room(&mut self, id: RoomId) -> Result<bool, PersistError> {
        Ok(self.rooms.remove(&id).is_some())
    }

    fn create_connector(&mut self, connector: &Connector) -> Result<Connector, PersistError> {
        self.connectors.insert(connector.id, connector.clone());
        Ok(connector.clone())
    }

    fn update_connector(
        &mut self,
        id: ConnectorId,
        patch: &ConnectorPatch,
    ) -> Result<Option<Connector>, PersistError> {
        let Some(conn) = self.connectors.get_mut(&id) else {
            return Ok(None);
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
        Ok(Some(conn.clone()))
    }

    fn delete_connector(&mut self, id: ConnectorId) -> Result<bool, PersistError> {
        Ok(self.connectors.remove(&id).is_some())
    }

    fn create_furniture(&mut self, item: &Furniture) -> Result<Furniture, PersistError> {
        self.furniture.insert(item.id, item.clone());
        Ok(item.clone())
    }

    fn update_furniture(
        &mut self,
        id: FurnitureId,
        patch: &FurniturePatch,
    ) -> Result<Option<Furniture>, PersistError> {
        let Some(item) = self.furniture.get_mut(&id) else {
            return Ok(None);
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
        Ok(Some(item.clone()))
    }

    fn delete_furniture(&mut self, id: FurnitureId) -> Result<bool, PersistError> {
        Ok(self.furniture.remove(&id).is_some())
    }
}
