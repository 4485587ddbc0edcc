//! Code-addressed registry of live rooms and the connection-to-room index.

use std::sync::Arc;

use dashmap::{DashMap, mapref::entry::Entry};
use tokio::sync::Mutex;

use crate::{
    error::ServiceError,
    state::room::{ConnectionId, Room},
};

/// Shared handle to one room; all mutation happens under the inner mutex.
pub type SharedRoom = Arc<Mutex<Room>>;

/// Sole owner of room lifecycle: create, look up, and delete by code.
///
/// The map itself is never exposed; callers go through the narrow API so a
/// room can only be reached by its immutable code.
#[derive(Debug, Default)]
pub struct RoomStore {
    rooms: DashMap<String, SharedRoom>,
}

impl RoomStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a freshly built room, failing when the code is already taken.
    pub fn create(&self, room: Room) -> Result<SharedRoom, ServiceError> {
        let code = room.code.clone();
        match self.rooms.entry(code) {
            Entry::Occupied(_) => Err(ServiceError::RoomExists),
            Entry::Vacant(entry) => {
                let shared = Arc::new(Mutex::new(room));
                entry.insert(shared.clone());
                Ok(shared)
            }
        }
    }

    /// Look up a live room by code.
    pub fn get(&self, code: &str) -> Option<SharedRoom> {
        self.rooms.get(code).map(|entry| entry.value().clone())
    }

    /// Whether a room with this code currently exists.
    pub fn contains(&self, code: &str) -> bool {
        self.rooms.contains_key(code)
    }

    /// Remove a room by code, returning the handle when one was present.
    pub fn delete(&self, code: &str) -> Option<SharedRoom> {
        self.rooms.remove(code).map(|(_, room)| room)
    }

    /// Number of currently active rooms.
    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    /// Whether no rooms are active.
    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }
}

/// Maps a live connection to the room it is currently joined to.
///
/// A connection belongs to at most one room; binding again replaces the
/// previous association.
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    memberships: DashMap<ConnectionId, String>,
}

impl ConnectionRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Associate a connection with a room code.
    pub fn bind(&self, connection_id: ConnectionId, code: String) {
        self.memberships.insert(connection_id, code);
    }

    /// Room code the connection is joined to, if any.
    pub fn room_of(&self, connection_id: ConnectionId) -> Option<String> {
        self.memberships
            .get(&connection_id)
            .map(|entry| entry.value().clone())
    }

    /// Drop the association for a connection, returning the code it held.
    pub fn unbind(&self, connection_id: ConnectionId) -> Option<String> {
        self.memberships
            .remove(&connection_id)
            .map(|(_, code)| code)
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;
    use crate::state::room::{Player, RoomSettings};

    fn sample_room(code: &str) -> Room {
        Room::new(
            code.into(),
            Player::new(Uuid::new_v4(), "Ava".into(), None),
            RoomSettings {
                content_source: "top-charts".into(),
                round_count: 7,
            },
        )
    }

    #[test]
    fn create_rejects_duplicate_code() {
        let store = RoomStore::new();
        store.create(sample_room("482913")).unwrap();
        assert!(matches!(
            store.create(sample_room("482913")),
            Err(ServiceError::RoomExists)
        ));
    }

    #[test]
    fn deleted_room_is_unreachable() {
        let store = RoomStore::new();
        store.create(sample_room("482913")).unwrap();
        assert!(store.delete("482913").is_some());
        assert!(store.get("482913").is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn registry_tracks_single_membership() {
        let registry = ConnectionRegistry::new();
        let connection = Uuid::new_v4();

        registry.bind(connection, "482913".into());
        assert_eq!(registry.room_of(connection).as_deref(), Some("482913"));

        registry.bind(connection, "777777".into());
        assert_eq!(registry.room_of(connection).as_deref(), Some("777777"));

        assert_eq!(registry.unbind(connection).as_deref(), Some("777777"));
        assert!(registry.room_of(connection).is_none());
    }
}
