//! Room registry: the process-wide map from room id to running room.

use std::collections::HashMap;
use std::sync::Arc;

use cardroom_presence::{Clock, TokioClock};
use cardroom_protocol::RoomId;

use crate::room::spawn_room;
use crate::{RoomConfig, RoomError, RoomHandle};

/// Creates rooms on first reference and looks them up afterwards.
///
/// The map only ever grows: rooms are never removed, so a handle obtained
/// from [`get`](Self::get) can never be invalidated by a concurrent
/// removal.
///
/// Like the presence tracker, the registry itself is not thread-safe. The
/// service owns it behind a mutex and clones handles out, so no lock is
/// held while a caller waits on a room.
pub struct RoomRegistry {
    rooms: HashMap<RoomId, RoomHandle>,
    config: RoomConfig,
    clock: Arc<dyn Clock>,
}

impl RoomRegistry {
    /// Creates an empty registry. Every room it creates uses `config` and
    /// reads time from `clock`.
    pub fn new(config: RoomConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            rooms: HashMap::new(),
            config,
            clock,
        }
    }

    /// Returns the room with this id, creating it first if needed.
    ///
    /// A new room starts at version 1 with no participants, a freshly
    /// shuffled deck, and an empty drawn-cards log. Must be called from
    /// within a Tokio runtime (the room runs as a task).
    pub fn get_or_create(&mut self, room_id: &RoomId) -> RoomHandle {
        if let Some(handle) = self.rooms.get(room_id) {
            return handle.clone();
        }

        let handle = spawn_room(room_id.clone(), &self.config, Arc::clone(&self.clock));
        self.rooms.insert(room_id.clone(), handle.clone());
        tracing::info!(%room_id, rooms = self.rooms.len(), "room created");
        handle
    }

    /// Returns the room with this id.
    ///
    /// # Errors
    /// [`RoomError::UnknownRoom`] if no room with this id was created.
    pub fn get(&self, room_id: &RoomId) -> Result<RoomHandle, RoomError> {
        self.rooms
            .get(room_id)
            .cloned()
            .ok_or_else(|| RoomError::UnknownRoom(room_id.clone()))
    }

    /// Returns `true` if a room with this id exists.
    pub fn contains(&self, room_id: &RoomId) -> bool {
        self.rooms.contains_key(room_id)
    }

    /// Number of rooms created so far.
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    /// Ids of every room, in no particular order.
    pub fn room_ids(&self) -> Vec<RoomId> {
        self.rooms.keys().cloned().collect()
    }

    /// The configuration new rooms are created with.
    pub fn config(&self) -> &RoomConfig {
        &self.config
    }
}

impl Default for RoomRegistry {
    fn default() -> Self {
        Self::new(RoomConfig::default(), Arc::new(TokioClock))
    }
}
