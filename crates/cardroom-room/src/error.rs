//! Error types for the room layer.

use cardroom_presence::PresenceError;
use cardroom_protocol::{ParticipantId, RoomId};

/// Errors that can occur during room operations.
///
/// None of these are retried internally. They go straight back to the
/// caller layer, and none of them affects other rooms.
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    /// No room with this id has been created yet.
    #[error("room {0} not found")]
    UnknownRoom(RoomId),

    /// The participant never joined this room.
    #[error("participant {0} not in room {1}")]
    UnknownParticipant(ParticipantId, RoomId),

    /// The participant is already present and online in this room.
    #[error("participant {0} already online in room {1}")]
    ParticipantAlreadyOnline(ParticipantId, RoomId),

    /// All 52 cards of the room's deck have been drawn.
    #[error("deck exhausted in room {0}")]
    DeckExhausted(RoomId),

    /// The room's task has stopped (after `shutdown`).
    #[error("room {0} is unavailable")]
    Unavailable(RoomId),
}

impl RoomError {
    /// Attaches the room id to a presence-layer error.
    pub(crate) fn from_presence(err: PresenceError, room_id: &RoomId) -> Self {
        match err {
            PresenceError::AlreadyOnline(id) => {
                Self::ParticipantAlreadyOnline(id, room_id.clone())
            }
            PresenceError::UnknownParticipant(id) => {
                Self::UnknownParticipant(id, room_id.clone())
            }
        }
    }
}
