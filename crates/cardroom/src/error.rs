//! Unified error type for Cardroom.

use cardroom_presence::PresenceError;
use cardroom_protocol::ProtocolError;
use cardroom_room::RoomError;

/// Top-level error that wraps all crate-specific errors.
///
/// Callers of the [`Cardroom`](crate::Cardroom) facade deal with this one
/// type instead of importing errors from each sub-crate. `#[from]` on each
/// variant lets `?` convert sub-crate errors.
#[derive(Debug, thiserror::Error)]
pub enum CardroomError {
    /// Encoding a snapshot or decoding a pushed body failed.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A presence-level error without room context.
    ///
    /// The facade itself never returns this: rooms attach their id and
    /// report [`RoomError`] instead. It exists for callers that drive a
    /// [`PresenceTracker`](cardroom_presence::PresenceTracker) directly
    /// and want one error type.
    #[error(transparent)]
    Presence(#[from] PresenceError),

    /// A room-level error (unknown room, unknown participant, deck
    /// exhausted, ...).
    #[error(transparent)]
    Room(#[from] RoomError),
}
