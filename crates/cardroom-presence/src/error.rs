//! Error types for the presence layer.

use cardroom_protocol::ParticipantId;

/// Errors that can occur while tracking presence.
#[derive(Debug, thiserror::Error)]
pub enum PresenceError {
    /// The participant already joined and is still online.
    /// Rejoining is only allowed once their heartbeat has lapsed, so two
    /// browser tabs cannot silently share one identity.
    #[error("participant {0} is already online")]
    AlreadyOnline(ParticipantId),

    /// No participant with this id ever joined.
    #[error("unknown participant {0}")]
    UnknownParticipant(ParticipantId),
}
