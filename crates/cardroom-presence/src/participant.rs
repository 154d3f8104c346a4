//! Participant records and presence configuration.
//!
//! A participant is the room's record of one joined client. It tracks:
//! - WHO they are (`ParticipantId`)
//! - WHEN they last proved they were still there (`last_heartbeat`)
//!
//! Whether they are online is never stored. It is derived from the
//! heartbeat age every time someone asks, so it can never go stale.

use std::time::Duration;

use cardroom_protocol::ParticipantId;
use serde::{Deserialize, Serialize};
use tokio::time::Instant;

// ---------------------------------------------------------------------------
// PresenceConfig
// ---------------------------------------------------------------------------

/// Configuration for presence derivation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresenceConfig {
    /// A participant whose last heartbeat is at least this old is offline.
    ///
    /// Default: 1 second. Clients are expected to heartbeat well inside it.
    pub timeout: Duration,
}

impl Default for PresenceConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(1),
        }
    }
}

// ---------------------------------------------------------------------------
// Participant
// ---------------------------------------------------------------------------

/// One participant of a room.
#[derive(Debug, Clone)]
pub struct Participant {
    /// Unique within the owning room.
    pub id: ParticipantId,

    /// When the participant last joined or heartbeated.
    pub last_heartbeat: Instant,
}

impl Participant {
    pub fn new(id: ParticipantId, now: Instant) -> Self {
        Self {
            id,
            last_heartbeat: now,
        }
    }

    /// `true` while `now - last_heartbeat < timeout`.
    ///
    /// The boundary is exclusive: exactly `timeout` after the last
    /// heartbeat the participant is already offline.
    pub fn is_online_at(&self, now: Instant, timeout: Duration) -> bool {
        now.saturating_duration_since(self.last_heartbeat) < timeout
    }
}
