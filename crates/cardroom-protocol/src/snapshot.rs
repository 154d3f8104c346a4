//! The versioned, client-visible projection of a room.
//!
//! A [`StateSnapshot`] is what a long-poll client receives. On the wire it
//! is a single JSON object:
//!
//! ```text
//! {
//!   "version": 4,
//!   "players": { "alice": true, "bob": false },
//!   "drawn_cards": [ { "suit": "hearts", "value": 12, "owner": "alice" } ],
//!   ...free-form payload keys...
//! }
//! ```
//!
//! The three reserved keys are always computed by the room. Anything else
//! comes from the last pushed [`StatePayload`] and is flattened beside them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{Card, ParticipantId, Suit};

/// Free-form state pushed by clients through the generic update path.
pub type StatePayload = serde_json::Map<String, serde_json::Value>;

/// Keys owned by the room. Values supplied for these in a pushed payload
/// are discarded.
pub const RESERVED_KEYS: [&str; 3] = ["version", "players", "drawn_cards"];

/// One entry of the append-only drawn-cards log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawnCardRecord {
    pub suit: Suit,
    /// Rank 1–13. Named `value` on the wire.
    #[serde(rename = "value")]
    pub rank: u8,
    /// Participant who drew the card.
    pub owner: ParticipantId,
}

impl DrawnCardRecord {
    pub fn new(card: Card, owner: ParticipantId) -> Self {
        Self {
            suit: card.suit(),
            rank: card.rank(),
            owner,
        }
    }
}

/// Immutable point-in-time view of a room, tagged with its version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateSnapshot {
    /// Starts at 1 and grows by exactly 1 per observable mutation.
    pub version: u64,

    /// Participant → currently online. A `BTreeMap` so two snapshots with
    /// the same presence serialize identically.
    pub players: BTreeMap<ParticipantId, bool>,

    /// Cards drawn so far, oldest first.
    pub drawn_cards: Vec<DrawnCardRecord>,

    /// Everything else, as last pushed by a client.
    #[serde(flatten)]
    pub payload: StatePayload,
}

impl StateSnapshot {
    /// The snapshot of a room nobody has touched yet (version 1).
    ///
    /// Starting at 1 rather than 0 lets a fresh client ask for
    /// "anything newer than 0" and receive the initial state immediately.
    pub fn initial() -> Self {
        Self {
            version: 1,
            players: BTreeMap::new(),
            drawn_cards: Vec::new(),
            payload: StatePayload::new(),
        }
    }

    /// Returns `true` if this snapshot is strictly newer than `version`.
    pub fn is_newer_than(&self, version: u64) -> bool {
        self.version > version
    }

    /// Removes the room-owned keys from a pushed payload.
    pub fn sanitize_payload(mut payload: StatePayload) -> StatePayload {
        for key in RESERVED_KEYS {
            payload.remove(key);
        }
        payload
    }
}

impl Default for StateSnapshot {
    fn default() -> Self {
        Self::initial()
    }
}
