//! Wire protocol for Cardroom.
//!
//! This crate defines everything a client can observe about a room:
//!
//! - **Identity** ([`RoomId`], [`ParticipantId`]) — string newtypes chosen
//!   by the caller layer (room names, usernames).
//! - **Cards** ([`Card`], [`Suit`]) — the 52-card pool a room draws from.
//! - **Snapshots** ([`StateSnapshot`], [`DrawnCardRecord`],
//!   [`StatePayload`]) — the versioned projection of room state that
//!   long-poll clients receive.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]) — how snapshots and
//!   pushed payloads are converted to/from bytes.
//! - **Errors** ([`ProtocolError`]).
//!
//! The protocol layer knows nothing about rooms, tasks, or time. It only
//! describes shapes and how to serialize them.

mod card;
mod codec;
mod error;
mod ids;
mod snapshot;

pub use card::{Card, Suit};
pub use codec::{Codec, JsonCodec};
pub use error::ProtocolError;
pub use ids::{ParticipantId, RoomId};
pub use snapshot::{DrawnCardRecord, RESERVED_KEYS, StatePayload, StateSnapshot};
