//! Room state and notification for Cardroom.
//!
//! Each room runs as an isolated Tokio task (actor model) that owns its
//! deck, its participants, and the version counter. Every mutation goes
//! through that one task, so mutations never race each other or the
//! presence sweep. Snapshots are published on a `watch` channel, which is
//! what long-poll callers wait on.
//!
//! # Key types
//!
//! - [`RoomRegistry`] — lazily creates rooms, looks them up by id
//! - [`RoomHandle`] — send commands to a running room, read snapshots,
//!   wait for the next version
//! - [`Deck`] — the 52 cards a room draws from
//! - [`RoomConfig`] — presence timeout, sweep cadence, channel size

mod config;
mod deck;
mod error;
mod registry;
mod room;

pub use config::RoomConfig;
pub use deck::{Deck, DeckExhausted};
pub use error::RoomError;
pub use registry::RoomRegistry;
pub use room::RoomHandle;
