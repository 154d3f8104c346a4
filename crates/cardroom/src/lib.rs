//! # Cardroom
//!
//! Long-poll card room backend.
//!
//! Clients join a room, heartbeat to stay online, draw from a shared
//! 52-card deck, push free-form state, and long-poll for the next version
//! of the room's state. Everything goes through one facade, [`Cardroom`],
//! which owns the room registry and the wire codec.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use cardroom::prelude::*;
//!
//! # async fn run() -> Result<(), CardroomError> {
//! let cardroom = Cardroom::builder().build();
//! let room = RoomId::from("R1");
//!
//! cardroom.join(&room, ParticipantId::from("alice")).await?;
//! cardroom.draw_card(&room, ParticipantId::from("alice")).await?;
//!
//! // Blocks until something newer than version 3 is published.
//! let body: Vec<u8> = cardroom.await_state(&room, 3).await?;
//! # let _ = body;
//! # Ok(())
//! # }
//! ```

mod error;
mod service;
pub mod telemetry;

pub use error::CardroomError;
pub use service::{Cardroom, CardroomBuilder, JoinReceipt};

/// Everything a caller layer usually needs, in one import.
pub mod prelude {
    pub use crate::{Cardroom, CardroomBuilder, CardroomError, JoinReceipt};
    pub use cardroom_presence::{Clock, ManualClock, PresenceConfig, PresenceError, TokioClock};
    pub use cardroom_protocol::{
        Card, Codec, DrawnCardRecord, JsonCodec, ParticipantId, ProtocolError, RoomId,
        StatePayload, StateSnapshot, Suit,
    };
    pub use cardroom_room::{RoomConfig, RoomError};
    pub use cardroom_sweep::SweepConfig;
}
