//! Participant presence for Cardroom.
//!
//! Clients poll instead of holding a socket open, so "is this player still
//! here?" can only be inferred from how recently they sent a heartbeat.
//! This crate owns that inference:
//!
//! 1. **Clock** — where "now" comes from ([`Clock`] trait, [`TokioClock`]
//!    for production, [`ManualClock`] for tests)
//! 2. **Participants** — who joined and when they last checked in
//!    ([`Participant`], [`PresenceConfig`])
//! 3. **Tracking** — joins, heartbeats, and the derived online map
//!    ([`PresenceTracker`], [`PresenceChange`])
//!
//! # How it fits in the stack
//!
//! ```text
//! Room Layer (above)      ← sweeps the tracker and publishes presence changes
//!     ↕
//! Presence Layer (this crate)  ← heartbeat bookkeeping, online/offline
//!     ↕
//! Protocol Layer (below)  ← provides ParticipantId
//! ```

mod clock;
mod error;
mod participant;
mod tracker;

pub use clock::{Clock, ManualClock, TokioClock};
pub use error::PresenceError;
pub use participant::{Participant, PresenceConfig};
pub use tracker::{PresenceChange, PresenceTracker, StatusMap};
