//! The `Cardroom` facade and its builder.
//!
//! This is the surface a caller layer (an HTTP handler, the demo binary)
//! talks to. It ties the layers together: protocol (wire codec) → room
//! registry → per-room tasks.

use std::future::Future;
use std::sync::Arc;

use cardroom_presence::{Clock, TokioClock};
use cardroom_protocol::{Codec, JsonCodec, ParticipantId, RoomId, StatePayload};
use cardroom_room::{RoomConfig, RoomHandle, RoomRegistry};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::CardroomError;

/// Returned by [`Cardroom::join`]: the ids the caller joined with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinReceipt {
    pub room_id: RoomId,
    pub participant_id: ParticipantId,
}

/// Builder for configuring a [`Cardroom`].
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use cardroom::prelude::*;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let cardroom = Cardroom::builder()
///     .room_config(RoomConfig {
///         sweep: SweepConfig::with_interval(Duration::from_millis(500)),
///         ..RoomConfig::default()
///     })
///     .build();
/// assert_eq!(cardroom.room_count().await, 0);
/// # }
/// ```
pub struct CardroomBuilder {
    room_config: RoomConfig,
    clock: Arc<dyn Clock>,
}

impl CardroomBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            room_config: RoomConfig::default(),
            clock: Arc::new(TokioClock),
        }
    }

    /// Sets the configuration every room is created with.
    pub fn room_config(mut self, config: RoomConfig) -> Self {
        self.room_config = config;
        self
    }

    /// Sets where presence reads the current time from.
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Builds the service with the JSON codec.
    pub fn build(self) -> Cardroom<JsonCodec> {
        self.build_with_codec(JsonCodec)
    }

    /// Builds the service with a custom codec.
    ///
    /// The sweep interval is clamped by each room's scheduler, not here.
    pub fn build_with_codec<C: Codec>(self, codec: C) -> Cardroom<C> {
        let room_config = self.room_config;
        tracing::debug!(
            sweep_interval_ms = room_config.sweep.interval.as_millis() as u64,
            presence_timeout_ms = room_config.presence.timeout.as_millis() as u64,
            "cardroom built"
        );
        Cardroom {
            rooms: Mutex::new(RoomRegistry::new(room_config, self.clock)),
            codec,
        }
    }
}

impl Default for CardroomBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// The card room service.
///
/// Share it across request tasks with an `Arc`. The registry sits behind
/// an async mutex that is only held to look up (or create) a room; the
/// handle is cloned out before any room command or wait, so a long poll
/// never blocks other rooms.
pub struct Cardroom<C: Codec = JsonCodec> {
    rooms: Mutex<RoomRegistry>,
    codec: C,
}

impl Cardroom<JsonCodec> {
    /// Creates a new builder.
    pub fn builder() -> CardroomBuilder {
        CardroomBuilder::new()
    }
}

impl<C: Codec> Cardroom<C> {
    /// Joins `participant` to `room_id`, creating the room on first use.
    ///
    /// # Errors
    /// [`RoomError::ParticipantAlreadyOnline`](cardroom_room::RoomError::ParticipantAlreadyOnline)
    /// if the participant is already present and online.
    pub async fn join(
        &self,
        room_id: &RoomId,
        participant: ParticipantId,
    ) -> Result<JoinReceipt, CardroomError> {
        let room = self.rooms.lock().await.get_or_create(room_id);
        room.add_participant(participant.clone()).await?;
        Ok(JoinReceipt {
            room_id: room_id.clone(),
            participant_id: participant,
        })
    }

    /// Records a heartbeat. Never publishes a new version.
    pub async fn heartbeat(
        &self,
        room_id: &RoomId,
        participant: ParticipantId,
    ) -> Result<(), CardroomError> {
        self.room(room_id).await?.heartbeat(participant).await?;
        Ok(())
    }

    /// Draws one card for `participant`.
    pub async fn draw_card(
        &self,
        room_id: &RoomId,
        participant: ParticipantId,
    ) -> Result<(), CardroomError> {
        self.room(room_id).await?.draw_card(participant).await?;
        Ok(())
    }

    /// Replaces the room's free-form state. Reserved keys are ignored.
    pub async fn push_state(
        &self,
        room_id: &RoomId,
        payload: StatePayload,
    ) -> Result<(), CardroomError> {
        self.room(room_id).await?.replace_state(payload).await?;
        Ok(())
    }

    /// Like [`push_state`](Self::push_state), for an encoded body.
    ///
    /// # Errors
    /// [`ProtocolError`](cardroom_protocol::ProtocolError) if the body does
    /// not decode to an object. The room is looked up first, so an unknown
    /// room wins over a bad body.
    pub async fn push_state_json(&self, room_id: &RoomId, body: &[u8]) -> Result<(), CardroomError> {
        let room = self.room(room_id).await?;
        let payload = self.codec.decode_payload(body)?;
        room.replace_state(payload).await?;
        Ok(())
    }

    /// Waits for a version newer than `since` and returns it encoded.
    pub async fn await_state(&self, room_id: &RoomId, since: u64) -> Result<Vec<u8>, CardroomError> {
        let room = self.room(room_id).await?;
        let snapshot = room.await_update(since).await?;
        Ok(self.codec.encode(&*snapshot)?)
    }

    /// Like [`await_state`](Self::await_state), but returns `None` once
    /// `closed` resolves (the caller's destination went away).
    pub async fn await_state_until<F>(
        &self,
        room_id: &RoomId,
        since: u64,
        closed: F,
    ) -> Result<Option<Vec<u8>>, CardroomError>
    where
        F: Future<Output = ()>,
    {
        let room = self.room(room_id).await?;
        match room.await_update_until(since, closed).await? {
            Some(snapshot) => Ok(Some(self.codec.encode(&*snapshot)?)),
            None => Ok(None),
        }
    }

    /// The room's latest published state, encoded. Never waits.
    pub async fn snapshot(&self, room_id: &RoomId) -> Result<Vec<u8>, CardroomError> {
        let snapshot = self.room(room_id).await?.current_snapshot();
        Ok(self.codec.encode(&*snapshot)?)
    }

    /// Number of rooms created so far.
    pub async fn room_count(&self) -> usize {
        self.rooms.lock().await.room_count()
    }

    /// Looks up an existing room and clones its handle out of the lock.
    async fn room(&self, room_id: &RoomId) -> Result<RoomHandle, CardroomError> {
        let rooms = self.rooms.lock().await;
        Ok(rooms.get(room_id)?)
    }
}
