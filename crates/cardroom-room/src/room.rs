//! Room actor: an isolated Tokio task that owns one room's state.
//!
//! Each room runs in its own task. Mutations arrive as commands on an mpsc
//! channel and are applied one at a time; results go back on oneshot reply
//! channels. The task also owns the presence sweep, so sweeps are just one
//! more thing the single mutation path does between commands.
//!
//! Every successful mutation bumps the version by one and publishes a new
//! [`StateSnapshot`] on a `watch` channel. Readers borrow the latest value
//! without going through the task, and long-poll callers wait on the
//! channel for a version newer than the one they have.

use std::future::Future;
use std::sync::Arc;

use cardroom_presence::{Clock, PresenceTracker};
use cardroom_protocol::{DrawnCardRecord, ParticipantId, RoomId, StatePayload, StateSnapshot};
use cardroom_sweep::SweepScheduler;
use tokio::sync::{mpsc, oneshot, watch};

use crate::{Deck, RoomConfig, RoomError};

/// Reply channel carrying the snapshot a mutation published.
type SnapshotReply = oneshot::Sender<Result<Arc<StateSnapshot>, RoomError>>;

/// Commands sent to a room task through its channel.
pub(crate) enum RoomCommand {
    /// Add a participant, or refresh one whose heartbeat lapsed.
    AddParticipant {
        participant: ParticipantId,
        reply: SnapshotReply,
    },

    /// Refresh a participant's heartbeat. Never publishes.
    Heartbeat {
        participant: ParticipantId,
        reply: oneshot::Sender<Result<(), RoomError>>,
    },

    /// Draw one card on behalf of a participant.
    DrawCard {
        participant: ParticipantId,
        reply: SnapshotReply,
    },

    /// Overwrite the free-form part of the state.
    ReplaceState {
        payload: StatePayload,
        reply: SnapshotReply,
    },

    /// Report how many cards are left.
    CardsRemaining { reply: oneshot::Sender<usize> },

    /// Stop the task (and with it, the sweep).
    Shutdown,
}

/// Handle to a running room. Used to mutate it, read it, and wait on it.
///
/// Cheap to clone: an `mpsc::Sender` plus a `watch::Receiver`. The
/// [`RoomRegistry`](crate::RoomRegistry) holds one per room and hands out
/// clones.
#[derive(Clone)]
pub struct RoomHandle {
    room_id: RoomId,
    sender: mpsc::Sender<RoomCommand>,
    snapshots: watch::Receiver<Arc<StateSnapshot>>,
}

impl RoomHandle {
    /// Returns the room's id.
    pub fn room_id(&self) -> &RoomId {
        &self.room_id
    }

    /// Adds a participant with a fresh heartbeat and publishes.
    ///
    /// # Errors
    /// [`RoomError::ParticipantAlreadyOnline`] if the participant is
    /// present and still online.
    pub async fn add_participant(
        &self,
        participant: ParticipantId,
    ) -> Result<Arc<StateSnapshot>, RoomError> {
        self.request(|reply| RoomCommand::AddParticipant { participant, reply })
            .await?
    }

    /// Refreshes a participant's heartbeat. Does not bump the version.
    ///
    /// # Errors
    /// [`RoomError::UnknownParticipant`] if the participant never joined.
    pub async fn heartbeat(&self, participant: ParticipantId) -> Result<(), RoomError> {
        self.request(|reply| RoomCommand::Heartbeat { participant, reply })
            .await?
    }

    /// Draws one card for `participant`, records it, and publishes.
    ///
    /// # Errors
    /// - [`RoomError::UnknownParticipant`] if the participant never joined.
    /// - [`RoomError::DeckExhausted`] if all 52 cards are gone.
    pub async fn draw_card(
        &self,
        participant: ParticipantId,
    ) -> Result<Arc<StateSnapshot>, RoomError> {
        self.request(|reply| RoomCommand::DrawCard { participant, reply })
            .await?
    }

    /// Replaces the free-form payload and publishes.
    ///
    /// `version`, `players`, and `drawn_cards` in `payload` are ignored;
    /// those always come from the room's own state.
    pub async fn replace_state(
        &self,
        payload: StatePayload,
    ) -> Result<Arc<StateSnapshot>, RoomError> {
        self.request(|reply| RoomCommand::ReplaceState { payload, reply })
            .await?
    }

    /// Cards left in the room's deck.
    pub async fn cards_remaining(&self) -> Result<usize, RoomError> {
        self.request(|reply| RoomCommand::CardsRemaining { reply })
            .await
    }

    /// The latest published snapshot. Never waits on the room task.
    pub fn current_snapshot(&self) -> Arc<StateSnapshot> {
        Arc::clone(&*self.snapshots.borrow())
    }

    /// Version of the latest published snapshot.
    pub fn last_version(&self) -> u64 {
        self.snapshots.borrow().version
    }

    /// Waits until a snapshot newer than `since` is published, then
    /// returns it. Returns at once if one already exists.
    ///
    /// Dropping the returned future cancels the wait. The waiter holds
    /// nothing but its own receiver clone, so cancellation leaks nothing
    /// and cannot hold up other waiters.
    ///
    /// # Errors
    /// [`RoomError::Unavailable`] if the room task stops while waiting.
    pub async fn await_update(&self, since: u64) -> Result<Arc<StateSnapshot>, RoomError> {
        let mut snapshots = self.snapshots.clone();
        // `wait_for` checks the current value and registers for change
        // notification in one step, so a publish can never slip between.
        let result = snapshots
            .wait_for(|snapshot| snapshot.is_newer_than(since))
            .await
            .map(|snapshot| Arc::clone(&*snapshot));
        result.map_err(|_| RoomError::Unavailable(self.room_id.clone()))
    }

    /// Like [`await_update`](Self::await_update), but gives up when
    /// `closed` resolves first.
    ///
    /// `closed` is the caller's signal that the destination (e.g. the
    /// client's connection) went away. That is a cancellation, not an
    /// error: the result is `Ok(None)`.
    pub async fn await_update_until<F>(
        &self,
        since: u64,
        closed: F,
    ) -> Result<Option<Arc<StateSnapshot>>, RoomError>
    where
        F: Future<Output = ()>,
    {
        tokio::select! {
            biased;
            () = closed => {
                tracing::debug!(room_id = %self.room_id, since, "destination closed, wait dropped");
                Ok(None)
            }
            result = self.await_update(since) => result.map(Some),
        }
    }

    /// Tells the room task to stop. Pending waiters receive
    /// [`RoomError::Unavailable`].
    pub async fn shutdown(&self) -> Result<(), RoomError> {
        self.sender
            .send(RoomCommand::Shutdown)
            .await
            .map_err(|_| RoomError::Unavailable(self.room_id.clone()))
    }

    /// Sends a command built around a fresh reply channel and waits for
    /// the answer.
    async fn request<T>(
        &self,
        make: impl FnOnce(oneshot::Sender<T>) -> RoomCommand,
    ) -> Result<T, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(make(reply_tx))
            .await
            .map_err(|_| RoomError::Unavailable(self.room_id.clone()))?;
        reply_rx
            .await
            .map_err(|_| RoomError::Unavailable(self.room_id.clone()))
    }
}

/// The internal room state. Lives inside the room's Tokio task.
struct RoomActor {
    room_id: RoomId,
    deck: Deck,
    presence: PresenceTracker,
    drawn_cards: Vec<DrawnCardRecord>,
    payload: StatePayload,
    version: u64,
    publisher: watch::Sender<Arc<StateSnapshot>>,
    receiver: mpsc::Receiver<RoomCommand>,
    sweeper: SweepScheduler,
}

impl RoomActor {
    /// Runs the task loop: commands and sweeps, one at a time, until
    /// shutdown or until every handle is gone.
    async fn run(mut self) {
        tracing::info!(room_id = %self.room_id, "room task started");

        loop {
            tokio::select! {
                cmd = self.receiver.recv() => match cmd {
                    Some(RoomCommand::Shutdown) => {
                        tracing::info!(room_id = %self.room_id, "room shutting down");
                        break;
                    }
                    Some(cmd) => self.handle(cmd),
                    None => break,
                },
                _ = self.sweeper.wait_for_sweep() => {
                    let published = self.sweep();
                    self.sweeper.record_outcome(published);
                }
            }
        }

        tracing::info!(
            room_id = %self.room_id,
            version = self.version,
            sweeps = self.sweeper.metrics().total_sweeps,
            "room task stopped"
        );
    }

    fn handle(&mut self, cmd: RoomCommand) {
        match cmd {
            RoomCommand::AddParticipant { participant, reply } => {
                let _ = reply.send(self.handle_add_participant(participant));
            }
            RoomCommand::Heartbeat { participant, reply } => {
                let result = self
                    .presence
                    .heartbeat(&participant)
                    .map_err(|e| RoomError::from_presence(e, &self.room_id));
                let _ = reply.send(result);
            }
            RoomCommand::DrawCard { participant, reply } => {
                let _ = reply.send(self.handle_draw_card(participant));
            }
            RoomCommand::ReplaceState { payload, reply } => {
                self.payload = StateSnapshot::sanitize_payload(payload);
                let snapshot = self.publish();
                tracing::debug!(
                    room_id = %self.room_id,
                    version = snapshot.version,
                    keys = self.payload.len(),
                    "state replaced"
                );
                let _ = reply.send(Ok(snapshot));
            }
            RoomCommand::CardsRemaining { reply } => {
                let _ = reply.send(self.deck.len());
            }
            // Handled by the run loop.
            RoomCommand::Shutdown => {}
        }
    }

    fn handle_add_participant(
        &mut self,
        participant: ParticipantId,
    ) -> Result<Arc<StateSnapshot>, RoomError> {
        self.presence
            .join(participant.clone())
            .map_err(|e| RoomError::from_presence(e, &self.room_id))?;

        // Nothing to sweep until someone is here.
        self.sweeper.resume();

        let snapshot = self.publish();
        tracing::info!(
            room_id = %self.room_id,
            %participant,
            participants = self.presence.len(),
            version = snapshot.version,
            "participant joined"
        );
        Ok(snapshot)
    }

    fn handle_draw_card(
        &mut self,
        participant: ParticipantId,
    ) -> Result<Arc<StateSnapshot>, RoomError> {
        if !self.presence.contains(&participant) {
            return Err(RoomError::UnknownParticipant(
                participant,
                self.room_id.clone(),
            ));
        }
        let card = self
            .deck
            .draw()
            .map_err(|_| RoomError::DeckExhausted(self.room_id.clone()))?;

        self.drawn_cards
            .push(DrawnCardRecord::new(card, participant.clone()));
        let snapshot = self.publish();
        tracing::debug!(
            room_id = %self.room_id,
            %participant,
            %card,
            remaining = self.deck.len(),
            version = snapshot.version,
            "card drawn"
        );
        Ok(snapshot)
    }

    /// Re-derives presence and publishes only if it differs from what
    /// clients last saw. Returns whether a new version went out.
    fn sweep(&mut self) -> bool {
        let changes = {
            let published = self.publisher.borrow();
            self.presence.changes_since(&published.players)
        };
        if changes.is_empty() {
            tracing::trace!(room_id = %self.room_id, "sweep: presence unchanged");
            return false;
        }

        let snapshot = self.publish();
        for change in &changes {
            tracing::info!(
                room_id = %self.room_id,
                participant = %change.participant,
                online = change.online,
                version = snapshot.version,
                "presence changed"
            );
        }
        true
    }

    /// Bumps the version, builds the next snapshot from authoritative
    /// state, and wakes every waiter.
    fn publish(&mut self) -> Arc<StateSnapshot> {
        self.version += 1;
        let snapshot = Arc::new(StateSnapshot {
            version: self.version,
            players: self.presence.status_map(),
            drawn_cards: self.drawn_cards.clone(),
            payload: self.payload.clone(),
        });
        // `send_replace` publishes even when no waiter is subscribed.
        self.publisher.send_replace(Arc::clone(&snapshot));
        snapshot
    }
}

/// Spawns a new room task and returns a handle to it.
///
/// The room starts at version 1 with an empty participant list, a freshly
/// shuffled deck, and its sweep paused until the first join.
pub(crate) fn spawn_room(
    room_id: RoomId,
    config: &RoomConfig,
    clock: Arc<dyn Clock>,
) -> RoomHandle {
    let (tx, rx) = mpsc::channel(config.channel_size.max(1));
    let initial = StateSnapshot::initial();
    let version = initial.version;
    let (publisher, snapshots) = watch::channel(Arc::new(initial));

    let mut sweeper = SweepScheduler::new(config.sweep.clone());
    sweeper.pause();

    let actor = RoomActor {
        room_id: room_id.clone(),
        deck: Deck::shuffled(),
        presence: PresenceTracker::new(config.presence.clone(), clock),
        drawn_cards: Vec::new(),
        payload: StatePayload::new(),
        version,
        publisher,
        receiver: rx,
        sweeper,
    };

    tokio::spawn(actor.run());

    RoomHandle {
        room_id,
        sender: tx,
        snapshots,
    }
}
