//! The presence tracker: who is in a room, and who is still online.
//!
//! # Concurrency note
//!
//! `PresenceTracker` is NOT thread-safe by itself. It is owned by exactly
//! one room task, which serializes joins, heartbeats, and sweeps. Keeping
//! it a plain `HashMap` avoids hidden locking.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use cardroom_protocol::ParticipantId;

use crate::{Clock, Participant, PresenceConfig, PresenceError};

/// Participant → online, in id order.
pub type StatusMap = BTreeMap<ParticipantId, bool>;

/// A participant whose online status differs from a previous status map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresenceChange {
    pub participant: ParticipantId,
    /// The live status. A participant missing from the live map is
    /// reported as offline.
    pub online: bool,
}

/// Tracks the participants of one room and derives their presence.
///
/// ## Lifecycle
///
/// ```text
/// join() ──→ [online] ──(no heartbeat for `timeout`)──→ [offline]
///               ↑  │                                        │
///               └──┘ heartbeat()                            │
///               ↑                                           │
///               └──────────── join() / heartbeat() ─────────┘
/// ```
///
/// Participants are never removed: an offline participant stays in the
/// status map as `false` so clients can render "bob (away)".
pub struct PresenceTracker {
    participants: HashMap<ParticipantId, Participant>,
    config: PresenceConfig,
    clock: Arc<dyn Clock>,
}

impl PresenceTracker {
    /// Creates an empty tracker.
    pub fn new(config: PresenceConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            participants: HashMap::new(),
            config,
            clock,
        }
    }

    /// Adds a participant, or refreshes one whose heartbeat has lapsed.
    ///
    /// # Errors
    /// Returns [`PresenceError::AlreadyOnline`] if the participant is
    /// present and still online.
    pub fn join(&mut self, id: ParticipantId) -> Result<&Participant, PresenceError> {
        let now = self.clock.now();

        if let Some(existing) = self.participants.get(&id) {
            if existing.is_online_at(now, self.config.timeout) {
                return Err(PresenceError::AlreadyOnline(id));
            }
            tracing::debug!(participant = %id, "offline participant rejoining");
        }

        let participant = self
            .participants
            .entry(id.clone())
            .and_modify(|p| p.last_heartbeat = now)
            .or_insert_with(|| Participant::new(id, now));
        Ok(&*participant)
    }

    /// Records a heartbeat.
    ///
    /// A heartbeat from an offline participant brings them back online;
    /// the next sweep publishes that.
    ///
    /// # Errors
    /// Returns [`PresenceError::UnknownParticipant`] if the id never joined.
    pub fn heartbeat(&mut self, id: &ParticipantId) -> Result<(), PresenceError> {
        let now = self.clock.now();
        let participant = self
            .participants
            .get_mut(id)
            .ok_or_else(|| PresenceError::UnknownParticipant(id.clone()))?;
        participant.last_heartbeat = now;
        tracing::trace!(participant = %id, "heartbeat");
        Ok(())
    }

    /// Live online status of one participant, `None` if unknown.
    pub fn is_online(&self, id: &ParticipantId) -> Option<bool> {
        let now = self.clock.now();
        self.participants
            .get(id)
            .map(|p| p.is_online_at(now, self.config.timeout))
    }

    /// Live status of every participant, evaluated at a single instant.
    pub fn status_map(&self) -> StatusMap {
        let now = self.clock.now();
        self.participants
            .values()
            .map(|p| (p.id.clone(), p.is_online_at(now, self.config.timeout)))
            .collect()
    }

    /// Entries where the live status differs from `previous`.
    ///
    /// Ids known to only one side count as changes. An empty result means
    /// nothing observable changed.
    pub fn changes_since(&self, previous: &StatusMap) -> Vec<PresenceChange> {
        let live = self.status_map();

        let mut changes: Vec<PresenceChange> = live
            .iter()
            .filter(|(id, online)| previous.get(*id) != Some(*online))
            .map(|(id, online)| PresenceChange {
                participant: id.clone(),
                online: *online,
            })
            .collect();

        changes.extend(
            previous
                .keys()
                .filter(|id| !live.contains_key(*id))
                .map(|id| PresenceChange {
                    participant: id.clone(),
                    online: false,
                }),
        );

        changes
    }

    /// Looks up a participant.
    pub fn get(&self, id: &ParticipantId) -> Option<&Participant> {
        self.participants.get(id)
    }

    /// Returns `true` if the id ever joined.
    pub fn contains(&self, id: &ParticipantId) -> bool {
        self.participants.contains_key(id)
    }

    /// Number of participants currently online.
    pub fn online_count(&self) -> usize {
        self.status_map().values().filter(|online| **online).count()
    }

    /// Number of participants, online or not.
    pub fn len(&self) -> usize {
        self.participants.len()
    }

    /// Returns `true` if nobody has joined.
    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    /// The active configuration.
    pub fn config(&self) -> &PresenceConfig {
        &self.config
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    //! Unit tests for `PresenceTracker`.
    //!
    //! Time is driven by a `ManualClock`, so expiry is tested by advancing
    //! the clock rather than sleeping.

    use std::time::Duration;

    use super::*;
    use crate::ManualClock;

    // -- Helpers ----------------------------------------------------------

    fn tracker() -> (PresenceTracker, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new());
        let tracker = PresenceTracker::new(PresenceConfig::default(), clock.clone());
        (tracker, clock)
    }

    fn pid(id: &str) -> ParticipantId {
        ParticipantId::from(id)
    }

    const PAST_TIMEOUT: Duration = Duration::from_millis(1001);

    // =====================================================================
    // join()
    // =====================================================================

    #[test]
    fn test_join_new_participant_is_online() {
        let (mut t, _clock) = tracker();

        let p = t.join(pid("alice")).expect("should succeed");
        assert_eq!(p.id, pid("alice"));
        assert_eq!(t.is_online(&pid("alice")), Some(true));
        assert_eq!(t.len(), 1);
    }

    #[test]
    fn test_join_while_online_returns_already_online() {
        let (mut t, _clock) = tracker();
        t.join(pid("alice")).unwrap();

        let result = t.join(pid("alice"));
        assert!(matches!(result, Err(PresenceError::AlreadyOnline(id)) if id == pid("alice")));
    }

    #[test]
    fn test_join_after_timeout_refreshes_participant() {
        let (mut t, clock) = tracker();
        t.join(pid("alice")).unwrap();

        clock.advance(PAST_TIMEOUT);
        assert_eq!(t.is_online(&pid("alice")), Some(false));

        t.join(pid("alice")).expect("rejoin after expiry should succeed");
        assert_eq!(t.is_online(&pid("alice")), Some(true));
        assert_eq!(t.len(), 1, "rejoin must not duplicate the participant");
    }

    // =====================================================================
    // heartbeat()
    // =====================================================================

    #[test]
    fn test_heartbeat_unknown_participant_returns_error() {
        let (mut t, _clock) = tracker();
        let result = t.heartbeat(&pid("ghost"));
        assert!(matches!(result, Err(PresenceError::UnknownParticipant(_))));
    }

    #[test]
    fn test_heartbeat_keeps_participant_online() {
        let (mut t, clock) = tracker();
        t.join(pid("alice")).unwrap();

        for _ in 0..5 {
            clock.advance(Duration::from_millis(600));
            t.heartbeat(&pid("alice")).unwrap();
        }
        assert_eq!(t.is_online(&pid("alice")), Some(true));
    }

    #[test]
    fn test_heartbeat_revives_offline_participant() {
        let (mut t, clock) = tracker();
        t.join(pid("alice")).unwrap();
        clock.advance(PAST_TIMEOUT);
        assert_eq!(t.is_online(&pid("alice")), Some(false));

        t.heartbeat(&pid("alice")).unwrap();
        assert_eq!(t.is_online(&pid("alice")), Some(true));
    }

    // =====================================================================
    // status_map() / changes_since()
    // =====================================================================

    #[test]
    fn test_status_map_reflects_heartbeat_age() {
        let (mut t, clock) = tracker();
        t.join(pid("alice")).unwrap();
        t.join(pid("bob")).unwrap();

        clock.advance(Duration::from_millis(500));
        t.heartbeat(&pid("alice")).unwrap();
        clock.advance(Duration::from_millis(600));

        let map = t.status_map();
        assert_eq!(map.get(&pid("alice")), Some(&true));
        assert_eq!(map.get(&pid("bob")), Some(&false));
        assert_eq!(t.online_count(), 1);
    }

    #[test]
    fn test_changes_since_identical_map_is_empty() {
        let (mut t, _clock) = tracker();
        t.join(pid("alice")).unwrap();

        let previous = t.status_map();
        assert!(t.changes_since(&previous).is_empty());
    }

    #[test]
    fn test_changes_since_reports_flip_to_offline() {
        let (mut t, clock) = tracker();
        t.join(pid("alice")).unwrap();
        let previous = t.status_map();

        clock.advance(PAST_TIMEOUT);

        let changes = t.changes_since(&previous);
        assert_eq!(
            changes,
            vec![PresenceChange {
                participant: pid("alice"),
                online: false
            }]
        );
    }

    #[test]
    fn test_changes_since_reports_ids_missing_from_either_side() {
        let (mut t, _clock) = tracker();
        t.join(pid("alice")).unwrap();

        let mut previous = StatusMap::new();
        previous.insert(pid("carol"), true);

        let changes = t.changes_since(&previous);
        assert_eq!(changes.len(), 2);
        assert!(changes.contains(&PresenceChange {
            participant: pid("alice"),
            online: true
        }));
        assert!(changes.contains(&PresenceChange {
            participant: pid("carol"),
            online: false
        }));
    }

    #[test]
    fn test_empty_tracker() {
        let (t, _clock) = tracker();
        assert!(t.is_empty());
        assert!(t.status_map().is_empty());
        assert_eq!(t.is_online(&pid("nobody")), None);
        assert!(!t.contains(&pid("nobody")));
    }
}
