//! Room configuration.

use cardroom_presence::PresenceConfig;
use cardroom_sweep::SweepConfig;
use serde::{Deserialize, Serialize};

/// Configuration shared by every room a registry creates.
///
/// Override individual fields with struct update syntax:
///
/// ```rust
/// use std::time::Duration;
/// use cardroom_room::RoomConfig;
/// use cardroom_sweep::SweepConfig;
///
/// let config = RoomConfig {
///     sweep: SweepConfig::with_interval(Duration::from_millis(500)),
///     ..RoomConfig::default()
/// };
/// assert_eq!(config.channel_size, 64);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomConfig {
    /// How heartbeat age maps to online/offline.
    pub presence: PresenceConfig,

    /// How often the presence sweep runs.
    pub sweep: SweepConfig,

    /// Capacity of each room's command channel. Callers wait (bounded
    /// channel backpressure) when a room falls this far behind.
    pub channel_size: usize,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            presence: PresenceConfig::default(),
            sweep: SweepConfig::default(),
            channel_size: 64,
        }
    }
}
