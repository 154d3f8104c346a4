//! Fixed-interval sweep scheduler for Cardroom.
//!
//! Every room re-derives participant presence on a fixed cadence (1 s by
//! default). This crate provides the cadence: a [`SweepScheduler`] that
//! resolves once per interval, with first-sweep jitter, overrun detection,
//! pause/resume, and a few counters.
//!
//! The scheduler knows nothing about presence. Deciding whether a sweep
//! changed anything is the room's job; it reports the outcome back through
//! [`SweepScheduler::record_outcome`].
//!
//! # Integration
//!
//! The scheduler sits inside a room task's `tokio::select!` loop:
//!
//! ```ignore
//! loop {
//!     tokio::select! {
//!         cmd = commands.recv() => { /* handle commands */ }
//!         _ = scheduler.wait_for_sweep() => {
//!             let published = room.sweep();
//!             scheduler.record_outcome(published);
//!         }
//!     }
//! }
//! ```
//!
//! [`SweepScheduler::wait_for_sweep`] is cancel-safe: if another branch wins
//! the `select!`, no sweep is consumed and the deadline is unchanged.

use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tokio::time::{self, Instant};
use tracing::{debug, trace, warn};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Configuration for the sweep scheduler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepConfig {
    /// Time between sweeps. Default: 1000 ms.
    pub interval: Duration,
    /// Random jitter (0–max µs) added to the *first* sweep so rooms created
    /// at the same instant do not sweep in lock-step.
    pub initial_jitter_us: u64,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(1000),
            initial_jitter_us: 5_000,
        }
    }
}

impl SweepConfig {
    /// Shortest interval accepted. Anything tighter is clamped.
    pub const MIN_INTERVAL: Duration = Duration::from_millis(10);

    /// Create a config for a specific interval with default jitter.
    pub fn with_interval(interval: Duration) -> Self {
        Self {
            interval,
            ..Default::default()
        }
    }

    /// Clamp out-of-range values so the config is safe to use.
    ///
    /// Called automatically by [`SweepScheduler::new`].
    pub fn validated(mut self) -> Self {
        if self.interval < Self::MIN_INTERVAL {
            warn!(
                interval_ms = self.interval.as_secs_f64() * 1000.0,
                min_ms = Self::MIN_INTERVAL.as_secs_f64() * 1000.0,
                "sweep interval below minimum, clamping"
            );
            self.interval = Self::MIN_INTERVAL;
        }
        self
    }
}

// ---------------------------------------------------------------------------
// Sweep info
// ---------------------------------------------------------------------------

/// Information about a due sweep, returned by [`SweepScheduler::wait_for_sweep`].
#[derive(Debug, Clone)]
pub struct SweepInfo {
    /// Monotonically increasing sweep number (starts at 1).
    pub sweep: u64,
    /// `true` if the sweep fired more than 10% of an interval late.
    pub overrun: bool,
    /// How late the sweep fired relative to its deadline.
    pub late_by: Duration,
}

// ---------------------------------------------------------------------------
// Metrics
// ---------------------------------------------------------------------------

/// Counters kept by the scheduler.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepMetrics {
    /// Sweeps that fired.
    pub total_sweeps: u64,
    /// Sweeps the room reported as having published a new version.
    pub total_published: u64,
    /// Sweeps that fired late.
    pub total_overruns: u64,
}

// ---------------------------------------------------------------------------
// Scheduler
// ---------------------------------------------------------------------------

/// Fixed-interval sweep scheduler. One per room task.
pub struct SweepScheduler {
    config: SweepConfig,
    sweep_count: u64,
    /// When the next sweep is due (Tokio instant for `sleep_until`).
    next_sweep: Instant,
    paused: bool,
    metrics: SweepMetrics,
}

impl SweepScheduler {
    /// Create a new scheduler. The first sweep is due after one interval
    /// plus jitter.
    pub fn new(config: SweepConfig) -> Self {
        let config = config.validated();

        let jitter = first_sweep_jitter(&config);
        let next_sweep = Instant::now() + config.interval + jitter;

        debug!(
            interval_ms = config.interval.as_secs_f64() * 1000.0,
            jitter_us = jitter.as_micros() as u64,
            "sweep scheduler created"
        );

        Self {
            config,
            sweep_count: 0,
            next_sweep,
            paused: false,
            metrics: SweepMetrics::default(),
        }
    }

    /// Create a scheduler for a specific interval with default settings.
    pub fn with_interval(interval: Duration) -> Self {
        Self::new(SweepConfig::with_interval(interval))
    }

    /// Wait until the next sweep is due.
    ///
    /// While paused this future pends forever; `tokio::select!` keeps
    /// serving its other branches.
    pub async fn wait_for_sweep(&mut self) -> SweepInfo {
        if self.paused {
            std::future::pending::<()>().await;
        }

        let deadline = self.next_sweep;
        time::sleep_until(deadline).await;

        let now = Instant::now();
        let interval = self.config.interval;
        let late_by = now.saturating_duration_since(deadline);
        let overrun = late_by > interval / 10;

        self.sweep_count += 1;
        self.metrics.total_sweeps += 1;
        if overrun {
            self.metrics.total_overruns += 1;
            warn!(
                sweep = self.sweep_count,
                late_ms = late_by.as_secs_f64() * 1000.0,
                "sweep overrun, rescheduling from now"
            );
            // No catch-up burst: one late sweep covers every missed one.
            self.next_sweep = now + interval;
        } else {
            self.next_sweep = deadline + interval;
        }

        trace!(sweep = self.sweep_count, overrun, "sweep due");

        SweepInfo {
            sweep: self.sweep_count,
            overrun,
            late_by,
        }
    }

    /// Record whether the sweep that just fired published a new version.
    pub fn record_outcome(&mut self, published: bool) {
        if published {
            self.metrics.total_published += 1;
        }
    }

    /// Pause sweeping. Idempotent.
    pub fn pause(&mut self) {
        if !self.paused {
            self.paused = true;
            debug!(sweep = self.sweep_count, "sweep scheduler paused");
        }
    }

    /// Resume sweeping. The next sweep is due one interval from now, so
    /// time spent paused never produces a burst. If no sweep has fired yet,
    /// the first-sweep jitter is drawn again on top. Idempotent.
    pub fn resume(&mut self) {
        if self.paused {
            self.paused = false;
            let jitter = if self.sweep_count == 0 {
                first_sweep_jitter(&self.config)
            } else {
                Duration::ZERO
            };
            self.next_sweep = Instant::now() + self.config.interval + jitter;
            debug!(
                sweep = self.sweep_count,
                jitter_us = jitter.as_micros() as u64,
                "sweep scheduler resumed"
            );
        }
    }

    /// Whether the scheduler is currently paused.
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Number of sweeps fired so far.
    pub fn sweep_count(&self) -> u64 {
        self.sweep_count
    }

    /// Snapshot of current metrics.
    pub fn metrics(&self) -> &SweepMetrics {
        &self.metrics
    }

    /// The configured interval.
    pub fn interval(&self) -> Duration {
        self.config.interval
    }
}

/// Random delay in `0..initial_jitter_us` for the first sweep.
fn first_sweep_jitter(config: &SweepConfig) -> Duration {
    if config.initial_jitter_us > 0 {
        Duration::from_micros(rand::rng().random_range(0..config.initial_jitter_us))
    } else {
        Duration::ZERO
    }
}
