//! Frame pacing for the encoder feeder
//!
//! The encoder expects frames at a constant cadence while the render loop
//! produces them in bursts. The clock throttles the feeder to at most one
//! write per frame duration; bursts queue up and drain at that cadence.

use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Slowest accepted frame rate (one frame every 1000 seconds)
pub const MIN_FPS: f64 = 0.001;

/// How the feeder converts elapsed time into writes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PacingPolicy {
    /// One frame per tick, never more
    #[default]
    FixedCadence,
    /// Write every frame owed since the clock started, back-to-back if behind
    CatchUp,
}

/// Tracks when the next frame may be written
#[derive(Debug, Clone)]
pub struct PacingClock {
    frame_duration: Duration,
    started: Instant,
    last_frame: Instant,
    frames_emitted: u64,
}

impl PacingClock {
    pub fn new(fps: f64) -> Self {
        Self::starting_at(fps, Instant::now())
    }

    /// Create a clock whose first frame is due one frame duration after `now`.
    ///
    /// Rates below [`MIN_FPS`] (or not finite) pace at [`MIN_FPS`].
    pub fn starting_at(fps: f64, now: Instant) -> Self {
        let fps = if fps.is_finite() { fps.max(MIN_FPS) } else { MIN_FPS };
        Self {
            frame_duration: Duration::from_secs_f64(1.0 / fps),
            started: now,
            last_frame: now,
            frames_emitted: 0,
        }
    }

    pub fn frame_duration(&self) -> Duration {
        self.frame_duration
    }

    pub fn frames_emitted(&self) -> u64 {
        self.frames_emitted
    }

    /// Whether a full frame duration has passed since the last write
    pub fn is_due(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.last_frame) >= self.frame_duration
    }

    /// Time left until the next frame is due (zero if already due)
    pub fn time_until_due(&self, now: Instant) -> Duration {
        (self.last_frame + self.frame_duration).saturating_duration_since(now)
    }

    /// Frames that should have been written by `now` but were not
    pub fn frames_owed(&self, now: Instant) -> u64 {
        let elapsed = now.saturating_duration_since(self.started);
        let expected = elapsed.as_nanos() / self.frame_duration.as_nanos().max(1);
        (expected as u64).saturating_sub(self.frames_emitted)
    }

    /// Number of frames the feeder may write at `now` under `policy`
    pub fn allowance(&self, policy: PacingPolicy, now: Instant) -> u64 {
        match policy {
            PacingPolicy::FixedCadence => u64::from(self.is_due(now)),
            PacingPolicy::CatchUp => self.frames_owed(now),
        }
    }

    /// Record a frame write
    pub fn mark_emitted(&mut self, now: Instant) {
        self.last_frame = now;
        self.frames_emitted += 1;
    }
}
