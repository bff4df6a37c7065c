//! Recording session state machine
//!
//! Tracks which recording mode is active and where the session cursor is
//! along its termination axis (seconds for time-bounded and pipe sessions,
//! frames for frame-bounded ones). The render loop calls
//! [`RecordingSession::on_frame_emitted`] once per rendered frame.

use crate::recorder::channel::{RecordingError, RecordingResult};
use crate::recorder::config::validate_fps;
use serde::Serialize;

/// Slack when comparing the time cursor against its end bound
const TIME_EPSILON: f64 = 1e-9;

/// Frame delta before any session has been started (24 fps)
const DEFAULT_FRAME_DELTA: f64 = 1.0 / 24.0;

/// Active recording mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RecordingMode {
    Idle,
    /// Local sequence bounded by wall-clock seconds
    TimeBounded,
    /// Local sequence bounded by a frame count
    FrameBounded,
    /// Streaming to an encoder, bounded by seconds
    PipeBounded,
}

/// Position along the session's termination axis
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "axis", rename_all = "camelCase")]
pub enum Cursor {
    Seconds { start: f64, head: f64, end: f64 },
    Frames { start: i64, head: i64, end: i64 },
}

/// Result of advancing the session by one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameAdvance {
    /// No session is active
    Idle,
    /// The session continues
    Recording,
    /// This frame reached the end bound; the session is now idle
    Finished(RecordingMode),
}

/// The recording session: mode, cursor and frame counter
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordingSession {
    mode: RecordingMode,
    cursor: Cursor,
    /// Seconds per frame
    frame_delta: f64,
    /// Frames emitted since the session started
    counter: u64,
    /// Frames emitted along the seconds axis, used to place `head`
    steps: u64,
}

impl Default for RecordingSession {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingSession {
    pub fn new() -> Self {
        Self {
            mode: RecordingMode::Idle,
            cursor: Cursor::Seconds {
                start: 0.0,
                head: 0.0,
                end: 0.0,
            },
            frame_delta: DEFAULT_FRAME_DELTA,
            counter: 0,
            steps: 0,
        }
    }

    /// Check a seconds range and frame rate before starting
    pub fn validate_seconds(start: f64, end: f64, fps: f64) -> RecordingResult<()> {
        validate_fps(fps)?;
        if !start.is_finite() || !end.is_finite() || end <= start {
            return Err(RecordingError::ConfigurationError(format!(
                "Invalid recording range {}s..{}s",
                start, end
            )));
        }
        Ok(())
    }

    /// Check a frame range and frame rate before starting
    pub fn validate_frames(start: i64, end: i64, fps: f64) -> RecordingResult<()> {
        validate_fps(fps)?;
        if end <= start {
            return Err(RecordingError::ConfigurationError(format!(
                "Invalid recording range frame {}..{}",
                start, end
            )));
        }
        Ok(())
    }

    /// Start a local sequence bounded by seconds
    pub fn start_by_seconds(&mut self, start: f64, end: f64, fps: f64) -> RecordingResult<()> {
        Self::validate_seconds(start, end, fps)?;
        self.begin_seconds(RecordingMode::TimeBounded, start, end, fps);
        Ok(())
    }

    /// Start a local sequence bounded by frame numbers
    pub fn start_by_frames(&mut self, start: i64, end: i64, fps: f64) -> RecordingResult<()> {
        Self::validate_frames(start, end, fps)?;
        self.mode = RecordingMode::FrameBounded;
        self.cursor = Cursor::Frames {
            start,
            head: start,
            end,
        };
        self.frame_delta = 1.0 / fps;
        self.counter = 0;
        self.steps = 0;
        Ok(())
    }

    /// Start the bookkeeping for a pipe recording bounded by seconds
    pub fn start_pipe(&mut self, start: f64, end: f64, fps: f64) -> RecordingResult<()> {
        Self::validate_seconds(start, end, fps)?;
        self.begin_seconds(RecordingMode::PipeBounded, start, end, fps);
        Ok(())
    }

    fn begin_seconds(&mut self, mode: RecordingMode, start: f64, end: f64, fps: f64) {
        self.mode = mode;
        self.cursor = Cursor::Seconds {
            start,
            head: start,
            end,
        };
        self.frame_delta = 1.0 / fps;
        self.counter = 0;
        self.steps = 0;
    }

    /// Advance the cursor by one frame, going idle when the end is reached
    pub fn on_frame_emitted(&mut self) -> FrameAdvance {
        if self.mode == RecordingMode::Idle {
            return FrameAdvance::Idle;
        }

        self.counter += 1;

        let reached_end = match &mut self.cursor {
            Cursor::Seconds { start, head, end } => {
                self.steps += 1;
                *head = *start + self.steps as f64 * self.frame_delta;
                *head >= *end - TIME_EPSILON
            }
            Cursor::Frames { head, end, .. } => {
                *head += 1;
                *head >= *end
            }
        };

        if reached_end {
            let finished = self.mode;
            self.mode = RecordingMode::Idle;
            FrameAdvance::Finished(finished)
        } else {
            FrameAdvance::Recording
        }
    }

    /// End the session now. Returns the mode that was active.
    pub fn stop(&mut self) -> RecordingMode {
        std::mem::replace(&mut self.mode, RecordingMode::Idle)
    }

    pub fn mode(&self) -> RecordingMode {
        self.mode
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn is_recording(&self) -> bool {
        self.mode != RecordingMode::Idle
    }

    /// Fraction of the session completed, in `[0, 1]`; `1.0` when idle
    pub fn percentage_complete(&self) -> f64 {
        if !self.is_recording() {
            return 1.0;
        }

        let fraction = match self.cursor {
            Cursor::Seconds { start, head, end } => (head - start) / (end - start),
            Cursor::Frames { start, head, end } => {
                (head as f64 - start as f64) / (end as f64 - start as f64)
            }
        };
        fraction.clamp(0.0, 1.0)
    }

    /// Absolute frame number of the current frame
    pub fn current_frame_index(&self) -> i64 {
        match self.cursor {
            Cursor::Seconds { start, .. } => {
                let first = (start / self.frame_delta + 1e-6).floor() as i64;
                first.saturating_add(i64::try_from(self.counter).unwrap_or(i64::MAX))
            }
            Cursor::Frames { head, .. } => head,
        }
    }

    /// Current position in seconds
    pub fn current_time(&self) -> f64 {
        match self.cursor {
            Cursor::Seconds { head, .. } => head,
            Cursor::Frames { head, .. } => head as f64 * self.frame_delta,
        }
    }

    /// Frames emitted since the session started
    pub fn frame_count(&self) -> u64 {
        self.counter
    }

    /// Seconds per frame
    pub fn frame_delta(&self) -> f64 {
        self.frame_delta
    }

    /// Frames per second of the current or last session
    pub fn fps(&self) -> f64 {
        1.0 / self.frame_delta
    }

    pub(crate) fn reset_counter(&mut self) {
        self.counter = 0;
    }
}
