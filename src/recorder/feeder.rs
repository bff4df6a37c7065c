//! Background feeder that drains the frame queue into the encoder sink
//!
//! The feeder keeps running after the recording flag is cleared until every
//! queued frame has been written, then closes the sink exactly once.

use crate::recorder::channel::{ClosingSink, EncoderSink};
use crate::recorder::frame::Frame;
use crate::recorder::pacing::{PacingClock, PacingPolicy};
use crate::recorder::queue::{FrameConsumer, QueueClosed};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

/// Longest wait on an empty queue before re-checking the recording flag
const IDLE_WAIT: Duration = Duration::from_millis(10);

/// Shortest sleep while waiting for the next frame slot
const MIN_SLEEP: Duration = Duration::from_micros(100);

/// Counters reported by a finished feeder
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeederStats {
    pub frames_written: u64,
    pub frames_dropped: u64,
    pub bytes_written: u64,
}

/// Handle to a running feeder thread
#[derive(Debug)]
pub struct Feeder {
    handle: JoinHandle<FeederStats>,
}

impl Feeder {
    /// Start draining `consumer` into `sink` at `fps`.
    ///
    /// The sink is closed even if the thread cannot be spawned.
    pub fn spawn(
        consumer: FrameConsumer,
        sink: Box<dyn EncoderSink>,
        recording: Arc<AtomicBool>,
        fps: f64,
        policy: PacingPolicy,
    ) -> std::io::Result<Self> {
        let sink = ClosingSink::new(sink);
        let handle = std::thread::Builder::new()
            .name("frame-feeder".to_string())
            .spawn(move || feed(consumer, sink, recording, fps, policy))?;

        Ok(Self { handle })
    }

    /// Whether the thread has exited and can be joined without blocking
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the queue to drain and the sink to close
    pub fn join(self) -> FeederStats {
        match self.handle.join() {
            Ok(stats) => stats,
            Err(_) => {
                tracing::error!("Frame feeder thread panicked");
                FeederStats::default()
            }
        }
    }
}

fn feed(
    consumer: FrameConsumer,
    mut sink: ClosingSink,
    recording: Arc<AtomicBool>,
    fps: f64,
    policy: PacingPolicy,
) -> FeederStats {
    let mut clock = PacingClock::new(fps);
    let mut stats = FeederStats::default();
    let mut announced_drain = false;

    tracing::debug!("Frame feeder started at {}fps ({:?})", fps, policy);

    loop {
        let frame = match consumer.consume() {
            Some(frame) => frame,
            None if !recording.load(Ordering::Acquire) => break,
            None => match consumer.consume_timeout(IDLE_WAIT) {
                Ok(Some(frame)) => frame,
                Ok(None) => continue,
                Err(QueueClosed) => break,
            },
        };

        if !announced_drain && !recording.load(Ordering::Acquire) {
            tracing::info!(
                "Recording stopped, finishing frame queue - {} remaining frames at {} fps",
                consumer.size() + 1,
                fps
            );
            announced_drain = true;
        }

        loop {
            let now = Instant::now();
            if clock.allowance(policy, now) > 0 {
                break;
            }
            std::thread::sleep(clock.time_until_due(now).max(MIN_SLEEP));
        }

        write_frame(&mut sink, &frame, &mut stats);
        clock.mark_emitted(Instant::now());
    }

    sink.close();

    tracing::info!(
        "Frame feeder finished: {} frames written, {} dropped",
        stats.frames_written,
        stats.frames_dropped
    );
    stats
}

/// Write one frame, counting a short or failed write as dropped
fn write_frame(sink: &mut ClosingSink, frame: &Frame, stats: &mut FeederStats) {
    let expected = frame.len();
    match sink.write_frame(frame.as_bytes()) {
        Ok(written) if written == expected => {
            stats.frames_written += 1;
            stats.bytes_written += written as u64;
        }
        Ok(written) => {
            tracing::warn!(
                "Unable to write the frame: {} of {} bytes accepted",
                written,
                expected
            );
            stats.frames_dropped += 1;
        }
        Err(e) => {
            tracing::warn!("Unable to write the frame: {}", e);
            stats.frames_dropped += 1;
        }
    }
}
