//! In-memory encoder sink
//!
//! Captures every frame written to it. Used for dry runs and to observe
//! ordering and pacing without an encoder process.

use crate::recorder::channel::{EncoderSink, SinkOpener};
use crate::recorder::config::RecordingSettings;
use parking_lot::Mutex as ParkingMutex;
use std::io;
use std::sync::Arc;
use std::time::Instant;

#[derive(Debug, Default)]
struct Captured {
    frames: Vec<Vec<u8>>,
    written_at: Vec<Instant>,
    opens: usize,
    closes: usize,
}

/// Sink that keeps written frames in memory. Clones share the same storage.
#[derive(Debug, Clone)]
pub struct MemorySink {
    captured: Arc<ParkingMutex<Captured>>,
    keep_pixels: bool,
}

impl MemorySink {
    pub fn new() -> Self {
        Self {
            captured: Arc::default(),
            keep_pixels: true,
        }
    }

    /// Sink that only counts frames, discarding their pixels
    pub fn counting() -> Self {
        Self {
            captured: Arc::default(),
            keep_pixels: false,
        }
    }

    /// Opener that hands out this sink for every session
    pub fn opener(&self) -> MemoryOpener {
        MemoryOpener { sink: self.clone() }
    }

    /// Frames written so far, in write order
    pub fn frames(&self) -> Vec<Vec<u8>> {
        self.captured.lock().frames.clone()
    }

    pub fn frame_count(&self) -> usize {
        self.captured.lock().written_at.len()
    }

    /// When each frame was written
    pub fn write_times(&self) -> Vec<Instant> {
        self.captured.lock().written_at.clone()
    }

    pub fn open_count(&self) -> usize {
        self.captured.lock().opens
    }

    pub fn close_count(&self) -> usize {
        self.captured.lock().closes
    }
}

impl Default for MemorySink {
    fn default() -> Self {
        Self::new()
    }
}

impl EncoderSink for MemorySink {
    fn write_frame(&mut self, bytes: &[u8]) -> io::Result<usize> {
        let mut captured = self.captured.lock();
        if self.keep_pixels {
            captured.frames.push(bytes.to_vec());
        }
        captured.written_at.push(Instant::now());
        Ok(bytes.len())
    }

    fn close(&mut self) -> io::Result<()> {
        self.captured.lock().closes += 1;
        Ok(())
    }
}

/// Opens a shared [`MemorySink`]
#[derive(Debug, Clone)]
pub struct MemoryOpener {
    sink: MemorySink,
}

impl SinkOpener for MemoryOpener {
    fn open(&self, settings: &RecordingSettings) -> io::Result<Box<dyn EncoderSink>> {
        self.sink.captured.lock().opens += 1;
        tracing::debug!(
            "Opened in-memory sink for {}x{}x{} frames",
            settings.width,
            settings.height,
            settings.channels
        );
        Ok(Box::new(self.sink.clone()))
    }
}
