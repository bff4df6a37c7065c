//! Encoder sink trait
//!
//! Defines the byte sink that recorded frames are streamed into, and the
//! errors surfaced by the recording control surface.

use crate::recorder::config::RecordingSettings;
use std::io;
use thiserror::Error;

/// Errors that can occur during recording
#[derive(Error, Debug)]
pub enum RecordingError {
    #[error("Already recording")]
    AlreadyRecording,

    #[error("Not recording")]
    NotRecording,

    #[error("Invalid output: {0}")]
    InvalidOutput(String),

    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("Failed to open encoder sink: {0}")]
    SinkOpenFailed(String),

    #[error("Encoder sink unavailable")]
    SinkUnavailable,

    #[error("Frame size mismatch: expected {expected} bytes, got {actual}")]
    FrameSizeMismatch { expected: usize, actual: usize },

    #[error("Previous recording is still processing ({0} frames remaining)")]
    PreviousSessionDraining(usize),

    #[error("Encoding error: {0}")]
    EncodingError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Result type for recording operations
pub type RecordingResult<T> = Result<T, RecordingError>;

/// Destination for raw video frames.
///
/// A sink is owned by exactly one thread at a time. The feeder calls
/// `write_frame` once per frame, in consumption order, and `close` exactly once.
pub trait EncoderSink: Send {
    /// Write one frame's bytes, returning how many bytes were accepted.
    fn write_frame(&mut self, bytes: &[u8]) -> io::Result<usize>;

    /// Flush and release the sink.
    fn close(&mut self) -> io::Result<()>;
}

/// Opens encoder sinks for a recording session
pub trait SinkOpener: Send + Sync {
    fn open(&self, settings: &RecordingSettings) -> io::Result<Box<dyn EncoderSink>>;
}

impl<F> SinkOpener for F
where
    F: Fn(&RecordingSettings) -> io::Result<Box<dyn EncoderSink>> + Send + Sync,
{
    fn open(&self, settings: &RecordingSettings) -> io::Result<Box<dyn EncoderSink>> {
        self(settings)
    }
}

/// Closes the wrapped sink exactly once, on `close` or on drop.
pub(crate) struct ClosingSink {
    inner: Option<Box<dyn EncoderSink>>,
}

impl ClosingSink {
    pub(crate) fn new(sink: Box<dyn EncoderSink>) -> Self {
        Self { inner: Some(sink) }
    }

    pub(crate) fn write_frame(&mut self, bytes: &[u8]) -> io::Result<usize> {
        match self.inner.as_mut() {
            Some(sink) => sink.write_frame(bytes),
            None => Err(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "encoder sink already closed",
            )),
        }
    }

    pub(crate) fn close(&mut self) {
        if let Some(mut sink) = self.inner.take() {
            if let Err(e) = sink.close() {
                tracing::error!("Error closing encoder sink: {}", e);
            }
        }
    }
}

impl Drop for ClosingSink {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct CountingSink {
        closes: Arc<AtomicUsize>,
    }

    impl EncoderSink for CountingSink {
        fn write_frame(&mut self, bytes: &[u8]) -> io::Result<usize> {
            Ok(bytes.len())
        }

        fn close(&mut self) -> io::Result<()> {
            self.closes.fetch_add(1, Ordering::SeqCst);
            Err(io::Error::other("close failed"))
        }
    }

    #[test]
    fn test_closing_sink_closes_once() {
        let closes = Arc::new(AtomicUsize::new(0));
        let mut sink = ClosingSink::new(Box::new(CountingSink {
            closes: closes.clone(),
        }));

        assert_eq!(sink.write_frame(&[1, 2, 3]).unwrap(), 3);
        sink.close();
        sink.close();
        drop(sink);

        assert_eq!(closes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_closing_sink_closes_on_drop() {
        let closes = Arc::new(AtomicUsize::new(0));
        {
            let _sink = ClosingSink::new(Box::new(CountingSink {
                closes: closes.clone(),
            }));
        }
        assert_eq!(closes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_write_after_close_fails() {
        let closes = Arc::new(AtomicUsize::new(0));
        let mut sink = ClosingSink::new(Box::new(CountingSink { closes }));
        sink.close();
        assert!(sink.write_frame(&[0]).is_err());
    }
}
