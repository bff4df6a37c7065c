//! Frame recording pipeline
//!
//! The render loop drives a [`RecordingCoordinator`]: it starts a session,
//! submits one [`Frame`] and calls `advance` per rendered frame, and stops.
//! In pipe mode frames travel through an SPSC queue to a paced feeder thread
//! that writes them to an [`EncoderSink`].

pub mod channel;
pub mod config;
pub mod coordinator;
pub mod feeder;
pub mod frame;
pub mod pacing;
pub mod queue;
pub mod state;

pub use channel::{EncoderSink, RecordingError, RecordingResult, SinkOpener};
pub use config::RecordingSettings;
pub use coordinator::{PipeReport, RecordingCoordinator};
pub use feeder::FeederStats;
pub use frame::Frame;
pub use pacing::{PacingClock, PacingPolicy, MIN_FPS};
pub use queue::{frame_queue, FrameConsumer, FrameProducer, QueueClosed};
pub use state::{Cursor, FrameAdvance, RecordingMode, RecordingSession};
