//! Single-producer/single-consumer frame queue
//!
//! Frames move from the render loop to the feeder thread through an unbounded
//! lock-free channel. Each end is owned by exactly one thread, so ownership of
//! a frame is always held by either the producer, the queue, or the consumer.

use crate::recorder::frame::Frame;
use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::time::Duration;

/// Create a connected producer/consumer pair
pub fn frame_queue() -> (FrameProducer, FrameConsumer) {
    let (tx, rx) = unbounded();
    (FrameProducer { tx }, FrameConsumer { rx })
}

/// Render-loop side of the queue
#[derive(Debug)]
pub struct FrameProducer {
    tx: Sender<Frame>,
}

impl FrameProducer {
    /// Move a frame into the queue without blocking.
    ///
    /// The frame is handed back if the consumer has gone away.
    pub fn produce(&self, frame: Frame) -> Result<(), Frame> {
        self.tx.send(frame).map_err(|e| e.into_inner())
    }

    /// Approximate number of queued frames
    pub fn size(&self) -> usize {
        self.tx.len()
    }
}

/// Every frame has been consumed and the producer is gone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueClosed;

/// Feeder side of the queue
#[derive(Debug)]
pub struct FrameConsumer {
    rx: Receiver<Frame>,
}

impl FrameConsumer {
    /// Take the oldest queued frame, if any
    pub fn consume(&self) -> Option<Frame> {
        match self.rx.try_recv() {
            Ok(frame) => Some(frame),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }

    /// Block for up to `timeout` waiting for the next frame
    pub fn consume_timeout(&self, timeout: Duration) -> Result<Option<Frame>, QueueClosed> {
        match self.rx.recv_timeout(timeout) {
            Ok(frame) => Ok(Some(frame)),
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => Err(QueueClosed),
        }
    }

    /// Approximate number of queued frames
    pub fn size(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}
