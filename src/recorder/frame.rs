//! Owned raw frame buffers

use crate::recorder::channel::{RecordingError, RecordingResult};

/// Raw pixel data for one rendered frame.
///
/// Pixels are packed row-major, `channels` bytes per pixel with no row padding.
/// A frame is not `Clone`: it has exactly one owner as it moves from the
/// render loop through the frame queue into the feeder.
#[derive(Debug)]
pub struct Frame {
    data: Vec<u8>,
    width: u32,
    height: u32,
    channels: u8,
}

impl Frame {
    /// Create a zero-filled frame
    pub fn new(width: u32, height: u32, channels: u8) -> Self {
        let len = Self::byte_len(width, height, channels);
        Self {
            data: vec![0; len],
            width,
            height,
            channels,
        }
    }

    /// Wrap an existing pixel buffer, checking its length against the dimensions
    pub fn from_pixels(
        width: u32,
        height: u32,
        channels: u8,
        data: Vec<u8>,
    ) -> RecordingResult<Self> {
        let expected = Self::byte_len(width, height, channels);
        if data.len() != expected {
            return Err(RecordingError::FrameSizeMismatch {
                expected,
                actual: data.len(),
            });
        }

        Ok(Self {
            data,
            width,
            height,
            channels,
        })
    }

    /// Number of bytes a frame of these dimensions occupies
    pub fn byte_len(width: u32, height: u32, channels: u8) -> usize {
        width as usize * height as usize * channels as usize
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> u8 {
        self.channels
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Bytes per row
    pub fn stride(&self) -> usize {
        self.width as usize * self.channels as usize
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Give up ownership of the pixel buffer
    pub fn into_pixels(self) -> Vec<u8> {
        self.data
    }
}
