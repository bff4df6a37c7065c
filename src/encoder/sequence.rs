//! PNG image-sequence output
//!
//! Local sequence recordings (time- or frame-bounded) bypass the encoder pipe
//! and write every frame to its own numbered PNG file.

use crate::recorder::channel::{RecordingError, RecordingResult};
use crate::recorder::frame::Frame;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

/// Writes frames as `<dir>/<prefix><index>.png`
#[derive(Debug, Clone)]
pub struct SequenceWriter {
    dir: PathBuf,
    prefix: String,
    flip_vertical: bool,
}

impl SequenceWriter {
    pub fn new(dir: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            prefix: prefix.into(),
            flip_vertical: false,
        }
    }

    /// Flip rows when writing (bottom-up read-back)
    pub fn with_flip_vertical(mut self, flip: bool) -> Self {
        self.flip_vertical = flip;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file for frame `index`
    pub fn frame_path(&self, index: i64) -> PathBuf {
        self.dir.join(format!("{}{:05}.png", self.prefix, index))
    }

    /// Encode `frame` to the file for `index`, creating the directory if needed
    pub fn write(&self, frame: &Frame, index: i64) -> RecordingResult<PathBuf> {
        std::fs::create_dir_all(&self.dir)?;

        let path = self.frame_path(index);
        let file = File::create(&path)?;
        write_png(BufWriter::new(file), frame, self.flip_vertical)
            .map_err(|e| RecordingError::EncodingError(format!("{}: {}", path.display(), e)))?;

        tracing::trace!("Wrote frame {} to {:?}", index, path);
        Ok(path)
    }
}

fn color_type(channels: u8) -> png::ColorType {
    match channels {
        1 => png::ColorType::Grayscale,
        4 => png::ColorType::Rgba,
        _ => png::ColorType::Rgb,
    }
}

fn write_png<W: std::io::Write>(w: W, frame: &Frame, flip: bool) -> Result<(), png::EncodingError> {
    let mut encoder = png::Encoder::new(w, frame.width(), frame.height());
    encoder.set_color(color_type(frame.channels()));
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder.write_header()?;

    if flip {
        let stride = frame.stride();
        let flipped: Vec<u8> = frame
            .as_bytes()
            .chunks_exact(stride)
            .rev()
            .flatten()
            .copied()
            .collect();
        writer.write_image_data(&flipped)
    } else {
        writer.write_image_data(frame.as_bytes())
    }
}
