//! Recording settings
//!
//! Settings are fixed for the lifetime of a recording session. They can be
//! loaded from a JSON file and are then overridden by command-line flags.

use crate::recorder::channel::{RecordingError, RecordingResult};
use crate::recorder::frame::Frame;
use crate::recorder::pacing::{PacingPolicy, MIN_FPS};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Encoder executable used when none is configured
pub const DEFAULT_ENCODER_PATH: &str = "ffmpeg";

/// Configuration for a pipe recording session
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RecordingSettings {
    /// Encoded output file
    pub output_path: Option<PathBuf>,

    /// Encoder executable (name on PATH or absolute path)
    pub encoder_path: String,

    /// Target frame rate
    pub fps: f64,

    pub width: u32,
    pub height: u32,

    /// Bytes per pixel: 1 (gray), 3 (rgb) or 4 (rgba)
    pub channels: u8,

    /// Output codec passed to the encoder
    pub video_codec: String,

    /// Output bitrate hint in kbps
    pub bitrate_kbps: u32,

    /// Extra encoder arguments placed before the input
    pub extra_input_args: Vec<String>,

    /// Extra encoder arguments placed before the output path
    pub extra_output_args: Vec<String>,

    /// Allow replacing an existing output file
    pub overwrite: bool,

    /// Flip rows vertically (bottom-up GL read-back)
    pub flip_vertical: bool,

    /// How the feeder paces writes to the encoder
    pub pacing: PacingPolicy,
}

impl Default for RecordingSettings {
    fn default() -> Self {
        Self {
            output_path: None,
            encoder_path: DEFAULT_ENCODER_PATH.to_string(),
            fps: 24.0,
            width: 1280,
            height: 720,
            channels: 3,
            video_codec: "libx264".to_string(),
            bitrate_kbps: 5000,
            extra_input_args: Vec::new(),
            extra_output_args: Vec::new(),
            overwrite: false,
            flip_vertical: true,
            pacing: PacingPolicy::default(),
        }
    }
}

impl RecordingSettings {
    /// Load settings from a JSON file. Missing fields take their defaults.
    pub fn load(path: &Path) -> RecordingResult<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            RecordingError::ConfigurationError(format!(
                "Failed to parse settings {}: {}",
                path.display(),
                e
            ))
        })
    }

    /// Bytes in one frame
    pub fn frame_len(&self) -> usize {
        Frame::byte_len(self.width, self.height, self.channels)
    }

    /// Encoder executable, falling back to the default when unset
    pub fn encoder(&self) -> &str {
        if self.encoder_path.trim().is_empty() {
            DEFAULT_ENCODER_PATH
        } else {
            &self.encoder_path
        }
    }

    /// Check the raw video description
    pub fn validate(&self) -> RecordingResult<()> {
        validate_fps(self.fps)?;

        if self.width == 0 || self.height == 0 {
            return Err(RecordingError::ConfigurationError(format!(
                "Invalid frame size {}x{}",
                self.width, self.height
            )));
        }

        if !matches!(self.channels, 1 | 3 | 4) {
            return Err(RecordingError::ConfigurationError(format!(
                "Unsupported channel count {}",
                self.channels
            )));
        }

        Ok(())
    }

    /// Resolve the output path, refusing to clobber existing files unless allowed
    pub fn validate_output(&self) -> RecordingResult<&Path> {
        let path = self
            .output_path
            .as_deref()
            .filter(|p| !p.as_os_str().is_empty())
            .ok_or_else(|| RecordingError::InvalidOutput("Output path is not set".to_string()))?;

        if path.exists() && !self.overwrite {
            return Err(RecordingError::InvalidOutput(format!(
                "{} already exists and overwriting is disabled",
                path.display()
            )));
        }

        Ok(path)
    }
}

/// Frame rates must be finite and at least [`MIN_FPS`]
pub(crate) fn validate_fps(fps: f64) -> RecordingResult<()> {
    if !fps.is_finite() || fps < MIN_FPS {
        return Err(RecordingError::ConfigurationError(format!(
            "Frame rate must be at least {}, got {}",
            MIN_FPS, fps
        )));
    }
    Ok(())
}
