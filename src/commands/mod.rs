//! Command-line front end
//!
//! `pipe` streams a synthetic render loop into FFmpeg; `sequence` writes it
//! out as numbered PNG files.

pub mod recording;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "frame-recorder", version, about = "Record a render loop to video")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Stream frames to an encoder process
    Pipe(PipeArgs),
    /// Write frames as a PNG image sequence
    Sequence(SequenceArgs),
}

/// Frame geometry shared by both commands
#[derive(Debug, Clone, Args)]
pub struct FrameArgs {
    /// Frame width in pixels
    #[arg(long, value_name = "PX")]
    pub width: Option<u32>,
    /// Frame height in pixels
    #[arg(long, value_name = "PX")]
    pub height: Option<u32>,
    /// Bytes per pixel (1, 3 or 4)
    #[arg(long, value_name = "N")]
    pub channels: Option<u8>,
    /// Target frame rate
    #[arg(long, value_name = "FPS")]
    pub fps: Option<f64>,
}

#[derive(Debug, Args)]
pub struct PipeArgs {
    /// JSON settings file; flags override its values
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
    /// Output video file (defaults to a timestamped name)
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,
    /// Encoder executable
    #[arg(long = "ffmpeg", value_name = "PATH")]
    pub encoder_path: Option<String>,
    #[command(flatten)]
    pub frame: FrameArgs,
    /// Recording start in seconds
    #[arg(long, default_value_t = 0.0)]
    pub start: f64,
    /// Recording length in seconds
    #[arg(long, default_value_t = 5.0)]
    pub duration: f64,
    /// Output codec
    #[arg(long, value_name = "CODEC")]
    pub codec: Option<String>,
    /// Output bitrate in kbps
    #[arg(long, value_name = "KBPS")]
    pub bitrate: Option<u32>,
    /// Replace an existing output file
    #[arg(long, action = clap::ArgAction::SetTrue)]
    pub overwrite: bool,
    /// Keep rows top-down instead of flipping
    #[arg(long = "no-flip", action = clap::ArgAction::SetTrue)]
    pub no_flip: bool,
    /// Write owed frames back-to-back when the feeder falls behind
    #[arg(long = "catch-up", action = clap::ArgAction::SetTrue)]
    pub catch_up: bool,
    /// Render loop rate; 0 renders as fast as possible
    #[arg(long = "render-fps", default_value_t = 0.0)]
    pub render_fps: f64,
    /// Record into memory instead of spawning the encoder
    #[arg(long = "dry-run", action = clap::ArgAction::SetTrue)]
    pub dry_run: bool,
    /// Print the recording report as JSON
    #[arg(long, action = clap::ArgAction::SetTrue)]
    pub report: bool,
}

#[derive(Debug, Args)]
pub struct SequenceArgs {
    /// Output directory
    #[arg(short, long, value_name = "DIR", default_value = "frames")]
    pub dir: PathBuf,
    /// File name prefix
    #[arg(long, default_value = "frame_")]
    pub prefix: String,
    #[command(flatten)]
    pub frame: FrameArgs,
    /// Range start (seconds, or frame number with --by-frames)
    #[arg(long, default_value_t = 0.0)]
    pub start: f64,
    /// Range end (seconds, or frame number with --by-frames)
    #[arg(long, default_value_t = 1.0)]
    pub end: f64,
    /// Interpret the range as frame numbers
    #[arg(long = "by-frames", action = clap::ArgAction::SetTrue)]
    pub by_frames: bool,
    /// Flip rows vertically
    #[arg(long, action = clap::ArgAction::SetTrue)]
    pub flip: bool,
}
