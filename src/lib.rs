//! Frame Recorder - paced recording of a render loop into a video encoder.
//!
//! The render loop submits frames at whatever rate it manages; a background
//! feeder writes them to an FFmpeg pipe at a constant frame rate. Local
//! time- and frame-bounded sessions write PNG sequences instead.

pub mod commands;
pub mod encoder;
pub mod recorder;
pub mod render;

pub use recorder::{
    Frame, FrameAdvance, PipeReport, RecordingCoordinator, RecordingError, RecordingMode,
    RecordingResult, RecordingSettings,
};

use clap::Parser;
use commands::{Cli, Command};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Run the command-line front end
pub async fn run() -> anyhow::Result<()> {
    // Initialize tracing/logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "frame_recorder=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::info!("Starting Frame Recorder v{}", env!("CARGO_PKG_VERSION"));

    match Cli::parse().command {
        Command::Pipe(args) => commands::recording::run_pipe(args).await,
        Command::Sequence(args) => commands::recording::run_sequence(args).await,
    }
}
