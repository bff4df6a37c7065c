//! Recording commands

use crate::commands::{FrameArgs, PipeArgs, SequenceArgs};
use crate::encoder::memory::MemorySink;
use crate::encoder::sequence::SequenceWriter;
use crate::recorder::{
    PacingPolicy, PipeReport, RecordingCoordinator, RecordingResult, RecordingSettings,
};
use crate::render::TestPattern;
use anyhow::Context;
use parking_lot::Mutex as ParkingMutex;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Recorder shared between the render loop and the signal handler
#[derive(Clone)]
pub struct RecorderState {
    pub coordinator: Arc<ParkingMutex<RecordingCoordinator>>,
    stop_requested: Arc<AtomicBool>,
}

impl RecorderState {
    pub fn new(coordinator: RecordingCoordinator) -> Self {
        Self {
            coordinator: Arc::new(ParkingMutex::new(coordinator)),
            stop_requested: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Ask the render loop to stop after the current frame
    pub fn request_stop(&self) {
        self.stop_requested.store(true, Ordering::SeqCst);
    }

    pub fn stop_requested(&self) -> bool {
        self.stop_requested.load(Ordering::SeqCst)
    }
}

impl FrameArgs {
    fn apply(&self, settings: &mut RecordingSettings) {
        if let Some(width) = self.width {
            settings.width = width;
        }
        if let Some(height) = self.height {
            settings.height = height;
        }
        if let Some(channels) = self.channels {
            settings.channels = channels;
        }
        if let Some(fps) = self.fps {
            settings.fps = fps;
        }
    }
}

fn default_output_path() -> PathBuf {
    PathBuf::from(format!(
        "recording-{}.mp4",
        chrono::Local::now().format("%Y%m%d-%H%M%S")
    ))
}

/// Resolve pipe settings from the config file and command-line flags
pub fn pipe_settings(args: &PipeArgs) -> anyhow::Result<RecordingSettings> {
    let mut settings = match &args.config {
        Some(path) => RecordingSettings::load(path)
            .with_context(|| format!("Failed to load settings from {}", path.display()))?,
        None => RecordingSettings::default(),
    };

    args.frame.apply(&mut settings);
    if let Some(output) = &args.output {
        settings.output_path = Some(output.clone());
    }
    if settings.output_path.is_none() {
        settings.output_path = Some(default_output_path());
    }
    if let Some(encoder) = &args.encoder_path {
        settings.encoder_path = encoder.clone();
    }
    if let Some(codec) = &args.codec {
        settings.video_codec = codec.clone();
    }
    if let Some(bitrate) = args.bitrate {
        settings.bitrate_kbps = bitrate;
    }
    if args.overwrite {
        settings.overwrite = true;
    }
    if args.no_flip {
        settings.flip_vertical = false;
    }
    if args.catch_up {
        settings.pacing = PacingPolicy::CatchUp;
    }

    settings.validate()?;
    Ok(settings)
}

/// Record the test pattern through the encoder pipe
pub async fn run_pipe(args: PipeArgs) -> anyhow::Result<()> {
    let settings = pipe_settings(&args)?;
    let fps = settings.fps;

    let coordinator = if args.dry_run {
        RecordingCoordinator::with_opener(MemorySink::counting().opener())
    } else {
        RecordingCoordinator::new()
    };
    let state = RecorderState::new(coordinator);

    state
        .coordinator
        .lock()
        .start_pipe(settings.clone(), args.start, args.start + args.duration, fps)
        .context("Failed to start recording")?;

    let signal = {
        let state = state.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("Interrupted, finishing queued frames");
                state.request_stop();
            }
        })
    };

    let pattern = TestPattern::new(settings.width, settings.height, settings.channels);
    let render_fps = args.render_fps;
    let render_state = state.clone();
    let report =
        tokio::task::spawn_blocking(move || render_pipe(&render_state, pattern, render_fps))
            .await
            .context("Render loop panicked")??;
    signal.abort();

    if let Some(report) = report {
        if args.report {
            println!("{}", serde_json::to_string_pretty(&report)?);
        } else {
            tracing::info!(
                "Recorded {} frames ({} dropped) to {:?}",
                report.frames_written,
                report.frames_dropped,
                report.output_path
            );
        }
    }

    Ok(())
}

/// Drive the render loop until the session ends or a stop is requested
pub fn render_pipe(
    state: &RecorderState,
    pattern: TestPattern,
    render_fps: f64,
) -> RecordingResult<Option<PipeReport>> {
    let interval = (render_fps > 0.0).then(|| Duration::from_secs_f64(1.0 / render_fps));
    let mut index = 0u64;

    loop {
        let started = Instant::now();
        {
            let mut coordinator = state.coordinator.lock();
            if !coordinator.is_recording() || state.stop_requested() {
                break;
            }

            let frame = pattern.render(index, coordinator.current_time());
            coordinator.submit_frame(frame)?;
            coordinator.advance();

            if index % 100 == 0 {
                tracing::debug!(
                    "Rendered {} frames ({:.0}%), {} queued",
                    index + 1,
                    coordinator.percentage_complete() * 100.0,
                    coordinator.pending_frames()
                );
            }
        }
        index += 1;

        if let Some(interval) = interval {
            std::thread::sleep(interval.saturating_sub(started.elapsed()));
        }
    }

    state.coordinator.lock().stop()
}

/// Write the test pattern as a PNG sequence
pub async fn run_sequence(args: SequenceArgs) -> anyhow::Result<()> {
    let dir = args.dir.clone();
    let written = tokio::task::spawn_blocking(move || record_sequence(&args))
        .await
        .context("Sequence writer panicked")??;

    tracing::info!("Wrote {} frames to {}", written, dir.display());
    Ok(())
}

/// Render and write every frame of a time- or frame-bounded session
pub fn record_sequence(args: &SequenceArgs) -> anyhow::Result<usize> {
    let mut settings = RecordingSettings {
        width: 640,
        height: 360,
        ..Default::default()
    };
    args.frame.apply(&mut settings);
    settings.validate()?;
    let fps = settings.fps;

    let mut coordinator = RecordingCoordinator::new();
    if args.by_frames {
        coordinator.start_by_frames(args.start as i64, args.end as i64, fps)?;
    } else {
        coordinator.start_by_seconds(args.start, args.end, fps)?;
    }

    let pattern = TestPattern::new(settings.width, settings.height, settings.channels);
    let writer = SequenceWriter::new(&args.dir, args.prefix.clone()).with_flip_vertical(args.flip);
    let mut written = 0;

    while coordinator.is_recording() {
        let index = coordinator.current_frame_index();
        let frame = pattern.render(index.max(0) as u64, coordinator.current_time());
        writer
            .write(&frame, index)
            .with_context(|| format!("Failed to write frame {}", index))?;
        coordinator.advance();
        written += 1;
    }

    Ok(written)
}
