//! Recording coordinator
//!
//! Owns the recording session and, in pipe mode, the frame queue, encoder
//! sink and feeder thread. This is the surface the render loop talks to.

use crate::encoder::ffmpeg::FfmpegOpener;
use crate::recorder::channel::{
    ClosingSink, EncoderSink, RecordingError, RecordingResult, SinkOpener,
};
use crate::recorder::config::RecordingSettings;
use crate::recorder::feeder::{Feeder, FeederStats};
use crate::recorder::frame::Frame;
use crate::recorder::queue::{frame_queue, FrameConsumer, FrameProducer};
use crate::recorder::state::{FrameAdvance, RecordingMode, RecordingSession};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use uuid::Uuid;

/// Summary of a finished pipe recording
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PipeReport {
    pub session_id: Uuid,
    pub output_path: Option<PathBuf>,
    pub frames_submitted: u64,
    pub frames_written: u64,
    pub frames_dropped: u64,
    pub bytes_written: u64,
}

/// Resources of one pipe recording
struct PipeSession {
    id: Uuid,
    settings: RecordingSettings,
    recording: Arc<AtomicBool>,
    producer: FrameProducer,
    /// Handed to the feeder with the sink on the first submitted frame
    pending: Option<(FrameConsumer, Box<dyn EncoderSink>)>,
    feeder: Option<Feeder>,
    frames_submitted: u64,
}

impl PipeSession {
    fn is_recording(&self) -> bool {
        self.recording.load(Ordering::Acquire)
    }

    /// The feeder has exited (or never started) and nothing is left to write
    fn is_drained(&self) -> bool {
        !self.is_recording()
            && match &self.feeder {
                Some(feeder) => feeder.is_finished(),
                None => true,
            }
    }

    fn ensure_feeder(&mut self) -> RecordingResult<()> {
        if self.feeder.is_some() {
            return Ok(());
        }

        let (consumer, sink) = self.pending.take().ok_or(RecordingError::SinkUnavailable)?;
        let feeder = Feeder::spawn(
            consumer,
            sink,
            self.recording.clone(),
            self.settings.fps,
            self.settings.pacing,
        )?;
        self.feeder = Some(feeder);

        tracing::debug!("Started frame feeder for session {}", self.id);
        Ok(())
    }

    /// Clear the flag, wait for the queue to drain and close the sink
    fn finish(mut self) -> PipeReport {
        self.recording.store(false, Ordering::Release);

        let stats = match self.feeder.take() {
            Some(feeder) => feeder.join(),
            None => {
                if let Some((_, sink)) = self.pending.take() {
                    ClosingSink::new(sink).close();
                }
                FeederStats::default()
            }
        };

        // Frames left behind by a feeder that died count as dropped
        let lost = self
            .frames_submitted
            .saturating_sub(stats.frames_written + stats.frames_dropped);
        if lost > 0 {
            tracing::error!("{} submitted frames were never written", lost);
        }

        PipeReport {
            session_id: self.id,
            output_path: self.settings.output_path.clone(),
            frames_submitted: self.frames_submitted,
            frames_written: stats.frames_written,
            frames_dropped: stats.frames_dropped + lost,
            bytes_written: stats.bytes_written,
        }
    }
}

/// Session control surface for a render loop
pub struct RecordingCoordinator {
    session: RecordingSession,
    opener: Box<dyn SinkOpener>,
    pipe: Option<PipeSession>,
}

impl Default for RecordingCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingCoordinator {
    /// Coordinator that records pipe sessions through FFmpeg
    pub fn new() -> Self {
        Self::with_opener(FfmpegOpener)
    }

    pub fn with_opener(opener: impl SinkOpener + 'static) -> Self {
        Self {
            session: RecordingSession::new(),
            opener: Box::new(opener),
            pipe: None,
        }
    }

    /// Start a local sequence bounded by seconds
    pub fn start_by_seconds(&mut self, start: f64, end: f64, fps: f64) -> RecordingResult<()> {
        self.ensure_pipe_idle()?;
        self.session.start_by_seconds(start, end, fps)?;

        tracing::info!("Recording {}s..{}s at {}fps", start, end, fps);
        Ok(())
    }

    /// Start a local sequence bounded by frame numbers
    pub fn start_by_frames(&mut self, start: i64, end: i64, fps: f64) -> RecordingResult<()> {
        self.ensure_pipe_idle()?;
        self.session.start_by_frames(start, end, fps)?;

        tracing::info!("Recording frames {}..{} at {}fps", start, end, fps);
        Ok(())
    }

    /// Start streaming frames to an encoder for `start..end` seconds
    pub fn start_pipe(
        &mut self,
        settings: RecordingSettings,
        start: f64,
        end: f64,
        fps: f64,
    ) -> RecordingResult<()> {
        if self.is_pipe_recording() {
            tracing::warn!("Can't start recording - already started");
            return Err(RecordingError::AlreadyRecording);
        }
        self.ensure_pipe_idle()?;

        let mut settings = settings;
        settings.fps = fps;
        settings.validate_output()?;
        settings.validate()?;
        RecordingSession::validate_seconds(start, end, fps)?;

        let sink = self.opener.open(&settings).map_err(|e| {
            tracing::error!("Unable to start recording: {}", e);
            RecordingError::SinkOpenFailed(e.to_string())
        })?;

        self.session.start_pipe(start, end, fps)?;

        let id = Uuid::new_v4();
        let (producer, consumer) = frame_queue();
        tracing::info!(
            "Pipe recording {} started: {}s..{}s at {}fps to {:?}",
            id,
            start,
            end,
            fps,
            settings.output_path
        );

        self.pipe = Some(PipeSession {
            id,
            settings,
            recording: Arc::new(AtomicBool::new(true)),
            producer,
            pending: Some((consumer, sink)),
            feeder: None,
            frames_submitted: 0,
        });
        Ok(())
    }

    /// Hand a rendered frame to the encoder.
    ///
    /// Only pipe sessions consume frames; time- and frame-bounded sessions
    /// write their frames elsewhere, so the frame is dropped.
    pub fn submit_frame(&mut self, frame: Frame) -> RecordingResult<()> {
        if !self.session.is_recording() {
            tracing::warn!("Can't add new frame - not in recording mode");
            return Err(RecordingError::NotRecording);
        }

        if self.session.mode() != RecordingMode::PipeBounded {
            return Ok(());
        }

        let pipe = self.pipe.as_mut().ok_or(RecordingError::SinkUnavailable)?;

        let expected = pipe.settings.frame_len();
        if frame.len() != expected {
            return Err(RecordingError::FrameSizeMismatch {
                expected,
                actual: frame.len(),
            });
        }

        pipe.ensure_feeder()?;

        if let Err(rejected) = pipe.producer.produce(frame) {
            drop(rejected);
            tracing::error!("Can't add new frame - encoder feeder is gone");
            return Err(RecordingError::SinkUnavailable);
        }
        pipe.frames_submitted += 1;
        Ok(())
    }

    /// Mark one frame as rendered, ending the session at its bound
    pub fn advance(&mut self) -> FrameAdvance {
        let advance = self.session.on_frame_emitted();

        if let FrameAdvance::Finished(mode) = advance {
            if mode == RecordingMode::PipeBounded {
                if let Some(pipe) = &self.pipe {
                    pipe.recording.store(false, Ordering::Release);
                    tracing::info!(
                        "Pipe recording {} reached its end, {} frames still queued",
                        pipe.id,
                        pipe.producer.size()
                    );
                }
            } else {
                tracing::info!("Recording finished after {} frames", self.session.frame_count());
            }
        }

        advance
    }

    /// Stop any recording. In pipe mode this blocks until every queued frame
    /// has been written and the encoder sink is closed.
    pub fn stop(&mut self) -> RecordingResult<Option<PipeReport>> {
        let was = self.session.stop();

        let report = self.pipe.take().map(|pipe| {
            let id = pipe.id;
            tracing::info!("Stopping pipe recording {}", id);
            let report = pipe.finish();
            tracing::info!(
                "Pipe recording {} closed: {} of {} frames written",
                id,
                report.frames_written,
                report.frames_submitted
            );
            report
        });

        if report.is_some() {
            self.session.reset_counter();
        } else if was != RecordingMode::Idle {
            tracing::info!("Recording stopped after {} frames", self.session.frame_count());
        }

        Ok(report)
    }

    /// Join a pipe session whose feeder already drained; fail if one is still writing
    fn ensure_pipe_idle(&mut self) -> RecordingResult<()> {
        let Some(pipe) = &self.pipe else {
            return Ok(());
        };

        if pipe.is_recording() {
            return Err(RecordingError::AlreadyRecording);
        }

        if !pipe.is_drained() {
            return Err(RecordingError::PreviousSessionDraining(pipe.producer.size()));
        }

        if let Some(pipe) = self.pipe.take() {
            let report = pipe.finish();
            tracing::debug!(
                "Reaped pipe recording {} ({} frames written)",
                report.session_id,
                report.frames_written
            );
        }
        Ok(())
    }

    pub fn is_recording(&self) -> bool {
        self.session.is_recording()
    }

    /// Whether frames are currently being accepted for the encoder
    pub fn is_pipe_recording(&self) -> bool {
        self.pipe.as_ref().is_some_and(|pipe| pipe.is_recording())
    }

    /// A finished pipe session still writing its queue
    pub fn is_draining(&self) -> bool {
        self.pipe
            .as_ref()
            .is_some_and(|pipe| !pipe.is_recording() && !pipe.is_drained())
    }

    /// Frames queued but not yet written
    pub fn pending_frames(&self) -> usize {
        self.pipe.as_ref().map_or(0, |pipe| pipe.producer.size())
    }

    pub fn mode(&self) -> RecordingMode {
        self.session.mode()
    }

    pub fn percentage_complete(&self) -> f64 {
        self.session.percentage_complete()
    }

    pub fn current_frame_index(&self) -> i64 {
        self.session.current_frame_index()
    }

    pub fn current_time(&self) -> f64 {
        self.session.current_time()
    }

    pub fn frame_count(&self) -> u64 {
        self.session.frame_count()
    }

    pub fn frame_delta(&self) -> f64 {
        self.session.frame_delta()
    }

    pub fn session(&self) -> &RecordingSession {
        &self.session
    }
}

impl Drop for RecordingCoordinator {
    fn drop(&mut self) {
        if self.pipe.is_some() {
            let _ = self.stop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::memory::MemorySink;
    use crate::recorder::pacing::PacingPolicy;
    use std::io;
    use std::time::{Duration, Instant};

    const W: u32 = 4;
    const H: u32 = 2;

    fn settings(dir: &tempfile::TempDir) -> RecordingSettings {
        RecordingSettings {
            output_path: Some(dir.path().join("out.mp4")),
            width: W,
            height: H,
            channels: 3,
            ..Default::default()
        }
    }

    fn tagged(tag: u8) -> Frame {
        Frame::from_pixels(W, H, 3, vec![tag; (W * H * 3) as usize]).unwrap()
    }

    fn tags(sink: &MemorySink) -> Vec<u8> {
        sink.frames().iter().map(|f| f[0]).collect()
    }

    #[test]
    fn test_time_bounded_session() {
        let mut coordinator = RecordingCoordinator::with_opener(MemorySink::new().opener());
        coordinator.start_by_seconds(0.0, 1.0, 25.0).unwrap();
        assert_eq!(coordinator.mode(), RecordingMode::TimeBounded);

        // Frames are written elsewhere in sequence mode
        coordinator.submit_frame(tagged(0)).unwrap();

        for _ in 0..24 {
            assert_eq!(coordinator.advance(), FrameAdvance::Recording);
        }
        assert!((coordinator.current_time() - 1.0).abs() <= coordinator.frame_delta() + 1e-9);
        assert_eq!(
            coordinator.advance(),
            FrameAdvance::Finished(RecordingMode::TimeBounded)
        );
        assert!(!coordinator.is_recording());
        assert_eq!(coordinator.frame_count(), 25);
    }

    #[test]
    fn test_submit_while_idle_fails() {
        let mut coordinator = RecordingCoordinator::with_opener(MemorySink::new().opener());
        assert!(matches!(
            coordinator.submit_frame(tagged(0)),
            Err(RecordingError::NotRecording)
        ));
        assert_eq!(coordinator.advance(), FrameAdvance::Idle);
    }

    #[test]
    fn test_stop_when_idle_is_noop() {
        let sink = MemorySink::new();
        let mut coordinator = RecordingCoordinator::with_opener(sink.opener());
        assert!(coordinator.stop().unwrap().is_none());
        assert!(coordinator.stop().unwrap().is_none());
        assert_eq!(sink.open_count(), 0);
    }

    #[test]
    fn test_start_pipe_requires_output() {
        let sink = MemorySink::new();
        let mut coordinator = RecordingCoordinator::with_opener(sink.opener());

        let err = coordinator
            .start_pipe(RecordingSettings::default(), 0.0, 1.0, 10.0)
            .unwrap_err();
        assert!(matches!(err, RecordingError::InvalidOutput(_)));
        assert!(!coordinator.is_recording());
        assert_eq!(sink.open_count(), 0);
    }

    #[test]
    fn test_start_pipe_refuses_existing_output() {
        let dir = tempfile::tempdir().unwrap();
        let settings = settings(&dir);
        std::fs::write(settings.output_path.as_ref().unwrap(), b"taken").unwrap();

        let mut coordinator = RecordingCoordinator::with_opener(MemorySink::new().opener());
        let err = coordinator.start_pipe(settings, 0.0, 1.0, 10.0).unwrap_err();
        assert!(matches!(err, RecordingError::InvalidOutput(_)));
        assert_eq!(coordinator.mode(), RecordingMode::Idle);
    }

    #[test]
    fn test_start_pipe_sink_open_failure() {
        let dir = tempfile::tempdir().unwrap();
        let opener = |_: &RecordingSettings| -> io::Result<Box<dyn EncoderSink>> {
            Err(io::Error::new(io::ErrorKind::NotFound, "no encoder"))
        };
        let mut coordinator = RecordingCoordinator::with_opener(opener);

        let err = coordinator.start_pipe(settings(&dir), 0.0, 1.0, 10.0).unwrap_err();
        assert!(matches!(err, RecordingError::SinkOpenFailed(_)));
        assert!(!coordinator.is_recording());
        assert!(coordinator.stop().unwrap().is_none());
    }

    #[test]
    fn test_start_pipe_rejects_rate_too_slow_to_pace() {
        let dir = tempfile::tempdir().unwrap();
        let sink = MemorySink::new();
        let mut coordinator = RecordingCoordinator::with_opener(sink.opener());

        let err = coordinator.start_pipe(settings(&dir), 0.0, 1.0, 1e-25).unwrap_err();
        assert!(matches!(err, RecordingError::ConfigurationError(_)));
        assert!(!coordinator.is_recording());
        assert_eq!(sink.open_count(), 0);
        assert!(matches!(
            coordinator.submit_frame(tagged(0)),
            Err(RecordingError::NotRecording)
        ));
    }

    #[test]
    fn test_start_pipe_keeps_exact_frame_rate() {
        let dir = tempfile::tempdir().unwrap();
        let mut coordinator = RecordingCoordinator::with_opener(MemorySink::new().opener());

        coordinator.start_pipe(settings(&dir), 0.0, 1.0, 29.97).unwrap();
        let pipe = coordinator.pipe.as_ref().unwrap();
        assert_eq!(pipe.settings.fps, 29.97);
        assert_eq!(coordinator.frame_delta(), 1.0 / 29.97);
        coordinator.stop().unwrap();
    }

    struct CrashingSink;

    impl EncoderSink for CrashingSink {
        fn write_frame(&mut self, _bytes: &[u8]) -> io::Result<usize> {
            panic!("encoder crashed");
        }

        fn close(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_submit_after_feeder_died_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let opener = |_: &RecordingSettings| -> io::Result<Box<dyn EncoderSink>> {
            Ok(Box::new(CrashingSink))
        };
        let mut coordinator = RecordingCoordinator::with_opener(opener);

        coordinator.start_pipe(settings(&dir), 0.0, 10.0, 1000.0).unwrap();
        coordinator.submit_frame(tagged(1)).unwrap();
        coordinator.advance();

        let deadline = Instant::now() + Duration::from_secs(5);
        let feeder_exited = |c: &RecordingCoordinator| {
            c.pipe
                .as_ref()
                .and_then(|pipe| pipe.feeder.as_ref())
                .is_some_and(|feeder| feeder.is_finished())
        };
        while !feeder_exited(&coordinator) && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(1));
        }
        assert!(coordinator.is_pipe_recording());

        assert!(matches!(
            coordinator.submit_frame(tagged(2)),
            Err(RecordingError::SinkUnavailable)
        ));

        let report = coordinator.stop().unwrap().unwrap();
        assert_eq!(report.frames_submitted, 1);
        assert_eq!(report.frames_written, 0);
        assert_eq!(report.frames_dropped, 1);
    }

    #[test]
    fn test_start_pipe_twice_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let sink = MemorySink::new();
        let mut coordinator = RecordingCoordinator::with_opener(sink.opener());

        coordinator.start_pipe(settings(&dir), 0.0, 10.0, 100.0).unwrap();
        coordinator.submit_frame(tagged(1)).unwrap();
        coordinator.advance();
        coordinator.submit_frame(tagged(2)).unwrap();
        coordinator.advance();

        let err = coordinator.start_pipe(settings(&dir), 0.0, 5.0, 30.0).unwrap_err();
        assert!(matches!(err, RecordingError::AlreadyRecording));
        assert_eq!(coordinator.frame_count(), 2);
        assert!((coordinator.frame_delta() - 0.01).abs() < 1e-12);
        assert!(coordinator.is_pipe_recording());
        assert_eq!(sink.open_count(), 1);

        assert!(matches!(
            coordinator.start_by_seconds(0.0, 1.0, 24.0),
            Err(RecordingError::AlreadyRecording)
        ));

        let report = coordinator.stop().unwrap().unwrap();
        assert_eq!(report.frames_written, 2);
        assert_eq!(tags(&sink), vec![1, 2]);
    }

    #[test]
    fn test_frame_size_mismatch_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut coordinator = RecordingCoordinator::with_opener(MemorySink::new().opener());
        coordinator.start_pipe(settings(&dir), 0.0, 1.0, 10.0).unwrap();

        let err = coordinator.submit_frame(Frame::new(1, 1, 3)).unwrap_err();
        assert!(matches!(err, RecordingError::FrameSizeMismatch { .. }));
        assert_eq!(coordinator.pending_frames(), 0);
    }

    #[test]
    fn test_stop_drains_all_queued_frames() {
        let dir = tempfile::tempdir().unwrap();
        let sink = MemorySink::new();
        let mut coordinator = RecordingCoordinator::with_opener(sink.opener());
        coordinator.start_pipe(settings(&dir), 0.0, 100.0, 200.0).unwrap();

        for tag in 0..20 {
            coordinator.submit_frame(tagged(tag)).unwrap();
            coordinator.advance();
        }

        let report = coordinator.stop().unwrap().unwrap();
        assert_eq!(report.frames_submitted, 20);
        assert_eq!(report.frames_written, 20);
        assert_eq!(report.bytes_written, 20 * (W * H * 3) as u64);
        assert_eq!(tags(&sink), (0..20).collect::<Vec<_>>());
        assert_eq!(sink.close_count(), 1);
        assert_eq!(coordinator.frame_count(), 0);
        assert!(!coordinator.is_recording());
    }

    #[test]
    fn test_stop_without_frames_closes_sink() {
        let dir = tempfile::tempdir().unwrap();
        let sink = MemorySink::new();
        let mut coordinator = RecordingCoordinator::with_opener(sink.opener());
        coordinator.start_pipe(settings(&dir), 0.0, 1.0, 10.0).unwrap();

        let report = coordinator.stop().unwrap().unwrap();
        assert_eq!(report.frames_written, 0);
        assert_eq!(sink.close_count(), 1);
    }

    #[test]
    fn test_burst_is_paced_at_target_rate() {
        let dir = tempfile::tempdir().unwrap();
        let sink = MemorySink::new();
        let mut coordinator = RecordingCoordinator::with_opener(sink.opener());
        coordinator.start_pipe(settings(&dir), 0.0, 10.0, 10.0).unwrap();

        let k = 5;
        let started = Instant::now();
        for tag in 0..k {
            coordinator.submit_frame(tagged(tag)).unwrap();
            coordinator.advance();
        }
        coordinator.stop().unwrap();
        let elapsed = started.elapsed();

        assert!(
            elapsed >= Duration::from_millis(100) * (k as u32 - 1),
            "drained {} frames in {:?}",
            k,
            elapsed
        );

        let times = sink.write_times();
        assert_eq!(times.len(), k as usize);
        for pair in times.windows(2) {
            assert!(
                pair[1].duration_since(pair[0]) >= Duration::from_millis(100),
                "writes {:?} apart",
                pair[1].duration_since(pair[0])
            );
        }
        assert_eq!(tags(&sink), (0..k).collect::<Vec<_>>());
    }

    #[test]
    fn test_pipe_end_bound_keeps_draining() {
        let dir = tempfile::tempdir().unwrap();
        let sink = MemorySink::new();
        let mut coordinator = RecordingCoordinator::with_opener(sink.opener());
        coordinator.start_pipe(settings(&dir), 0.0, 0.3, 10.0).unwrap();

        for tag in 0..3 {
            coordinator.submit_frame(tagged(tag)).unwrap();
            coordinator.advance();
        }

        assert!(!coordinator.is_recording());
        assert!(!coordinator.is_pipe_recording());
        assert!(matches!(
            coordinator.submit_frame(tagged(9)),
            Err(RecordingError::NotRecording)
        ));

        let report = coordinator.stop().unwrap().unwrap();
        assert_eq!(report.frames_written, 3);
        assert_eq!(tags(&sink), vec![0, 1, 2]);
    }

    #[test]
    fn test_restart_after_drained_pipe() {
        let dir = tempfile::tempdir().unwrap();
        let sink = MemorySink::new();
        let mut coordinator = RecordingCoordinator::with_opener(sink.opener());
        coordinator.start_pipe(settings(&dir), 0.0, 0.01, 1000.0).unwrap();
        coordinator.submit_frame(tagged(1)).unwrap();
        coordinator.submit_frame(tagged(2)).unwrap();
        for _ in 0..10 {
            coordinator.advance();
        }
        assert!(!coordinator.is_pipe_recording());

        // Either still draining or already drained, never both
        let deadline = Instant::now() + Duration::from_secs(5);
        while coordinator.is_draining() && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(5));
        }
        assert!(!coordinator.is_draining());

        let second = RecordingSettings {
            output_path: Some(dir.path().join("second.mp4")),
            ..settings(&dir)
        };
        coordinator.start_pipe(second, 0.0, 1.0, 1000.0).unwrap();
        assert_eq!(coordinator.frame_count(), 0);
        assert_eq!(sink.open_count(), 2);
        assert_eq!(sink.close_count(), 1);

        coordinator.submit_frame(tagged(3)).unwrap();
        coordinator.stop().unwrap();
        assert_eq!(tags(&sink), vec![1, 2, 3]);
        assert_eq!(sink.close_count(), 2);
    }

    #[test]
    fn test_restart_while_draining_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let sink = MemorySink::new();
        let mut coordinator = RecordingCoordinator::with_opener(sink.opener());
        coordinator.start_pipe(settings(&dir), 0.0, 0.2, 5.0).unwrap();
        for tag in 0..5 {
            coordinator.submit_frame(tagged(tag)).unwrap();
        }
        coordinator.advance();
        assert!(!coordinator.is_pipe_recording());
        assert!(coordinator.is_draining());

        let err = coordinator.start_by_frames(0, 10, 24.0).unwrap_err();
        assert!(matches!(err, RecordingError::PreviousSessionDraining(_)));

        let report = coordinator.stop().unwrap().unwrap();
        assert_eq!(report.frames_written, 5);
        coordinator.start_by_frames(0, 10, 24.0).unwrap();
    }

    #[test]
    fn test_drop_closes_sink() {
        let dir = tempfile::tempdir().unwrap();
        let sink = MemorySink::new();
        {
            let mut coordinator = RecordingCoordinator::with_opener(sink.opener());
            coordinator.start_pipe(settings(&dir), 0.0, 1.0, 500.0).unwrap();
            coordinator.submit_frame(tagged(4)).unwrap();
        }
        assert_eq!(tags(&sink), vec![4]);
        assert_eq!(sink.close_count(), 1);
    }

    #[test]
    fn test_catch_up_policy_from_settings() {
        let dir = tempfile::tempdir().unwrap();
        let sink = MemorySink::new();
        let mut coordinator = RecordingCoordinator::with_opener(sink.opener());
        let settings = RecordingSettings {
            pacing: PacingPolicy::CatchUp,
            ..settings(&dir)
        };
        coordinator.start_pipe(settings, 0.0, 10.0, 50.0).unwrap();
        for tag in 0..4 {
            coordinator.submit_frame(tagged(tag)).unwrap();
        }
        let report = coordinator.stop().unwrap().unwrap();
        assert_eq!(report.frames_written, 4);
        assert_eq!(tags(&sink), vec![0, 1, 2, 3]);
    }
}
