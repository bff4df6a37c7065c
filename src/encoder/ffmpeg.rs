//! FFmpeg encoder sink
//!
//! Spawns FFmpeg reading raw video from stdin and encoding to the configured
//! output file. Frames are written to the child's stdin one at a time.

use crate::recorder::channel::{EncoderSink, SinkOpener};
use crate::recorder::config::RecordingSettings;
use std::collections::VecDeque;
use std::io::{self, BufRead, BufReader, Read, Write};
use std::process::{Child, ChildStdin, Command, Stdio};
use std::thread::JoinHandle;

/// FFmpeg pixel format for a channel count
pub fn pixel_format(channels: u8) -> &'static str {
    match channels {
        1 => "gray",
        4 => "rgba",
        _ => "rgb24",
    }
}

/// Build the FFmpeg argument list for a raw-video pipe recording
pub fn build_args(settings: &RecordingSettings) -> Vec<String> {
    let fps = settings.fps.to_string();
    let mut args: Vec<String> = vec![
        "-y".into(),  // Overwrite output (existence is checked before opening)
        "-an".into(), // No audio
        "-loglevel".into(),
        "quiet".into(),
        // Input
        "-r".into(),
        fps.clone(),
        "-s".into(),
        format!("{}x{}", settings.width, settings.height),
        "-f".into(),
        "rawvideo".into(),
        "-pix_fmt".into(),
        pixel_format(settings.channels).into(),
    ];
    args.extend(settings.extra_input_args.iter().cloned());
    args.extend(["-i", "pipe:"].map(String::from));

    // Output
    args.extend([
        "-r".to_string(),
        fps,
        "-c:v".to_string(),
        settings.video_codec.clone(),
        "-b:v".to_string(),
        format!("{}k", settings.bitrate_kbps),
    ]);
    if settings.flip_vertical {
        args.extend(["-vf", "vflip"].map(String::from));
    }
    args.extend(settings.extra_output_args.iter().cloned());

    if let Some(output) = &settings.output_path {
        args.push(output.to_string_lossy().to_string());
    }

    args.retain(|arg| !arg.is_empty());
    args
}

/// Opens an FFmpeg child process per recording session
#[derive(Debug, Clone, Copy, Default)]
pub struct FfmpegOpener;

impl SinkOpener for FfmpegOpener {
    fn open(&self, settings: &RecordingSettings) -> io::Result<Box<dyn EncoderSink>> {
        Ok(Box::new(FfmpegPipeSink::spawn(settings)?))
    }
}

/// Lines of encoder stderr kept for error reports
const STDERR_TAIL_LINES: usize = 20;

/// Raw-video stdin pipe into an FFmpeg process
#[derive(Debug)]
pub struct FfmpegPipeSink {
    process: Option<Child>,
    stdin: Option<ChildStdin>,
    stderr: Option<JoinHandle<Vec<String>>>,
}

impl FfmpegPipeSink {
    pub fn spawn(settings: &RecordingSettings) -> io::Result<Self> {
        let args = build_args(settings);
        let mut process = Command::new(settings.encoder())
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()?;

        let pipes = process.stdin.take().zip(process.stderr.take());
        let started = match pipes {
            Some((stdin, stderr)) => drain_stderr(stderr).map(|reader| (stdin, reader)),
            None => Err(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "FFmpeg pipes unavailable",
            )),
        };
        let (stdin, stderr) = match started {
            Ok(pipes) => pipes,
            Err(e) => {
                let _ = process.kill();
                let _ = process.wait();
                return Err(e);
            }
        };

        tracing::info!(
            "Started FFmpeg encoder: {}x{} @ {}fps, output: {:?}",
            settings.width,
            settings.height,
            settings.fps,
            settings.output_path
        );
        tracing::debug!("FFmpeg command: {} {}", settings.encoder(), args.join(" "));

        Ok(Self {
            process: Some(process),
            stdin: Some(stdin),
            stderr: Some(stderr),
        })
    }

    fn stderr_tail(&mut self) -> Vec<String> {
        self.stderr
            .take()
            .and_then(|reader| reader.join().ok())
            .unwrap_or_default()
    }
}

/// Read the encoder's stderr to the end on its own thread so the pipe never
/// fills. Each line is logged; the last few are returned for error reports.
fn drain_stderr<R: Read + Send + 'static>(stderr: R) -> io::Result<JoinHandle<Vec<String>>> {
    std::thread::Builder::new()
        .name("ffmpeg-stderr".to_string())
        .spawn(move || {
            let mut reader = BufReader::new(stderr);
            let mut tail = VecDeque::with_capacity(STDERR_TAIL_LINES);
            let mut buf = Vec::new();

            loop {
                buf.clear();
                match reader.read_until(b'\n', &mut buf) {
                    Ok(0) => break,
                    Ok(_) => {
                        let line = String::from_utf8_lossy(&buf).trim_end().to_string();
                        if line.is_empty() {
                            continue;
                        }
                        tracing::debug!("FFmpeg: {}", line);
                        if tail.len() == STDERR_TAIL_LINES {
                            tail.pop_front();
                        }
                        tail.push_back(line);
                    }
                    Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                    Err(e) => {
                        tracing::warn!("Error reading FFmpeg stderr: {}", e);
                        break;
                    }
                }
            }

            tail.into_iter().collect()
        })
}

impl EncoderSink for FfmpegPipeSink {
    fn write_frame(&mut self, bytes: &[u8]) -> io::Result<usize> {
        let stdin = self
            .stdin
            .as_mut()
            .ok_or_else(|| io::Error::new(io::ErrorKind::BrokenPipe, "FFmpeg pipe is closed"))?;
        stdin.write_all(bytes)?;
        Ok(bytes.len())
    }

    fn close(&mut self) -> io::Result<()> {
        // Closing stdin signals EOF
        drop(self.stdin.take());

        let Some(mut process) = self.process.take() else {
            return Ok(());
        };

        let status = process.wait()?;
        let stderr = self.stderr_tail();
        if !status.success() {
            return Err(io::Error::other(format!(
                "FFmpeg exited with status {}: {}",
                status,
                stderr.join("\n")
            )));
        }

        tracing::info!("FFmpeg encoder finished");
        Ok(())
    }
}

impl Drop for FfmpegPipeSink {
    fn drop(&mut self) {
        drop(self.stdin.take());
        if let Some(mut process) = self.process.take() {
            tracing::warn!("FFmpeg sink dropped without close, terminating encoder");
            let _ = process.kill();
            let _ = process.wait();
        }
        self.stderr_tail();
    }
}
